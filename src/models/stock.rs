// src/models/stock.rs

use chrono::{DateTime, Utc};

/// A row of the 'stocks' table as the in-memory store keeps it. Rows are created
/// lazily when a quiz first references a symbol and are never updated afterwards.
#[derive(Debug, Clone)]
pub struct Stock {
    pub symbol: String,
    pub name: String,
    pub exchange: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewStock {
    pub symbol: String,
    pub name: String,
    pub exchange: Option<String>,
}
