// src/models/mod.rs

pub mod leaderboard;
pub mod quiz;
pub mod stock;
pub mod user;
pub mod user_score;
