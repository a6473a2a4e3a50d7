// src/db/mod.rs

//! Persistence gateway.
//!
//! Handlers and services only see the [`Store`] trait. `PgStore` is the
//! production backend; `MemoryStore` keeps everything in process and backs the
//! test suite (and `DATABASE_URL=memory`).

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    config::Config,
    error::AppError,
    models::{
        quiz::{NewQuiz, Quiz},
        stock::NewStock,
        user::User,
        user_score::{AnswerRecord, AnswerTally, NewUserScore, UserScore},
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Fails with `Conflict` when the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Inserts the stock unless the symbol is already known.
    /// Returns `true` when a new row was created.
    async fn upsert_stock(&self, stock: &NewStock) -> Result<bool, AppError>;

    async fn create_quiz(&self, quiz: NewQuiz) -> Result<Quiz, AppError>;

    async fn find_quiz(&self, id: Uuid) -> Result<Option<Quiz>, AppError>;

    async fn find_answer(&self, user_id: Uuid, quiz_id: Uuid)
    -> Result<Option<UserScore>, AppError>;

    /// Fails with `Conflict` when the (user, quiz) pair already has an answer.
    /// The check and the insert are atomic.
    async fn create_answer(&self, answer: NewUserScore) -> Result<UserScore, AppError>;

    /// Per-user answer counts, grouped by user.
    async fn answer_tallies(&self) -> Result<Vec<AnswerTally>, AppError>;

    /// A user's answers joined with their quizzes, newest first.
    async fn answers_for_user(&self, user_id: Uuid) -> Result<Vec<AnswerRecord>, AppError>;
}

/// Opens the store selected by `DATABASE_URL` and, for Postgres, applies migrations.
pub async fn connect(config: &Config) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    if config.uses_memory_store() {
        tracing::warn!("Using in-memory store, data will not survive a restart");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = PgStore::connect(&config.database_url).await?;
    tracing::info!("Database connected...");

    tracing::info!("Running migrations...");
    store.migrate().await?;
    tracing::info!("Migrations applied successfully.");

    Ok(Arc::new(store))
}
