// src/db/postgres.rs

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, migrate::MigrateError, postgres::PgPoolOptions, types::Json};
use uuid::Uuid;

use super::Store;
use crate::{
    catalog::Scenario,
    error::AppError,
    models::{
        quiz::{NewQuiz, Quiz},
        stock::NewStock,
        user::User,
        user_score::{AnswerRecord, AnswerTally, NewUserScore, UserScore},
    },
};

const MAX_CONNECT_ATTEMPTS: u32 = 5;

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct QuizRow {
    id: Uuid,
    #[sqlx(rename = "type")]
    kind: String,
    symbol: String,
    correct_answer: String,
    payload: Json<Scenario>,
    created_at: DateTime<Utc>,
}

impl TryFrom<QuizRow> for Quiz {
    type Error = AppError;

    fn try_from(row: QuizRow) -> Result<Self, Self::Error> {
        Ok(Quiz {
            id: row.id,
            kind: row.kind.parse().map_err(AppError::InternalServerError)?,
            symbol: row.symbol,
            correct_answer: row
                .correct_answer
                .parse()
                .map_err(AppError::InternalServerError)?,
            payload: row.payload.0,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct UserScoreRow {
    id: Uuid,
    user_id: Uuid,
    quiz_id: Uuid,
    answer: String,
    correct: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserScoreRow> for UserScore {
    type Error = AppError;

    fn try_from(row: UserScoreRow) -> Result<Self, Self::Error> {
        Ok(UserScore {
            id: row.id,
            user_id: row.user_id,
            quiz_id: row.quiz_id,
            answer: row.answer.parse().map_err(AppError::InternalServerError)?,
            correct: row.correct,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct TallyRow {
    user_id: Uuid,
    username: Option<String>,
    total: i64,
    correct: i64,
}

#[derive(FromRow)]
struct AnswerRecordRow {
    quiz_id: Uuid,
    #[sqlx(rename = "type")]
    kind: String,
    symbol: String,
    answer: String,
    correct: bool,
    answered_at: DateTime<Utc>,
}

impl TryFrom<AnswerRecordRow> for AnswerRecord {
    type Error = AppError;

    fn try_from(row: AnswerRecordRow) -> Result<Self, Self::Error> {
        Ok(AnswerRecord {
            quiz_id: row.quiz_id,
            kind: row.kind.parse().map_err(AppError::InternalServerError)?,
            symbol: row.symbol,
            answer: row.answer.parse().map_err(AppError::InternalServerError)?,
            correct: row.correct,
            answered_at: row.answered_at,
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects with a small retry loop so the service can start alongside its database.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let mut retry_count = 0;
        loop {
            match PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(3))
                .connect(database_url)
                .await
            {
                Ok(pool) => return Ok(Self::new(pool)),
                Err(e) => {
                    retry_count += 1;
                    if retry_count >= MAX_CONNECT_ATTEMPTS {
                        tracing::error!(
                            "Failed to connect to database after {} attempts: {}",
                            retry_count,
                            e
                        );
                        return Err(e);
                    }
                    tracing::warn!(
                        "Database not ready, retrying in 2s... (Attempt {})",
                        retry_count
                    );
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        }
    }

    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Username already exists".to_string())
            } else {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::from(e)
            }
        })
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn upsert_stock(&self, stock: &NewStock) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO stocks (symbol, name, exchange)
            VALUES ($1, $2, $3)
            ON CONFLICT (symbol) DO NOTHING
            "#,
        )
        .bind(&stock.symbol)
        .bind(&stock.name)
        .bind(&stock.exchange)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upsert stock {}: {:?}", stock.symbol, e);
            AppError::from(e)
        })?;

        Ok(result.rows_affected() == 1)
    }

    async fn create_quiz(&self, quiz: NewQuiz) -> Result<Quiz, AppError> {
        let row = sqlx::query_as::<_, QuizRow>(
            r#"
            INSERT INTO quizzes (type, symbol, correct_answer, payload)
            VALUES ($1, $2, $3, $4)
            RETURNING id, type, symbol, correct_answer, payload, created_at
            "#,
        )
        .bind(quiz.kind.as_str())
        .bind(&quiz.symbol)
        .bind(quiz.correct_answer.as_str())
        .bind(Json(&quiz.payload))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create quiz: {:?}", e);
            AppError::from(e)
        })?;

        row.try_into()
    }

    async fn find_quiz(&self, id: Uuid) -> Result<Option<Quiz>, AppError> {
        let row = sqlx::query_as::<_, QuizRow>(
            r#"
            SELECT id, type, symbol, correct_answer, payload, created_at
            FROM quizzes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Quiz::try_from).transpose()
    }

    async fn find_answer(
        &self,
        user_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<Option<UserScore>, AppError> {
        let row = sqlx::query_as::<_, UserScoreRow>(
            r#"
            SELECT id, user_id, quiz_id, answer, correct, created_at
            FROM user_scores
            WHERE user_id = $1 AND quiz_id = $2
            "#,
        )
        .bind(user_id)
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserScore::try_from).transpose()
    }

    async fn create_answer(&self, answer: NewUserScore) -> Result<UserScore, AppError> {
        // The (user_id, quiz_id) unique constraint decides concurrent duplicates.
        let row = sqlx::query_as::<_, UserScoreRow>(
            r#"
            INSERT INTO user_scores (user_id, quiz_id, answer, correct)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, quiz_id, answer, correct, created_at
            "#,
        )
        .bind(answer.user_id)
        .bind(answer.quiz_id)
        .bind(answer.answer.as_str())
        .bind(answer.correct)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Quiz already answered".to_string())
            } else {
                tracing::error!("Failed to record answer: {:?}", e);
                AppError::from(e)
            }
        })?;

        row.try_into()
    }

    async fn answer_tallies(&self) -> Result<Vec<AnswerTally>, AppError> {
        let rows = sqlx::query_as::<_, TallyRow>(
            r#"
            SELECT
                s.user_id,
                u.username,
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE s.correct) AS correct
            FROM user_scores s
            LEFT JOIN users u ON u.id = s.user_id
            GROUP BY s.user_id, u.username
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to tally answers: {:?}", e);
            AppError::from(e)
        })?;

        Ok(rows
            .into_iter()
            .map(|row| AnswerTally {
                user_id: row.user_id,
                username: row.username,
                total: row.total,
                correct: row.correct,
            })
            .collect())
    }

    async fn answers_for_user(&self, user_id: Uuid) -> Result<Vec<AnswerRecord>, AppError> {
        let rows = sqlx::query_as::<_, AnswerRecordRow>(
            r#"
            SELECT
                s.quiz_id,
                q.type,
                q.symbol,
                s.answer,
                s.correct,
                s.created_at AS answered_at
            FROM user_scores s
            JOIN quizzes q ON q.id = s.quiz_id
            WHERE s.user_id = $1
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AnswerRecord::try_from).collect()
    }
}
