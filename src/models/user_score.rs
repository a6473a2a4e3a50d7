// src/models/user_score.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::quiz::{Direction, QuizKind};

/// One user's answer to one quiz. At most one exists per (user, quiz) pair.
#[derive(Debug, Clone)]
pub struct UserScore {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub answer: Direction,
    pub correct: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUserScore {
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub answer: Direction,
    pub correct: bool,
}

/// Group-by result over `user_scores`: attempt counts for a single user.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerTally {
    pub user_id: Uuid,
    /// `None` only from the in-memory store, for an answer whose user it does not know.
    /// Postgres cannot produce it: `user_scores.user_id` references `users`.
    pub username: Option<String>,
    pub total: i64,
    pub correct: i64,
}

/// An answer joined with the quiz it belongs to.
#[derive(Debug, Clone)]
pub struct AnswerRecord {
    pub quiz_id: Uuid,
    pub kind: QuizKind,
    pub symbol: String,
    pub answer: Direction,
    pub correct: bool,
    pub answered_at: DateTime<Utc>,
}

/// Item of `GET /api/quiz/history`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub quiz_id: Uuid,
    #[serde(rename = "type")]
    pub kind: QuizKind,
    pub symbol: String,
    pub answer: Direction,
    pub correct: bool,
    pub score: i64,
    pub answered_at: DateTime<Utc>,
}
