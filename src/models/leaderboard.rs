// src/models/leaderboard.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

fn default_limit() -> u32 {
    50
}

/// Query string for `GET /api/quiz/leaderboard`.
#[derive(Debug, Deserialize, Validate)]
pub struct LeaderboardParams {
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LeaderboardUser {
    pub id: Uuid,
    pub username: String,
}

/// One ranked row of the leaderboard.
///
/// `current_streak` and `best_streak` are reserved fields and always zero.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user: LeaderboardUser,
    pub total_score: i64,
    pub total_quizzes: i64,
    pub accuracy: f64,
    pub current_streak: i64,
    pub best_streak: i64,
}
