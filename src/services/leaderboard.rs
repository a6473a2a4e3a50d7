// src/services/leaderboard.rs

use std::cmp::Ordering;

use crate::{
    db::Store,
    error::AppError,
    models::{
        leaderboard::{LeaderboardEntry, LeaderboardUser},
        user_score::AnswerTally,
    },
    services::answer_evaluator::CORRECT_SCORE,
};

const ANONYMOUS: &str = "Anonymous";

/// Percentage of correct answers, rounded to two decimals.
pub fn accuracy(correct: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let raw = correct as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

/// Orders by total score descending. Ties go to the higher accuracy, then to
/// the username and finally the user id, both ascending.
fn compare(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.total_score
        .cmp(&a.total_score)
        .then_with(|| b.accuracy.total_cmp(&a.accuracy))
        .then_with(|| a.user.username.cmp(&b.user.username))
        .then_with(|| a.user.id.cmp(&b.user.id))
}

/// Turns raw tallies into the ranked, truncated leaderboard.
pub fn rank(tallies: Vec<AnswerTally>, limit: usize) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = tallies
        .into_iter()
        .filter(|t| t.total > 0)
        .map(|t| LeaderboardEntry {
            user: LeaderboardUser {
                id: t.user_id,
                username: t.username.unwrap_or_else(|| ANONYMOUS.to_string()),
            },
            total_score: t.correct * CORRECT_SCORE,
            total_quizzes: t.total,
            accuracy: accuracy(t.correct, t.total),
            // Streaks are not tracked yet.
            current_streak: 0,
            best_streak: 0,
        })
        .collect();

    entries.sort_by(compare);
    entries.truncate(limit);
    entries
}

pub async fn get_leaderboard(
    store: &dyn Store,
    limit: usize,
) -> Result<Vec<LeaderboardEntry>, AppError> {
    let tallies = store.answer_tallies().await?;
    Ok(rank(tallies, limit))
}
