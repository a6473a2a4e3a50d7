// src/services/answer_evaluator.rs

use std::sync::Mutex;

use rand::{Rng, rngs::StdRng};
use uuid::Uuid;

use super::with_rng;
use crate::{
    catalog::Scenario,
    db::Store,
    error::AppError,
    models::{
        quiz::{ActualOutcome, AnswerResult, Direction, QuizKind},
        user_score::{HistoryEntry, NewUserScore},
    },
};

/// Points for a correct call. A wrong call scores zero.
pub const CORRECT_SCORE: i64 = 100;

/// Bounds of the reported move, in percent.
const MIN_MOVE: f64 = 2.0;
const MAX_MOVE: f64 = 25.0;

pub fn score_for(correct: bool) -> i64 {
    if correct { CORRECT_SCORE } else { 0 }
}

/// Draws the cosmetic "actual move" shown after an answer.
///
/// The magnitude is random within `[MIN_MOVE, MAX_MOVE]`, rounded to two
/// decimals. The sign follows `direction`, so it always agrees with the
/// correct answer. No market data is involved.
pub fn synthetic_move<R>(direction: Direction, rng: &mut R) -> f64
where
    R: Rng + ?Sized,
{
    let magnitude = rng.gen_range(MIN_MOVE..MAX_MOVE);
    let magnitude = (magnitude * 100.0).round() / 100.0;

    match direction {
        Direction::Up => magnitude,
        Direction::Down => -magnitude,
    }
}

/// Scenario explanation followed by the synthetic outcome sentence.
pub fn narrative(scenario: &Scenario, percent_change: f64) -> String {
    let days = scenario.prediction_days();
    let magnitude = percent_change.abs();

    let outcome = match scenario.kind {
        QuizKind::Technical => format!(
            "The price moved {} by {:.2}% over the next {} days.",
            if percent_change >= 0.0 { "up" } else { "down" },
            magnitude,
            days
        ),
        QuizKind::Fundamental => format!(
            "The share price went on to {} {:.2}% over the following {} days.",
            if percent_change >= 0.0 { "rise" } else { "fall" },
            magnitude,
            days
        ),
    };

    format!("{} {}", scenario.explanation, outcome)
}

/// Scores a user's answer to a stored quiz and records it.
///
/// * `NotFound` when the quiz does not exist.
/// * `Conflict` when the user already answered it, including when a
///   concurrent submission wins the race at insert time.
pub async fn evaluate_answer(
    store: &dyn Store,
    rng: &Mutex<StdRng>,
    user_id: Uuid,
    quiz_id: Uuid,
    answer: Direction,
) -> Result<AnswerResult, AppError> {
    let quiz = store
        .find_quiz(quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

    if store.find_answer(user_id, quiz_id).await?.is_some() {
        return Err(AppError::Conflict("Quiz already answered".to_string()));
    }

    let correct = answer == quiz.correct_answer;
    let percent_change = with_rng(rng, |rng| synthetic_move(quiz.correct_answer, rng))?;

    store
        .create_answer(NewUserScore {
            user_id,
            quiz_id,
            answer,
            correct,
        })
        .await
        .inspect_err(|e| {
            if matches!(e, AppError::Conflict(_)) {
                tracing::warn!(%user_id, %quiz_id, "Concurrent duplicate answer rejected");
            }
        })?;

    tracing::info!(%user_id, %quiz_id, correct, "Answer recorded");

    Ok(AnswerResult {
        correct,
        explanation: narrative(&quiz.payload, percent_change),
        actual_outcome: ActualOutcome {
            percent_change,
            direction: quiz.correct_answer,
        },
        score: score_for(correct),
    })
}

/// The user's answers, newest first.
pub async fn user_history(store: &dyn Store, user_id: Uuid) -> Result<Vec<HistoryEntry>, AppError> {
    let records = store.answers_for_user(user_id).await?;

    Ok(records
        .into_iter()
        .map(|record| HistoryEntry {
            quiz_id: record.quiz_id,
            kind: record.kind,
            symbol: record.symbol,
            answer: record.answer,
            correct: record.correct,
            score: score_for(record.correct),
            answered_at: record.answered_at,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::Catalog, db::MemoryStore, models::quiz::NewQuiz};
    use rand::SeedableRng;

    async fn store_with_quiz(scenario_id: &str) -> (MemoryStore, Uuid) {
        let catalog = Catalog::embedded().unwrap();
        let store = MemoryStore::new();
        let quiz = store
            .create_quiz(NewQuiz::from(catalog.get(scenario_id).unwrap()))
            .await
            .unwrap();
        (store, quiz.id)
    }

    #[test]
    fn synthetic_move_sign_follows_direction() {
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..200 {
            let up = synthetic_move(Direction::Up, &mut rng);
            assert!((MIN_MOVE..=MAX_MOVE).contains(&up), "{}", up);

            let down = synthetic_move(Direction::Down, &mut rng);
            assert!((-MAX_MOVE..=-MIN_MOVE).contains(&down), "{}", down);
        }
    }

    #[test]
    fn synthetic_move_has_two_decimals() {
        let mut rng = StdRng::seed_from_u64(11);
        let value = synthetic_move(Direction::Up, &mut rng);

        assert!(((value * 100.0).round() - value * 100.0).abs() < 1e-9);
    }

    #[test]
    fn narrative_starts_with_explanation() {
        let catalog = Catalog::embedded().unwrap();
        let scenario = catalog.get("tech_7").unwrap();
        let text = narrative(scenario, -12.5);

        assert!(text.starts_with(&scenario.explanation));
        assert!(text.ends_with("The price moved down by 12.50% over the next 15 days."));
    }

    #[tokio::test]
    async fn correct_answer_scores_100() {
        // tech_1 is a Head and Shoulders top, resolved down.
        let (store, quiz_id) = store_with_quiz("tech_1").await;
        let rng = Mutex::new(StdRng::seed_from_u64(1));
        let user_id = Uuid::new_v4();

        let result = evaluate_answer(&store, &rng, user_id, quiz_id, Direction::Down)
            .await
            .unwrap();

        assert!(result.correct);
        assert_eq!(result.score, 100);
        assert_eq!(result.actual_outcome.direction, Direction::Down);
        assert!(result.actual_outcome.percent_change < 0.0);
    }

    #[tokio::test]
    async fn wrong_answer_scores_0_and_reports_unfavorable_move() {
        let (store, quiz_id) = store_with_quiz("tech_1").await;
        let rng = Mutex::new(StdRng::seed_from_u64(2));

        let result = evaluate_answer(&store, &rng, Uuid::new_v4(), quiz_id, Direction::Up)
            .await
            .unwrap();

        assert!(!result.correct);
        assert_eq!(result.score, 0);
        assert!(result.actual_outcome.percent_change < 0.0);
    }

    #[tokio::test]
    async fn second_submission_conflicts() {
        let (store, quiz_id) = store_with_quiz("fund_2").await;
        let rng = Mutex::new(StdRng::seed_from_u64(3));
        let user_id = Uuid::new_v4();

        evaluate_answer(&store, &rng, user_id, quiz_id, Direction::Up)
            .await
            .unwrap();
        let err = evaluate_answer(&store, &rng, user_id, quiz_id, Direction::Down)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.answer_tallies().await.unwrap()[0].total, 1);
    }

    #[tokio::test]
    async fn unknown_quiz_is_not_found() {
        let store = MemoryStore::new();
        let rng = Mutex::new(StdRng::seed_from_u64(4));

        let err = evaluate_answer(&store, &rng, Uuid::new_v4(), Uuid::new_v4(), Direction::Up)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn history_lists_scored_answers() {
        let (store, quiz_id) = store_with_quiz("fund_1").await;
        let rng = Mutex::new(StdRng::seed_from_u64(6));
        let user_id = Uuid::new_v4();

        evaluate_answer(&store, &rng, user_id, quiz_id, Direction::Down)
            .await
            .unwrap();
        let history = user_history(&store, user_id).await.unwrap();

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].quiz_id, quiz_id);
        assert_eq!(history[0].symbol, "NFLX");
        assert_eq!(history[0].score, 100);
        assert!(user_history(&store, Uuid::new_v4()).await.unwrap().is_empty());
    }
}
