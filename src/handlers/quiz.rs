// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::Store,
    error::AppError,
    models::{
        leaderboard::LeaderboardParams,
        quiz::{AnswerRequest, QuizKind, QuizParams},
    },
    services::{answer_evaluator, leaderboard, quiz_generator},
    state::AppState,
    utils::jwt::Claims,
};

/// Generates a quiz of the requested type.
///
/// `type` defaults to technical when missing or unrecognized, including a
/// query string the extractor cannot decode (e.g. a repeated `type` key).
/// The response never carries the correct answer or the explanation.
pub async fn get_quiz(
    State(state): State<AppState>,
    params: Result<Query<QuizParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let params = params.map(|Query(params)| params).unwrap_or_else(|rejection| {
        tracing::debug!("Unreadable quiz query, using defaults: {}", rejection.body_text());
        QuizParams::default()
    });
    let kind = QuizKind::from_query(params.kind.as_deref());

    let quiz =
        quiz_generator::generate_quiz(state.store.as_ref(), &state.catalog, &state.rng, kind)
            .await?;

    Ok(Json(quiz))
}

/// Submits the caller's prediction for a quiz.
///
/// * 404 if the quiz does not exist (or the id is not a UUID).
/// * 409 if the caller already answered it.
pub async fn submit_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let user_id = claims.user_id()?;
    let quiz_id =
        Uuid::parse_str(&id).map_err(|_| AppError::NotFound("Quiz not found".to_string()))?;

    let result = answer_evaluator::evaluate_answer(
        state.store.as_ref(),
        &state.rng,
        user_id,
        quiz_id,
        req.answer,
    )
    .await?;

    Ok(Json(result))
}

/// Ranks users by total score. `limit` must be within 1..=100 (default 50).
pub async fn get_leaderboard(
    State(store): State<Arc<dyn Store>>,
    params: Result<Query<LeaderboardParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params?;
    params.validate()?;

    let board = leaderboard::get_leaderboard(store.as_ref(), params.limit as usize).await?;

    Ok(Json(board))
}

/// Lists the caller's past answers, newest first.
pub async fn get_history(
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let history = answer_evaluator::user_history(store.as_ref(), claims.user_id()?).await?;

    Ok(Json(history))
}
