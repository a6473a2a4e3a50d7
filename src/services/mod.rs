// src/services/mod.rs

//! Quiz core: generation, scoring and ranking.

pub mod answer_evaluator;
pub mod leaderboard;
pub mod quiz_generator;

use std::sync::Mutex;

use rand::rngs::StdRng;

use crate::error::AppError;

/// Runs `f` with exclusive access to the shared RNG.
///
/// Kept synchronous so the guard can never be held across an `.await`.
pub fn with_rng<T>(rng: &Mutex<StdRng>, f: impl FnOnce(&mut StdRng) -> T) -> Result<T, AppError> {
    let mut guard = rng
        .lock()
        .map_err(|_| AppError::InternalServerError("quiz rng lock poisoned".to_string()))?;
    Ok(f(&mut guard))
}
