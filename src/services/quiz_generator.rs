// src/services/quiz_generator.rs

use std::sync::Mutex;

use rand::{Rng, rngs::StdRng, seq::SliceRandom};

use super::with_rng;
use crate::{
    catalog::{Catalog, Scenario},
    db::Store,
    error::AppError,
    models::{
        quiz::{NewQuiz, QuizKind, QuizResponse},
        stock::NewStock,
    },
};

/// Picks one scenario of `kind` uniformly at random.
pub fn pick_scenario<'a, R>(catalog: &'a Catalog, kind: QuizKind, rng: &mut R) -> Option<&'a Scenario>
where
    R: Rng + ?Sized,
{
    catalog.of_kind(kind).choose(rng).copied()
}

/// Generates and stores a new quiz of `kind`.
///
/// * Picks a random scenario from the catalog.
/// * Makes sure the referenced stock exists (create-if-absent).
/// * Stores the quiz with the full scenario, explanation included.
/// * Returns the sanitized view without answer or explanation.
pub async fn generate_quiz(
    store: &dyn Store,
    catalog: &Catalog,
    rng: &Mutex<StdRng>,
    kind: QuizKind,
) -> Result<QuizResponse, AppError> {
    let scenario = with_rng(rng, |rng| pick_scenario(catalog, kind, rng).cloned())?
        .ok_or_else(|| AppError::NotFound(format!("No {} scenarios available", kind)))?;

    let created = store
        .upsert_stock(&NewStock {
            symbol: scenario.symbol.clone(),
            name: scenario.stock_name.clone(),
            exchange: Some(scenario.exchange.clone()),
        })
        .await?;
    if created {
        tracing::info!("Registered stock {}", scenario.symbol);
    }

    let quiz = store.create_quiz(NewQuiz::from(&scenario)).await?;
    tracing::info!(
        quiz_id = %quiz.id,
        scenario = %scenario.id,
        "Generated {} quiz for {}",
        kind,
        quiz.symbol
    );

    Ok(QuizResponse::from(&quiz))
}
