// src/state.rs

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rand::{SeedableRng, rngs::StdRng};

use crate::{catalog::Catalog, config::Config, db::Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub catalog: Arc<Catalog>,
    /// Source of randomness for scenario picks and synthetic moves.
    pub rng: Arc<Mutex<StdRng>>,
    pub config: Config,
}

impl AppState {
    /// Seeds the RNG from `config.quiz_seed`, or from OS entropy when unset.
    pub fn new(store: Arc<dyn Store>, catalog: Catalog, config: Config) -> Self {
        let rng = match config.quiz_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            store,
            catalog: Arc::new(catalog),
            rng: Arc::new(Mutex::new(rng)),
            config,
        }
    }
}

impl FromRef<AppState> for Arc<dyn Store> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
