// src/config.rs

use std::env;

/// `DATABASE_URL` value that selects the in-process store instead of Postgres.
pub const MEMORY_DATABASE_URL: &str = "memory";

const DEFAULT_JWT_EXPIRATION: u64 = 7 * 24 * 60 * 60;
const DEFAULT_PORT: u16 = 4000;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub port: u16,
    /// Allowed CORS origin.
    pub frontend_url: String,
    /// Fixed seed for the quiz RNG. Entropy-seeded when absent.
    pub quiz_seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// `DATABASE_URL` and `JWT_SECRET` are required; every other key falls
    /// back to its default when missing or unparsable.
    pub fn from_vars<F>(get: F) -> Result<Self, env::VarError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = get("DATABASE_URL").ok_or(env::VarError::NotPresent)?;
        let jwt_secret = get("JWT_SECRET").ok_or(env::VarError::NotPresent)?;

        let jwt_expiration = get("JWT_EXPIRATION")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_JWT_EXPIRATION);

        let rust_log = get("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let port = get("PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let frontend_url =
            get("FRONTEND_URL").unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string());

        let quiz_seed = get("QUIZ_SEED").and_then(|v| v.parse().ok());

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            port,
            frontend_url,
            quiz_seed,
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE_URL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_optional_keys_missing() {
        let env = vars(&[("DATABASE_URL", "postgres://localhost/quiz"), ("JWT_SECRET", "s")]);
        let config = Config::from_vars(|k| env.get(k).cloned()).unwrap();

        assert_eq!(config.jwt_expiration, 604_800);
        assert_eq!(config.port, 4000);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.frontend_url, "http://localhost:5173");
        assert_eq!(config.quiz_seed, None);
        assert!(!config.uses_memory_store());
    }

    #[test]
    fn missing_secret_is_an_error() {
        let env = vars(&[("DATABASE_URL", "memory")]);
        assert!(Config::from_vars(|k| env.get(k).cloned()).is_err());
    }

    #[test]
    fn parses_overrides_and_ignores_garbage() {
        let env = vars(&[
            ("DATABASE_URL", "memory"),
            ("JWT_SECRET", "s"),
            ("PORT", "8080"),
            ("QUIZ_SEED", "42"),
            ("JWT_EXPIRATION", "not-a-number"),
        ]);
        let config = Config::from_vars(|k| env.get(k).cloned()).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.quiz_seed, Some(42));
        assert_eq!(config.jwt_expiration, 604_800);
        assert!(config.uses_memory_store());
    }
}
