//! Store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MARKETPLACE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `MARKETPLACE_DB_MAX_CONNECTIONS` - Pool size upper bound (default: 10)
//! - `MARKETPLACE_DB_MIN_CONNECTIONS` - Idle connections kept open (default: 2)
//! - `MARKETPLACE_DB_ACQUIRE_TIMEOUT_SECS` - Pool acquire timeout (default: 10)
//! - `MARKETPLACE_TOKEN_BYTES` - Random bytes per confirmation key (default: 32, max: 48)

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use marketplace_core::RandomTokenGenerator;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Persistence layer configuration.
///
/// Implements `Debug` manually to redact the database URL.
#[derive(Clone)]
pub struct StoreConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Minimum number of pooled connections
    pub min_connections: u32,
    /// How long to wait for a free connection
    pub acquire_timeout: Duration,
    /// Random bytes drawn per confirmation token key
    pub token_bytes: usize,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("token_bytes", &self.token_bytes)
            .finish()
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("MARKETPLACE_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("MARKETPLACE_DATABASE_URL".to_owned()))?;

        let max_connections = parse_or_default(&lookup, "MARKETPLACE_DB_MAX_CONNECTIONS", 10)?;
        let min_connections = parse_or_default(&lookup, "MARKETPLACE_DB_MIN_CONNECTIONS", 2)?;
        if min_connections > max_connections {
            return Err(ConfigError::InvalidEnvVar(
                "MARKETPLACE_DB_MIN_CONNECTIONS".to_owned(),
                format!("must not exceed max connections ({max_connections})"),
            ));
        }

        let acquire_timeout = Duration::from_secs(parse_or_default(
            &lookup,
            "MARKETPLACE_DB_ACQUIRE_TIMEOUT_SECS",
            10,
        )?);

        let token_bytes = parse_or_default(
            &lookup,
            "MARKETPLACE_TOKEN_BYTES",
            RandomTokenGenerator::DEFAULT_BYTES,
        )?;
        if token_bytes == 0 || token_bytes > RandomTokenGenerator::MAX_BYTES {
            return Err(ConfigError::InvalidEnvVar(
                "MARKETPLACE_TOKEN_BYTES".to_owned(),
                format!("must be between 1 and {}", RandomTokenGenerator::MAX_BYTES),
            ));
        }

        Ok(Self {
            database_url,
            max_connections,
            min_connections,
            acquire_timeout,
            token_bytes,
        })
    }

    /// Token generator configured with `token_bytes`.
    #[must_use]
    pub fn token_generator(&self) -> RandomTokenGenerator {
        RandomTokenGenerator::new(self.token_bytes)
    }
}

/// Parse an optional variable, using `default` when unset.
fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_database_url() {
        let err = StoreConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "MARKETPLACE_DATABASE_URL"));
    }

    #[test]
    fn test_defaults() {
        let config =
            StoreConfig::from_lookup(lookup_from(&[("MARKETPLACE_DATABASE_URL", "postgres://x")]))
                .unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://x");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.acquire_timeout, Duration::from_secs(10));
        assert_eq!(config.token_bytes, 32);
    }

    #[test]
    fn test_falls_back_to_database_url() {
        let config =
            StoreConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://fallback")]))
                .unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fallback");
    }

    #[test]
    fn test_invalid_number() {
        let err = StoreConfig::from_lookup(lookup_from(&[
            ("MARKETPLACE_DATABASE_URL", "postgres://x"),
            ("MARKETPLACE_DB_MAX_CONNECTIONS", "many"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "MARKETPLACE_DB_MAX_CONNECTIONS"));
    }

    #[test]
    fn test_min_exceeds_max() {
        let err = StoreConfig::from_lookup(lookup_from(&[
            ("MARKETPLACE_DATABASE_URL", "postgres://x"),
            ("MARKETPLACE_DB_MAX_CONNECTIONS", "1"),
            ("MARKETPLACE_DB_MIN_CONNECTIONS", "3"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_token_bytes_bounds() {
        for bad in ["0", "49"] {
            let result = StoreConfig::from_lookup(lookup_from(&[
                ("MARKETPLACE_DATABASE_URL", "postgres://x"),
                ("MARKETPLACE_TOKEN_BYTES", bad),
            ]));
            assert!(result.is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_debug_redacts_url() {
        let config = StoreConfig::from_lookup(lookup_from(&[(
            "MARKETPLACE_DATABASE_URL",
            "postgres://user:hunter2@db",
        )]))
        .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }
}
