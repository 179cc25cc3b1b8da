//! Store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `EMPORIUM_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! ## Optional
//! - `EMPORIUM_DB_MAX_CONNECTIONS` - Pool upper bound (default: 10)
//! - `EMPORIUM_DB_MIN_CONNECTIONS` - Idle connections kept open (default: 1)
//! - `EMPORIUM_DB_ACQUIRE_TIMEOUT_SECS` - Seconds to wait for a connection (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Connection pool sizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    /// Maximum open connections.
    pub max_connections: u32,
    /// Minimum idle connections.
    pub min_connections: u32,
    /// How long `acquire` waits before failing.
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

/// Store configuration.
///
/// Implements `Debug` manually to redact the database URL.
#[derive(Clone)]
pub struct StoreConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Connection pool sizing
    pub pool: PoolSettings,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. "production")
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("database_url", &"[REDACTED]")
            .field("pool", &self.pool)
            .field("sentry_dsn", &self.sentry_dsn)
            .field("sentry_environment", &self.sentry_environment)
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
    /// Returns `ConfigError` if the database URL is missing or a numeric
    /// setting cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// `from_env` delegates here; tests pass a map instead of mutating the
    /// process environment.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("EMPORIUM_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("EMPORIUM_DATABASE_URL".to_string()))?;

        let defaults = PoolSettings::default();
        let max_connections =
            parse_or_default(&lookup, "EMPORIUM_DB_MAX_CONNECTIONS", defaults.max_connections)?;
        let min_connections =
            parse_or_default(&lookup, "EMPORIUM_DB_MIN_CONNECTIONS", defaults.min_connections)?;
        let acquire_timeout_secs = parse_or_default(
            &lookup,
            "EMPORIUM_DB_ACQUIRE_TIMEOUT_SECS",
            defaults.acquire_timeout.as_secs(),
        )?;

        if max_connections == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "EMPORIUM_DB_MAX_CONNECTIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        if min_connections > max_connections {
            return Err(ConfigError::InvalidEnvVar(
                "EMPORIUM_DB_MIN_CONNECTIONS".to_string(),
                format!("must not exceed max connections ({max_connections})"),
            ));
        }

        Ok(Self {
            database_url,
            pool: PoolSettings {
                max_connections,
                min_connections,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            },
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT").filter(|v| !v.is_empty()),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional numeric variable, falling back to `default` when unset.
fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StoreConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StoreConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_requires_database_url() {
        assert_eq!(
            load(&[]).unwrap_err(),
            ConfigError::MissingEnvVar("EMPORIUM_DATABASE_URL".to_string())
        );
    }

    #[test]
    fn test_falls_back_to_generic_database_url() {
        let config = load(&[("DATABASE_URL", "postgres://fallback")]).unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fallback");
    }

    #[test]
    fn test_prefers_specific_database_url() {
        let config = load(&[
            ("EMPORIUM_DATABASE_URL", "postgres://specific"),
            ("DATABASE_URL", "postgres://fallback"),
        ])
        .unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://specific");
    }

    #[test]
    fn test_pool_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://x")]).unwrap();
        assert_eq!(config.pool, PoolSettings::default());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_pool_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgres://x"),
            ("EMPORIUM_DB_MAX_CONNECTIONS", "20"),
            ("EMPORIUM_DB_MIN_CONNECTIONS", " 4 "),
            ("EMPORIUM_DB_ACQUIRE_TIMEOUT_SECS", "3"),
        ])
        .unwrap();
        assert_eq!(config.pool.max_connections, 20);
        assert_eq!(config.pool.min_connections, 4);
        assert_eq!(config.pool.acquire_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_rejects_bad_numbers() {
        let err = load(&[
            ("DATABASE_URL", "postgres://x"),
            ("EMPORIUM_DB_MAX_CONNECTIONS", "many"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "EMPORIUM_DB_MAX_CONNECTIONS"));
    }

    #[test]
    fn test_rejects_min_above_max() {
        let err = load(&[
            ("DATABASE_URL", "postgres://x"),
            ("EMPORIUM_DB_MAX_CONNECTIONS", "2"),
            ("EMPORIUM_DB_MIN_CONNECTIONS", "5"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "EMPORIUM_DB_MIN_CONNECTIONS"));
    }

    #[test]
    fn test_debug_redacts_url() {
        let config = load(&[("DATABASE_URL", "postgres://user:hunter2@db")]).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }
}
