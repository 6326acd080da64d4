//! Reel API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::time::Duration;

use reel_db::DbConfig;

/// Reel API configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Interface to bind (default: 0.0.0.0)
    pub host: String,

    /// HTTP port (default: 3001)
    pub port: u16,

    /// SQLite database file
    pub db_path: String,

    /// Pool size
    pub db_max_connections: u32,

    /// How long a request waits for a pooled connection, in seconds
    pub db_acquire_timeout_secs: u64,

    /// Per-request timeout, in seconds
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            host: "0.0.0.0".to_string(),
            port: 3001,
            db_path: "sakila.db".to_string(),
            db_max_connections: 5,
            db_acquire_timeout_secs: 30,
            request_timeout_secs: 15,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup (the environment, or a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            host: lookup("REEL_HOST").unwrap_or(defaults.host),

            port: parse_or(&lookup, "REEL_PORT", defaults.port)?,

            db_path: lookup("REEL_DB_PATH").unwrap_or(defaults.db_path),

            db_max_connections: parse_or(
                &lookup,
                "REEL_DB_MAX_CONNECTIONS",
                defaults.db_max_connections,
            )?,

            db_acquire_timeout_secs: parse_or(
                &lookup,
                "REEL_DB_ACQUIRE_TIMEOUT_SECS",
                defaults.db_acquire_timeout_secs,
            )?,

            request_timeout_secs: parse_or(
                &lookup,
                "REEL_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "REEL_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Pool configuration. The store must already exist.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.db_path)
            .max_connections(self.db_max_connections)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(self.db_acquire_timeout_secs))
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ApiConfig::default());
        assert_eq!(config.bind_address(), "0.0.0.0:3001");
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_overrides() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("REEL_PORT", "8080"),
            ("REEL_DB_PATH", "/data/sakila.db"),
            ("REEL_DB_MAX_CONNECTIONS", " 10 "),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.db_config().max_connections, 10);
        assert_eq!(
            config.db_config().database_path,
            std::path::PathBuf::from("/data/sakila.db")
        );
        assert!(!config.db_config().create_if_missing);
    }

    #[test]
    fn test_invalid_values() {
        let err = ApiConfig::from_lookup(lookup(&[("REEL_PORT", "eighty")])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for REEL_PORT");

        let err =
            ApiConfig::from_lookup(lookup(&[("REEL_DB_MAX_CONNECTIONS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }
}
