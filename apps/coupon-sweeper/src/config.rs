//! Sweeper configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,alo=debug,sqlx=warn";

/// Coupon sweeper configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweeperConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Time between sweeps
    pub sweep_interval: Duration,

    /// Pool size
    pub max_connections: u32,
}

impl SweeperConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable              | Default            |
    /// |-----------------------|--------------------|
    /// | `ALO_DB_PATH`         | `./alotrabong.db`  |
    /// | `SWEEP_INTERVAL_SECS` | `3600`             |
    /// | `DB_MAX_CONNECTIONS`  | `5`                |
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sweep_interval_secs: u64 = lookup("SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|| "3600".to_string()) // hourly
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SWEEP_INTERVAL_SECS".to_string()))?;

        if sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidValue("SWEEP_INTERVAL_SECS".to_string()));
        }

        let max_connections: u32 = lookup("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()))?;

        if max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        let database_path = lookup("ALO_DB_PATH")
            .map(|p| p.trim().to_string())
            .unwrap_or_else(|| "./alotrabong.db".to_string());

        if database_path.is_empty() {
            return Err(ConfigError::MissingRequired("ALO_DB_PATH".to_string()));
        }

        Ok(SweeperConfig {
            database_path: PathBuf::from(database_path),
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            max_connections,
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<SweeperConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SweeperConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.database_path, PathBuf::from("./alotrabong.db"));
        assert_eq!(config.sweep_interval, Duration::from_secs(3600));
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("ALO_DB_PATH", "/var/lib/alo/coupons.db"),
            ("SWEEP_INTERVAL_SECS", " 60 "),
            ("DB_MAX_CONNECTIONS", "2"),
        ])
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/alo/coupons.db"));
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
        assert_eq!(config.max_connections, 2);
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("SWEEP_INTERVAL_SECS", "hourly"),
            ("SWEEP_INTERVAL_SECS", "0"),
            ("DB_MAX_CONNECTIONS", "-1"),
            ("DB_MAX_CONNECTIONS", "0"),
        ] {
            let err = from_pairs(&[(key, value)]).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue(ref k) if k == key));
        }

        let err = from_pairs(&[("ALO_DB_PATH", "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(_)));
    }
}
