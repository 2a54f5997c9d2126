//! Store configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `MAGHOLDER_DB_PATH` | `magholder.db` |
//! | `MAGHOLDER_DB_MAX_CONNECTIONS` | `5` |
//! | `MAGHOLDER_PRICING_CACHE_TTL_SECS` | `60` (`0` disables the cache) |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::pool::DbConfig;

pub const DB_PATH_VAR: &str = "MAGHOLDER_DB_PATH";
pub const DB_MAX_CONNECTIONS_VAR: &str = "MAGHOLDER_DB_MAX_CONNECTIONS";
pub const PRICING_CACHE_TTL_VAR: &str = "MAGHOLDER_PRICING_CACHE_TTL_SECS";

/// Store configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// How long an active pricing table is served from cache
    pub pricing_cache_ttl: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            database_path: PathBuf::from("magholder.db"),
            max_connections: 5,
            pricing_cache_ttl: Duration::from_secs(60),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = StoreConfig::default();

        let config = StoreConfig {
            database_path: lookup(DB_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            max_connections: parse_or(&lookup, DB_MAX_CONNECTIONS_VAR, defaults.max_connections)?,

            pricing_cache_ttl: Duration::from_secs(parse_or(
                &lookup,
                PRICING_CACHE_TTL_VAR,
                defaults.pricing_cache_ttl.as_secs(),
            )?),
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(DB_MAX_CONNECTIONS_VAR.to_string()));
        }

        Ok(config)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone()).max_connections(self.max_connections)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
