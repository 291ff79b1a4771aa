/// Configuration management for the personalization service
///
/// Values come from environment variables (optionally via a `.env` file).
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub storage: StorageConfig,
    pub ranking: RankingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    pub refresh_mode: FeedRefreshMode,
    /// Pending users the deferred refresh queue holds before callers wait
    pub refresh_queue_capacity: usize,
    /// Buffered activity events per live subscriber before it starts lagging
    pub activity_channel_capacity: usize,
}

/// Where interest scores, feed rankings and the catalog live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Postgres catalog + Redis fast store
    Redis,
    /// Process-local stores, for local development and tests
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(format!("expected 'redis' or 'memory', got '{}'", other)),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redis => write!(f, "redis"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// When a user's feed is rebuilt after an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedRefreshMode {
    /// Rebuild inside the interaction request
    Sync,
    /// Queue the rebuild; coalesce repeated requests per user
    Deferred,
}

impl FromStr for FeedRefreshMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sync" => Ok(Self::Sync),
            "deferred" => Ok(Self::Deferred),
            other => Err(format!("expected 'sync' or 'deferred', got '{}'", other)),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_backend: StorageBackend =
            parse_or(&lookup, "STORAGE_BACKEND", StorageBackend::Redis)?;

        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None if storage_backend == StorageBackend::Memory => String::new(),
            None => return Err(ConfigError::Missing("DATABASE_URL")),
        };

        let env = lookup("APP_ENV").unwrap_or_else(|| "development".to_string());
        let json_logs = match lookup("LOG_FORMAT") {
            Some(format) => format.eq_ignore_ascii_case("json"),
            None => env == "production",
        };

        Ok(Config {
            app: AppConfig {
                env,
                host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "APP_PORT", 8000)?,
                json_logs,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            },
            redis: RedisConfig {
                url: lookup("REDIS_URL").unwrap_or_else(|| "redis://localhost:6379".to_string()),
            },
            storage: StorageConfig {
                backend: storage_backend,
            },
            ranking: RankingConfig {
                refresh_mode: parse_or(&lookup, "FEED_REFRESH_MODE", FeedRefreshMode::Sync)?,
                refresh_queue_capacity: parse_or(&lookup, "FEED_REFRESH_QUEUE_CAPACITY", 1024)?,
                activity_channel_capacity: parse_or(&lookup, "ACTIVITY_CHANNEL_CAPACITY", 256)?,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
