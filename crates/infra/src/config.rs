//! Configuration loading and representation.
//!
//! Read once at startup from environment variables.

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_JWT_SECRET: &str = "dev-secret";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("USE_PERSISTENT_STORES=true requires DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Where the stores live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    InMemory,
    Postgres { url: String, max_connections: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    /// `true` when no `JWT_SECRET` was supplied and the dev default is in use.
    pub insecure_jwt_secret: bool,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let (jwt_secret, insecure_jwt_secret) = match get("JWT_SECRET") {
            Some(secret) if !secret.is_empty() => (secret, false),
            _ => (DEFAULT_JWT_SECRET.to_string(), true),
        };

        let persistent = match get("USE_PERSISTENT_STORES") {
            Some(v) => v.parse::<bool>().map_err(|_| ConfigError::Invalid {
                key: "USE_PERSISTENT_STORES",
                value: v,
            })?,
            None => false,
        };

        let storage = if persistent {
            let url = get("DATABASE_URL").ok_or(ConfigError::MissingDatabaseUrl)?;
            let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
                Some(v) => v.parse::<u32>().map_err(|_| ConfigError::Invalid {
                    key: "DATABASE_MAX_CONNECTIONS",
                    value: v,
                })?,
                None => DEFAULT_MAX_CONNECTIONS,
            };
            StorageConfig::Postgres {
                url,
                max_connections,
            }
        } else {
            StorageConfig::InMemory
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            insecure_jwt_secret,
            storage,
        })
    }
}
