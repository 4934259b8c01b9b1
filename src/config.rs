//! Server configuration from environment variables (after `.env` is loaded).

use crate::error::ConfigError;
use crate::store::DEFAULT_SCHEMA;
use regex::Regex;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub backend: StoreBackend,
    /// Required for the postgres backend.
    pub database_url: Option<String>,
    /// Postgres schema holding the settings tables.
    pub settings_schema: String,
    /// JSON file of `{kind, id, path}` rows for the static element resolver.
    pub element_paths: Option<PathBuf>,
    pub body_limit_bytes: usize,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|e| ConfigError::Invalid {
            key: "BIND_ADDR",
            message: format!("{}: {}", bind_raw, e),
        })?;

        let database_url = get("DATABASE_URL");
        let backend = match get("SETTINGS_STORE").as_deref() {
            Some("memory") => StoreBackend::Memory,
            Some("postgres") => StoreBackend::Postgres,
            None if database_url.is_some() => StoreBackend::Postgres,
            None => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "SETTINGS_STORE",
                    message: format!("expected memory or postgres, got {}", other),
                })
            }
        };
        if backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingVar("DATABASE_URL"));
        }

        let settings_schema = get("SETTINGS_SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.to_string());
        if !is_identifier(&settings_schema) {
            return Err(ConfigError::Invalid {
                key: "SETTINGS_SCHEMA",
                message: format!("{} is not a plain SQL identifier", settings_schema),
            });
        }

        let body_limit_bytes = match get("BODY_LIMIT_BYTES") {
            Some(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
                key: "BODY_LIMIT_BYTES",
                message: format!("{}: {}", raw, e),
            })?,
            None => DEFAULT_BODY_LIMIT_BYTES,
        };

        Ok(ServerConfig {
            bind_addr,
            backend,
            database_url,
            settings_schema,
            element_paths: get("ELEMENT_PATHS").map(PathBuf::from),
            body_limit_bytes,
        })
    }
}

/// Schema names are spliced into DDL, so only unquoted identifiers are accepted.
fn is_identifier(name: &str) -> bool {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$")
        .map(|re| re.is_match(name))
        .unwrap_or(false)
}
