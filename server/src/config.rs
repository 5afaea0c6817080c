use std::{env, fmt::Display, str::FromStr};

use mongodb::options::ConnectionString;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

pub const URI_VAR: &str = "MONGODB_URI";
pub const DATABASE_VAR: &str = "MONGODB_DATABASE";
const DEFAULT_DATABASE: &str = "todo-app";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    Missing(&'static str),

    #[error("{key} is not a valid URI: {reason}")]
    InvalidUri { key: &'static str, reason: String },

    #[error("unsupported store scheme `{0}` (expected mongodb, mongodb+srv or memory)")]
    UnsupportedScheme(String),

    #[error("invalid {key} value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            host: try_load(&lookup, "HOST", "127.0.0.1")?,
            port: try_load(&lookup, "PORT", "3000")?,
            store: load_store(&lookup)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            value,
            reason: e.to_string(),
        }
    })
}

fn load_store(lookup: &impl Fn(&str) -> Option<String>) -> Result<StoreConfig, ConfigError> {
    let uri = lookup(URI_VAR)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(URI_VAR))?;
    let invalid = |reason: String| ConfigError::InvalidUri { key: URI_VAR, reason };

    let Some((scheme, _)) = uri.split_once("://") else {
        return Err(invalid("missing scheme".to_string()));
    };
    let (backend, from_uri) = match scheme {
        "mongodb" | "mongodb+srv" => {
            let parsed = ConnectionString::parse(&uri).map_err(|e| invalid(e.to_string()))?;
            (StoreBackend::Mongo, parsed.default_database)
        }
        "memory" => {
            let parsed = Url::parse(&uri).map_err(|e| invalid(e.to_string()))?;
            let path = parsed.path().trim_start_matches('/');
            (StoreBackend::Memory, Some(path.to_string()).filter(|p| !p.is_empty()))
        }
        other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
    };

    let database = match (lookup(DATABASE_VAR).filter(|v| !v.trim().is_empty()), from_uri) {
        (Some(name), _) | (None, Some(name)) => name,
        (None, None) => {
            info!("{DATABASE_VAR} not set, using default: {DEFAULT_DATABASE}");
            DEFAULT_DATABASE.to_string()
        }
    };

    Ok(StoreConfig {
        backend,
        uri,
        database,
    })
}
