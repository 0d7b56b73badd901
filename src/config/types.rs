//! Core configuration types and loading.

use ipnet::IpNet;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::security::SecurityConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Service identity.
    pub server: ServerConfig,
    /// HTTP listener.
    pub http: HttpConfig,
    /// Database configuration.
    pub database: Option<DatabaseConfig>,
    /// Fingerprint secret and binding policy.
    pub security: SecurityConfig,
    /// Resolver tuning.
    #[serde(default)]
    pub resolver: ResolverConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Database path, defaulting to `watchgate.db`.
    pub fn database_path(&self) -> &str {
        self.database
            .as_ref()
            .map(|d| d.path.as_str())
            .unwrap_or("watchgate.db")
    }
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Name used in logs.
    pub name: String,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Address to bind to (e.g., "0.0.0.0:8080").
    pub address: SocketAddr,
    /// Reverse proxies whose `X-Forwarded-For` header is trusted for the viewer address.
    #[serde(default)]
    pub trusted_proxies: Vec<IpNet>,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file.
    pub path: String,
}

/// Resolver tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
    /// Milliseconds allowed for each backing-store call before failing as transient (default: 3000).
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

impl ResolverConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            store_timeout_ms: default_store_timeout_ms(),
        }
    }
}

fn default_store_timeout_ms() -> u64 {
    3000
}

pub(super) fn default_true() -> bool {
    true
}
