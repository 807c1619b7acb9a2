//! Configuration for the payload logging agent
//!
//! Loaded from a TOML file; every section has sensible defaults so a
//! missing file section never fails deserialization. Validation is a
//! separate step so the agent can report every problem before starting.

mod error;
mod logger;
mod logging;

pub use error::ConfigError;
pub use logger::{BatchPolicyConfig, LoggerConfig};
pub use logging::{LogConfig, LogFormat, LogLevel};

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;

/// Top-level agent configuration.
///
/// # Example
///
/// ```toml
/// [log]
/// level = "info"
/// format = "console"
///
/// [logger]
/// worker_count = 4
/// queue_size = 128
///
/// [logger.batch]
/// mode = "timed"
/// size = 64
/// interval_ms = 500
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Internal logging behaviour.
    pub log: LogConfig,

    /// The logging pipeline itself.
    pub logger: LoggerConfig,

    /// Embedded marshaller server, used when no remote marshaller is
    /// configured.
    pub marshaller_server: MarshallerServerConfig,

    /// Ingest endpoint accepting records over HTTP.
    pub ingest: IngestConfig,
}

impl Config {
    /// Load and parse a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw)?;
        Ok(config)
    }

    /// Check every section; returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logger.validate()
    }
}

/// Bind address for the embedded marshaller server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarshallerServerConfig {
    pub bind: SocketAddr,
}

impl Default for MarshallerServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 9443)),
        }
    }
}

/// Bind address for the record ingest endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub bind: SocketAddr,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}
