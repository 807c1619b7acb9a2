//! Logging pipeline configuration

use std::path::PathBuf;

use serde::Deserialize;

use crate::ConfigError;

/// Configuration for the logging pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Size of the HTTP worker pool. Must be at least 1.
    pub worker_count: usize,

    /// Capacity of the ingress queue. Must be at least 1.
    pub queue_size: usize,

    /// Extra path segment appended after the component in every blob
    /// object key. May be empty.
    pub store_path: String,

    /// Remote marshaller URL. When empty, batches are marshalled in
    /// process and the same wire contract is served at the embedded
    /// marshaller bind address.
    pub marshaller_url: String,

    /// Directory holding CA certificate files for the HTTP sink.
    pub cert_dir: PathBuf,

    /// How blob-bound records are grouped before upload.
    pub batch: BatchPolicyConfig,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            queue_size: 128,
            store_path: String::new(),
            marshaller_url: String::new(),
            cert_dir: PathBuf::from("/etc/tls"),
            batch: BatchPolicyConfig::default(),
        }
    }
}

impl LoggerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count < 1 {
            return Err(ConfigError::Invalid(
                "logger.worker_count must be at least 1".to_string(),
            ));
        }
        if self.queue_size < 1 {
            return Err(ConfigError::Invalid(
                "logger.queue_size must be at least 1".to_string(),
            ));
        }
        self.batch.validate()
    }
}

/// Batch policy selection.
///
/// A timed policy with `interval_ms = 0` degrades to plain size batching.
///
/// # Example
///
/// ```toml
/// [logger.batch]
/// mode = "size"
/// size = 16
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum BatchPolicyConfig {
    /// One record per batch.
    Immediate,
    /// Emit after `size` records.
    Size { size: usize },
    /// Emit after `size` records or `interval_ms`, whichever comes first.
    Timed {
        size: usize,
        #[serde(default)]
        interval_ms: u64,
    },
}

impl Default for BatchPolicyConfig {
    fn default() -> Self {
        Self::Immediate
    }
}

impl BatchPolicyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::Immediate => Ok(()),
            Self::Size { size } | Self::Timed { size, .. } if size < 1 => Err(
                ConfigError::Invalid("logger.batch.size must be at least 1".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_modes_parse() {
        let immediate: BatchPolicyConfig = toml::from_str(r#"mode = "immediate""#).unwrap();
        assert_eq!(immediate, BatchPolicyConfig::Immediate);

        let size: BatchPolicyConfig = toml::from_str(
            r#"
            mode = "size"
            size = 16
            "#,
        )
        .unwrap();
        assert_eq!(size, BatchPolicyConfig::Size { size: 16 });

        let timed: BatchPolicyConfig = toml::from_str(
            r#"
            mode = "timed"
            size = 8
            "#,
        )
        .unwrap();
        assert_eq!(
            timed,
            BatchPolicyConfig::Timed {
                size: 8,
                interval_ms: 0
            }
        );
    }

    #[test]
    fn validation_rejects_zero_sizes() {
        assert!(BatchPolicyConfig::Size { size: 0 }.validate().is_err());
        assert!(BatchPolicyConfig::Timed {
            size: 0,
            interval_ms: 100
        }
        .validate()
        .is_err());
        assert!(BatchPolicyConfig::Immediate.validate().is_ok());

        let mut config = LoggerConfig::default();
        config.worker_count = 0;
        assert!(config.validate().is_err());

        let mut config = LoggerConfig::default();
        config.queue_size = 0;
        assert!(config.validate().is_err());
    }
}
