//! HTTP cloud-event sink
//!
//! Delivers one record at a time to its destination URL as a binary-mode
//! cloud event. Record metadata and annotations travel as plain headers;
//! routing metadata becomes `ce-*` extension attributes.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use inflog_record::LogRecord;
use parking_lot::Mutex;
use reqwest::header::HeaderName;

use crate::DeliverError;

/// Configuration for the HTTP sink.
#[derive(Debug, Clone)]
pub struct HttpSinkConfig {
    /// Directory holding CA certificate files referenced by
    /// `LogRecord::cert_name`.
    pub cert_dir: PathBuf,

    /// Per-request timeout.
    pub request_timeout: Duration,

    /// Delivery attempts per record, including the first.
    pub retry_attempts: usize,

    /// Base delay for exponential backoff; doubles each retry, capped at
    /// 64x.
    pub retry_base_delay: Duration,
}

impl Default for HttpSinkConfig {
    fn default() -> Self {
        Self {
            cert_dir: PathBuf::from("/etc/tls"),
            request_timeout: Duration::from_secs(30),
            retry_attempts: 3,
            retry_base_delay: Duration::from_secs(1),
        }
    }
}

impl HttpSinkConfig {
    #[must_use]
    pub fn with_cert_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cert_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retry_attempts(mut self, attempts: usize) -> Self {
        self.retry_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    fn retry_delay(&self, attempt: usize) -> Duration {
        self.retry_base_delay * (1u32 << attempt.min(6) as u32)
    }
}

/// TLS variant a record asks for, keying the client cache.
type ClientKey = (String, bool);

/// The cloud-event delivery client used by the worker pool.
///
/// Clients are cached per `(cert_name, tls_skip_verify)` pair so records
/// with TLS hints do not rebuild a connector on every delivery.
pub struct HttpSink {
    config: HttpSinkConfig,
    default_client: reqwest::Client,
    clients: Mutex<HashMap<ClientKey, reqwest::Client>>,
}

impl HttpSink {
    pub fn new(config: HttpSinkConfig) -> Result<Self, DeliverError> {
        let default_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(DeliverError::Client)?;
        Ok(Self {
            config,
            default_client,
            clients: Mutex::new(HashMap::new()),
        })
    }

    /// Deliver `record` to its destination, retrying transient failures
    /// with capped exponential backoff.
    pub async fn deliver(&self, record: &LogRecord) -> Result<(), DeliverError> {
        let mut last_error = String::new();

        for attempt in 0..self.config.retry_attempts.max(1) {
            if attempt > 0 {
                tokio::time::sleep(self.config.retry_delay(attempt - 1)).await;
            }

            match self.send(record).await {
                Ok(()) => return Ok(()),
                Err(error) if error.is_transient() => {
                    tracing::debug!(
                        record_id = %record.id,
                        attempt = attempt + 1,
                        max_attempts = self.config.retry_attempts,
                        error = %error,
                        "delivery attempt failed"
                    );
                    last_error = error.to_string();
                }
                Err(error) => return Err(error),
            }
        }

        Err(DeliverError::RetriesExhausted {
            attempts: self.config.retry_attempts,
            last_error,
        })
    }

    async fn send(&self, record: &LogRecord) -> Result<(), DeliverError> {
        let client = self.client_for(record)?;

        let content_type = if record.content_type.is_empty() {
            "application/json"
        } else {
            record.content_type.as_str()
        };

        let mut request = client
            .post(record.url.clone())
            .header("content-type", content_type)
            .header("ce-specversion", "1.0")
            .header("ce-id", record.id.as_str())
            .header("ce-type", record.request_type.as_str())
            .header("ce-time", Utc::now().to_rfc3339());

        if let Some(source) = &record.source_uri {
            request = request.header("ce-source", source.as_str());
        }
        for (name, value) in [
            ("ce-namespace", record.namespace.as_str()),
            ("ce-inferenceservicename", record.inference_service.as_str()),
            ("ce-component", record.component.as_str()),
            ("ce-endpoint", record.endpoint.as_str()),
        ] {
            if !value.is_empty() {
                request = request.header(name, value);
            }
        }

        for (key, values) in &record.metadata {
            let Ok(name) = HeaderName::from_bytes(key.as_bytes()) else {
                tracing::warn!(record_id = %record.id, header = %key, "skipping invalid metadata header");
                continue;
            };
            for value in values {
                request = request.header(name.clone(), value.as_str());
            }
        }
        for (key, value) in &record.annotations {
            let Ok(name) = HeaderName::from_bytes(key.as_bytes()) else {
                tracing::warn!(record_id = %record.id, header = %key, "skipping invalid annotation header");
                continue;
            };
            request = request.header(name, value.as_str());
        }

        if let Some(payload) = &record.payload {
            request = request.body(payload.clone());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeliverError::Status {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    fn client_for(&self, record: &LogRecord) -> Result<reqwest::Client, DeliverError> {
        if record.cert_name.is_empty() && !record.tls_skip_verify {
            return Ok(self.default_client.clone());
        }

        let key: ClientKey = (record.cert_name.clone(), record.tls_skip_verify);
        if let Some(client) = self.clients.lock().get(&key) {
            return Ok(client.clone());
        }

        let mut builder = reqwest::Client::builder().timeout(self.config.request_timeout);
        if record.tls_skip_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        if !record.cert_name.is_empty() {
            let path = self.config.cert_dir.join(&record.cert_name);
            let pem = std::fs::read(&path).map_err(|source| DeliverError::Certificate {
                name: record.cert_name.clone(),
                source,
            })?;
            let certificate = reqwest::Certificate::from_pem(&pem).map_err(|source| {
                DeliverError::InvalidCertificate {
                    name: record.cert_name.clone(),
                    source,
                }
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        let client = builder.build().map_err(DeliverError::Client)?;
        self.clients.lock().insert(key, client.clone());
        Ok(client)
    }
}

#[cfg(test)]
#[path = "sink_test.rs"]
mod sink_test;
