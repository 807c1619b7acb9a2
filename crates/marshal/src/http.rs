//! HTTP marshaller client

use async_trait::async_trait;
use inflog_record::LogRecord;

use crate::{MarshalError, MarshalOutput, Marshaller, DEFAULT_EXTENSION, EXTENSION_HEADER};

/// Marshals batches through a remote HTTP service.
///
/// The batch is POSTed as a JSON array; the response body is taken verbatim
/// as the marshalled file and the `X-Log-Marshal-Extension` header as the
/// extension token, defaulting to `json` when absent. Remote services may
/// return any format they like (Parquet, Avro, ...), which is the point of
/// outsourcing marshalling.
pub struct HttpMarshaller {
    url: String,
    client: reqwest::Client,
}

impl HttpMarshaller {
    /// Create a marshaller against `url`. The client should carry a request
    /// timeout; retry policy belongs to the caller.
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Marshaller for HttpMarshaller {
    async fn marshal(&self, batch: &[LogRecord]) -> Result<MarshalOutput, MarshalError> {
        let response = self.client.post(&self.url).json(&batch).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let mut body: String = body.chars().take(256).collect();
            if body.is_empty() {
                body.push_str("<empty body>");
            }
            return Err(MarshalError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let extension = response
            .headers()
            .get(EXTENSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_EXTENSION)
            .to_string();

        let data = response.bytes().await?;
        Ok(MarshalOutput { data, extension })
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;
