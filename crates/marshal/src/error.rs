//! Marshalling errors

use thiserror::Error;

/// Errors from marshalling a batch.
#[derive(Debug, Error)]
pub enum MarshalError {
    /// The batch could not be encoded as JSON.
    #[error("failed to encode batch as JSON: {0}")]
    Encode(#[from] serde_json::Error),

    /// The marshaller service could not be reached.
    #[error("marshaller request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The marshaller service answered outside `[200, 300)`. Carries a
    /// prefix of the response body for diagnosis.
    #[error("marshaller returned status {status}: {body}")]
    Status { status: u16, body: String },
}

impl MarshalError {
    /// Whether a retry could plausibly succeed: transport failures, 5xx,
    /// and the throttling statuses 408/429. Other 4xx are terminal.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Encode(_) => false,
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 408 || *status == 429,
        }
    }
}
