//! Pipeline errors

use thiserror::Error;

/// Errors from delivering one record to the HTTP sink.
#[derive(Debug, Error)]
pub enum DeliverError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    /// The CA certificate named by the record could not be read.
    #[error("failed to load certificate {name:?}: {source}")]
    Certificate {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The CA certificate named by the record is not valid PEM.
    #[error("invalid certificate {name:?}: {source}")]
    InvalidCertificate {
        name: String,
        #[source]
        source: reqwest::Error,
    },

    /// The request never reached the sink.
    #[error("delivery failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The sink answered outside `[200, 300)`.
    #[error("sink returned status {status}")]
    Status { status: u16 },

    /// Every retry attempt failed.
    #[error("all {attempts} delivery attempts failed: {last_error}")]
    RetriesExhausted { attempts: usize, last_error: String },
}

impl DeliverError {
    /// Whether a retry could plausibly succeed: transport failures, 5xx,
    /// and the throttling statuses 408/429. Other statuses and local
    /// configuration problems are terminal.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status } => *status >= 500 || *status == 408 || *status == 429,
            _ => false,
        }
    }
}

/// Errors from the pipeline surface itself.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid pipeline configuration: {0}")]
    Config(String),

    /// The ingress queue is full (try_submit only).
    #[error("ingress queue is full")]
    QueueFull,

    /// The pipeline has been shut down.
    #[error("pipeline is shut down")]
    Closed,

    #[error(transparent)]
    Sink(#[from] DeliverError),
}
