//! Blob store errors

use inflog_marshal::MarshalError;
use thiserror::Error;

/// Errors from storing a batch.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The batch was empty. Checked before the marshaller is invoked.
    #[error("empty batch")]
    EmptyBatch,

    /// The destination URL scheme is not a blob scheme.
    #[error("invalid blob scheme {0:?}")]
    InvalidScheme(String),

    /// The destination URL carries no bucket.
    #[error("no bucket specified in url {0}")]
    MissingBucket(String),

    /// The record's request type has no `.`-separated tail to build the
    /// object key from.
    #[error("invalid request type {0:?}")]
    InvalidRequestType(String),

    /// No provider is registered for the URL scheme.
    #[error("no blob provider registered for scheme {0:?}")]
    UnknownScheme(String),

    #[error(transparent)]
    Marshal(#[from] MarshalError),

    /// The provider could not be constructed for the target bucket.
    #[error("failed to build provider for bucket {bucket:?}: {message}")]
    Provider { bucket: String, message: String },

    /// The upload itself failed.
    #[error("upload of {key:?} failed: {message}")]
    Upload { key: String, message: String },
}
