//! Sink classification by destination URL scheme

use url::Url;

/// The sink family a record is routed to, derived from the scheme of its
/// destination URL. Never stored on the record itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageStrategy {
    /// Per-record cloud-event delivery over HTTP(S).
    Http,
    /// Batched upload to S3-compatible storage (`s3`, `s3a`).
    S3,
    /// Batched upload to Google Cloud Storage (`gs`).
    Gcs,
    /// Batched upload to Azure Blob Storage (`abfs`).
    Azure,
}

impl StorageStrategy {
    /// Classify a destination URL. Total: unrecognized schemes default to
    /// [`StorageStrategy::Http`].
    pub fn for_url(url: &Url) -> Self {
        Self::for_scheme(url.scheme())
    }

    /// Classify a scheme token by case-sensitive prefix match.
    pub fn for_scheme(scheme: &str) -> Self {
        if scheme.starts_with("http") {
            Self::Http
        } else if scheme.starts_with("s3") {
            Self::S3
        } else if scheme.starts_with("gs") {
            Self::Gcs
        } else if scheme.starts_with("abfs") {
            Self::Azure
        } else {
            Self::Http
        }
    }

    /// Whether records with this strategy flow through the batching pipeline
    /// into blob storage rather than the per-record HTTP sink.
    pub fn is_blob(self) -> bool {
        !matches!(self, Self::Http)
    }
}

#[cfg(test)]
#[path = "strategy_test.rs"]
mod strategy_test;
