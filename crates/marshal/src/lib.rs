//! Batch marshalling for the payload logging pipeline
//!
//! A marshaller turns a batch of [`LogRecord`]s into an opaque byte buffer
//! plus a file-extension token; the blob store writes the buffer under a key
//! ending in that extension. Two implementations share one wire contract:
//!
//! - [`JsonMarshaller`] encodes in process. A single-record batch is encoded
//!   as the bare record object, everything else as a JSON array. Downstream
//!   consumers rely on single-record files being plain objects, so the
//!   asymmetry is part of the contract.
//! - [`HttpMarshaller`] POSTs the batch as a JSON array to a remote service
//!   and reads back arbitrary bytes (JSON, Parquet, ...) together with the
//!   `X-Log-Marshal-Extension` response header.
//!
//! [`handler::router`] serves the same contract over HTTP, so a process can
//! expose its in-process marshaller to remote callers.

mod error;
pub mod handler;
mod http;
mod json;

pub use error::MarshalError;
pub use http::HttpMarshaller;
pub use json::JsonMarshaller;

use async_trait::async_trait;
use bytes::Bytes;
use inflog_record::LogRecord;

/// File-extension token used when a marshaller does not report one.
pub const DEFAULT_EXTENSION: &str = "json";

/// Response header carrying the file-extension token, without the dot.
pub const EXTENSION_HEADER: &str = "x-log-marshal-extension";

/// A marshalled batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarshalOutput {
    /// The marshalled file contents.
    pub data: Bytes,
    /// File-extension token without the dot, e.g. `json` or `parquet`.
    pub extension: String,
}

/// Converts a batch of records into bytes plus an extension token.
///
/// Implementations must be safe to share across tasks; the pipeline calls
/// `marshal` once per batch from a single task, but the instance itself may
/// be shared.
#[async_trait]
pub trait Marshaller: Send + Sync {
    async fn marshal(&self, batch: &[LogRecord]) -> Result<MarshalOutput, MarshalError>;
}
