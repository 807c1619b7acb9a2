//! In-process JSON marshaller

use async_trait::async_trait;
use inflog_record::LogRecord;

use crate::{MarshalError, MarshalOutput, Marshaller, DEFAULT_EXTENSION};

/// Encodes batches as JSON in process.
///
/// A batch of length one is encoded as the single record object, not a
/// one-element array; every other length is encoded as an array. The
/// extension is always `json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMarshaller;

pub(crate) fn encode(batch: &[LogRecord]) -> Result<Vec<u8>, serde_json::Error> {
    match batch {
        [record] => serde_json::to_vec(record),
        _ => serde_json::to_vec(batch),
    }
}

#[async_trait]
impl Marshaller for JsonMarshaller {
    async fn marshal(&self, batch: &[LogRecord]) -> Result<MarshalOutput, MarshalError> {
        let data = encode(batch)?;
        Ok(MarshalOutput {
            data: data.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "json_test.rs"]
mod json_test;
