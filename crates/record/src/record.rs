//! The log record flowing through the pipeline

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

/// A single inference request or response envelope.
///
/// `url` is the destination and selects the sink: `http`/`https` URLs are
/// delivered one record at a time as cloud events, blob URLs (`s3`, `s3a`,
/// `gs`, `abfs`) flow through the batching pipeline into object storage.
///
/// All other fields are optional. Empty fields are omitted on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    /// Destination URL for this record.
    pub url: Url,

    /// Raw request/response payload, base64 on the wire.
    #[serde(
        rename = "bytes",
        default,
        skip_serializing_if = "Option::is_none",
        with = "base64_bytes"
    )]
    pub payload: Option<Vec<u8>>,

    /// Content type of the payload.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content_type: String,

    /// Dotted request type, e.g. `io.kserve.request`. The segment after the
    /// last `.` becomes part of the blob object key.
    #[serde(rename = "reqType", default, skip_serializing_if = "String::is_empty")]
    pub request_type: String,

    /// Caller-assigned id, opaque to the pipeline. Used verbatim in object
    /// keys and for log correlation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// URI of the component that produced the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<Url>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub inference_service: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub component: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub endpoint: String,

    /// Multi-valued headers propagated to the HTTP sink.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Vec<String>>,

    /// Single-valued annotations propagated to the HTTP sink.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub annotations: HashMap<String, String>,

    /// Name of a CA certificate file used when delivering to the HTTP sink.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cert_name: String,

    /// Skip TLS verification for the HTTP sink.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub tls_skip_verify: bool,
}

impl LogRecord {
    /// Create a record carrying only a destination; the remaining fields
    /// start empty.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            payload: None,
            content_type: String::new(),
            request_type: String::new(),
            id: String::new(),
            source_uri: None,
            inference_service: String::new(),
            namespace: String::new(),
            component: String::new(),
            endpoint: String::new(),
            metadata: HashMap::new(),
            annotations: HashMap::new(),
            cert_name: String::new(),
            tls_skip_verify: false,
        }
    }
}

/// Base64 (de)serialization for the optional payload, matching the wire
/// representation used by the external marshaller protocol.
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, ser: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => ser.serialize_str(&STANDARD.encode(bytes)),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded = Option::<String>::deserialize(de)?;
        match encoded {
            Some(s) => STANDARD
                .decode(s.as_bytes())
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "record_test.rs"]
mod record_test;
