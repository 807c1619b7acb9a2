//! Blob store writer

use std::sync::Arc;

use async_trait::async_trait;
use inflog_marshal::Marshaller;
use inflog_record::LogRecord;
use url::Url;

use crate::{parse_blob_store_url, ProviderRegistry, StoreError};

/// Terminal consumer of a batch destined for blob storage.
#[async_trait]
pub trait Store: Send + Sync {
    async fn store(&self, url: &Url, batch: &[LogRecord]) -> Result<(), StoreError>;
}

/// Writes marshalled batches to cloud object storage.
///
/// The object key is derived from the *first* record of the batch:
///
/// ```text
/// <url prefix>/<namespace>/<inferenceService>/<component>/<storePath>/<id>-<typeTail>.<ext>
/// ```
///
/// with empty segments elided. All records of a batch land in one object;
/// the marshaller puts the whole batch inside the file body.
pub struct BlobStore {
    store_path: String,
    marshaller: Arc<dyn Marshaller>,
    providers: ProviderRegistry,
}

impl BlobStore {
    pub fn new(
        store_path: impl Into<String>,
        marshaller: Arc<dyn Marshaller>,
        providers: ProviderRegistry,
    ) -> Self {
        Self {
            store_path: store_path.into(),
            marshaller,
            providers,
        }
    }

    fn object_prefix(&self, config_prefix: &str, record: &LogRecord) -> String {
        let segments = [
            config_prefix,
            record.namespace.as_str(),
            record.inference_service.as_str(),
            record.component.as_str(),
            self.store_path.as_str(),
        ];
        segments
            .into_iter()
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn object_key(
        &self,
        config_prefix: &str,
        record: &LogRecord,
        extension: &str,
    ) -> Result<String, StoreError> {
        let type_tail = record
            .request_type
            .rsplit_once('.')
            .map(|(_, tail)| tail)
            .ok_or_else(|| StoreError::InvalidRequestType(record.request_type.clone()))?;

        let prefix = self.object_prefix(config_prefix, record);
        Ok(format!("{prefix}/{}-{type_tail}.{extension}", record.id))
    }
}

#[async_trait]
impl Store for BlobStore {
    async fn store(&self, url: &Url, batch: &[LogRecord]) -> Result<(), StoreError> {
        let first = batch.first().ok_or(StoreError::EmptyBatch)?;

        let output = self.marshaller.marshal(batch).await?;

        let (bucket, config_prefix) = parse_blob_store_url(url)?;
        if bucket.is_empty() {
            return Err(StoreError::MissingBucket(url.to_string()));
        }

        let object_key = self.object_key(&config_prefix, first, &output.extension)?;
        let provider = self.providers.get(url.scheme())?;
        provider
            .upload_object(&bucket, &object_key, output.data)
            .await?;

        tracing::info!(
            bucket = %bucket,
            key = %object_key,
            records = batch.len(),
            "uploaded batch"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "blob_test.rs"]
mod blob_test;
