//! Opendal-backed blob provider

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use opendal::services::{Azblob, Gcs, Memory, S3};
use opendal::Operator;
use parking_lot::Mutex;

use crate::{BlobProvider, StoreError};

/// The opendal service a provider instance talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    S3,
    Gcs,
    Azblob,
    /// In-memory backend. Useful for local development; uploads vanish with
    /// the process.
    Memory,
}

/// A [`BlobProvider`] backed by an opendal operator per bucket.
///
/// Operators are built lazily on first upload to a bucket and cached for the
/// provider's lifetime. Credentials and endpoints come from backend-specific
/// options (`region`, `endpoint`, `account_name`, ...) merged over whatever
/// the opendal service resolves from the environment.
pub struct OpendalProvider {
    backend: Backend,
    options: HashMap<String, String>,
    operators: Mutex<HashMap<String, Operator>>,
}

impl OpendalProvider {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            options: HashMap::new(),
            operators: Mutex::new(HashMap::new()),
        }
    }

    pub fn s3() -> Self {
        Self::new(Backend::S3)
    }

    pub fn gcs() -> Self {
        Self::new(Backend::Gcs)
    }

    pub fn azblob() -> Self {
        Self::new(Backend::Azblob)
    }

    pub fn memory() -> Self {
        Self::new(Backend::Memory)
    }

    /// Add a backend-specific option applied to every operator this provider
    /// builds.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    fn operator_for(&self, bucket: &str) -> Result<Operator, StoreError> {
        if let Some(op) = self.operators.lock().get(bucket) {
            return Ok(op.clone());
        }

        let op = self.build_operator(bucket).map_err(|e| StoreError::Provider {
            bucket: bucket.to_string(),
            message: e.to_string(),
        })?;
        self.operators
            .lock()
            .insert(bucket.to_string(), op.clone());
        Ok(op)
    }

    fn build_operator(&self, bucket: &str) -> Result<Operator, opendal::Error> {
        match self.backend {
            Backend::S3 => {
                let mut builder = S3::default().bucket(bucket);
                if let Some(region) = self.options.get("region") {
                    builder = builder.region(region);
                }
                if let Some(endpoint) = self.options.get("endpoint") {
                    builder = builder.endpoint(endpoint);
                }
                Ok(Operator::new(builder)?.finish())
            }
            Backend::Gcs => {
                let mut builder = Gcs::default().bucket(bucket);
                if let Some(credential_file) = self.options.get("credential_file") {
                    builder = builder.credential_path(credential_file);
                }
                if let Some(endpoint) = self.options.get("endpoint") {
                    builder = builder.endpoint(endpoint);
                }
                Ok(Operator::new(builder)?.finish())
            }
            Backend::Azblob => {
                let mut builder = Azblob::default().container(bucket);
                if let Some(endpoint) = self.options.get("endpoint") {
                    builder = builder.endpoint(endpoint);
                }
                if let Some(account_name) = self.options.get("account_name") {
                    builder = builder.account_name(account_name);
                }
                if let Some(account_key) = self.options.get("account_key") {
                    builder = builder.account_key(account_key);
                }
                Ok(Operator::new(builder)?.finish())
            }
            Backend::Memory => Ok(Operator::new(Memory::default())?.finish()),
        }
    }
}

#[async_trait]
impl BlobProvider for OpendalProvider {
    async fn upload_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<(), StoreError> {
        let op = self.operator_for(bucket)?;
        op.write(key, data)
            .await
            .map_err(|e| StoreError::Upload {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "opendal_test.rs"]
mod opendal_test;
