//! Blob provider capability and scheme registry

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::StoreError;

/// Uploads an opaque buffer to `(bucket, key)` on a concrete backend.
///
/// Providers are stateless from the store's perspective and shared
/// read-only across tasks.
#[async_trait]
pub trait BlobProvider: Send + Sync {
    async fn upload_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<(), StoreError>;
}

/// Providers registered by scheme token (`s3`, `s3a`, `gs`, `abfs`).
/// Lookup fails for unregistered schemes.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn BlobProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` for `scheme`, replacing any previous entry.
    pub fn register(&mut self, scheme: impl Into<String>, provider: Arc<dyn BlobProvider>) {
        self.providers.insert(scheme.into(), provider);
    }

    /// Look up the provider for `scheme`.
    pub fn get(&self, scheme: &str) -> Result<Arc<dyn BlobProvider>, StoreError> {
        self.providers
            .get(scheme)
            .cloned()
            .ok_or_else(|| StoreError::UnknownScheme(scheme.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut schemes: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        f.debug_struct("ProviderRegistry")
            .field("schemes", &schemes)
            .finish()
    }
}
