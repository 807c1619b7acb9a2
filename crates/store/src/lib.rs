//! Blob storage for marshalled log batches
//!
//! [`BlobStore`] owns a marshaller, a provider registry, and a configured
//! path suffix. For every batch it marshals the records, parses the
//! destination URL into `(bucket, prefix)`, derives a stable object key from
//! the first record, and uploads through the provider registered for the
//! URL scheme.
//!
//! Providers implement [`BlobProvider`] — upload an opaque buffer to
//! `(bucket, key)` — and are registered by scheme token. The shipped
//! implementation wraps an opendal operator per backend; anything else
//! (mocks included) plugs in the same way.

mod blob;
mod error;
mod opendal;
mod provider;
mod url;

pub use blob::{BlobStore, Store};
pub use error::StoreError;
pub use provider::{BlobProvider, ProviderRegistry};
pub use self::opendal::{Backend, OpendalProvider};
pub use self::url::parse_blob_store_url;
