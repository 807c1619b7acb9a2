//! Blob URL parsing

use url::Url;

use crate::StoreError;

fn is_blob_scheme(scheme: &str) -> bool {
    scheme.starts_with("s3") || scheme.starts_with("gs") || scheme.starts_with("abfs")
}

/// Split a blob URL into `(bucket, key_prefix)`.
///
/// The generic form is `scheme://host/path`, where the host is the bucket.
/// Azure URLs follow `abfs://container@account.host/path`: the user-info
/// part carries the container, so it wins over the host when present. The
/// key prefix is the path with the leading `/` stripped.
pub fn parse_blob_store_url(url: &Url) -> Result<(String, String), StoreError> {
    if !is_blob_scheme(url.scheme()) {
        return Err(StoreError::InvalidScheme(url.scheme().to_string()));
    }

    let bucket = if url.username().is_empty() {
        url.host_str().unwrap_or_default().to_string()
    } else {
        url.username().to_string()
    };
    let key_prefix = url.path().trim_start_matches('/').to_string();

    Ok((bucket, key_prefix))
}

#[cfg(test)]
#[path = "url_test.rs"]
mod url_test;
