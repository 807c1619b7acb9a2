//! Blob URL parsing tests

use url::Url;

use super::parse_blob_store_url;
use crate::StoreError;

fn parse(url: &str) -> Result<(String, String), StoreError> {
    parse_blob_store_url(&Url::parse(url).unwrap())
}

#[test]
fn parses_bucket_and_key() {
    let cases = [
        ("s3://bucket/key", ("bucket", "key")),
        ("s3://bucket/path/to/key", ("bucket", "path/to/key")),
        ("s3a://bucket/logs", ("bucket", "logs")),
        ("gs://bucket/logs", ("bucket", "logs")),
        ("s3://bucket", ("bucket", "")),
    ];

    for (url, (bucket, key)) in cases {
        let (got_bucket, got_key) = parse(url).unwrap();
        assert_eq!(got_bucket, bucket, "url {url}");
        assert_eq!(got_key, key, "url {url}");
    }
}

#[test]
fn azure_user_info_carries_the_container() {
    let (bucket, key) = parse("abfs://container@account.dfs.core.windows.net/logs").unwrap();
    assert_eq!(bucket, "container");
    assert_eq!(key, "logs");
}

#[test]
fn rejects_non_blob_schemes() {
    for url in ["http://host/key", "https://host/key", "ftp://host/key"] {
        assert!(
            matches!(parse(url), Err(StoreError::InvalidScheme(_))),
            "url {url}"
        );
    }
}
