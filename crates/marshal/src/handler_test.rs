//! Marshaller wire handler tests

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use tower::ServiceExt;
use url::Url;

use super::router;
use inflog_record::LogRecord;

fn record(id: &str) -> LogRecord {
    let mut record = LogRecord::new(Url::parse("s3://bucket/logs").unwrap());
    record.id = id.to_string();
    record
}

fn post_batch(batch: &[LogRecord]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(batch).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn single_record_returns_bare_object() {
    let response = router().oneshot(post_batch(&[record("r0")])).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    assert_eq!(response.headers()[crate::EXTENSION_HEADER], "json");

    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(value.is_object(), "expected bare object, got {value}");
    assert_eq!(value["id"], "r0");
}

#[tokio::test]
async fn two_records_return_an_array() {
    let batch = [record("r0"), record("r1")];
    let response = router().oneshot(post_batch(&batch)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[crate::EXTENSION_HEADER], "json");

    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let decoded: Vec<LogRecord> = serde_json::from_slice(&body).unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0].id, "r0");
    assert_eq!(decoded[1].id, "r1");
}

#[tokio::test]
async fn empty_batch_returns_empty_array() {
    let response = router().oneshot(post_batch(&[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value, serde_json::json!([]));
}

#[tokio::test]
async fn non_post_methods_are_rejected() {
    for method in [Method::GET, Method::PUT, Method::DELETE] {
        let request = Request::builder()
            .method(method.clone())
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::METHOD_NOT_ALLOWED,
            "method {method}"
        );
    }
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
