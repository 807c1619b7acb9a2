//! HTTP ingest endpoint
//!
//! `POST /v1/logs` accepts a JSON `LogRecord` or an array of records and
//! submits them to the pipeline. Ingest is fire and forget: a 202 means the
//! records entered the queue, not that they were delivered.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use inflog_pipeline::LoggingPipeline;
use inflog_record::LogRecord;

/// Build the ingest router.
pub fn router(pipeline: Arc<LoggingPipeline>) -> Router {
    Router::new()
        .route("/v1/logs", post(ingest_records))
        .route("/health", get(health))
        .with_state(pipeline)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn ingest_records(
    State(pipeline): State<Arc<LoggingPipeline>>,
    body: Bytes,
) -> Response {
    // A bare object is a single record; anything else must be an array.
    let records: Vec<LogRecord> = match serde_json::from_slice::<LogRecord>(&body) {
        Ok(record) => vec![record],
        Err(_) => match serde_json::from_slice(&body) {
            Ok(records) => records,
            Err(error) => {
                tracing::debug!(error = %error, "rejecting malformed ingest request");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "invalid JSON"})),
                )
                    .into_response();
            }
        },
    };

    let accepted = records.len();
    for record in records {
        if pipeline.submit(record).await.is_err() {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"error": "pipeline is shut down"})),
            )
                .into_response();
        }
    }

    (StatusCode::ACCEPTED, Json(json!({"accepted": accepted}))).into_response()
}

#[cfg(test)]
#[path = "ingest_test.rs"]
mod ingest_test;
