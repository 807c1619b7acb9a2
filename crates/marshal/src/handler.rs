//! HTTP handler for the marshaller wire contract
//!
//! Serves the same protocol [`crate::HttpMarshaller`] speaks, backed by the
//! in-process JSON encoding: accept a POST of a JSON array of records,
//! answer with the single record object for one-record batches and an array
//! otherwise, and set `Content-Type: application/json` plus
//! `X-Log-Marshal-Extension: json`. Non-POST methods get 405, malformed
//! bodies 400.

use axum::body::Bytes;
use axum::http::{header, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use inflog_record::LogRecord;

use crate::json;

/// Build the marshaller router. Mount at `/`.
pub fn router() -> Router {
    Router::new().route("/", post(marshal_batch))
}

/// Serve the marshaller contract on `listener` until `cancel` fires.
pub async fn serve(listener: TcpListener, cancel: CancellationToken) -> std::io::Result<()> {
    tracing::info!(
        addr = %listener.local_addr()?,
        "marshaller handler listening"
    );
    axum::serve(listener, router())
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
}

async fn marshal_batch(body: Bytes) -> Response {
    let batch: Vec<LogRecord> = match serde_json::from_slice(&body) {
        Ok(batch) => batch,
        Err(error) => {
            tracing::debug!(error = %error, "rejecting malformed marshal request");
            return (StatusCode::BAD_REQUEST, "invalid JSON").into_response();
        }
    };

    match json::encode(&batch) {
        Ok(data) => (
            [
                (header::CONTENT_TYPE, "application/json"),
                (HeaderName::from_static(crate::EXTENSION_HEADER), "json"),
            ],
            data,
        )
            .into_response(),
        Err(error) => {
            tracing::error!(error = %error, "failed to marshal batch");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to marshal batch").into_response()
        }
    }
}

#[cfg(test)]
#[path = "handler_test.rs"]
mod handler_test;
