//! End-to-end pipeline tests
//!
//! Wire a real pipeline against an in-process HTTP sink server and an
//! in-memory blob provider, then drive the scenarios a producer would.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use url::Url;

use inflog_batch::BatchPolicy;
use inflog_marshal::JsonMarshaller;
use inflog_pipeline::{HttpSinkConfig, LoggingPipeline, PipelineConfig};
use inflog_record::LogRecord;
use inflog_store::{BlobProvider, BlobStore, ProviderRegistry, StoreError};

/// Provider double that records uploads and signals each arrival.
struct RecordingProvider {
    uploads: Mutex<Vec<(String, String, Bytes)>>,
    notify: mpsc::UnboundedSender<()>,
}

impl RecordingProvider {
    fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<()>) {
        let (notify, notified) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                uploads: Mutex::new(Vec::new()),
                notify,
            }),
            notified,
        )
    }
}

#[async_trait]
impl BlobProvider for RecordingProvider {
    async fn upload_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<(), StoreError> {
        self.uploads
            .lock()
            .push((bucket.to_string(), key.to_string(), data));
        let _ = self.notify.send(());
        Ok(())
    }
}

/// Sink server double collecting `ce-id` headers in arrival order.
#[derive(Clone, Default)]
struct SinkServer(Arc<Mutex<Vec<String>>>);

async fn spawn_sink_server() -> (SinkServer, String) {
    let server = SinkServer::default();
    let app = Router::new()
        .route(
            "/events",
            post(
                |State(server): State<SinkServer>, headers: HeaderMap| async move {
                    let id = headers
                        .get("ce-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    server.0.lock().push(id);
                    StatusCode::OK
                },
            ),
        )
        .with_state(server.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (server, format!("http://{addr}/events"))
}

fn http_record(url: &str, id: &str) -> LogRecord {
    let mut record = LogRecord::new(Url::parse(url).unwrap());
    record.id = id.to_string();
    record.request_type = "io.kserve.request".to_string();
    record.payload = Some(b"{}".to_vec());
    record
}

fn blob_record(id: &str) -> LogRecord {
    let mut record = LogRecord::new(Url::parse("s3://bucket/logs").unwrap());
    record.id = id.to_string();
    record.request_type = "io.kserve.request".to_string();
    record.namespace = "ns".to_string();
    record.inference_service = "svc".to_string();
    record.component = "predictor".to_string();
    record
}

fn blob_store(provider: Arc<RecordingProvider>) -> Arc<BlobStore> {
    let mut providers = ProviderRegistry::new();
    providers.register("s3", provider);
    Arc::new(BlobStore::new("", Arc::new(JsonMarshaller), providers))
}

fn pipeline_config(worker_count: usize, batch: BatchPolicy) -> PipelineConfig {
    PipelineConfig {
        worker_count,
        queue_size: 32,
        batch,
        sink: HttpSinkConfig::default().with_retry_base_delay(Duration::from_millis(10)),
    }
}

#[tokio::test]
async fn http_records_are_delivered_individually_in_order() {
    let (server, url) = spawn_sink_server().await;
    let (provider, _notified) = RecordingProvider::new();

    // A single worker keeps delivery order identical to enqueue order.
    let pipeline = LoggingPipeline::start(
        pipeline_config(1, BatchPolicy::Immediate),
        blob_store(provider),
    )
    .unwrap();

    for i in 0..5 {
        pipeline
            .submit(http_record(&url, &format!("r{i}")))
            .await
            .unwrap();
    }

    timeout(Duration::from_secs(5), async {
        while pipeline.metrics().snapshot().events_delivered < 5 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("all five deliveries should arrive");

    assert_eq!(*server.0.lock(), ["r0", "r1", "r2", "r3", "r4"]);
    assert_eq!(pipeline.metrics().snapshot().events_delivered, 5);
    pipeline.shutdown().await;
}

#[tokio::test]
async fn blob_records_are_batched_and_uploaded_under_derived_keys() {
    let (provider, mut notified) = RecordingProvider::new();
    let pipeline = LoggingPipeline::start(
        pipeline_config(2, BatchPolicy::Size { size: 3 }),
        blob_store(provider.clone()),
    )
    .unwrap();

    for id in ["a", "b", "c", "d", "e", "f", "g"] {
        pipeline.submit(blob_record(id)).await.unwrap();
    }

    // Two full batches upload immediately; the tail flushes on close.
    for _ in 0..2 {
        timeout(Duration::from_secs(5), notified.recv())
            .await
            .expect("upload should arrive")
            .unwrap();
    }
    drop(pipeline);
    timeout(Duration::from_secs(5), notified.recv())
        .await
        .expect("tail upload should arrive")
        .unwrap();

    let uploads = provider.uploads.lock();
    assert_eq!(uploads.len(), 3);

    let keys: Vec<&str> = uploads.iter().map(|(_, key, _)| key.as_str()).collect();
    assert_eq!(
        keys,
        [
            "logs/ns/svc/predictor/a-request.json",
            "logs/ns/svc/predictor/d-request.json",
            "logs/ns/svc/predictor/g-request.json",
        ]
    );

    let sizes: Vec<usize> = uploads
        .iter()
        .map(|(_, _, data)| {
            let value: serde_json::Value = serde_json::from_slice(data).unwrap();
            if value.is_array() {
                value.as_array().unwrap().len()
            } else {
                1
            }
        })
        .collect();
    assert_eq!(sizes, [3, 3, 1]);

    for (bucket, _, _) in uploads.iter() {
        assert_eq!(bucket, "bucket");
    }
}

#[tokio::test]
async fn http_and_blob_records_interleave() {
    let (server, url) = spawn_sink_server().await;
    let (provider, mut notified) = RecordingProvider::new();

    let pipeline = LoggingPipeline::start(
        pipeline_config(2, BatchPolicy::Immediate),
        blob_store(provider.clone()),
    )
    .unwrap();

    pipeline.submit(http_record(&url, "h0")).await.unwrap();
    pipeline.submit(blob_record("b0")).await.unwrap();
    pipeline.submit(http_record(&url, "h1")).await.unwrap();
    pipeline.submit(blob_record("b1")).await.unwrap();

    for _ in 0..2 {
        timeout(Duration::from_secs(5), notified.recv())
            .await
            .expect("blob upload should arrive")
            .unwrap();
    }
    timeout(Duration::from_secs(5), async {
        while pipeline.metrics().snapshot().events_delivered < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("both cloud events should arrive");

    let mut delivered = server.0.lock().clone();
    delivered.sort();
    assert_eq!(delivered, ["h0", "h1"]);
    assert_eq!(provider.uploads.lock().len(), 2);

    // Counters trail the observable effects by a few instructions.
    timeout(Duration::from_secs(1), async {
        loop {
            let snapshot = pipeline.metrics().snapshot();
            if snapshot.records_received == 4
                && snapshot.http_dispatched == 2
                && snapshot.blob_dispatched == 2
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("metrics should settle");
    pipeline.shutdown().await;
}
