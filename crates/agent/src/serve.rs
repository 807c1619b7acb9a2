//! Agent wiring: config to running pipeline

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use inflog_batch::BatchPolicy;
use inflog_config::{BatchPolicyConfig, Config};
use inflog_marshal::{handler, HttpMarshaller, JsonMarshaller, Marshaller};
use inflog_pipeline::{HttpSinkConfig, LoggingPipeline, PipelineConfig};
use inflog_store::{BlobStore, OpendalProvider, ProviderRegistry};

use crate::ingest;

pub async fn run(config_path: &Path, log_level: Option<&str>) -> Result<()> {
    let config = Config::from_file(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    crate::init_logging(&config.log, log_level)?;
    config.validate().context("validating configuration")?;

    tracing::info!(
        config = %config_path.display(),
        worker_count = config.logger.worker_count,
        queue_size = config.logger.queue_size,
        "starting payload logging agent"
    );

    let cancel = CancellationToken::new();

    // Marshaller: remote when configured, otherwise in-process JSON with
    // the same wire contract exposed at the embedded bind address.
    let marshaller: Arc<dyn Marshaller> = if config.logger.marshaller_url.is_empty() {
        let listener = TcpListener::bind(config.marshaller_server.bind)
            .await
            .with_context(|| format!("binding marshaller to {}", config.marshaller_server.bind))?;
        tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if let Err(error) = handler::serve(listener, cancel).await {
                    tracing::error!(error = %error, "embedded marshaller server failed");
                }
            }
        });
        Arc::new(JsonMarshaller)
    } else {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("building marshaller HTTP client")?;
        tracing::info!(url = %config.logger.marshaller_url, "using remote marshaller");
        Arc::new(HttpMarshaller::new(
            config.logger.marshaller_url.as_str(),
            client,
        ))
    };

    let store = Arc::new(BlobStore::new(
        config.logger.store_path.clone(),
        marshaller,
        provider_registry(),
    ));

    let pipeline = Arc::new(LoggingPipeline::start(
        PipelineConfig {
            worker_count: config.logger.worker_count,
            queue_size: config.logger.queue_size,
            batch: batch_policy(config.logger.batch),
            sink: HttpSinkConfig::default().with_cert_dir(&config.logger.cert_dir),
        },
        store,
    )?);

    // Ingest endpoint: the process-boundary form of the ingress queue.
    let listener = TcpListener::bind(config.ingest.bind)
        .await
        .with_context(|| format!("binding ingest to {}", config.ingest.bind))?;
    tracing::info!(addr = %listener.local_addr()?, "ingest endpoint listening");
    let ingest_server = tokio::spawn({
        let app = ingest::router(Arc::clone(&pipeline));
        let cancel = cancel.clone();
        async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { cancel.cancelled().await })
                .await
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    tracing::info!("shutdown signal received");

    cancel.cancel();
    pipeline.shutdown().await;
    ingest_server.await?.context("ingest server failed")?;

    Ok(())
}

/// One provider per blob backend; `s3` and `s3a` share the S3 provider.
fn provider_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    let s3 = Arc::new(OpendalProvider::s3());
    registry.register("s3", s3.clone());
    registry.register("s3a", s3);
    registry.register("gs", Arc::new(OpendalProvider::gcs()));
    registry.register("abfs", Arc::new(OpendalProvider::azblob()));
    registry
}

fn batch_policy(config: BatchPolicyConfig) -> BatchPolicy {
    match config {
        BatchPolicyConfig::Immediate => BatchPolicy::Immediate,
        BatchPolicyConfig::Size { size } => BatchPolicy::Size { size },
        BatchPolicyConfig::Timed { size, interval_ms } => BatchPolicy::Timed {
            size,
            interval: Duration::from_millis(interval_ms),
        },
    }
}
