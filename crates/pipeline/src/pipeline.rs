//! Pipeline wiring and the dispatcher task

use std::sync::Arc;

use inflog_batch::BatchPolicy;
use inflog_record::{LogRecord, StorageStrategy};
use inflog_store::Store;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::metrics::PipelineMetrics;
use crate::sink::{HttpSink, HttpSinkConfig};
use crate::worker::Worker;
use crate::PipelineError;

/// Configuration for [`LoggingPipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of HTTP sink workers. Must be at least 1.
    pub worker_count: usize,

    /// Capacity of the ingress queue. Producers suspend when it is full.
    /// Must be at least 1.
    pub queue_size: usize,

    /// How blob-bound records are grouped before upload.
    pub batch: BatchPolicy,

    /// HTTP sink settings.
    pub sink: HttpSinkConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            queue_size: 128,
            batch: BatchPolicy::Immediate,
            sink: HttpSinkConfig::default(),
        }
    }
}

/// The process-wide entry point for log records.
///
/// Owns the ingress queue, the worker pool, the batching pipeline, and the
/// store loop. Starting a new pipeline replaces nothing implicitly: the old
/// instance keeps draining until dropped, at which point its tasks lose
/// their queues and exit, so no stale dispatcher can steal work from the
/// new one.
#[derive(Debug)]
pub struct LoggingPipeline {
    ingress: mpsc::Sender<LogRecord>,
    cancel: CancellationToken,
    metrics: Arc<PipelineMetrics>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl LoggingPipeline {
    /// Validate `config`, spawn every task, and return the running pipeline.
    pub fn start(config: PipelineConfig, store: Arc<dyn Store>) -> Result<Self, PipelineError> {
        if config.worker_count == 0 {
            return Err(PipelineError::Config(
                "worker_count must be at least 1".to_string(),
            ));
        }
        if config.queue_size == 0 {
            return Err(PipelineError::Config(
                "queue_size must be at least 1".to_string(),
            ));
        }
        config
            .batch
            .validate()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let cancel = CancellationToken::new();
        let metrics = Arc::new(PipelineMetrics::new());
        let sink = Arc::new(HttpSink::new(config.sink)?);

        let (ingress_tx, ingress_rx) = mpsc::channel(config.queue_size);
        let (idle_tx, idle_rx) = mpsc::channel(config.worker_count);

        let mut tasks = Vec::with_capacity(config.worker_count + 3);
        for id in 1..=config.worker_count {
            tracing::info!(worker_id = id, "starting worker");
            tasks.push(
                Worker {
                    id,
                    sink: Arc::clone(&sink),
                    idle_queue: idle_tx.clone(),
                    metrics: Arc::clone(&metrics),
                    cancel: cancel.clone(),
                }
                .spawn(),
            );
        }
        drop(idle_tx);

        // Batching pipeline for blob-bound records.
        let (batch_tx, batch_rx) = mpsc::channel(1);
        let (out_tx, out_rx) = mpsc::channel(1);
        let strategy = config.batch.build();
        tasks.push(tokio::spawn({
            let cancel = cancel.clone();
            async move { strategy.run(cancel, batch_rx, out_tx).await }
        }));

        tasks.push(tokio::spawn(store_loop(
            store,
            out_rx,
            Arc::clone(&metrics),
        )));

        tasks.push(tokio::spawn(dispatch_loop(
            ingress_rx,
            idle_rx,
            batch_tx,
            Arc::clone(&metrics),
            cancel.clone(),
        )));

        Ok(Self {
            ingress: ingress_tx,
            cancel,
            metrics,
            tasks: Mutex::new(tasks),
        })
    }

    /// Hand a record to the pipeline, suspending while the ingress queue is
    /// full. Fire and forget: delivery failures surface only in logs.
    pub async fn submit(&self, record: LogRecord) -> Result<(), PipelineError> {
        self.ingress
            .send(record)
            .await
            .map_err(|_| PipelineError::Closed)
    }

    /// Non-suspending variant of [`submit`](Self::submit).
    pub fn try_submit(&self, record: LogRecord) -> Result<(), PipelineError> {
        self.ingress.try_send(record).map_err(|error| match error {
            mpsc::error::TrySendError::Full(_) => PipelineError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => PipelineError::Closed,
        })
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Force shutdown: cancel every task and wait for them to exit.
    /// In-flight HTTP calls complete under their own timeout; buffered
    /// batch residue is flushed best-effort.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let tasks: Vec<JoinHandle<()>> = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            let _ = task.await;
        }

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            records_received = snapshot.records_received,
            events_delivered = snapshot.events_delivered,
            delivery_errors = snapshot.delivery_errors,
            batches_stored = snapshot.batches_stored,
            store_errors = snapshot.store_errors,
            "pipeline shut down"
        );
    }
}

/// Read the ingress queue and route records by destination scheme.
async fn dispatch_loop(
    mut ingress: mpsc::Receiver<LogRecord>,
    mut idle_workers: mpsc::Receiver<mpsc::Sender<LogRecord>>,
    batch_tx: mpsc::Sender<LogRecord>,
    metrics: Arc<PipelineMetrics>,
    cancel: CancellationToken,
) {
    loop {
        let record = tokio::select! {
            _ = cancel.cancelled() => break,
            record = ingress.recv() => match record {
                Some(record) => record,
                None => break,
            },
        };
        metrics.record_received();

        if StorageStrategy::for_url(&record.url).is_blob() {
            // Blob sink: feed the batching pipeline.
            tokio::select! {
                _ = cancel.cancelled() => break,
                sent = batch_tx.send(record) => {
                    if sent.is_err() {
                        break;
                    }
                    metrics.record_blob_dispatched();
                }
            }
        } else {
            // HTTP sink: rendezvous with an idle worker, blocking while the
            // whole pool is busy.
            let worker = tokio::select! {
                _ = cancel.cancelled() => break,
                worker = idle_workers.recv() => match worker {
                    Some(worker) => worker,
                    None => break,
                },
            };
            if worker.send(record).await.is_err() {
                tracing::warn!("worker exited before accepting a record");
                continue;
            }
            metrics.record_http_dispatched();
        }
    }
    tracing::debug!("dispatcher stopping");
}

/// Write every emitted batch to the store; log and drop on failure.
async fn store_loop(
    store: Arc<dyn Store>,
    mut batches: mpsc::Receiver<Vec<LogRecord>>,
    metrics: Arc<PipelineMetrics>,
) {
    while let Some(batch) = batches.recv().await {
        let Some(first) = batch.first() else {
            continue;
        };
        let url = first.url.clone();
        match store.store(&url, &batch).await {
            Ok(()) => metrics.record_batch_stored(),
            Err(error) => {
                metrics.record_store_error();
                tracing::error!(
                    record_id = %first.id,
                    records = batch.len(),
                    url = %url,
                    error = %error,
                    "failed to store batch, dropping"
                );
            }
        }
    }
    tracing::debug!("store loop stopping");
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;
