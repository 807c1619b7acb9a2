//! HTTP sink workers
//!
//! Each worker owns its work channel for its whole lifetime and announces
//! itself on the idle queue by sending that channel's sender; the
//! dispatcher hands a record to whichever worker it popped. Workers are
//! never dispatched to by reference.

use std::sync::Arc;

use inflog_record::LogRecord;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::metrics::PipelineMetrics;
use crate::sink::HttpSink;

pub(crate) struct Worker {
    pub(crate) id: usize,
    pub(crate) sink: Arc<HttpSink>,
    pub(crate) idle_queue: mpsc::Sender<mpsc::Sender<LogRecord>>,
    pub(crate) metrics: Arc<PipelineMetrics>,
    pub(crate) cancel: CancellationToken,
}

impl Worker {
    pub(crate) fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        tracing::debug!(worker_id = self.id, "worker starting");
        let (work_tx, mut work_rx) = mpsc::channel::<LogRecord>(1);

        loop {
            // Announce as idle; a closed idle queue means the pipeline is gone.
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                registered = self.idle_queue.send(work_tx.clone()) => {
                    if registered.is_err() {
                        break;
                    }
                }
            }

            let record = tokio::select! {
                _ = self.cancel.cancelled() => break,
                record = work_rx.recv() => match record {
                    Some(record) => record,
                    None => break,
                },
            };

            // The in-flight delivery finishes even under cancellation; the
            // client timeout bounds it.
            match self.sink.deliver(&record).await {
                Ok(()) => {
                    self.metrics.record_delivered();
                    tracing::debug!(
                        worker_id = self.id,
                        record_id = %record.id,
                        url = %record.url,
                        "delivered cloud event"
                    );
                }
                Err(error) => {
                    self.metrics.record_delivery_error();
                    tracing::error!(
                        worker_id = self.id,
                        record_id = %record.id,
                        url = %record.url,
                        error = %error,
                        "failed to deliver cloud event"
                    );
                }
            }
        }

        tracing::debug!(worker_id = self.id, "worker stopping");
    }
}
