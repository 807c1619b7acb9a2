//! Pipeline metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by the dispatcher, workers, and the store loop.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// Records accepted from the ingress queue.
    pub records_received: AtomicU64,

    /// Records handed to the HTTP worker pool.
    pub http_dispatched: AtomicU64,

    /// Records forwarded into the batching pipeline.
    pub blob_dispatched: AtomicU64,

    /// Cloud events delivered successfully.
    pub events_delivered: AtomicU64,

    /// Cloud-event deliveries that failed terminally.
    pub delivery_errors: AtomicU64,

    /// Batches written to the store.
    pub batches_stored: AtomicU64,

    /// Batches dropped after a store error.
    pub store_errors: AtomicU64,
}

impl PipelineMetrics {
    pub const fn new() -> Self {
        Self {
            records_received: AtomicU64::new(0),
            http_dispatched: AtomicU64::new(0),
            blob_dispatched: AtomicU64::new(0),
            events_delivered: AtomicU64::new(0),
            delivery_errors: AtomicU64::new(0),
            batches_stored: AtomicU64::new(0),
            store_errors: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn record_received(&self) {
        self.records_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_http_dispatched(&self) {
        self.http_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_blob_dispatched(&self) {
        self.blob_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_delivered(&self) {
        self.events_delivered.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_delivery_error(&self) {
        self.delivery_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_batch_stored(&self) {
        self.batches_stored.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_store_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time view of all counters.
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            records_received: self.records_received.load(Ordering::Relaxed),
            http_dispatched: self.http_dispatched.load(Ordering::Relaxed),
            blob_dispatched: self.blob_dispatched.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            delivery_errors: self.delivery_errors.load(Ordering::Relaxed),
            batches_stored: self.batches_stored.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of [`PipelineMetrics`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineSnapshot {
    pub records_received: u64,
    pub http_dispatched: u64,
    pub blob_dispatched: u64,
    pub events_delivered: u64,
    pub delivery_errors: u64,
    pub batches_stored: u64,
    pub store_errors: u64,
}
