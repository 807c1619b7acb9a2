//! Batching strategies for blob-bound log records
//!
//! A strategy consumes [`LogRecord`]s from an input channel, groups them, and
//! writes batches to an output channel. All strategies share one contract:
//!
//! - the output channel closes when `run` returns (the sender is dropped);
//! - `run` returns when the input closes (after flushing buffered records)
//!   or when the cancellation token fires (after a best-effort flush);
//! - arrival order is preserved within every emitted batch;
//! - strategies never surface errors. Downstream failures belong to whoever
//!   reads the output.
//!
//! Strategies are selected through [`BatchPolicy`], a tagged construction
//! that degrades gracefully: a timed policy with a zero interval behaves as
//! a size policy, and a zero size turns `run` into a no-op that still closes
//! its output.

mod immediate;
mod policy;
mod size;
mod timed;

pub use immediate::ImmediateBatch;
pub use policy::{BatchPolicy, BatchPolicyError};
pub use size::SizeBatch;
pub use timed::TimedBatch;

use async_trait::async_trait;
use inflog_record::LogRecord;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A strategy that groups records into batches.
///
/// Implementations must preserve arrival order within each batch and must
/// not emit empty batches.
#[async_trait]
pub trait BatchStrategy: Send + Sync {
    /// Consume records from `input` and write batches to `output` until the
    /// input closes or `cancel` fires. The output sender is dropped on
    /// return, closing the channel for the consumer.
    async fn run(
        &self,
        cancel: CancellationToken,
        input: mpsc::Receiver<LogRecord>,
        output: mpsc::Sender<Vec<LogRecord>>,
    );
}

/// Send the buffered records as one batch, racing against cancellation.
///
/// Returns false when the batch could not be handed over (cancellation won
/// the race or the receiver is gone); the residue is dropped in that case.
pub(crate) async fn flush(
    cancel: &CancellationToken,
    output: &mpsc::Sender<Vec<LogRecord>>,
    buffer: &mut Vec<LogRecord>,
) -> bool {
    if buffer.is_empty() {
        return true;
    }
    let batch = std::mem::take(buffer);
    tokio::select! {
        _ = cancel.cancelled() => false,
        sent = output.send(batch) => sent.is_ok(),
    }
}
