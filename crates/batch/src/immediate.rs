//! One record per batch

use async_trait::async_trait;
use inflog_record::LogRecord;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::BatchStrategy;

/// Emits one single-record batch per input record. Never buffers, so the
/// flush-on-close contract is trivially satisfied.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateBatch;

#[async_trait]
impl BatchStrategy for ImmediateBatch {
    async fn run(
        &self,
        cancel: CancellationToken,
        mut input: mpsc::Receiver<LogRecord>,
        output: mpsc::Sender<Vec<LogRecord>>,
    ) {
        loop {
            let record = tokio::select! {
                _ = cancel.cancelled() => return,
                record = input.recv() => match record {
                    Some(record) => record,
                    None => return,
                },
            };
            tokio::select! {
                _ = cancel.cancelled() => return,
                sent = output.send(vec![record]) => {
                    if sent.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "immediate_test.rs"]
mod immediate_test;
