//! Size-bounded batching

use async_trait::async_trait;
use inflog_record::LogRecord;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{flush, BatchStrategy};

/// Buffers up to `size` records and emits when the buffer fills. The tail is
/// flushed when the input closes. A zero size makes `run` a no-op.
#[derive(Debug, Clone, Copy)]
pub struct SizeBatch {
    size: usize,
}

impl SizeBatch {
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

#[async_trait]
impl BatchStrategy for SizeBatch {
    async fn run(
        &self,
        cancel: CancellationToken,
        mut input: mpsc::Receiver<LogRecord>,
        output: mpsc::Sender<Vec<LogRecord>>,
    ) {
        if self.size == 0 {
            return;
        }

        let mut buffer: Vec<LogRecord> = Vec::with_capacity(self.size);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    flush(&cancel, &output, &mut buffer).await;
                    return;
                }
                record = input.recv() => match record {
                    Some(record) => {
                        buffer.push(record);
                        if buffer.len() == self.size && !flush(&cancel, &output, &mut buffer).await {
                            return;
                        }
                    }
                    None => {
                        flush(&cancel, &output, &mut buffer).await;
                        return;
                    }
                },
            }
        }
    }
}

#[cfg(test)]
#[path = "size_test.rs"]
mod size_test;
