//! Size- and time-bounded batching

use std::time::Duration;

use async_trait::async_trait;
use inflog_record::LogRecord;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{flush, BatchStrategy};

/// Buffers up to `size` records and emits when the buffer fills or when
/// `interval` elapses since the last flush, whichever comes first.
///
/// The timer is rearmed after every flush, including size-driven ones. When
/// the `size`-th record arrives as the timer fires, the size check runs
/// immediately after the append, so the size-driven flush wins. A zero
/// interval disables the timer entirely, which makes this equivalent to
/// [`crate::SizeBatch`]; a zero size makes `run` a no-op.
#[derive(Debug, Clone, Copy)]
pub struct TimedBatch {
    size: usize,
    interval: Duration,
}

impl TimedBatch {
    pub fn new(size: usize, interval: Duration) -> Self {
        Self { size, interval }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl BatchStrategy for TimedBatch {
    async fn run(
        &self,
        cancel: CancellationToken,
        mut input: mpsc::Receiver<LogRecord>,
        output: mpsc::Sender<Vec<LogRecord>>,
    ) {
        if self.size == 0 {
            return;
        }

        let timed = !self.interval.is_zero();
        let mut buffer: Vec<LogRecord> = Vec::with_capacity(self.size);
        let timer = tokio::time::sleep(self.interval);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    flush(&cancel, &output, &mut buffer).await;
                    return;
                }
                () = timer.as_mut(), if timed => {
                    // Fires with an empty buffer as well; rearm silently.
                    if !flush(&cancel, &output, &mut buffer).await {
                        return;
                    }
                    timer.as_mut().reset(Instant::now() + self.interval);
                }
                record = input.recv() => match record {
                    Some(record) => {
                        buffer.push(record);
                        if buffer.len() == self.size {
                            if !flush(&cancel, &output, &mut buffer).await {
                                return;
                            }
                            if timed {
                                timer.as_mut().reset(Instant::now() + self.interval);
                            }
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
#[path = "timed_test.rs"]
mod timed_test;
