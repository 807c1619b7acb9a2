//! Size batch strategy tests

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{BatchStrategy, SizeBatch};
use inflog_record::LogRecord;

fn record(id: &str) -> LogRecord {
    let mut record = LogRecord::new(Url::parse("s3://bucket/logs").unwrap());
    record.id = id.to_string();
    record
}

async fn run_with_records(size: usize, count: usize) -> Vec<Vec<LogRecord>> {
    let cancel = CancellationToken::new();
    let (in_tx, in_rx) = mpsc::channel(1);
    let (out_tx, mut out_rx) = mpsc::channel(1);

    let run = tokio::spawn(async move { SizeBatch::new(size).run(cancel, in_rx, out_tx).await });

    let producer = tokio::spawn(async move {
        for i in 0..count {
            in_tx.send(record(&format!("r{i}"))).await.unwrap();
        }
    });

    let mut batches = Vec::new();
    while let Some(batch) = out_rx.recv().await {
        batches.push(batch);
    }

    producer.await.unwrap();
    run.await.unwrap();
    batches
}

#[tokio::test]
async fn emits_exact_batches() {
    let batches = run_with_records(3, 3).await;
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 3);
}

#[tokio::test]
async fn flushes_remainder_on_close() {
    let batches = run_with_records(3, 5).await;
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].len(), 3);
    assert_eq!(batches[1].len(), 2);
}

#[tokio::test]
async fn emits_multiple_full_batches_in_order() {
    let batches = run_with_records(3, 7).await;
    assert_eq!(batches.len(), 3);
    assert_eq!(batches[0].len(), 3);
    assert_eq!(batches[1].len(), 3);
    assert_eq!(batches[2].len(), 1);

    let ids: Vec<&str> = batches
        .iter()
        .flatten()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(ids, ["r0", "r1", "r2", "r3", "r4", "r5", "r6"]);
}

#[tokio::test]
async fn size_one_matches_immediate() {
    let batches = run_with_records(1, 4).await;
    assert_eq!(batches.len(), 4);
    for batch in &batches {
        assert_eq!(batch.len(), 1);
    }
}

#[tokio::test]
async fn zero_size_emits_nothing() {
    let cancel = CancellationToken::new();
    let (in_tx, in_rx) = mpsc::channel::<LogRecord>(1);
    let (out_tx, mut out_rx) = mpsc::channel(1);

    let run = tokio::spawn(async move { SizeBatch::new(0).run(cancel, in_rx, out_tx).await });

    // The strategy must terminate promptly without consuming input.
    timeout(Duration::from_millis(100), run)
        .await
        .expect("zero-size run should return immediately")
        .unwrap();
    assert!(out_rx.recv().await.is_none());
    drop(in_tx);
}

#[tokio::test]
async fn cancellation_closes_output_promptly() {
    let cancel = CancellationToken::new();
    let (in_tx, in_rx) = mpsc::channel(1);
    let (out_tx, mut out_rx) = mpsc::channel(1);

    let run = {
        let cancel = cancel.clone();
        tokio::spawn(async move { SizeBatch::new(100).run(cancel, in_rx, out_tx).await })
    };

    // Two buffered records, then a forced shutdown.
    in_tx.send(record("r0")).await.unwrap();
    in_tx.send(record("r1")).await.unwrap();
    cancel.cancel();

    timeout(Duration::from_millis(100), run)
        .await
        .expect("run should return after cancellation")
        .unwrap();

    // The residue may or may not have been flushed; the channel must close.
    let deadline = timeout(Duration::from_millis(100), async {
        while out_rx.recv().await.is_some() {}
    })
    .await;
    assert!(deadline.is_ok(), "output should close after cancellation");
}
