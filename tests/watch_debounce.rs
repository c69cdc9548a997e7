// tests/watch_debounce.rs

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use testsieve::watch::spawn_debouncer;

#[tokio::test(start_paused = true)]
async fn rapid_events_collapse_into_one_deduplicated_batch() {
    let (raw_tx, raw_rx) = mpsc::unbounded_channel();
    let (flush_tx, mut flush_rx) = mpsc::channel(4);
    spawn_debouncer(Duration::from_millis(100), raw_rx, flush_tx);

    raw_tx.send(PathBuf::from("/work/a.ts")).unwrap();
    raw_tx.send(PathBuf::from("/work/b.ts")).unwrap();
    raw_tx.send(PathBuf::from("/work/a.ts")).unwrap();

    let batch = timeout(Duration::from_secs(5), flush_rx.recv())
        .await
        .expect("flush within the quiet period")
        .expect("debouncer alive");

    assert_eq!(
        batch,
        vec![PathBuf::from("/work/a.ts"), PathBuf::from("/work/b.ts")]
    );
}

#[tokio::test(start_paused = true)]
async fn batches_are_split_by_quiet_periods() {
    let (raw_tx, raw_rx) = mpsc::unbounded_channel();
    let (flush_tx, mut flush_rx) = mpsc::channel(4);
    spawn_debouncer(Duration::from_millis(100), raw_rx, flush_tx);

    raw_tx.send(PathBuf::from("/work/first.ts")).unwrap();
    let first = timeout(Duration::from_secs(5), flush_rx.recv())
        .await
        .unwrap()
        .unwrap();

    raw_tx.send(PathBuf::from("/work/second.ts")).unwrap();
    let second = timeout(Duration::from_secs(5), flush_rx.recv())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first, vec![PathBuf::from("/work/first.ts")]);
    assert_eq!(second, vec![PathBuf::from("/work/second.ts")]);
}

#[tokio::test]
async fn pending_paths_flush_when_the_source_closes() {
    let (raw_tx, raw_rx) = mpsc::unbounded_channel();
    let (flush_tx, mut flush_rx) = mpsc::channel(4);
    spawn_debouncer(Duration::from_secs(60), raw_rx, flush_tx);

    raw_tx.send(PathBuf::from("/work/last.ts")).unwrap();
    drop(raw_tx);

    // No quiet period needed: channel closure flushes immediately.
    let batch = timeout(Duration::from_secs(5), flush_rx.recv())
        .await
        .expect("flush on close")
        .expect("debouncer alive");
    assert_eq!(batch, vec![PathBuf::from("/work/last.ts")]);
}
