// src/watch/debounce.rs

//! Timer-driven batching boundary between raw watch events and the engine.
//!
//! Rapid successive events for any paths are collected until a quiet period
//! of `delay` passes with nothing new, then flushed as one deduplicated
//! batch. The policy lives here, outside the diff/graph core, which accepts
//! arbitrarily batched input.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Spawn the debouncer task.
///
/// Consumes raw paths from `raw_rx` and sends quiet-period batches to
/// `flush_tx`. The task ends when either side of the channel pair closes;
/// anything still pending is flushed on the way out.
pub fn spawn_debouncer(
    delay: Duration,
    mut raw_rx: mpsc::UnboundedReceiver<PathBuf>,
    flush_tx: mpsc::Sender<Vec<PathBuf>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut pending: BTreeSet<PathBuf> = BTreeSet::new();

        loop {
            if pending.is_empty() {
                match raw_rx.recv().await {
                    Some(path) => {
                        pending.insert(path);
                    }
                    None => break,
                }
                continue;
            }

            tokio::select! {
                next = raw_rx.recv() => match next {
                    Some(path) => {
                        // Restarts the quiet period.
                        pending.insert(path);
                    }
                    None => {
                        let batch: Vec<PathBuf> = std::mem::take(&mut pending).into_iter().collect();
                        let _ = flush_tx.send(batch).await;
                        break;
                    }
                },
                _ = tokio::time::sleep(delay) => {
                    let batch: Vec<PathBuf> = std::mem::take(&mut pending).into_iter().collect();
                    debug!(paths = batch.len(), "flushing debounced change batch");
                    if flush_tx.send(batch).await.is_err() {
                        break;
                    }
                }
            }
        }

        debug!("debouncer task finished");
    })
}
