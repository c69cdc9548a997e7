// src/watch/watcher.rs

use std::path::PathBuf;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::{EngineEvent, FileInput};
use crate::errors::Result;
use crate::watch::debounce::spawn_debouncer;
use crate::watch::filter::WatchFilter;
use crate::watch::path_utils::relative_str;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive
/// for as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher observing `root` recursively.
///
/// Events are filtered against `filter`, debounced for `delay`, then read
/// into content and forwarded to the engine as one
/// [`EngineEvent::FilesChanged`] batch per quiet period. A file that cannot
/// be read (vanished between notification and read, permissions) is reported
/// with `content: None` and treated as removed; transient IO is never fatal.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    filter: WatchFilter,
    delay: Duration,
    engine_tx: mpsc::Sender<EngineEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    // Canonicalize once so we have a stable base path.
    let root = root.canonicalize().unwrap_or_else(|_| root.clone());

    // Channel from the blocking notify callback into the async world.
    let (raw_tx, raw_rx) = mpsc::unbounded_channel::<PathBuf>();
    let (flush_tx, mut flush_rx) = mpsc::channel::<Vec<PathBuf>>(8);

    let callback_root = root.clone();
    let callback_filter = filter.clone();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for path in event.paths {
                    let Some(rel) = relative_str(&callback_root, &path) else {
                        continue;
                    };
                    if !callback_filter.is_relevant(&rel) {
                        continue;
                    }
                    if raw_tx.send(path).is_err() {
                        // Engine side is gone; nothing useful to do here.
                        return;
                    }
                }
            }
            Err(err) => {
                // The tracing subscriber may not be usable on this thread.
                eprintln!("testsieve: file watch error: {err}");
            }
        },
        Config::default(),
    )
    .map_err(|err| crate::errors::Error::msg(err.to_string()))?;

    watcher
        .watch(&root, RecursiveMode::Recursive)
        .map_err(|err| crate::errors::Error::msg(err.to_string()))?;

    info!("file watcher started on {:?}", root);

    spawn_debouncer(delay, raw_rx, flush_tx);

    // Consumer: read batch contents and forward to the engine.
    tokio::spawn(async move {
        while let Some(batch) = flush_rx.recv().await {
            let changes = read_batch(&batch).await;
            if changes.is_empty() {
                continue;
            }
            debug!(files = changes.len(), "forwarding change batch to engine");
            if engine_tx
                .send(EngineEvent::FilesChanged { changes })
                .await
                .is_err()
            {
                debug!("engine channel closed; stopping watch consumer");
                break;
            }
        }
    });

    Ok(WatcherHandle { _inner: watcher })
}

async fn read_batch(paths: &[PathBuf]) -> Vec<FileInput> {
    let mut changes = Vec::with_capacity(paths.len());

    for path in paths {
        let raw = path.to_string_lossy().to_string();
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_dir() => continue,
            Ok(_) => match tokio::fs::read(path).await {
                Ok(bytes) => changes.push(FileInput {
                    path: raw,
                    content: Some(String::from_utf8_lossy(&bytes).into_owned()),
                }),
                Err(err) => {
                    warn!(path = %raw, error = %err, "file unreadable; treating as removed");
                    changes.push(FileInput {
                        path: raw,
                        content: None,
                    });
                }
            },
            // Gone between notification and read.
            Err(_) => changes.push(FileInput {
                path: raw,
                content: None,
            }),
        }
    }

    changes
}
