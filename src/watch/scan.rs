// src/watch/scan.rs

//! Initial workspace scan.
//!
//! No core state is persisted between processes; everything is rebuilt from
//! this one walk at startup.

use std::path::Path;

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::engine::FileInput;
use crate::errors::Result;
use crate::watch::filter::WatchFilter;
use crate::watch::path_utils::relative_str;

/// Files larger than this are skipped during the scan; they are almost
/// certainly not source files.
const MAX_SCAN_FILE_BYTES: u64 = 1_048_576;

/// Walk `root` and produce the seed batch for the engine.
pub fn initial_scan(root: &Path, filter: &WatchFilter) -> Result<Vec<FileInput>> {
    let mut changes = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(error = %err, "skipping unreadable entry during scan");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(rel) = relative_str(root, entry.path()) else {
            continue;
        };
        if !filter.is_relevant(&rel) {
            continue;
        }

        match entry.metadata() {
            Ok(meta) if meta.len() > MAX_SCAN_FILE_BYTES => {
                debug!(path = %rel, size = meta.len(), "skipping oversized file");
                continue;
            }
            Ok(_) => {}
            Err(err) => {
                debug!(path = %rel, error = %err, "skipping entry without metadata");
                continue;
            }
        }

        match std::fs::read(entry.path()) {
            Ok(bytes) => changes.push(FileInput {
                path: entry.path().to_string_lossy().to_string(),
                content: Some(String::from_utf8_lossy(&bytes).into_owned()),
            }),
            Err(err) => {
                debug!(path = %rel, error = %err, "file unreadable during scan; skipping");
            }
        }
    }

    info!(files = changes.len(), "initial scan collected files");
    Ok(changes)
}
