// src/store/snapshot.rs

use std::time::SystemTime;

use serde::Serialize;

use crate::types::FilePath;

/// Where a snapshot's content came from.
///
/// `Buffer` content is an unsaved editor overlay and shadows whatever is on
/// disk for the same path until the buffer is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotSource {
    Disk,
    Buffer,
}

/// The engine's view of a single tracked file at one point in time.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    pub path: FilePath,
    pub content: String,
    /// Process-wide monotonically increasing write counter.
    pub version: u64,
    /// Content digest; see [`crate::store::content_hash`].
    pub hash: String,
    pub source: SnapshotSource,
    pub timestamp: SystemTime,
}
