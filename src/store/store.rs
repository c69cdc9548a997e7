use std::collections::{HashMap, VecDeque};
use std::time::SystemTime;

use tracing::{debug, trace};

use crate::store::hash::content_hash;
use crate::store::paths::normalize_path;
use crate::store::snapshot::{FileSnapshot, SnapshotSource};
use crate::types::{ChangeKind, FilePath, PathDiff};

/// Prior snapshots retained per path for rollback; older entries are evicted
/// first.
const HISTORY_LIMIT: usize = 10;

/// Authoritative in-memory content, version and hash of every tracked file,
/// with unsaved editor buffers overlaid on top of on-disk content.
///
/// All mutation goes through the operations below; versioning is a single
/// process-wide counter bumped only by writes that actually change content.
/// The per-path state machine is `absent -> disk <-> buffer -> absent`: while
/// a buffer overlay is live, disk writes for the same path are ignored.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    files: HashMap<FilePath, FileSnapshot>,
    history: HashMap<FilePath, VecDeque<FileSnapshot>>,
    version_counter: u64,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot for a path, if tracked.
    pub fn get(&self, path: &str) -> Option<&FileSnapshot> {
        self.files.get(&normalize_path(path))
    }

    /// Record on-disk content for a path.
    ///
    /// Ignored (the live buffer snapshot is returned) while an unsaved buffer
    /// overlay exists for the same path: unsaved edits win. A write whose
    /// hash and source match the current snapshot is a no-op that bumps
    /// nothing.
    pub fn write_from_disk(&mut self, path: &str, content: impl Into<String>) -> &FileSnapshot {
        let path = normalize_path(path);
        if matches!(
            self.files.get(&path),
            Some(s) if s.source == SnapshotSource::Buffer
        ) {
            debug!(path = %path, "disk write ignored; buffer overlay is active");
            return &self.files[&path];
        }
        self.write(path, content.into(), SnapshotSource::Disk)
    }

    /// Record unsaved editor content for a path, shadowing any disk snapshot.
    pub fn write_from_buffer(&mut self, path: &str, content: impl Into<String>) -> &FileSnapshot {
        let path = normalize_path(path);
        self.write(path, content.into(), SnapshotSource::Buffer)
    }

    /// Drop a buffer overlay, reverting to the most recent disk snapshot in
    /// history, or removing the path entirely if it never existed on disk.
    ///
    /// The reinstated snapshot is re-issued under a fresh version so that
    /// `changed_since` consumers observe the revert. Returns the snapshot now
    /// current for the path, or `None` if the path was removed.
    pub fn clear_buffer(&mut self, path: &str) -> Option<FileSnapshot> {
        let path = normalize_path(path);
        let is_buffer = matches!(
            self.files.get(&path),
            Some(s) if s.source == SnapshotSource::Buffer
        );
        if !is_buffer {
            return self.files.get(&path).cloned();
        }

        let restored = self.history.get(&path).and_then(|entries| {
            entries
                .iter()
                .rev()
                .find(|s| s.source == SnapshotSource::Disk)
                .cloned()
        });

        match restored {
            Some(disk) => {
                let version = self.next_version();
                let snapshot = FileSnapshot {
                    version,
                    timestamp: SystemTime::now(),
                    ..disk
                };
                debug!(path = %path, version, "buffer cleared; reverting to disk snapshot");
                if let Some(prev) = self.files.insert(path.clone(), snapshot) {
                    self.push_history(prev);
                }
                self.files.get(&path).cloned()
            }
            None => {
                debug!(path = %path, "buffer cleared with no disk history; removing path");
                if let Some(prev) = self.files.remove(&path) {
                    self.push_history(prev);
                }
                None
            }
        }
    }

    /// Remove a tracked path. Returns whether anything was removed.
    pub fn remove(&mut self, path: &str) -> bool {
        let path = normalize_path(path);
        match self.files.remove(&path) {
            Some(prev) => {
                debug!(path = %path, "removing tracked file");
                self.push_history(prev);
                true
            }
            None => false,
        }
    }

    /// Snapshots written after the given version, oldest first.
    pub fn changed_since(&self, version: u64) -> Vec<&FileSnapshot> {
        let mut changed: Vec<&FileSnapshot> = self
            .files
            .values()
            .filter(|s| s.version > version)
            .collect();
        changed.sort_by_key(|s| s.version);
        changed
    }

    /// Compare the live store against a prior `path -> hash` map.
    pub fn diff_against(&self, prior: &HashMap<FilePath, String>) -> Vec<PathDiff> {
        let mut diffs = Vec::new();

        for (path, snapshot) in &self.files {
            match prior.get(path) {
                None => diffs.push(PathDiff {
                    path: path.clone(),
                    kind: ChangeKind::Added,
                }),
                Some(hash) if *hash != snapshot.hash => diffs.push(PathDiff {
                    path: path.clone(),
                    kind: ChangeKind::Changed,
                }),
                Some(_) => {}
            }
        }

        for path in prior.keys() {
            if !self.files.contains_key(path) {
                diffs.push(PathDiff {
                    path: path.clone(),
                    kind: ChangeKind::Removed,
                });
            }
        }

        diffs.sort_by(|a, b| a.path.cmp(&b.path));
        diffs
    }

    /// Reinstate a prior snapshot by version, under a fresh version number.
    ///
    /// Returns the new current snapshot, or `None` if no snapshot with that
    /// version exists in the path's history.
    pub fn rollback(&mut self, path: &str, version: u64) -> Option<FileSnapshot> {
        let path = normalize_path(path);

        if matches!(self.files.get(&path), Some(s) if s.version == version) {
            return self.files.get(&path).cloned();
        }

        let target = self
            .history
            .get(&path)?
            .iter()
            .find(|s| s.version == version)
            .cloned()?;

        let new_version = self.next_version();
        let snapshot = FileSnapshot {
            version: new_version,
            timestamp: SystemTime::now(),
            ..target
        };
        debug!(path = %path, from_version = version, version = new_version, "rolling back snapshot");
        if let Some(prev) = self.files.insert(path.clone(), snapshot) {
            self.push_history(prev);
        }
        self.files.get(&path).cloned()
    }

    /// Current `path -> hash` view, suitable for a later [`Self::diff_against`].
    pub fn hashes(&self) -> HashMap<FilePath, String> {
        self.files
            .iter()
            .map(|(path, s)| (path.clone(), s.hash.clone()))
            .collect()
    }

    /// Highest version assigned so far.
    pub fn current_version(&self) -> u64 {
        self.version_counter
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &FilePath> {
        self.files.keys()
    }

    fn next_version(&mut self) -> u64 {
        self.version_counter += 1;
        self.version_counter
    }

    /// Shared write path for both sources. Assumes `path` is normalized and
    /// buffer precedence has already been enforced by the caller.
    fn write(&mut self, path: FilePath, content: String, source: SnapshotSource) -> &FileSnapshot {
        let hash = content_hash(&content);

        if let Some(existing) = self.files.get(&path) {
            if existing.hash == hash && existing.source == source {
                trace!(path = %path, "write is a no-op; content and source unchanged");
                return &self.files[&path];
            }
        }

        let version = self.next_version();
        let snapshot = FileSnapshot {
            path: path.clone(),
            content,
            version,
            hash,
            source,
            timestamp: SystemTime::now(),
        };
        trace!(path = %path, version, source = ?source, "recording snapshot");
        if let Some(prev) = self.files.insert(path.clone(), snapshot) {
            self.push_history(prev);
        }
        &self.files[&path]
    }

    fn push_history(&mut self, snapshot: FileSnapshot) {
        let entries = self.history.entry(snapshot.path.clone()).or_default();
        entries.push_back(snapshot);
        while entries.len() > HISTORY_LIMIT {
            entries.pop_front();
        }
    }
}
