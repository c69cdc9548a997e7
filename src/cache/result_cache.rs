use std::collections::HashMap;
use std::time::SystemTime;

use tracing::debug;

use crate::store::paths::normalize_path;
use crate::types::{CollectedSummary, FilePath, RunResolution, TestInfo, TestResult};

/// A memoized slice of a finished run, keyed by test file.
///
/// The entry is valid only while the live content hash of `file_path` equals
/// `content_hash`. The key intentionally covers only the test file's own
/// content: edits to files the test *imports* do not invalidate the entry.
/// Selection still re-runs those tests through the dependency graph, so the
/// staleness is confined to the replay path.
#[derive(Debug, Clone)]
pub struct CachedTestRun {
    pub content_hash: String,
    pub file_path: FilePath,
    pub cached_at: SystemTime,
    pub resolution: RunResolution,
    pub discovered_tests: Vec<TestInfo>,
    pub results: Vec<TestResult>,
    pub collected_summary: CollectedSummary,
    pub console_logs: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Lazily invalidated result cache.
///
/// No active invalidation happens on dependency changes; staleness is
/// detected at lookup time by comparing the stored hash against the caller's
/// live hash, and stale entries are evicted on the spot.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: HashMap<FilePath, CachedTestRun>,
    hits: u64,
    misses: u64,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the cached run for a test file.
    ///
    /// `live_hash` is the current content hash of the file (`None` when the
    /// file is untracked, which always misses). A stored entry whose hash
    /// differs is evicted and counted as a miss.
    pub fn lookup(&mut self, path: &str, live_hash: Option<&str>) -> Option<&CachedTestRun> {
        let path = normalize_path(path);

        let Some(live_hash) = live_hash else {
            self.misses += 1;
            return None;
        };

        let stale = matches!(
            self.entries.get(&path),
            Some(entry) if entry.content_hash != live_hash
        );
        if stale {
            debug!(path = %path, "cached run is stale; evicting");
            self.entries.remove(&path);
        }

        if self.entries.contains_key(&path) {
            self.hits += 1;
            self.entries.get(&path)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Record a run's output for its test file, replacing any prior entry.
    pub fn store(&mut self, entry: CachedTestRun) {
        let path = normalize_path(&entry.file_path);
        debug!(path = %path, hash = %entry.content_hash, "caching run results");
        self.entries.insert(path, entry);
    }

    pub fn invalidate(&mut self, path: &str) -> bool {
        self.entries.remove(&normalize_path(path)).is_some()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Validity check without touching the hit/miss counters.
    pub fn has(&self, path: &str, live_hash: Option<&str>) -> bool {
        let Some(live_hash) = live_hash else {
            return false;
        };
        matches!(
            self.entries.get(&normalize_path(path)),
            Some(entry) if entry.content_hash == live_hash
        )
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}
