//! Shared vocabulary types for the engine.
//!
//! Everything here is plain data: no channels, no IO, no engine state. These
//! types cross module boundaries (store -> scheduler -> queue -> cache -> bus)
//! and the wire protocol, so they live in one place instead of being owned by
//! any single component.

use std::collections::BTreeSet;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Canonical file identifier: a normalized absolute path.
///
/// Normalization rules live in [`crate::store::paths::normalize_path`].
pub type FilePath = String;

/// Monotonically increasing identifier for a dispatched run.
pub type RunId = u64;

/// What happened to a path in a store diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Changed,
    Removed,
}

/// One entry of a [`crate::store::SnapshotStore::diff_against`] result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathDiff {
    pub path: FilePath,
    pub kind: ChangeKind,
}

/// A test case reported by a runner adapter during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestInfo {
    /// Runner-scoped stable identifier.
    pub id: String,
    pub name: String,
    pub file_path: FilePath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

/// Outcome of a single test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub test_id: String,
    pub name: String,
    pub file_path: FilePath,
    pub status: TestStatus,
    pub duration_ms: u64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub stack: Option<String>,
}

/// Aggregate counts for a finished run (or a cached slice of one).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
}

impl CollectedSummary {
    pub fn from_results(results: &[TestResult], duration_ms: u64) -> Self {
        let mut summary = CollectedSummary {
            total: results.len(),
            duration_ms,
            ..Default::default()
        };
        for result in results {
            match result.status {
                TestStatus::Passed => summary.passed += 1,
                TestStatus::Failed => summary.failed += 1,
                TestStatus::Skipped => summary.skipped += 1,
            }
        }
        summary
    }
}

/// How a scheduled batch resolved: which test files must actually execute and
/// which were satisfied from the result cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResolution {
    /// Test files that must be executed by the runner adapter. Empty together
    /// with a nonempty project set means "full sweep".
    pub run: Vec<FilePath>,
    /// Test files whose cached results were replayed instead of re-running.
    pub replayed: Vec<FilePath>,
    pub projects: Vec<String>,
}

/// A request for the execution queue.
///
/// An empty `test_files` set with a nonempty `projects` set means "run
/// everything owned by these projects".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRunRequest {
    pub test_files: BTreeSet<FilePath>,
    pub projects: BTreeSet<String>,
    pub priority: i64,
    pub timestamp: SystemTime,
}

impl TestRunRequest {
    pub fn is_full_sweep(&self) -> bool {
        self.test_files.is_empty() && !self.projects.is_empty()
    }
}

/// A project known to the engine: a name and the normalized root it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSpec {
    pub name: String,
    pub root: FilePath,
}
