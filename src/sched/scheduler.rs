use std::collections::BTreeSet;
use std::time::SystemTime;

use tracing::debug;

use crate::graph::DepGraph;
use crate::sched::project::ProjectResolver;
use crate::sched::test_patterns::TestFilePatterns;
use crate::store::{SnapshotSource, SnapshotStore};
use crate::types::{FilePath, TestRunRequest};

/// Priority floor for every scheduled run.
pub const BASE_PRIORITY: i64 = 10;

/// Added once per changed path whose snapshot is an unsaved buffer overlay.
/// Biases the queue toward whatever the user is actively editing over
/// background disk churn.
pub const BUFFER_EDIT_BONUS: i64 = 100;

/// Turns a batch of changed paths into a prioritized run request by walking
/// the dependency graph for the affected test files.
pub struct Scheduler {
    patterns: TestFilePatterns,
    projects: Box<dyn ProjectResolver>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    pub fn new(patterns: TestFilePatterns, projects: Box<dyn ProjectResolver>) -> Self {
        Self { patterns, projects }
    }

    /// Compute the blast radius of a change batch.
    ///
    /// For each changed path: the path itself if it is a test file, plus
    /// every transitive dependent that is a test file; the owning project is
    /// recorded for run scoping. Returns `None` when no test files are
    /// affected.
    pub fn plan(
        &self,
        store: &SnapshotStore,
        graph: &DepGraph,
        changed: &[FilePath],
    ) -> Option<TestRunRequest> {
        let mut test_files: BTreeSet<FilePath> = BTreeSet::new();
        let mut projects: BTreeSet<String> = BTreeSet::new();
        let mut priority = BASE_PRIORITY;

        for path in changed {
            if self.patterns.is_test_file(path) {
                test_files.insert(path.clone());
            }
            for dependent in graph.affected_by(path) {
                if self.patterns.is_test_file(&dependent) {
                    test_files.insert(dependent);
                }
            }

            if let Some(project) = self.projects.resolve(path) {
                projects.insert(project);
            }

            if matches!(
                store.get(path),
                Some(s) if s.source == SnapshotSource::Buffer
            ) {
                priority += BUFFER_EDIT_BONUS;
            }
        }

        if test_files.is_empty() {
            debug!(changed = changed.len(), "no affected test files in batch");
            return None;
        }

        debug!(
            changed = changed.len(),
            affected = test_files.len(),
            priority,
            "planned run request"
        );
        Some(TestRunRequest {
            test_files,
            projects,
            priority,
            timestamp: SystemTime::now(),
        })
    }

    /// Build a full-sweep request: run everything owned by `projects`.
    pub fn full_sweep(&self, projects: BTreeSet<String>) -> TestRunRequest {
        TestRunRequest {
            test_files: BTreeSet::new(),
            projects,
            priority: BASE_PRIORITY,
            timestamp: SystemTime::now(),
        }
    }

    pub fn is_test_file(&self, path: &str) -> bool {
        self.patterns.is_test_file(path)
    }
}
