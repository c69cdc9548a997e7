// src/exec/adapter.rs

//! Pluggable test-runner adapter contract.
//!
//! The engine treats every adapter call as best-effort: a failed call is
//! converted into synthetic failed results for the requested files rather
//! than propagated as a fatal error.

use std::future::Future;
use std::pin::Pin;

use crate::exec::cancel::CancelFlag;
use crate::types::{FilePath, ProjectSpec, TestInfo, TestResult, TestStatus};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Streaming callbacks fired by an adapter while a run is in progress.
#[derive(Default)]
pub struct LifecycleHooks {
    pub on_test_started: Option<Box<dyn Fn(&str) + Send + Sync>>,
    pub on_test_result: Option<Box<dyn Fn(&TestResult) + Send + Sync>>,
    pub on_console: Option<Box<dyn Fn(&str) + Send + Sync>>,
}

impl std::fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("on_test_started", &self.on_test_started.is_some())
            .field("on_test_result", &self.on_test_result.is_some())
            .field("on_console", &self.on_console.is_some())
            .finish()
    }
}

/// A dependency observed during execution: `test_file` actually ran code
/// from `source`. Feeds runtime edges back into the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageEdge {
    pub source: FilePath,
    pub test_file: FilePath,
}

/// Everything an adapter hands back after a run.
#[derive(Debug, Clone, Default)]
pub struct CollectedRun {
    pub results: Vec<TestResult>,
    pub coverage: Vec<CoverageEdge>,
    pub console_logs: Vec<String>,
    pub duration_ms: u64,
}

/// Options accompanying an execute call.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Projects the run is scoped to.
    pub projects: Vec<ProjectSpec>,
}

/// Contract for one supported test runner.
///
/// Implementations must observe the [`CancelFlag`] promptly at their own
/// await points; the engine never kills underlying work.
pub trait RunnerAdapter: Send {
    fn discover_tests(
        &mut self,
        project_root: String,
        config_path: Option<String>,
    ) -> BoxFuture<'_, anyhow::Result<Vec<TestInfo>>>;

    fn execute_tests(
        &mut self,
        test_files: Vec<FilePath>,
        options: ExecuteOptions,
        cancel: CancelFlag,
    ) -> BoxFuture<'_, anyhow::Result<Vec<TestResult>>>;

    /// Replace the streaming callbacks for subsequent runs.
    fn hook_into_lifecycle(&mut self, hooks: LifecycleHooks);

    fn collect_results(&mut self) -> BoxFuture<'_, anyhow::Result<CollectedRun>>;

    fn dispose(&mut self) -> BoxFuture<'_, anyhow::Result<()>>;
}

/// An adapter that discovers and runs nothing. Used for protocol-only
/// sessions and as a stand-in while no runner is configured.
#[derive(Debug, Default)]
pub struct NullRunnerAdapter;

impl RunnerAdapter for NullRunnerAdapter {
    fn discover_tests(
        &mut self,
        _project_root: String,
        _config_path: Option<String>,
    ) -> BoxFuture<'_, anyhow::Result<Vec<TestInfo>>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn execute_tests(
        &mut self,
        _test_files: Vec<FilePath>,
        _options: ExecuteOptions,
        _cancel: CancelFlag,
    ) -> BoxFuture<'_, anyhow::Result<Vec<TestResult>>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn hook_into_lifecycle(&mut self, _hooks: LifecycleHooks) {}

    fn collect_results(&mut self) -> BoxFuture<'_, anyhow::Result<CollectedRun>> {
        Box::pin(async { Ok(CollectedRun::default()) })
    }

    fn dispose(&mut self) -> BoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// Convert an adapter failure into one failed result per requested file, so
/// observers see concrete failures instead of a vanished run.
pub fn synthesize_failed_results(files: &[FilePath], message: &str) -> Vec<TestResult> {
    files
        .iter()
        .map(|file| TestResult {
            test_id: format!("{file}::adapter"),
            name: "runner adapter failure".to_string(),
            file_path: file.clone(),
            status: TestStatus::Failed,
            duration_ms: 0,
            message: Some(message.to_string()),
            stack: None,
        })
        .collect()
}
