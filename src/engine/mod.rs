// src/engine/mod.rs

//! Orchestration engine.
//!
//! This module ties together:
//! - the snapshot store and dependency graph
//! - the diff engine and scheduler
//! - the single-flight execution queue and result cache
//! - the main runtime event loop that reacts to:
//!   - debounced file-change batches
//!   - buffer overlay updates from the protocol
//!   - run completion and streamed progress from the executor
//!   - cancellation and shutdown requests
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::exec::adapter::CoverageEdge;
use crate::types::{RunId, TestInfo, TestResult};

/// One file in an intake batch. `content: None` means the file is gone (or
/// unreadable, which the engine treats the same way).
#[derive(Debug, Clone)]
pub struct FileInput {
    pub path: String,
    pub content: Option<String>,
}

/// Output of a run that actually finished (as opposed to being cancelled).
///
/// `error` carries an adapter failure message; the run still completes, with
/// synthetic failed results standing in for whatever could not execute.
#[derive(Debug, Clone)]
pub struct CompletedRun {
    pub discovered: Vec<TestInfo>,
    pub results: Vec<TestResult>,
    pub coverage: Vec<CoverageEdge>,
    pub console_logs: Vec<String>,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// How a dispatched run ended.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(CompletedRun),
    /// Cancelled cooperatively; partial results are discarded.
    Cancelled,
}

/// A per-test result streamed by the executor while a run is in flight.
#[derive(Debug, Clone)]
pub struct RunProgress {
    pub run_id: RunId,
    pub result: TestResult,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// If true, exit the runtime once no run is active and nothing is queued
    /// (used for `--once`).
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from watchers, the protocol, and the
/// executor.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Initial state rebuild: seed store and graph, schedule nothing.
    WorkspaceScanned { changes: Vec<FileInput> },
    /// A debounced batch of on-disk changes.
    FilesChanged { changes: Vec<FileInput> },
    /// Unsaved editor content for a path.
    BufferUpdated { path: String, content: String },
    /// The editor dropped its buffer; revert to disk content.
    BufferClosed { path: String },
    /// Explicit full-sweep request (empty = all configured projects).
    RunRequested { projects: Vec<String> },
    /// Cancel the active run and discard everything queued.
    CancelRequested,
    /// The executor finished a dispatched run.
    RunFinished { run_id: RunId, outcome: RunOutcome },
    /// Graceful shutdown requested (e.g. Ctrl-C or a control message).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use core::EngineCore;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
