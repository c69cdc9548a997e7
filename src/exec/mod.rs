// src/exec/mod.rs

//! Run execution layer.
//!
//! - [`queue`] serializes run requests: at most one in flight, the rest
//!   accumulate priority-sorted.
//! - [`cancel`] is the shared cooperative cancellation flag.
//! - [`adapter`] defines the external test-runner contract and helpers for
//!   converting adapter failures into synthetic results.
//! - [`process_adapter`] is the production adapter: a shell command speaking
//!   NDJSON over stdout.
//! - [`backend`] abstracts "dispatch a run" so tests can swap in a fake
//!   executor; the real implementation forwards to [`executor`]'s loop.
//! - [`executor`] owns the adapter and drives one run at a time.

pub mod adapter;
pub mod backend;
pub mod cancel;
pub mod executor;
pub mod process_adapter;
pub mod queue;

pub use adapter::{
    CollectedRun, CoverageEdge, ExecuteOptions, LifecycleHooks, NullRunnerAdapter, RunnerAdapter,
    synthesize_failed_results,
};
pub use backend::{ExecutorBackend, ProcessExecutorBackend, RunDirective};
pub use cancel::CancelFlag;
pub use executor::spawn_executor;
pub use process_adapter::ProcessRunnerAdapter;
pub use queue::ExecutionQueue;
