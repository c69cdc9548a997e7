// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of a raw mpsc sender.
//! This makes it easy to swap in a fake executor in tests while keeping the
//! production executor implementation in [`crate::exec::executor`].
//!
//! - `ProcessExecutorBackend` is the default implementation. It wraps the
//!   executor loop and forwards run directives over an mpsc channel.
//! - Tests can provide their own `ExecutorBackend` that, for example, records
//!   dispatched runs and directly emits `RunFinished` events.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::engine::{EngineEvent, RunProgress};
use crate::errors::{Error, Result};
use crate::exec::adapter::RunnerAdapter;
use crate::exec::cancel::CancelFlag;
use crate::exec::executor::spawn_executor;
use crate::types::{ProjectSpec, RunId, RunResolution, TestRunRequest};

/// Everything the executor needs to carry out one dispatched run.
#[derive(Debug, Clone)]
pub struct RunDirective {
    pub run_id: RunId,
    pub request: TestRunRequest,
    pub resolution: RunResolution,
    /// Projects the run is scoped to, with their roots.
    pub projects: Vec<ProjectSpec>,
    pub cancel: CancelFlag,
}

/// Trait abstracting how dispatched runs are executed.
pub trait ExecutorBackend: Send {
    /// Hand a run to the execution side. The backend reports completion by
    /// sending `EngineEvent::RunFinished` back to the runtime.
    fn dispatch_run(
        &mut self,
        directive: RunDirective,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real executor backend used in production.
///
/// Spawns the background executor loop immediately; `dispatch_run` just
/// forwards directives to it.
pub struct ProcessExecutorBackend {
    tx: mpsc::Sender<RunDirective>,
}

impl ProcessExecutorBackend {
    pub fn new(
        runtime_tx: mpsc::Sender<EngineEvent>,
        progress_tx: mpsc::UnboundedSender<RunProgress>,
        adapter: Box<dyn RunnerAdapter>,
    ) -> Self {
        let tx = spawn_executor(runtime_tx, progress_tx, adapter);
        Self { tx }
    }
}

impl ExecutorBackend for ProcessExecutorBackend {
    fn dispatch_run(
        &mut self,
        directive: RunDirective,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.tx.clone();

        Box::pin(async move {
            tx.send(directive)
                .await
                .map_err(|err| Error::msg(err.to_string()))?;
            Ok(())
        })
    }
}
