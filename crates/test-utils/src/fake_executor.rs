use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use testsieve::engine::{CompletedRun, EngineEvent, RunOutcome};
use testsieve::errors::Result;
use testsieve::exec::{ExecutorBackend, RunDirective};
use testsieve::types::FilePath;

use crate::builders::passing_result;

/// A fake executor that:
/// - records every dispatched run directive
/// - immediately reports a completed run with one passing result per
///   requested test file.
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<EngineEvent>,
    dispatched: Arc<Mutex<Vec<RunDirective>>>,
}

impl FakeExecutor {
    pub fn new(
        runtime_tx: mpsc::Sender<EngineEvent>,
        dispatched: Arc<Mutex<Vec<RunDirective>>>,
    ) -> Self {
        Self {
            runtime_tx,
            dispatched,
        }
    }
}

impl ExecutorBackend for FakeExecutor {
    fn dispatch_run(
        &mut self,
        directive: RunDirective,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let dispatched = Arc::clone(&self.dispatched);

        Box::pin(async move {
            let files: Vec<FilePath> = directive.request.test_files.iter().cloned().collect();
            let run_id = directive.run_id;
            {
                let mut guard = dispatched.lock().unwrap();
                guard.push(directive);
            }

            let results = files.iter().map(|f| passing_result(f)).collect();
            let outcome = RunOutcome::Completed(CompletedRun {
                discovered: Vec::new(),
                results,
                coverage: Vec::new(),
                console_logs: Vec::new(),
                duration_ms: 1,
                error: None,
            });

            tx.send(EngineEvent::RunFinished { run_id, outcome })
                .await
                .map_err(|err| testsieve::errors::Error::msg(err.to_string()))?;
            Ok(())
        })
    }
}
