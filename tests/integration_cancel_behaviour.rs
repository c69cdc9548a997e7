// tests/integration_cancel_behaviour.rs

mod common;
use crate::common::builders::{EngineCoreBuilder, passing_result};
use crate::common::{init_tracing, wait_for_event};

use std::error::Error;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::{Notify, mpsc};

use testsieve::bus::EventBus;
use testsieve::bus::protocol::{EngineStatus, OutboundEvent, RunCompletionStatus};
use testsieve::engine::{
    CompletedRun, EngineEvent, FileInput, RunOutcome, RunProgress, Runtime,
};
use testsieve::errors::Result;
use testsieve::exec::{ExecutorBackend, RunDirective};

const UTIL: &str = "/work/util.ts";
const UTIL_TEST: &str = "/work/util.test.ts";
const UTIL_TEST_SRC: &str = "import { x } from './util';\ntest('x', () => {});";

/// A fake executor that holds every dispatched run open until the test
/// releases it, and honours the cancellation flag at that point.
struct ControllableExecutor {
    runtime_tx: mpsc::Sender<EngineEvent>,
    started: Arc<Mutex<Vec<RunDirective>>>,
    release: Arc<Notify>,
}

impl ExecutorBackend for ControllableExecutor {
    fn dispatch_run(
        &mut self,
        directive: RunDirective,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let started = Arc::clone(&self.started);
        let release = Arc::clone(&self.release);

        Box::pin(async move {
            started.lock().unwrap().push(directive.clone());

            // Finish later, when the test says so.
            tokio::spawn(async move {
                release.notified().await;
                let outcome = if directive.cancel.is_cancelled() {
                    RunOutcome::Cancelled
                } else {
                    RunOutcome::Completed(CompletedRun {
                        discovered: Vec::new(),
                        results: directive
                            .request
                            .test_files
                            .iter()
                            .map(|f| passing_result(f))
                            .collect(),
                        coverage: Vec::new(),
                        console_logs: Vec::new(),
                        duration_ms: 1,
                        error: None,
                    })
                };
                let _ = tx
                    .send(EngineEvent::RunFinished {
                        run_id: directive.run_id,
                        outcome,
                    })
                    .await;
            });

            Ok(())
        })
    }
}

struct Harness {
    engine_tx: mpsc::Sender<EngineEvent>,
    observer: mpsc::UnboundedReceiver<testsieve::bus::protocol::Envelope>,
    started: Arc<Mutex<Vec<RunDirective>>>,
    release: Arc<Notify>,
    handle: tokio::task::JoinHandle<Result<()>>,
    _progress_tx: mpsc::UnboundedSender<RunProgress>,
}

fn spawn_harness() -> Harness {
    init_tracing();

    let core = EngineCoreBuilder::new().build();
    let (engine_tx, engine_rx) = mpsc::channel::<EngineEvent>(64);
    let (progress_tx, progress_rx) = mpsc::unbounded_channel::<RunProgress>();

    let started = Arc::new(Mutex::new(Vec::new()));
    let release = Arc::new(Notify::new());
    let executor = ControllableExecutor {
        runtime_tx: engine_tx.clone(),
        started: Arc::clone(&started),
        release: Arc::clone(&release),
    };

    let mut runtime = Runtime::new(core, EventBus::new(), engine_rx, progress_rx, executor);
    let observer = runtime.subscribe();
    let handle = tokio::spawn(runtime.run());

    Harness {
        engine_tx,
        observer,
        started,
        release,
        handle,
        _progress_tx: progress_tx,
    }
}

fn file(path: &str, content: &str) -> FileInput {
    FileInput {
        path: path.to_string(),
        content: Some(content.to_string()),
    }
}

fn files_changed(path: &str, content: &str) -> EngineEvent {
    EngineEvent::FilesChanged {
        changes: vec![file(path, content)],
    }
}

type TestOutcome = std::result::Result<(), Box<dyn Error>>;

#[tokio::test]
async fn cancel_discards_pending_work_and_the_active_runs_results() -> TestOutcome {
    let mut h = spawn_harness();

    h.engine_tx
        .send(EngineEvent::WorkspaceScanned {
            changes: vec![file(UTIL, "export const x = 1;"), file(UTIL_TEST, UTIL_TEST_SRC)],
        })
        .await?;

    // Start a run and keep it in flight.
    h.engine_tx
        .send(files_changed(UTIL, "export const x = 2;"))
        .await?;
    wait_for_event(&mut h.observer, |e| {
        matches!(e, OutboundEvent::RunStarted(_))
    })
    .await;

    // A further change queues behind the active run.
    h.engine_tx
        .send(files_changed(UTIL, "export const x = 3;"))
        .await?;

    // Cancel everything, then let the in-flight run observe the flag. The
    // buffer probe is a FIFO marker: once its ack comes back, the cancel
    // event has definitely been processed.
    h.engine_tx.send(EngineEvent::CancelRequested).await?;
    h.engine_tx
        .send(EngineEvent::BufferUpdated {
            path: "/work/probe.md".to_string(),
            content: "probe".to_string(),
        })
        .await?;
    wait_for_event(&mut h.observer, |e| {
        matches!(e, OutboundEvent::FileChangedAck(p) if p.path == "/work/probe.md")
    })
    .await;
    h.release.notify_one();

    wait_for_event(&mut h.observer, |e| {
        matches!(
            e,
            OutboundEvent::RunComplete(p) if p.status == RunCompletionStatus::Cancelled
        )
    })
    .await;
    // The queue was drained, so the engine settles idle without another run.
    wait_for_event(&mut h.observer, |e| {
        matches!(
            e,
            OutboundEvent::EngineStatus {
                status: EngineStatus::Idle
            }
        )
    })
    .await;

    h.engine_tx.send(EngineEvent::ShutdownRequested).await?;
    h.handle.await??;

    assert_eq!(h.started.lock().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn queued_requests_drain_in_order_when_not_cancelled() -> TestOutcome {
    let mut h = spawn_harness();

    h.engine_tx
        .send(EngineEvent::WorkspaceScanned {
            changes: vec![file(UTIL, "export const x = 1;"), file(UTIL_TEST, UTIL_TEST_SRC)],
        })
        .await?;

    h.engine_tx
        .send(files_changed(UTIL, "export const x = 2;"))
        .await?;
    wait_for_event(&mut h.observer, |e| {
        matches!(e, OutboundEvent::RunStarted(_))
    })
    .await;

    // Queue a second request while the first is still running.
    h.engine_tx
        .send(files_changed(UTIL, "export const x = 3;"))
        .await?;

    // Complete the first run; the queued one must start immediately.
    h.release.notify_one();
    wait_for_event(&mut h.observer, |e| {
        matches!(
            e,
            OutboundEvent::RunComplete(p) if p.status == RunCompletionStatus::Passed
        )
    })
    .await;
    wait_for_event(&mut h.observer, |e| {
        matches!(e, OutboundEvent::RunStarted(_))
    })
    .await;

    h.release.notify_one();
    wait_for_event(&mut h.observer, |e| {
        matches!(
            e,
            OutboundEvent::RunComplete(p) if p.status == RunCompletionStatus::Passed
        )
    })
    .await;

    h.engine_tx.send(EngineEvent::ShutdownRequested).await?;
    h.handle.await??;

    let started = h.started.lock().unwrap();
    assert_eq!(started.len(), 2);
    assert!(started[0].run_id < started[1].run_id);
    Ok(())
}
