// src/exec/executor.rs

//! The executor loop: owns the runner adapter and drives one run at a time.

use std::collections::BTreeSet;

use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::engine::{CompletedRun, EngineEvent, RunOutcome, RunProgress};
use crate::exec::adapter::{
    CollectedRun, ExecuteOptions, LifecycleHooks, RunnerAdapter, synthesize_failed_results,
};
use crate::exec::backend::RunDirective;
use crate::types::{FilePath, RunId};

/// Spawn the background executor loop.
///
/// The returned sender is what [`crate::exec::ProcessExecutorBackend`] feeds.
/// The engine's queue guarantees at most one directive is outstanding, so the
/// loop simply processes them in arrival order, reporting each completion
/// back through `runtime_tx` and streaming per-test results through
/// `progress_tx`.
pub fn spawn_executor(
    runtime_tx: mpsc::Sender<EngineEvent>,
    progress_tx: mpsc::UnboundedSender<RunProgress>,
    mut adapter: Box<dyn RunnerAdapter>,
) -> mpsc::Sender<RunDirective> {
    let (tx, mut rx) = mpsc::channel::<RunDirective>(16);

    tokio::spawn(async move {
        info!("executor loop started");

        while let Some(directive) = rx.recv().await {
            install_hooks(adapter.as_mut(), progress_tx.clone(), directive.run_id);
            let run_id = directive.run_id;
            let outcome = drive_run(adapter.as_mut(), directive).await;
            if runtime_tx
                .send(EngineEvent::RunFinished { run_id, outcome })
                .await
                .is_err()
            {
                break;
            }
        }

        if let Err(err) = adapter.dispose().await {
            warn!(error = %err, "adapter dispose failed");
        }
        info!("executor loop finished (channel closed)");
    });

    tx
}

/// Re-install lifecycle hooks with the current run id baked in, so streamed
/// results are attributed to the right run.
fn install_hooks(
    adapter: &mut dyn RunnerAdapter,
    progress_tx: mpsc::UnboundedSender<RunProgress>,
    run_id: RunId,
) {
    adapter.hook_into_lifecycle(LifecycleHooks {
        on_test_started: Some(Box::new(move |test_id| {
            debug!(run_id, test_id, "test started");
        })),
        on_test_result: Some(Box::new(move |result| {
            let _ = progress_tx.send(RunProgress {
                run_id,
                result: result.clone(),
            });
        })),
        on_console: Some(Box::new(move |text| {
            trace!(run_id, "runner console: {}", text);
        })),
    });
}

/// Carry out one run end to end against the adapter.
///
/// Every adapter call is best-effort: discovery failures shrink the run,
/// execution failures become synthetic failed results, and a failed collect
/// falls back to whatever was streamed. The cancel flag is checked between
/// adapter calls; a cancelled run reports `Cancelled` and nothing else.
pub async fn drive_run(adapter: &mut dyn RunnerAdapter, directive: RunDirective) -> RunOutcome {
    let mut discovered = Vec::new();
    for project in &directive.projects {
        if directive.cancel.is_cancelled() {
            return RunOutcome::Cancelled;
        }
        match adapter.discover_tests(project.root.clone(), None).await {
            Ok(tests) => discovered.extend(tests),
            Err(err) => {
                warn!(project = %project.name, error = %err, "test discovery failed");
            }
        }
    }

    // A full sweep resolves to every discovered test file.
    let files: Vec<FilePath> = if directive.resolution.run.is_empty() {
        discovered
            .iter()
            .map(|t| t.file_path.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    } else {
        directive.resolution.run.clone()
    };

    let options = ExecuteOptions {
        projects: directive.projects.clone(),
    };

    let mut error = None;
    let streamed = match adapter
        .execute_tests(files.clone(), options, directive.cancel.clone())
        .await
    {
        Ok(results) => results,
        Err(err) => {
            warn!(error = %err, "runner adapter failed; synthesizing failed results");
            error = Some(err.to_string());
            synthesize_failed_results(&files, &err.to_string())
        }
    };

    if directive.cancel.is_cancelled() {
        return RunOutcome::Cancelled;
    }

    let collected = match adapter.collect_results().await {
        Ok(collected) => collected,
        Err(err) => {
            warn!(error = %err, "collect_results failed; using streamed results");
            CollectedRun::default()
        }
    };

    let results = if collected.results.is_empty() {
        streamed
    } else {
        collected.results
    };

    RunOutcome::Completed(CompletedRun {
        discovered,
        results,
        coverage: collected.coverage,
        console_logs: collected.console_logs,
        duration_ms: collected.duration_ms,
        error,
    })
}
