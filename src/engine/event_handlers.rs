// src/engine/event_handlers.rs

//! Event handling logic for the engine core.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::time::SystemTime;

use tracing::{debug, info, trace, warn};

use crate::bus::protocol::{
    EngineStatus, FileChangedAckPayload, OutboundEvent, RunCompletePayload, RunCompletionStatus,
    RunResolvedPayload, RunStartedPayload, TestResultPayload, TestsDiscoveredPayload,
};
use crate::cache::CachedTestRun;
use crate::engine::core::EngineCore;
use crate::engine::{CompletedRun, FileInput, RunOutcome};
use crate::exec::backend::RunDirective;
use crate::store::SnapshotSource;
use crate::store::paths::normalize_path;
use crate::types::{
    CollectedSummary, FilePath, RunId, RunResolution, TestInfo, TestResult, TestRunRequest,
};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug)]
pub enum CoreCommand {
    /// Hand this run to the executor backend.
    StartRun(RunDirective),
    /// Broadcast this event through the bus.
    Publish(OutboundEvent),
    /// Request that the process exits (used for `--once` when idle).
    RequestExit,
}

/// Decision returned by the core after handling a single [`EngineEvent`].
#[derive(Debug)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Seed store and graph from an initial workspace scan.
///
/// Unlike a live change batch, a scan schedules nothing: it rebuilds the
/// in-memory state the process starts without.
pub fn handle_scan(core: &mut EngineCore, changes: Vec<FileInput>) -> CoreStep {
    let mut commands = vec![CoreCommand::Publish(OutboundEvent::EngineStatus {
        status: EngineStatus::Scanning,
    })];

    let mut touched: Vec<FilePath> = Vec::new();
    for change in changes {
        if let Some(content) = change.content {
            let path = normalize_path(&change.path);
            core.store.write_from_disk(&path, content);
            touched.push(path);
        }
    }
    core.diff.apply_batch(&core.store, &mut core.graph, &touched);
    info!(
        files = touched.len(),
        edges = core.graph.edge_count(),
        "workspace scan ingested"
    );

    commands.push(CoreCommand::Publish(OutboundEvent::EngineStatus {
        status: EngineStatus::Idle,
    }));
    CoreStep::running(commands)
}

/// Handle a batch of changed files from disk or a single buffer update.
///
/// Writes that turn out to be no-ops (same content, same source) are filtered
/// here by the store's idempotent-write rule and cause no recomputation.
pub fn handle_change_batch(
    core: &mut EngineCore,
    changes: Vec<FileInput>,
    source: SnapshotSource,
) -> CoreStep {
    let mut commands = Vec::new();
    let mut touched: Vec<FilePath> = Vec::new();

    for change in changes {
        let path = normalize_path(&change.path);
        match change.content {
            None => {
                if core.store.remove(&path) {
                    touched.push(path);
                }
            }
            Some(content) => {
                let prior_version = core.store.get(&path).map(|s| s.version);
                let snapshot = match source {
                    SnapshotSource::Disk => core.store.write_from_disk(&path, content),
                    SnapshotSource::Buffer => core.store.write_from_buffer(&path, content),
                };
                let version = snapshot.version;
                if source == SnapshotSource::Buffer {
                    commands.push(CoreCommand::Publish(OutboundEvent::FileChangedAck(
                        FileChangedAckPayload {
                            path: path.clone(),
                            version,
                        },
                    )));
                }
                if prior_version != Some(version) {
                    touched.push(path);
                }
            }
        }
    }

    if touched.is_empty() {
        trace!("change batch was a no-op");
        return CoreStep::running(commands);
    }

    let mut follow = recompute_and_schedule(core, &touched);
    commands.append(&mut follow);
    CoreStep::running(commands)
}

/// The editor dropped its unsaved buffer for a path.
pub fn handle_buffer_closed(core: &mut EngineCore, path: String) -> CoreStep {
    let path = normalize_path(&path);
    let prior_version = core.store.get(&path).map(|s| s.version);
    let restored = core.store.clear_buffer(&path);
    let version = restored.as_ref().map(|s| s.version);

    if prior_version == version {
        // No overlay was active; nothing changed.
        return CoreStep::running(Vec::new());
    }

    let mut commands = Vec::new();
    if let Some(snapshot) = &restored {
        commands.push(CoreCommand::Publish(OutboundEvent::FileChangedAck(
            FileChangedAckPayload {
                path: path.clone(),
                version: snapshot.version,
            },
        )));
    }

    let mut follow = recompute_and_schedule(core, &[path]);
    commands.append(&mut follow);
    CoreStep::running(commands)
}

/// Explicit full-sweep request from an observer.
pub fn handle_run_requested(core: &mut EngineCore, projects: Vec<String>) -> CoreStep {
    let mut commands = Vec::new();

    let selected: BTreeSet<String> = if projects.is_empty() {
        core.projects.iter().map(|p| p.name.clone()).collect()
    } else {
        projects
            .into_iter()
            .filter(|name| {
                let known = core.projects.iter().any(|p| &p.name == name);
                if !known {
                    warn!(project = %name, "run requested for unknown project; ignoring");
                }
                known
            })
            .collect()
    };

    if selected.is_empty() {
        warn!("run request matched no configured projects");
        return CoreStep::running(commands);
    }

    let request = core.scheduler.full_sweep(selected);
    schedule_request(core, request, &mut commands);
    CoreStep::running(commands)
}

/// Cancel the active run and discard everything queued.
pub fn handle_cancel(core: &mut EngineCore) -> CoreStep {
    let discarded = core.queue.cancel_all();
    debug!(discarded, "cancellation requested");
    CoreStep::running(Vec::new())
}

/// The executor finished a dispatched run.
pub fn handle_run_finished(core: &mut EngineCore, run_id: RunId, outcome: RunOutcome) -> CoreStep {
    let mut commands = Vec::new();

    let Some(active) = core.queue.finish(run_id) else {
        // Completion from a superseded run; its results are not authoritative.
        return CoreStep::running(commands);
    };

    match outcome {
        RunOutcome::Cancelled => {
            debug!(run_id, "run cancelled; discarding partial results");
            commands.push(CoreCommand::Publish(OutboundEvent::RunComplete(
                RunCompletePayload {
                    run_id,
                    status: RunCompletionStatus::Cancelled,
                    summary: None,
                    error: None,
                },
            )));
        }
        RunOutcome::Completed(run) => {
            for edge in &run.coverage {
                core.diff
                    .observe_runtime_edge(&mut core.graph, &edge.source, &edge.test_file);
            }

            if !run.discovered.is_empty() {
                commands.push(CoreCommand::Publish(OutboundEvent::TestsDiscovered(
                    TestsDiscoveredPayload {
                        run_id,
                        tests: run.discovered.clone(),
                    },
                )));
            }

            // Adapter failures produce synthetic results; memoizing those
            // would replay the failure after the adapter recovers.
            if run.error.is_none() {
                cache_results(core, &active.resolution, &run);
            }

            let summary = CollectedSummary::from_results(&run.results, run.duration_ms);
            let status = if run.error.is_some() {
                RunCompletionStatus::Error
            } else if summary.failed > 0 {
                RunCompletionStatus::Failed
            } else {
                RunCompletionStatus::Passed
            };
            info!(run_id, status = ?status, passed = summary.passed, failed = summary.failed, "run complete");
            commands.push(CoreCommand::Publish(OutboundEvent::RunComplete(
                RunCompletePayload {
                    run_id,
                    status,
                    summary: Some(summary),
                    error: run.error,
                },
            )));
        }
    }

    // Drain loop: immediately start the next queued request, if any.
    try_dispatch(core, &mut commands);

    if !core.queue.is_busy() {
        commands.push(CoreCommand::Publish(OutboundEvent::EngineStatus {
            status: EngineStatus::Idle,
        }));
    }

    let mut keep_running = true;
    if core.options.exit_when_idle && !core.queue.is_busy() && core.pending_runs() == 0 {
        keep_running = false;
        commands.push(CoreCommand::RequestExit);
    }

    CoreStep {
        commands,
        keep_running,
    }
}

/// Shared tail of every mutation path: re-diff the graph for the touched
/// paths, plan the affected test files, and schedule the resulting request.
fn recompute_and_schedule(core: &mut EngineCore, touched: &[FilePath]) -> Vec<CoreCommand> {
    let mut commands = Vec::new();
    core.diff.apply_batch(&core.store, &mut core.graph, touched);

    if let Some(request) = core.scheduler.plan(&core.store, &core.graph, touched) {
        schedule_request(core, request, &mut commands);
    }
    commands
}

/// Partition a request's test files into cache replays and real work, publish
/// the resolution, and enqueue whatever must actually run.
fn schedule_request(
    core: &mut EngineCore,
    request: TestRunRequest,
    commands: &mut Vec<CoreCommand>,
) {
    let mut run: Vec<FilePath> = Vec::new();
    let mut replayed: Vec<FilePath> = Vec::new();

    for file in &request.test_files {
        let live_hash = core.store.get(file).map(|s| s.hash.clone());
        match core.cache.lookup(file, live_hash.as_deref()) {
            Some(entry) => {
                let results = entry.results.clone();
                debug!(path = %file, results = results.len(), "replaying cached results");
                for result in results {
                    commands.push(CoreCommand::Publish(OutboundEvent::TestResult(
                        TestResultPayload {
                            run_id: None,
                            replayed: true,
                            result,
                        },
                    )));
                }
                replayed.push(file.clone());
            }
            None => run.push(file.clone()),
        }
    }

    let full_sweep = request.is_full_sweep();
    let resolution = RunResolution {
        run: run.clone(),
        replayed: replayed.clone(),
        projects: request.projects.iter().cloned().collect(),
    };
    commands.push(CoreCommand::Publish(OutboundEvent::RunResolved(
        RunResolvedPayload {
            run: run.clone(),
            replayed,
            projects: resolution.projects.clone(),
            full_sweep,
        },
    )));

    if run.is_empty() && !full_sweep {
        debug!("every affected test file replayed from cache; nothing to run");
        return;
    }

    let mut request = request;
    request.test_files = run.into_iter().collect();
    core.queue.enqueue(request, resolution);
    try_dispatch(core, commands);
}

/// Start the head of the queue unless a run is already in flight.
fn try_dispatch(core: &mut EngineCore, commands: &mut Vec<CoreCommand>) {
    let Some((run_id, request, resolution, cancel)) = core.queue.try_dispatch() else {
        return;
    };

    commands.push(CoreCommand::Publish(OutboundEvent::EngineStatus {
        status: EngineStatus::Running,
    }));
    commands.push(CoreCommand::Publish(OutboundEvent::RunStarted(
        RunStartedPayload {
            run_id,
            test_files: request.test_files.iter().cloned().collect(),
            projects: request.projects.iter().cloned().collect(),
            priority: request.priority,
        },
    )));

    let projects = core.project_specs_for(&request.projects);
    commands.push(CoreCommand::StartRun(RunDirective {
        run_id,
        request,
        resolution,
        projects,
        cancel,
    }));
}

/// Memoize a finished run's results, sliced per test file and keyed by each
/// file's current content hash.
fn cache_results(core: &mut EngineCore, resolution: &RunResolution, run: &CompletedRun) {
    let mut by_file: BTreeMap<FilePath, Vec<TestResult>> = BTreeMap::new();
    for result in &run.results {
        by_file
            .entry(result.file_path.clone())
            .or_default()
            .push(result.clone());
    }

    for (file, results) in by_file {
        let Some(snapshot) = core.store.get(&file) else {
            // The file vanished mid-run; nothing to key the entry on.
            continue;
        };
        let duration_ms = results.iter().map(|r| r.duration_ms).sum();
        let discovered_tests: Vec<TestInfo> = run
            .discovered
            .iter()
            .filter(|t| t.file_path == file)
            .cloned()
            .collect();
        let collected_summary = CollectedSummary::from_results(&results, duration_ms);
        core.cache.store(CachedTestRun {
            content_hash: snapshot.hash.clone(),
            file_path: file,
            cached_at: SystemTime::now(),
            resolution: resolution.clone(),
            discovered_tests,
            results,
            collected_summary,
            console_logs: run.console_logs.clone(),
        });
    }
}
