// src/engine/core.rs

//! Pure core state machine.
//!
//! This module contains a synchronous, deterministic core that consumes
//! [`EngineEvent`]s and produces:
//! - updated core state (store, graph, queue, cache)
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for
//! reading events from channels, handing runs to the executor backend, and
//! fanning published events out through the bus.
//!
//! The core has no channels and no Tokio types, so it can be unit tested
//! without any async machinery. All state is owned here and threaded in at
//! construction; nothing is looked up ambiently.

use crate::cache::ResultCache;
use crate::engine::event_handlers::{
    CoreStep, handle_buffer_closed, handle_cancel, handle_change_batch, handle_run_finished,
    handle_run_requested, handle_scan,
};
use crate::engine::{EngineEvent, EngineOptions};
use crate::exec::queue::ExecutionQueue;
use crate::graph::{DepGraph, DiffEngine};
use crate::sched::Scheduler;
use crate::store::{SnapshotSource, SnapshotStore};
use crate::types::ProjectSpec;

#[derive(Debug)]
pub struct EngineCore {
    pub(crate) store: SnapshotStore,
    pub(crate) graph: DepGraph,
    pub(crate) diff: DiffEngine,
    pub(crate) scheduler: Scheduler,
    pub(crate) queue: ExecutionQueue,
    pub(crate) cache: ResultCache,
    pub(crate) projects: Vec<ProjectSpec>,
    pub(crate) options: EngineOptions,
}

impl EngineCore {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: SnapshotStore,
        graph: DepGraph,
        diff: DiffEngine,
        scheduler: Scheduler,
        queue: ExecutionQueue,
        cache: ResultCache,
        projects: Vec<ProjectSpec>,
        options: EngineOptions,
    ) -> Self {
        Self {
            store,
            graph,
            diff,
            scheduler,
            queue,
            cache,
            projects,
            options,
        }
    }

    /// Handle a single engine event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: EngineEvent) -> CoreStep {
        match event {
            EngineEvent::WorkspaceScanned { changes } => handle_scan(self, changes),
            EngineEvent::FilesChanged { changes } => {
                handle_change_batch(self, changes, SnapshotSource::Disk)
            }
            EngineEvent::BufferUpdated { path, content } => handle_change_batch(
                self,
                vec![crate::engine::FileInput {
                    path,
                    content: Some(content),
                }],
                SnapshotSource::Buffer,
            ),
            EngineEvent::BufferClosed { path } => handle_buffer_closed(self, path),
            EngineEvent::RunRequested { projects } => handle_run_requested(self, projects),
            EngineEvent::CancelRequested => handle_cancel(self),
            EngineEvent::RunFinished { run_id, outcome } => {
                handle_run_finished(self, run_id, outcome)
            }
            EngineEvent::ShutdownRequested => {
                self.queue.cancel_all();
                CoreStep {
                    commands: Vec::new(),
                    keep_running: false,
                }
            }
        }
    }

    /// Projects matching the given names; an empty set means all of them.
    pub(crate) fn project_specs_for(
        &self,
        names: &std::collections::BTreeSet<String>,
    ) -> Vec<ProjectSpec> {
        if names.is_empty() {
            return self.projects.clone();
        }
        self.projects
            .iter()
            .filter(|p| names.contains(&p.name))
            .cloned()
            .collect()
    }

    // Read-only views, mainly for tests and diagnostics.

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn graph(&self) -> &DepGraph {
        &self.graph
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn is_busy(&self) -> bool {
        self.queue.is_busy()
    }

    pub fn pending_runs(&self) -> usize {
        self.queue.pending_len()
    }
}
