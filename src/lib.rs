// src/lib.rs

pub mod bus;
pub mod cache;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod graph;
pub mod logging;
pub mod sched;
pub mod store;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::debug;

use crate::bus::{EventBus, InboundRegistry};
use crate::cache::ResultCache;
use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::{ConfigFile, RunnerKind};
use crate::engine::{EngineCore, EngineEvent, EngineOptions, RunProgress, Runtime};
use crate::exec::{
    ExecutionQueue, NullRunnerAdapter, ProcessExecutorBackend, ProcessRunnerAdapter, RunnerAdapter,
};
use crate::graph::{DepGraph, DiffEngine, EsImportParser};
use crate::sched::{RootProjectResolver, Scheduler, TestFilePatterns};
use crate::store::paths::normalize_path;
use crate::store::SnapshotStore;
use crate::types::ProjectSpec;
use crate::watch::{WatchFilter, initial_scan, spawn_watcher};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the engine core (store, graph, scheduler, queue, cache)
/// - the executor and runner adapter
/// - the stdio protocol connection
/// - (optional) file watcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let workspace_root = config_root_dir(&config_path);
    let projects = project_specs(&cfg, &workspace_root);

    // Core pieces: constructed once here, threaded through constructors.
    let patterns = TestFilePatterns::from_globs(&cfg.selection.test_patterns)?;
    let resolver = RootProjectResolver::new(projects.clone());
    let core = EngineCore::new(
        SnapshotStore::new(),
        DepGraph::new(),
        DiffEngine::new(Box::new(EsImportParser::new())),
        Scheduler::new(patterns, Box::new(resolver)),
        ExecutionQueue::new(),
        ResultCache::new(),
        projects,
        EngineOptions {
            exit_when_idle: args.once,
        },
    );

    // Engine event channel and the streamed-progress side channel.
    let (engine_tx, engine_rx) = mpsc::channel::<EngineEvent>(64);
    let (progress_tx, progress_rx) = mpsc::unbounded_channel::<RunProgress>();

    let adapter = build_adapter(&cfg);
    let executor = ProcessExecutorBackend::new(engine_tx.clone(), progress_tx, adapter);

    // Protocol connection: subscribe before anything publishes so the
    // observer sees the full state stream from the beginning.
    let mut bus = EventBus::new();
    let protocol_rx = bus.subscribe();
    bus::stdio::spawn_protocol(protocol_rx, InboundRegistry::engine_defaults(), engine_tx.clone());

    // Initial scan: all core state is in-memory and rebuilt fresh.
    let filter = WatchFilter::from_section(&cfg.watch)?;
    let scanned = initial_scan(&workspace_root, &filter)?;
    engine_tx
        .send(EngineEvent::WorkspaceScanned { changes: scanned })
        .await?;

    // Optional file watcher (disabled in --once mode).
    let _watcher_handle = if !args.once {
        Some(spawn_watcher(
            workspace_root.clone(),
            filter,
            Duration::from_millis(cfg.engine.debounce_ms),
            engine_tx.clone(),
        )?)
    } else {
        None
    };

    if args.once {
        // One full sweep across every configured project, then exit when idle.
        engine_tx
            .send(EngineEvent::RunRequested {
                projects: Vec::new(),
            })
            .await?;
    }

    // Ctrl-C -> graceful shutdown.
    {
        let tx = engine_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(EngineEvent::ShutdownRequested).await;
        });
    }

    let runtime = Runtime::new(core, bus, engine_rx, progress_rx, executor);
    runtime.run().await.map_err(Into::into)
}

/// Figure out a sensible workspace root for scanning and watching.
///
/// - If the config path has a non-empty parent (e.g. "configs/Testsieve.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Testsieve.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Normalize configured project roots against the workspace root.
fn project_specs(cfg: &ConfigFile, workspace_root: &Path) -> Vec<ProjectSpec> {
    cfg.project
        .iter()
        .map(|(name, project)| ProjectSpec {
            name: name.clone(),
            root: normalize_path(&workspace_root.join(&project.root).to_string_lossy()),
        })
        .collect()
}

fn build_adapter(cfg: &ConfigFile) -> Box<dyn RunnerAdapter> {
    match cfg.runner.kind {
        RunnerKind::Process => Box::new(ProcessRunnerAdapter::from_config(cfg)),
        RunnerKind::Null => Box::new(NullRunnerAdapter),
    }
}

/// Simple dry-run output: print selection patterns, projects and runner.
fn print_dry_run(cfg: &ConfigFile) {
    println!("testsieve dry-run");
    println!("  engine.debounce_ms = {}", cfg.engine.debounce_ms);
    println!("  runner.kind = {:?}", cfg.runner.kind);
    if let Some(ref command) = cfg.runner.command {
        println!("  runner.command = {command}");
    }
    println!();

    println!("test patterns ({}):", cfg.selection.test_patterns.len());
    for pattern in &cfg.selection.test_patterns {
        println!("  - {pattern}");
    }
    println!();

    println!("projects ({}):", cfg.project.len());
    for (name, project) in cfg.project.iter() {
        println!("  - {name}");
        println!("      root: {}", project.root);
        if let Some(ref runner) = project.runner {
            println!("      runner: {runner}");
        }
    }

    debug!("dry-run complete (no execution)");
}
