// src/exec/process_adapter.rs

//! Production runner adapter: shells out to a configured command and speaks
//! NDJSON over its stdout.
//!
//! Line contract (one JSON object per line):
//! - discovery mode: `TestInfo` objects
//! - execute mode: `{"event": "test-started" | "test-result" | "console" |
//!   "coverage", ...}`
//!
//! Cancellation is polled between stdout lines; on cancellation the child is
//! killed and whatever was parsed so far is returned (the engine discards it
//! anyway).

use std::collections::HashMap;
use std::process::Stdio;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::ConfigFile;
use crate::exec::adapter::{
    BoxFuture, CollectedRun, CoverageEdge, ExecuteOptions, LifecycleHooks, RunnerAdapter,
};
use crate::exec::cancel::CancelFlag;
use crate::store::paths::normalize_path;
use crate::types::{FilePath, TestInfo, TestResult};

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
enum RunnerLine {
    TestStarted {
        id: String,
    },
    TestResult {
        #[serde(flatten)]
        result: TestResult,
    },
    Console {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Coverage {
        source: String,
        test_file: String,
    },
}

pub struct ProcessRunnerAdapter {
    default_command: Option<String>,
    /// Per-project command overrides, keyed by project name.
    project_commands: HashMap<String, String>,
    hooks: LifecycleHooks,
    results: Vec<TestResult>,
    coverage: Vec<CoverageEdge>,
    console_logs: Vec<String>,
    started: Option<Instant>,
    duration_ms: u64,
}

impl std::fmt::Debug for ProcessRunnerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessRunnerAdapter")
            .field("default_command", &self.default_command)
            .finish_non_exhaustive()
    }
}

impl ProcessRunnerAdapter {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let project_commands = cfg
            .project
            .iter()
            .filter_map(|(name, p)| p.runner.clone().map(|cmd| (name.clone(), cmd)))
            .collect();
        Self {
            default_command: cfg.runner.command.clone(),
            project_commands,
            hooks: LifecycleHooks::default(),
            results: Vec::new(),
            coverage: Vec::new(),
            console_logs: Vec::new(),
            started: None,
            duration_ms: 0,
        }
    }

    /// Command for a run scoped to the given projects: a single project with
    /// an override wins, otherwise the global command.
    fn command_for(&self, options: &ExecuteOptions) -> Option<String> {
        if let [project] = options.projects.as_slice() {
            if let Some(cmd) = self.project_commands.get(&project.name) {
                return Some(cmd.clone());
            }
        }
        self.default_command.clone()
    }

    fn shell_command(command: &str) -> Command {
        // Platform-appropriate shell wrapper.
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(command);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(command);
            c
        };
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    fn handle_line(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }
        match serde_json::from_str::<RunnerLine>(trimmed) {
            Ok(RunnerLine::TestStarted { id }) => {
                if let Some(hook) = &self.hooks.on_test_started {
                    hook(&id);
                }
            }
            Ok(RunnerLine::TestResult { mut result }) => {
                result.file_path = normalize_path(&result.file_path);
                if let Some(hook) = &self.hooks.on_test_result {
                    hook(&result);
                }
                self.results.push(result);
            }
            Ok(RunnerLine::Console { text }) => {
                if let Some(hook) = &self.hooks.on_console {
                    hook(&text);
                }
                self.console_logs.push(text);
            }
            Ok(RunnerLine::Coverage { source, test_file }) => {
                self.coverage.push(CoverageEdge {
                    source: normalize_path(&source),
                    test_file: normalize_path(&test_file),
                });
            }
            Err(_) => {
                // Non-protocol output from the runner is treated as console noise.
                self.console_logs.push(trimmed.to_string());
            }
        }
    }

    async fn run_execute(
        &mut self,
        test_files: Vec<FilePath>,
        options: ExecuteOptions,
        cancel: CancelFlag,
    ) -> Result<Vec<TestResult>> {
        let command = self
            .command_for(&options)
            .context("no runner command configured")?;

        self.results.clear();
        self.coverage.clear();
        self.console_logs.clear();
        self.started = Some(Instant::now());
        self.duration_ms = 0;

        info!(
            cmd = %command,
            test_files = test_files.len(),
            "starting runner process"
        );

        let roots: Vec<String> = options.projects.iter().map(|p| p.root.clone()).collect();
        let mut cmd = Self::shell_command(&command);
        cmd.env("TESTSIEVE_MODE", "execute")
            .env("TESTSIEVE_TEST_FILES", test_files.join("\n"))
            .env("TESTSIEVE_PROJECT_ROOTS", roots.join("\n"));

        let mut child = cmd.spawn().context("spawning runner process")?;

        let stdout = child.stdout.take().context("runner stdout unavailable")?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("runner stderr: {}", line);
                }
            });
        }

        let mut lines = BufReader::new(stdout).lines();
        let mut poll = tokio::time::interval(CANCEL_POLL_INTERVAL);
        let mut cancelled = false;

        loop {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => self.handle_line(&line),
                    Ok(None) => break,
                    Err(err) => {
                        warn!(error = %err, "error reading runner stdout");
                        break;
                    }
                },
                _ = poll.tick() => {
                    if cancel.is_cancelled() {
                        info!("cancellation requested; killing runner process");
                        if let Err(err) = child.kill().await {
                            warn!(error = %err, "failed to kill runner process");
                        }
                        cancelled = true;
                        break;
                    }
                }
            }
        }

        self.duration_ms = self
            .started
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);

        if cancelled {
            return Ok(std::mem::take(&mut self.results));
        }

        let status = child.wait().await.context("waiting for runner process")?;
        debug!(
            exit_code = status.code().unwrap_or(-1),
            results = self.results.len(),
            "runner process exited"
        );

        // A nonzero exit with parsed results just means tests failed; a
        // nonzero exit with nothing parsed means the runner itself broke.
        if !status.success() && self.results.is_empty() {
            anyhow::bail!(
                "runner exited with status {} and produced no results",
                status.code().unwrap_or(-1)
            );
        }

        Ok(self.results.clone())
    }

    async fn run_discover(&mut self, project_root: String) -> Result<Vec<TestInfo>> {
        let command = self
            .default_command
            .clone()
            .context("no runner command configured")?;

        let mut cmd = Self::shell_command(&command);
        cmd.env("TESTSIEVE_MODE", "discover")
            .env("TESTSIEVE_PROJECT_ROOT", &project_root);

        let output = cmd.output().await.context("running discovery")?;
        if !output.status.success() {
            anyhow::bail!(
                "discovery exited with status {}",
                output.status.code().unwrap_or(-1)
            );
        }

        let mut tests = Vec::new();
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<TestInfo>(trimmed) {
                Ok(mut info) => {
                    info.file_path = normalize_path(&info.file_path);
                    tests.push(info);
                }
                Err(err) => {
                    debug!(error = %err, "skipping non-discovery output line");
                }
            }
        }
        Ok(tests)
    }
}

impl RunnerAdapter for ProcessRunnerAdapter {
    fn discover_tests(
        &mut self,
        project_root: String,
        _config_path: Option<String>,
    ) -> BoxFuture<'_, Result<Vec<TestInfo>>> {
        Box::pin(self.run_discover(project_root))
    }

    fn execute_tests(
        &mut self,
        test_files: Vec<FilePath>,
        options: ExecuteOptions,
        cancel: CancelFlag,
    ) -> BoxFuture<'_, Result<Vec<TestResult>>> {
        Box::pin(self.run_execute(test_files, options, cancel))
    }

    fn hook_into_lifecycle(&mut self, hooks: LifecycleHooks) {
        self.hooks = hooks;
    }

    fn collect_results(&mut self) -> BoxFuture<'_, Result<CollectedRun>> {
        Box::pin(async move {
            Ok(CollectedRun {
                results: std::mem::take(&mut self.results),
                coverage: std::mem::take(&mut self.coverage),
                console_logs: std::mem::take(&mut self.console_logs),
                duration_ms: self.duration_ms,
            })
        })
    }

    fn dispose(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async { Ok(()) })
    }
}
