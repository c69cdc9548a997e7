// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// `[engine]` section: timing knobs for the intake side.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Quiet period before a batch of file events is flushed to the engine.
    pub debounce_ms: u64,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self { debounce_ms: 150 }
    }
}

/// `[selection]` section: how test files are recognised.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectionSection {
    /// Glob patterns naming test files, evaluated against normalized paths.
    pub test_patterns: Vec<String>,
}

impl Default for SelectionSection {
    fn default() -> Self {
        Self {
            test_patterns: vec![
                "**/*.test.*".to_string(),
                "**/*.spec.*".to_string(),
                "**/__tests__/**".to_string(),
            ],
        }
    }
}

/// `[watch]` section: which files the watcher and initial scan consider.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchSection {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            include: vec!["**/*".to_string()],
            exclude: vec![
                "**/node_modules/**".to_string(),
                "**/.git/**".to_string(),
                "**/dist/**".to_string(),
                "**/target/**".to_string(),
            ],
        }
    }
}

/// Which runner adapter implementation to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunnerKind {
    /// Shell out to `command` and speak NDJSON over its stdout.
    #[default]
    Process,
    /// Discover and run nothing. Useful for protocol-only sessions.
    Null,
}

/// `[runner]` section: the external test-runner adapter.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RunnerSection {
    pub kind: RunnerKind,
    /// Shell command for the `process` kind.
    pub command: Option<String>,
}

/// One `[project.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Root directory, relative to the config file's directory.
    pub root: String,
    /// Per-project runner command override.
    #[serde(default)]
    pub runner: Option<String>,
}

/// Raw deserialized configuration, prior to validation.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawConfigFile {
    pub engine: EngineSection,
    pub selection: SelectionSection,
    pub watch: WatchSection,
    pub runner: RunnerSection,
    pub project: BTreeMap<String, ProjectConfig>,
}

/// A validated configuration.
///
/// Constructed only through `TryFrom<RawConfigFile>` (see
/// [`crate::config::validate`]); holding one is proof that patterns compile,
/// projects are sane, and the runner section is usable.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub engine: EngineSection,
    pub selection: SelectionSection,
    pub watch: WatchSection,
    pub runner: RunnerSection,
    pub project: BTreeMap<String, ProjectConfig>,
}

impl ConfigFile {
    /// Construct without validation. Only `validate` should call this.
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            engine: raw.engine,
            selection: raw.selection,
            watch: raw.watch,
            runner: raw.runner,
            project: raw.project,
        }
    }
}
