// src/config/validate.rs

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile, RunnerKind};
use crate::errors::{EngineError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = EngineError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_projects(cfg)?;
    validate_engine_section(cfg)?;
    validate_patterns(cfg)?;
    validate_runner(cfg)?;
    Ok(())
}

fn ensure_has_projects(cfg: &RawConfigFile) -> Result<()> {
    if cfg.project.is_empty() {
        return Err(EngineError::ConfigError(
            "config must contain at least one [project.<name>] section".to_string(),
        ));
    }
    for (name, project) in cfg.project.iter() {
        if project.root.trim().is_empty() {
            return Err(EngineError::ConfigError(format!(
                "project '{}' has an empty root",
                name
            )));
        }
    }
    Ok(())
}

fn validate_engine_section(cfg: &RawConfigFile) -> Result<()> {
    let ms = cfg.engine.debounce_ms;
    if !(10..=5_000).contains(&ms) {
        return Err(EngineError::ConfigError(format!(
            "[engine].debounce_ms must be between 10 and 5000 (got {ms})"
        )));
    }
    Ok(())
}

fn validate_patterns(cfg: &RawConfigFile) -> Result<()> {
    let all = cfg
        .selection
        .test_patterns
        .iter()
        .chain(cfg.watch.include.iter())
        .chain(cfg.watch.exclude.iter());

    for pattern in all {
        Glob::new(pattern).map_err(|err| {
            EngineError::ConfigError(format!("invalid glob pattern '{pattern}': {err}"))
        })?;
    }

    if cfg.selection.test_patterns.is_empty() {
        return Err(EngineError::ConfigError(
            "[selection].test_patterns must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_runner(cfg: &RawConfigFile) -> Result<()> {
    if cfg.runner.kind == RunnerKind::Process {
        let missing_global = cfg
            .runner
            .command
            .as_deref()
            .map(str::trim)
            .is_none_or(str::is_empty);
        // A global command may be omitted if every project overrides it.
        let all_projects_covered = cfg
            .project
            .values()
            .all(|p| p.runner.as_deref().map(str::trim).is_some_and(|c| !c.is_empty()));
        if missing_global && !all_projects_covered {
            return Err(EngineError::ConfigError(
                "[runner].command is required for kind = \"process\" unless every project sets `runner`"
                    .to_string(),
            ));
        }
    }
    Ok(())
}
