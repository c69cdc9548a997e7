// src/cli.rs

use clap::{Parser, ValueEnum};

/// Incremental test selection and execution engine.
///
/// Watches a workspace, computes the blast radius of each change through a
/// file dependency graph, and runs exactly the affected test files, replaying
/// cached results when nothing relevant changed.
#[derive(Parser, Debug, Clone)]
#[command(name = "testsieve", version)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(long, default_value = "Testsieve.toml")]
    pub config: String,

    /// Log level override (else `TESTSIEVE_LOG`, else `info`).
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Scan, run one full sweep, and exit when idle instead of watching.
    #[arg(long)]
    pub once: bool,

    /// Print the effective configuration and exit without running anything.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}
