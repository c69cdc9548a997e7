// src/config/mod.rs

//! Configuration loading and validation.
//!
//! - [`model`] holds the serde model (`RawConfigFile`) and the checked
//!   [`ConfigFile`] the rest of the engine consumes.
//! - [`loader`] reads TOML from disk.
//! - [`validate`] turns a raw config into a checked one.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    ConfigFile, EngineSection, ProjectConfig, RawConfigFile, RunnerKind, RunnerSection,
    SelectionSection, WatchSection,
};
