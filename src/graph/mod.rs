// src/graph/mod.rs

//! File dependency graph and incremental diffing.
//!
//! - [`dep_graph`] holds the bidirectional adjacency between files with edge
//!   provenance (statically parsed vs. observed at runtime).
//! - [`diff_engine`] reacts to batches of changed paths, invalidating and
//!   re-seeding the static edges that touch each changed file.
//! - [`imports`] defines the import-resolution collaborator seam and a
//!   regex-based default implementation.

pub mod dep_graph;
pub mod diff_engine;
pub mod imports;

pub use dep_graph::{DepGraph, EdgeKind};
pub use diff_engine::DiffEngine;
pub use imports::{EsImportParser, ImportParser};
