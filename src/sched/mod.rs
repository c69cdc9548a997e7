// src/sched/mod.rs

//! Test selection: from a batch of changed paths to a prioritized run request.
//!
//! - [`test_patterns`] recognises test files by naming convention.
//! - [`project`] resolves a path to its owning project (collaborator seam).
//! - [`scheduler`] walks the dependency graph for the blast radius of a batch
//!   and emits a single [`crate::types::TestRunRequest`] covering it.

pub mod project;
pub mod scheduler;
pub mod test_patterns;

pub use project::{ProjectResolver, RootProjectResolver};
pub use scheduler::{BASE_PRIORITY, BUFFER_EDIT_BONUS, Scheduler};
pub use test_patterns::TestFilePatterns;
