// src/watch/mod.rs

//! File watching and change intake.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Debouncing rapid successive events into one batch per quiet period.
//! - Reading changed file contents off the engine thread, so the core only
//!   ever sees ready-made [`crate::engine::FileInput`] batches.
//! - The initial workspace scan that rebuilds all in-memory state on start.
//!
//! It does **not** know about the dependency graph or test selection; the
//! batching policy lives entirely on this side of the channel.

pub mod debounce;
pub mod filter;
pub mod path_utils;
pub mod scan;
pub mod watcher;

pub use debounce::spawn_debouncer;
pub use filter::WatchFilter;
pub use scan::initial_scan;
pub use watcher::{WatcherHandle, spawn_watcher};
