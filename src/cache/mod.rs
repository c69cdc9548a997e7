// src/cache/mod.rs

//! Content-addressable memoization of test-run output.

pub mod result_cache;

pub use result_cache::{CacheStats, CachedTestRun, ResultCache};
