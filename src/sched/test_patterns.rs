use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::errors::Result;
use crate::store::paths::normalize_path;

/// Compiled test-file naming conventions.
#[derive(Debug, Clone)]
pub struct TestFilePatterns {
    set: GlobSet,
}

impl TestFilePatterns {
    pub fn from_globs(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern)?);
        }
        Ok(Self {
            set: builder.build()?,
        })
    }

    /// The conventional defaults (`*.test.*`, `*.spec.*`, `__tests__/`).
    pub fn default_conventions() -> Self {
        let patterns = crate::config::SelectionSection::default().test_patterns;
        Self::from_globs(&patterns).expect("default test patterns are valid")
    }

    /// Whether a path names a test file. The match runs against the
    /// normalized path without its leading slash so `**/`-style patterns
    /// behave the same for root-level and nested files.
    pub fn is_test_file(&self, path: &str) -> bool {
        let normalized = normalize_path(path);
        self.set.is_match(normalized.trim_start_matches('/'))
    }
}
