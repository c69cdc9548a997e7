//! Deterministic collaborator fakes for tests.

use std::collections::HashMap;

use anyhow::bail;

use testsieve::graph::ImportParser;
use testsieve::store::normalize_path;

/// Import parser answering from a fixed `path -> specifiers` table.
#[derive(Debug, Default)]
pub struct MapImportParser {
    imports: HashMap<String, Vec<String>>,
}

impl MapImportParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_imports(mut self, path: &str, specifiers: &[&str]) -> Self {
        self.imports.insert(
            normalize_path(path),
            specifiers.iter().map(|s| s.to_string()).collect(),
        );
        self
    }
}

impl ImportParser for MapImportParser {
    fn parse_imports(&self, path: &str, _content: &str) -> anyhow::Result<Vec<String>> {
        Ok(self
            .imports
            .get(&normalize_path(path))
            .cloned()
            .unwrap_or_default())
    }
}

/// Import parser that always fails, for exercising the parse-failure path.
#[derive(Debug, Default)]
pub struct FailingImportParser;

impl ImportParser for FailingImportParser {
    fn parse_imports(&self, path: &str, _content: &str) -> anyhow::Result<Vec<String>> {
        bail!("synthetic parse failure for {path}")
    }
}
