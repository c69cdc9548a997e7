#![allow(dead_code)]

use testsieve::cache::ResultCache;
use testsieve::engine::{EngineCore, EngineOptions};
use testsieve::exec::ExecutionQueue;
use testsieve::graph::{DepGraph, DiffEngine, EsImportParser, ImportParser};
use testsieve::sched::{RootProjectResolver, Scheduler, TestFilePatterns};
use testsieve::store::SnapshotStore;
use testsieve::types::{ProjectSpec, TestResult, TestStatus};

/// Builder for [`EngineCore`] to simplify test setup.
pub struct EngineCoreBuilder {
    projects: Vec<ProjectSpec>,
    test_patterns: Vec<String>,
    parser: Option<Box<dyn ImportParser>>,
    options: EngineOptions,
}

impl EngineCoreBuilder {
    pub fn new() -> Self {
        Self {
            projects: vec![ProjectSpec {
                name: "app".to_string(),
                root: "/work".to_string(),
            }],
            test_patterns: Vec::new(),
            parser: None,
            options: EngineOptions::default(),
        }
    }

    pub fn with_project(mut self, name: &str, root: &str) -> Self {
        self.projects.push(ProjectSpec {
            name: name.to_string(),
            root: root.to_string(),
        });
        self
    }

    /// Replace the default project table entirely.
    pub fn with_only_project(mut self, name: &str, root: &str) -> Self {
        self.projects = vec![ProjectSpec {
            name: name.to_string(),
            root: root.to_string(),
        }];
        self
    }

    pub fn with_test_pattern(mut self, pattern: &str) -> Self {
        self.test_patterns.push(pattern.to_string());
        self
    }

    pub fn with_parser(mut self, parser: Box<dyn ImportParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn exit_when_idle(mut self, value: bool) -> Self {
        self.options.exit_when_idle = value;
        self
    }

    pub fn build(self) -> EngineCore {
        let patterns = if self.test_patterns.is_empty() {
            TestFilePatterns::default_conventions()
        } else {
            TestFilePatterns::from_globs(&self.test_patterns).expect("valid test patterns")
        };
        let parser = self
            .parser
            .unwrap_or_else(|| Box::new(EsImportParser::new()));
        let resolver = RootProjectResolver::new(self.projects.clone());

        EngineCore::new(
            SnapshotStore::new(),
            DepGraph::new(),
            DiffEngine::new(parser),
            Scheduler::new(patterns, Box::new(resolver)),
            ExecutionQueue::new(),
            ResultCache::new(),
            self.projects,
            self.options,
        )
    }
}

impl Default for EngineCoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A passing result for one synthetic test in `file`.
pub fn passing_result(file: &str) -> TestResult {
    TestResult {
        test_id: format!("{file}::t1"),
        name: format!("{file} passes"),
        file_path: file.to_string(),
        status: TestStatus::Passed,
        duration_ms: 1,
        message: None,
        stack: None,
    }
}

/// A failing result for one synthetic test in `file`.
pub fn failing_result(file: &str) -> TestResult {
    TestResult {
        test_id: format!("{file}::t1"),
        name: format!("{file} fails"),
        file_path: file.to_string(),
        status: TestStatus::Failed,
        duration_ms: 1,
        message: Some("assertion failed".to_string()),
        stack: None,
    }
}
