// tests/diff_engine.rs

mod common;
use crate::common::fakes::{FailingImportParser, MapImportParser};

use anyhow::bail;

use testsieve::graph::{DepGraph, DiffEngine, EdgeKind, EsImportParser, ImportParser};
use testsieve::store::SnapshotStore;

fn seeded_store() -> SnapshotStore {
    let mut store = SnapshotStore::new();
    store.write_from_disk("/work/util.ts", "export const x = 1;");
    store.write_from_disk(
        "/work/util.test.ts",
        "import { x } from './util';\ntest('x', () => {});",
    );
    store
}

#[test]
fn reseeds_static_edges_from_parsed_imports() {
    let store = seeded_store();
    let mut graph = DepGraph::new();
    let diff = DiffEngine::new(Box::new(EsImportParser::new()));

    diff.apply_batch(
        &store,
        &mut graph,
        &["/work/util.ts".to_string(), "/work/util.test.ts".to_string()],
    );

    // util.test.ts depends on util.ts, with extension probing.
    assert_eq!(
        graph.edge_type("/work/util.ts", "/work/util.test.ts"),
        Some(EdgeKind::Static)
    );
    assert!(graph.affected_by("/work/util.ts").contains("/work/util.test.ts"));
}

#[test]
fn non_relative_imports_seed_no_edges() {
    let mut store = SnapshotStore::new();
    store.write_from_disk("/work/a.ts", "import react from 'react';");
    let mut graph = DepGraph::new();
    let diff = DiffEngine::new(Box::new(EsImportParser::new()));

    diff.apply_batch(&store, &mut graph, &["/work/a.ts".to_string()]);

    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn absent_files_are_dropped_from_the_graph() {
    let mut store = seeded_store();
    let mut graph = DepGraph::new();
    let diff = DiffEngine::new(Box::new(EsImportParser::new()));
    diff.apply_batch(
        &store,
        &mut graph,
        &["/work/util.ts".to_string(), "/work/util.test.ts".to_string()],
    );

    store.remove("/work/util.ts");
    diff.apply_batch(&store, &mut graph, &["/work/util.ts".to_string()]);

    assert!(!graph.contains("/work/util.ts"));
    assert_eq!(graph.edge_type("/work/util.ts", "/work/util.test.ts"), None);
}

#[test]
fn parse_failure_yields_zero_edges_and_the_batch_continues() {
    /// Fails only for one specific path.
    struct SelectiveParser;
    impl ImportParser for SelectiveParser {
        fn parse_imports(&self, path: &str, _content: &str) -> anyhow::Result<Vec<String>> {
            if path.ends_with("broken.ts") {
                bail!("unexpected token");
            }
            Ok(vec!["./util".to_string()])
        }
    }

    let mut store = seeded_store();
    store.write_from_disk("/work/broken.ts", "not parseable");
    let mut graph = DepGraph::new();
    let diff = DiffEngine::new(Box::new(SelectiveParser));

    diff.apply_batch(
        &store,
        &mut graph,
        &["/work/broken.ts".to_string(), "/work/util.test.ts".to_string()],
    );

    // The broken file produced nothing, the healthy one still got its edge.
    assert!(graph.dependencies_of("/work/broken.ts").is_empty());
    assert_eq!(
        graph.edge_type("/work/util.ts", "/work/util.test.ts"),
        Some(EdgeKind::Static)
    );
}

#[test]
fn total_parse_failure_is_contained() {
    let store = seeded_store();
    let mut graph = DepGraph::new();
    let diff = DiffEngine::new(Box::new(FailingImportParser));

    diff.apply_batch(
        &store,
        &mut graph,
        &["/work/util.ts".to_string(), "/work/util.test.ts".to_string()],
    );

    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn runtime_edges_are_lost_on_rescan_until_reconfirmed() {
    let store = seeded_store();
    let mut graph = DepGraph::new();
    // The map parser reports no imports, so rescans only clear.
    let diff = DiffEngine::new(Box::new(MapImportParser::new()));

    diff.observe_runtime_edge(&mut graph, "/work/util.ts", "/work/util.test.ts");
    assert_eq!(
        graph.edge_type("/work/util.ts", "/work/util.test.ts"),
        Some(EdgeKind::Runtime)
    );

    // A change to util.test.ts clears ALL incoming edges, runtime included.
    diff.apply_batch(&store, &mut graph, &["/work/util.test.ts".to_string()]);
    assert_eq!(graph.edge_type("/work/util.ts", "/work/util.test.ts"), None);

    // A later coverage-producing run brings it back.
    diff.observe_runtime_edge(&mut graph, "/work/util.ts", "/work/util.test.ts");
    assert_eq!(
        graph.edge_type("/work/util.ts", "/work/util.test.ts"),
        Some(EdgeKind::Runtime)
    );
}

#[test]
fn mapped_imports_resolve_against_the_importing_directory() {
    let mut store = SnapshotStore::new();
    store.write_from_disk("/work/lib/helper.ts", "export {}");
    store.write_from_disk("/work/app/main.ts", "irrelevant");
    let mut graph = DepGraph::new();
    let diff = DiffEngine::new(Box::new(
        MapImportParser::new().with_imports("/work/app/main.ts", &["../lib/helper"]),
    ));

    diff.apply_batch(&store, &mut graph, &["/work/app/main.ts".to_string()]);

    assert_eq!(
        graph.edge_type("/work/lib/helper.ts", "/work/app/main.ts"),
        Some(EdgeKind::Static)
    );
}
