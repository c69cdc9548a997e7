// tests/graph_edges.rs

use testsieve::graph::{DepGraph, EdgeKind};

#[test]
fn self_edges_are_rejected() {
    let mut graph = DepGraph::new();

    assert!(!graph.add_edge("/work/a.ts", "/work/a.ts", EdgeKind::Static));
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn affected_by_walks_transitive_dependents() {
    let mut graph = DepGraph::new();

    // c depends on b depends on a.
    graph.add_edge("/work/a.ts", "/work/b.ts", EdgeKind::Static);
    graph.add_edge("/work/b.ts", "/work/c.ts", EdgeKind::Static);

    let affected = graph.affected_by("/work/a.ts");
    assert!(affected.contains("/work/b.ts"));
    assert!(affected.contains("/work/c.ts"));
    assert_eq!(affected.len(), 2);
}

#[test]
fn affected_by_terminates_on_cycles() {
    let mut graph = DepGraph::new();

    graph.add_edge("/work/a.ts", "/work/b.ts", EdgeKind::Static);
    graph.add_edge("/work/b.ts", "/work/a.ts", EdgeKind::Static);

    let affected = graph.affected_by("/work/a.ts");
    assert!(affected.contains("/work/b.ts"));
    // The cycle brings the start node back in; it must not loop forever.
    assert!(affected.len() <= 2);
}

#[test]
fn runtime_edges_are_never_downgraded() {
    let mut graph = DepGraph::new();

    graph.add_edge("/work/a.ts", "/work/b.ts", EdgeKind::Runtime);
    graph.add_edge("/work/a.ts", "/work/b.ts", EdgeKind::Static);

    assert_eq!(
        graph.edge_type("/work/a.ts", "/work/b.ts"),
        Some(EdgeKind::Runtime)
    );
}

#[test]
fn static_edges_are_promoted_by_runtime_observation() {
    let mut graph = DepGraph::new();

    graph.add_edge("/work/a.ts", "/work/b.ts", EdgeKind::Static);
    assert_eq!(
        graph.edge_type("/work/a.ts", "/work/b.ts"),
        Some(EdgeKind::Static)
    );

    graph.add_edge("/work/a.ts", "/work/b.ts", EdgeKind::Runtime);
    assert_eq!(
        graph.edge_type("/work/a.ts", "/work/b.ts"),
        Some(EdgeKind::Runtime)
    );
}

#[test]
fn clear_incoming_drops_all_edge_kinds() {
    let mut graph = DepGraph::new();

    graph.add_edge("/work/a.ts", "/work/t.ts", EdgeKind::Static);
    graph.add_edge("/work/b.ts", "/work/t.ts", EdgeKind::Runtime);
    graph.add_edge("/work/t.ts", "/work/down.ts", EdgeKind::Static);

    graph.clear_incoming_edges("/work/t.ts");

    assert!(graph.dependencies_of("/work/t.ts").is_empty());
    // Outgoing edges survive.
    assert_eq!(
        graph.edge_type("/work/t.ts", "/work/down.ts"),
        Some(EdgeKind::Static)
    );
}

#[test]
fn removing_a_file_leaves_other_nodes_intact() {
    let mut graph = DepGraph::new();

    graph.add_edge("/work/a.ts", "/work/b.ts", EdgeKind::Static);
    graph.add_edge("/work/b.ts", "/work/c.ts", EdgeKind::Static);

    graph.remove_file("/work/a.ts");

    assert!(!graph.contains("/work/a.ts"));
    assert_eq!(graph.edge_type("/work/a.ts", "/work/b.ts"), None);
    // b keeps its other edge and stays a node.
    assert!(graph.contains("/work/b.ts"));
    assert_eq!(
        graph.edge_type("/work/b.ts", "/work/c.ts"),
        Some(EdgeKind::Static)
    );
}

#[test]
fn queries_on_unknown_paths_are_empty() {
    let graph = DepGraph::new();

    assert!(graph.affected_by("/nowhere.ts").is_empty());
    assert!(graph.dependencies_of("/nowhere.ts").is_empty());
    assert_eq!(graph.edge_type("/a.ts", "/b.ts"), None);
}
