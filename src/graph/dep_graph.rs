use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use petgraph::Direction;
use petgraph::graphmap::DiGraphMap;
use serde::Serialize;
use tracing::{debug, trace};

use crate::store::paths::normalize_path;
use crate::types::FilePath;

/// Provenance of a dependency edge.
///
/// `Runtime` edges were observed during an actual run (a test executed a
/// source file) and take precedence: once a pair is known at runtime, a later
/// static re-scan never downgrades it. A `Static` edge may be learned first
/// and promoted by a later runtime observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Static,
    Runtime,
}

/// Bidirectional file dependency graph.
///
/// An edge `(from, to)` means "`to` depends on `from`". Paths are interned to
/// compact ids; both directions of every edge are queryable in O(1) average
/// through the underlying adjacency.
#[derive(Debug)]
pub struct DepGraph {
    ids: HashMap<FilePath, u32>,
    paths: Vec<FilePath>,
    graph: DiGraphMap<u32, EdgeKind>,
}

impl Default for DepGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl DepGraph {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            paths: Vec::new(),
            graph: DiGraphMap::new(),
        }
    }

    /// Insert or upgrade an edge. Self-edges are rejected.
    ///
    /// Returns `true` if the graph changed (new edge, or static promoted to
    /// runtime).
    pub fn add_edge(&mut self, from: &str, to: &str, kind: EdgeKind) -> bool {
        let from = normalize_path(from);
        let to = normalize_path(to);
        if from == to {
            debug!(path = %from, "ignoring self-edge");
            return false;
        }

        let from_id = self.intern(from);
        let to_id = self.intern(to);

        if let Some(existing) = self.graph.edge_weight(from_id, to_id) {
            // Runtime provenance is never downgraded; identical kind is a no-op.
            if *existing == EdgeKind::Runtime || *existing == kind {
                return false;
            }
        }

        trace!(
            from = %self.paths[from_id as usize],
            to = %self.paths[to_id as usize],
            kind = ?kind,
            "recording dependency edge"
        );
        self.graph.add_edge(from_id, to_id, kind);
        true
    }

    /// Provenance of the edge `(from, to)`, if present.
    pub fn edge_type(&self, from: &str, to: &str) -> Option<EdgeKind> {
        let from_id = self.id_of(from)?;
        let to_id = self.id_of(to)?;
        self.graph.edge_weight(from_id, to_id).copied()
    }

    /// All transitive dependents of a path: everything a change to `path`
    /// could invalidate. BFS with a visited set, so cycles terminate.
    pub fn affected_by(&self, path: &str) -> BTreeSet<FilePath> {
        let mut affected = BTreeSet::new();
        let Some(start) = self.id_of(path) else {
            return affected;
        };
        if !self.graph.contains_node(start) {
            return affected;
        }

        let mut visited: HashSet<u32> = HashSet::from([start]);
        let mut queue: VecDeque<u32> = VecDeque::from([start]);

        while let Some(id) = queue.pop_front() {
            for dependent in self.graph.neighbors_directed(id, Direction::Outgoing) {
                if visited.insert(dependent) {
                    affected.insert(self.paths[dependent as usize].clone());
                    queue.push_back(dependent);
                }
            }
        }

        affected
    }

    /// Direct dependencies of a path ("what does this file depend on").
    pub fn dependencies_of(&self, path: &str) -> BTreeSet<FilePath> {
        self.direct_neighbors(path, Direction::Incoming)
    }

    /// Direct dependents of a path.
    pub fn dependents_of(&self, path: &str) -> BTreeSet<FilePath> {
        self.direct_neighbors(path, Direction::Outgoing)
    }

    /// Drop every edge whose target is `path`, from all sources, regardless
    /// of kind. Runtime edges are cleared too and must be re-confirmed by a
    /// later coverage-producing run.
    pub fn clear_incoming_edges(&mut self, path: &str) {
        let Some(id) = self.id_of(path) else {
            return;
        };
        if !self.graph.contains_node(id) {
            return;
        }

        let sources: Vec<u32> = self
            .graph
            .neighbors_directed(id, Direction::Incoming)
            .collect();
        for source in sources {
            self.graph.remove_edge(source, id);
        }
    }

    /// Drop a file as both source and target of all edges. Other nodes keep
    /// their remaining edges.
    pub fn remove_file(&mut self, path: &str) {
        if let Some(id) = self.id_of(path) {
            if self.graph.remove_node(id) {
                debug!(path = %normalize_path(path), "removed file from dependency graph");
            }
        }
    }

    /// Whether the file currently participates in any edge bookkeeping.
    pub fn contains(&self, path: &str) -> bool {
        self.id_of(path)
            .is_some_and(|id| self.graph.contains_node(id))
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn direct_neighbors(&self, path: &str, direction: Direction) -> BTreeSet<FilePath> {
        let mut neighbors = BTreeSet::new();
        let Some(id) = self.id_of(path) else {
            return neighbors;
        };
        if !self.graph.contains_node(id) {
            return neighbors;
        }
        for neighbor in self.graph.neighbors_directed(id, direction) {
            neighbors.insert(self.paths[neighbor as usize].clone());
        }
        neighbors
    }

    fn id_of(&self, path: &str) -> Option<u32> {
        self.ids.get(&normalize_path(path)).copied()
    }

    /// Intern an already-normalized path, registering its node.
    fn intern(&mut self, path: FilePath) -> u32 {
        if let Some(id) = self.ids.get(&path) {
            let id = *id;
            self.graph.add_node(id);
            return id;
        }
        let id = self.paths.len() as u32;
        self.paths.push(path.clone());
        self.ids.insert(path, id);
        self.graph.add_node(id);
        id
    }
}
