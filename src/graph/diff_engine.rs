use tracing::{debug, warn};

use crate::graph::dep_graph::{DepGraph, EdgeKind};
use crate::graph::imports::{ImportParser, is_relative, resolve_specifier};
use crate::store::SnapshotStore;
use crate::store::paths::parent_dir;
use crate::store::snapshot::FileSnapshot;
use crate::types::FilePath;

/// Reacts to batches of changed paths by invalidating and rebuilding the
/// static edges touching each changed file.
///
/// Clearing a changed file's incoming edges drops previously observed
/// `runtime` edges along with the static ones; they come back only when a
/// later coverage-producing run re-confirms them.
pub struct DiffEngine {
    parser: Box<dyn ImportParser>,
}

impl std::fmt::Debug for DiffEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffEngine").finish_non_exhaustive()
    }
}

impl DiffEngine {
    pub fn new(parser: Box<dyn ImportParser>) -> Self {
        Self { parser }
    }

    /// Process one batch of changed paths against the store and graph.
    ///
    /// Paths absent from the store are dropped from the graph; present paths
    /// have their incoming edges cleared and re-seeded from a fresh import
    /// scan. A parse failure is logged and yields zero static edges for that
    /// file; the batch continues.
    pub fn apply_batch(&self, store: &SnapshotStore, graph: &mut DepGraph, changed: &[FilePath]) {
        for path in changed {
            match store.get(path) {
                None => {
                    debug!(path = %path, "changed file absent from store; dropping graph entries");
                    graph.remove_file(path);
                }
                Some(snapshot) => {
                    graph.clear_incoming_edges(path);
                    self.reseed_static_edges(store, graph, snapshot);
                }
            }
        }
    }

    /// Record a dependency observed during execution ("test X actually ran
    /// source Y"), bypassing the static re-scan.
    pub fn observe_runtime_edge(&self, graph: &mut DepGraph, source: &str, dependent: &str) {
        graph.add_edge(source, dependent, EdgeKind::Runtime);
    }

    fn reseed_static_edges(
        &self,
        store: &SnapshotStore,
        graph: &mut DepGraph,
        snapshot: &FileSnapshot,
    ) {
        let specifiers = match self.parser.parse_imports(&snapshot.path, &snapshot.content) {
            Ok(specifiers) => specifiers,
            Err(err) => {
                warn!(
                    path = %snapshot.path,
                    error = %err,
                    "import parse failed; seeding no static edges"
                );
                return;
            }
        };

        let dir = parent_dir(&snapshot.path);
        for specifier in specifiers {
            if !is_relative(&specifier) {
                continue;
            }
            match resolve_specifier(store, dir, &specifier) {
                Some(target) => {
                    graph.add_edge(&target, &snapshot.path, EdgeKind::Static);
                }
                None => {
                    debug!(
                        path = %snapshot.path,
                        specifier = %specifier,
                        "relative import does not resolve to a tracked file; skipping"
                    );
                }
            }
        }
    }
}
