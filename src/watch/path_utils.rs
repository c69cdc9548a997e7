// src/watch/path_utils.rs

use std::path::Path;

/// Relate an event path to the workspace root, yielding a forward-slash
/// relative string for glob matching.
///
/// Watch backends sometimes report paths under a different absolute prefix
/// than the root we watched (symlinked temp dirs, macOS `/private` aliases),
/// so when a plain `strip_prefix` fails we canonicalize both sides and try
/// once more. `None` means the path genuinely lives outside the root.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(slashed(rel));
    }

    let root_canon = root.canonicalize().ok()?;
    let path_canon = path.canonicalize().ok()?;
    path_canon.strip_prefix(&root_canon).ok().map(slashed)
}

fn slashed(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}
