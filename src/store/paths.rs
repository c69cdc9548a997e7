// src/store/paths.rs

//! Path normalization for canonical file identifiers.
//!
//! Every path entering the engine (watcher, protocol, import resolution) is
//! normalized once at the boundary so that lookups never depend on the
//! spelling the host happened to use: forward slashes, lowercase, no drive
//! letter, always a single leading `/`.

use crate::types::FilePath;

/// Normalize a raw path into the canonical identifier form.
pub fn normalize_path(raw: &str) -> FilePath {
    let mut s = raw.replace('\\', "/").to_lowercase();

    // Strip a Windows drive letter ("c:/..." -> "/...").
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        s.drain(..2);
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in s.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut out = String::with_capacity(s.len() + 1);
    for segment in &segments {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Directory portion of a normalized path (without trailing slash).
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

/// Resolve a relative specifier against a normalized directory.
pub fn join_relative(dir: &str, specifier: &str) -> FilePath {
    normalize_path(&format!("{dir}/{specifier}"))
}
