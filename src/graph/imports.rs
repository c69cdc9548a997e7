// src/graph/imports.rs

//! Import-resolution collaborator seam.
//!
//! The engine only needs one capability from the source language: "given file
//! text, produce the list of referenced module specifiers". The default
//! implementation below is a lightweight regex scan over ES-style sources;
//! a host can plug in a real parser behind the same trait.

use anyhow::{Result, bail};
use regex::Regex;

use crate::store::SnapshotStore;
use crate::store::paths::join_relative;
use crate::types::FilePath;

/// Extensions probed, in order, when a specifier omits one.
const RESOLVE_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".mts", ".cts"];

pub trait ImportParser: Send {
    /// Module specifiers referenced by `content`. A failure is contained by
    /// the diff engine and yields zero static edges for the file.
    fn parse_imports(&self, path: &str, content: &str) -> Result<Vec<String>>;
}

/// Regex-based specifier scan for ES-style `import` / `require` / re-export
/// forms.
pub struct EsImportParser {
    import_re: Regex,
    dynamic_re: Regex,
    export_re: Regex,
}

impl EsImportParser {
    pub fn new() -> Self {
        Self {
            import_re: Regex::new(r#"(?m)^\s*import\s+(?:[^'"]+?\s+from\s+)?['"]([^'"]+)['"]"#)
                .expect("import regex is valid"),
            dynamic_re: Regex::new(r#"(?:\brequire|\bimport)\s*\(\s*['"]([^'"]+)['"]\s*\)"#)
                .expect("dynamic import regex is valid"),
            export_re: Regex::new(r#"(?m)^\s*export\s+(?:\*|\{[^}]*\})\s*from\s+['"]([^'"]+)['"]"#)
                .expect("export-from regex is valid"),
        }
    }
}

impl Default for EsImportParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportParser for EsImportParser {
    fn parse_imports(&self, path: &str, content: &str) -> Result<Vec<String>> {
        if content.contains('\0') {
            bail!("refusing to scan binary content in {path}");
        }

        let mut specifiers = Vec::new();
        for re in [&self.import_re, &self.dynamic_re, &self.export_re] {
            for capture in re.captures_iter(content) {
                let specifier = capture[1].to_string();
                if !specifiers.contains(&specifier) {
                    specifiers.push(specifier);
                }
            }
        }
        Ok(specifiers)
    }
}

/// Whether a specifier is relative; only these produce static graph edges.
pub fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

/// Resolve a relative specifier against the importing file's directory,
/// probing extensions and `index` files against tracked store entries.
///
/// Returns `None` when the target is not (yet) tracked; no edge is seeded in
/// that case.
pub fn resolve_specifier(store: &SnapshotStore, dir: &str, specifier: &str) -> Option<FilePath> {
    let joined = join_relative(dir, specifier);

    if store.get(&joined).is_some() {
        return Some(joined);
    }
    for ext in RESOLVE_EXTENSIONS {
        let candidate = format!("{joined}{ext}");
        if store.get(&candidate).is_some() {
            return Some(candidate);
        }
    }
    for ext in RESOLVE_EXTENSIONS {
        let candidate = format!("{joined}/index{ext}");
        if store.get(&candidate).is_some() {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_static_dynamic_and_reexport_specifiers() {
        let parser = EsImportParser::new();
        let content = r#"
import { a } from './a';
import './side-effect';
const b = require('../b');
export * from './c';
export { d } from "./d";
import * as path from 'path';
"#;
        let specifiers = parser.parse_imports("/x.ts", content).unwrap();
        assert!(specifiers.contains(&"./a".to_string()));
        assert!(specifiers.contains(&"./side-effect".to_string()));
        assert!(specifiers.contains(&"../b".to_string()));
        assert!(specifiers.contains(&"./c".to_string()));
        assert!(specifiers.contains(&"./d".to_string()));
        assert!(specifiers.contains(&"path".to_string()));
    }

    #[test]
    fn bare_specifiers_are_not_relative() {
        assert!(is_relative("./util"));
        assert!(is_relative("../util"));
        assert!(!is_relative("react"));
        assert!(!is_relative("@scope/pkg"));
    }
}
