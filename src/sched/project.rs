// src/sched/project.rs

//! Project-ownership collaborator seam.
//!
//! Workspace discovery is out of scope; the engine only needs "which project
//! owns this path" for run-scoping metadata. The default implementation
//! answers from a static root table built at startup.

use crate::store::paths::normalize_path;
use crate::types::ProjectSpec;

pub trait ProjectResolver: Send {
    /// Name of the project owning `path`, if any.
    fn resolve(&self, path: &str) -> Option<String>;
}

/// Longest-prefix matcher over configured project roots.
#[derive(Debug)]
pub struct RootProjectResolver {
    /// Sorted by root length descending so the most specific root wins.
    roots: Vec<ProjectSpec>,
}

impl RootProjectResolver {
    pub fn new(mut projects: Vec<ProjectSpec>) -> Self {
        for project in &mut projects {
            project.root = normalize_path(&project.root);
        }
        projects.sort_by_key(|p| std::cmp::Reverse(p.root.len()));
        Self { roots: projects }
    }
}

impl ProjectResolver for RootProjectResolver {
    fn resolve(&self, path: &str) -> Option<String> {
        let path = normalize_path(path);
        self.roots
            .iter()
            .find(|p| {
                path.strip_prefix(&p.root)
                    .is_some_and(|rest| rest.starts_with('/') || rest.is_empty())
            })
            .map(|p| p.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> RootProjectResolver {
        RootProjectResolver::new(vec![
            ProjectSpec {
                name: "app".to_string(),
                root: "/work/app".to_string(),
            },
            ProjectSpec {
                name: "app-server".to_string(),
                root: "/work/app/server".to_string(),
            },
        ])
    }

    #[test]
    fn most_specific_root_wins() {
        let r = resolver();
        assert_eq!(r.resolve("/work/app/a.ts").as_deref(), Some("app"));
        assert_eq!(
            r.resolve("/work/app/server/b.ts").as_deref(),
            Some("app-server")
        );
        assert_eq!(r.resolve("/elsewhere/c.ts"), None);
    }

    #[test]
    fn prefix_match_respects_segment_boundaries() {
        let r = resolver();
        // "/work/app-extras" shares a string prefix but not a path prefix.
        assert_eq!(r.resolve("/work/app-extras/a.ts"), None);
    }
}
