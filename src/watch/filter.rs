use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::WatchSection;
use crate::errors::Result;

/// Include/exclude globs applied to workspace-relative paths before anything
/// reaches the engine. Exclude wins over include.
#[derive(Debug, Clone)]
pub struct WatchFilter {
    include: GlobSet,
    exclude: GlobSet,
}

impl WatchFilter {
    pub fn from_section(section: &WatchSection) -> Result<Self> {
        Ok(Self {
            include: build_set(&section.include)?,
            exclude: build_set(&section.exclude)?,
        })
    }

    /// Whether a workspace-relative path is of interest.
    pub fn is_relevant(&self, rel_path: &str) -> bool {
        if self.exclude.is_match(rel_path) {
            return false;
        }
        self.include.is_match(rel_path)
    }
}

fn build_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclude_wins_over_include() {
        let filter = WatchFilter::from_section(&WatchSection::default()).unwrap();
        assert!(filter.is_relevant("src/util.ts"));
        assert!(!filter.is_relevant("node_modules/react/index.js"));
        assert!(!filter.is_relevant("a/.git/HEAD"));
    }
}
