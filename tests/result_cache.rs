// tests/result_cache.rs

mod common;
use crate::common::builders::passing_result;

use std::time::SystemTime;

use testsieve::cache::{CachedTestRun, ResultCache};
use testsieve::store::content_hash;
use testsieve::types::{CollectedSummary, RunResolution};

fn entry_for(path: &str, content: &str) -> CachedTestRun {
    let results = vec![passing_result(path)];
    let collected_summary = CollectedSummary::from_results(&results, 1);
    CachedTestRun {
        content_hash: content_hash(content),
        file_path: path.to_string(),
        cached_at: SystemTime::now(),
        resolution: RunResolution::default(),
        discovered_tests: Vec::new(),
        results,
        collected_summary,
        console_logs: Vec::new(),
    }
}

#[test]
fn lookup_is_sensitive_to_content_changes() {
    let mut cache = ResultCache::new();
    cache.store(entry_for("/work/a.test.ts", "original"));

    let original = content_hash("original");
    let mutated = content_hash("mutated");

    assert!(cache.lookup("/work/a.test.ts", Some(&original)).is_some());
    // Content changed: miss, and the stale entry is evicted.
    assert!(cache.lookup("/work/a.test.ts", Some(&mutated)).is_none());
    // Even restoring the exact original content misses now.
    assert!(cache.lookup("/work/a.test.ts", Some(&original)).is_none());

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.size, 0);
}

#[test]
fn restoring_original_content_hits_with_the_original_payload() {
    let mut cache = ResultCache::new();
    cache.store(entry_for("/work/a.test.ts", "original"));

    // Content was mutated and then restored to the exact original, with no
    // lookup in between: the entry is still live and replays its payload.
    let restored = content_hash("original");
    let hit = cache
        .lookup("/work/a.test.ts", Some(&restored))
        .expect("hash matches again");
    assert_eq!(hit.results, vec![passing_result("/work/a.test.ts")]);
}

#[test]
fn untracked_files_always_miss() {
    let mut cache = ResultCache::new();
    cache.store(entry_for("/work/a.test.ts", "original"));

    assert!(cache.lookup("/work/a.test.ts", None).is_none());
    assert_eq!(cache.stats().misses, 1);
}

#[test]
fn has_does_not_touch_the_counters() {
    let mut cache = ResultCache::new();
    cache.store(entry_for("/work/a.test.ts", "original"));
    let original = content_hash("original");

    assert!(cache.has("/work/a.test.ts", Some(&original)));
    assert!(!cache.has("/work/a.test.ts", Some(&content_hash("other"))));
    assert!(!cache.has("/work/b.test.ts", Some(&original)));

    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses), (0, 0));
}

#[test]
fn invalidate_and_reset_clear_entries() {
    let mut cache = ResultCache::new();
    cache.store(entry_for("/work/a.test.ts", "a"));
    cache.store(entry_for("/work/b.test.ts", "b"));

    assert!(cache.invalidate("/work/a.test.ts"));
    assert!(!cache.invalidate("/work/a.test.ts"));
    assert_eq!(cache.stats().size, 1);

    cache.reset();
    let stats = cache.stats();
    assert_eq!((stats.size, stats.hits, stats.misses), (0, 0, 0));
}

#[test]
fn store_replaces_the_prior_entry_for_a_path() {
    let mut cache = ResultCache::new();
    cache.store(entry_for("/work/a.test.ts", "v1"));
    cache.store(entry_for("/work/a.test.ts", "v2"));

    assert_eq!(cache.stats().size, 1);
    assert!(cache.has("/work/a.test.ts", Some(&content_hash("v2"))));
    assert!(!cache.has("/work/a.test.ts", Some(&content_hash("v1"))));
}
