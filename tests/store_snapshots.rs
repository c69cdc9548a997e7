// tests/store_snapshots.rs

use std::collections::HashMap;

use testsieve::store::{SnapshotSource, SnapshotStore};
use testsieve::types::ChangeKind;

#[test]
fn identical_disk_write_is_a_no_op() {
    let mut store = SnapshotStore::new();

    let first = store.write_from_disk("/work/a.ts", "let a = 1;").version;
    let second = store.write_from_disk("/work/a.ts", "let a = 1;").version;

    assert_eq!(first, second);
    assert_eq!(store.current_version(), first);
    // No history entry was pushed, so nothing to roll back to.
    assert!(store.rollback("/work/a.ts", first + 1).is_none());
}

#[test]
fn content_change_bumps_the_global_version() {
    let mut store = SnapshotStore::new();

    let v1 = store.write_from_disk("/work/a.ts", "let a = 1;").version;
    let v2 = store.write_from_disk("/work/a.ts", "let a = 2;").version;

    assert!(v2 > v1);
    assert_eq!(store.get("/work/a.ts").unwrap().content, "let a = 2;");
}

#[test]
fn buffer_overlay_wins_over_disk_writes() {
    let mut store = SnapshotStore::new();

    store.write_from_disk("/work/a.ts", "on disk");
    store.write_from_buffer("/work/a.ts", "unsaved edit");
    let snapshot = store.write_from_disk("/work/a.ts", "disk churn");

    assert_eq!(snapshot.source, SnapshotSource::Buffer);
    assert_eq!(snapshot.content, "unsaved edit");
    assert_eq!(store.get("/work/a.ts").unwrap().content, "unsaved edit");
}

#[test]
fn clear_buffer_reverts_to_latest_disk_snapshot() {
    let mut store = SnapshotStore::new();

    store.write_from_disk("/work/a.ts", "v1");
    store.write_from_disk("/work/a.ts", "v2");
    store.write_from_buffer("/work/a.ts", "typing...");

    let restored = store.clear_buffer("/work/a.ts").expect("disk history exists");
    assert_eq!(restored.content, "v2");
    assert_eq!(restored.source, SnapshotSource::Disk);
    // Reinstated under a fresh version so observers see the revert.
    assert_eq!(restored.version, store.current_version());
}

#[test]
fn clear_buffer_without_disk_history_removes_the_path() {
    let mut store = SnapshotStore::new();

    store.write_from_buffer("/work/scratch.ts", "never saved");
    assert!(store.clear_buffer("/work/scratch.ts").is_none());
    assert!(store.get("/work/scratch.ts").is_none());
}

#[test]
fn clear_buffer_is_a_no_op_without_an_overlay() {
    let mut store = SnapshotStore::new();

    store.write_from_disk("/work/a.ts", "v1");
    let before = store.current_version();
    let current = store.clear_buffer("/work/a.ts").unwrap();

    assert_eq!(current.content, "v1");
    assert_eq!(store.current_version(), before);
}

#[test]
fn rollback_reinstates_prior_content_under_a_fresh_version() {
    let mut store = SnapshotStore::new();

    let v1 = store.write_from_disk("/work/a.ts", "v1").version;
    store.write_from_disk("/work/a.ts", "v2");

    let rolled = store.rollback("/work/a.ts", v1).expect("v1 is in history");
    assert_eq!(rolled.content, "v1");
    assert!(rolled.version > v1);
    assert_eq!(store.get("/work/a.ts").unwrap().content, "v1");
}

#[test]
fn history_is_capped_and_evicted_fifo() {
    let mut store = SnapshotStore::new();

    let first = store.write_from_disk("/work/a.ts", "v0").version;
    for i in 1..=12 {
        store.write_from_disk("/work/a.ts", format!("v{i}"));
    }

    // The earliest snapshot fell out of the 10-entry window.
    assert!(store.rollback("/work/a.ts", first).is_none());
    // A recent one is still there.
    let recent = store.get("/work/a.ts").unwrap().version - 1;
    assert!(store.rollback("/work/a.ts", recent).is_some());
}

#[test]
fn changed_since_reports_newer_snapshots_in_version_order() {
    let mut store = SnapshotStore::new();

    let v1 = store.write_from_disk("/work/a.ts", "a").version;
    store.write_from_disk("/work/b.ts", "b");
    store.write_from_disk("/work/c.ts", "c");

    let changed: Vec<&str> = store
        .changed_since(v1)
        .iter()
        .map(|s| s.path.as_str())
        .collect();
    assert_eq!(changed, vec!["/work/b.ts", "/work/c.ts"]);
}

#[test]
fn diff_against_reports_added_changed_and_removed() {
    let mut store = SnapshotStore::new();

    store.write_from_disk("/work/a.ts", "a1");
    store.write_from_disk("/work/b.ts", "b1");
    let prior: HashMap<String, String> = store.hashes();

    store.write_from_disk("/work/a.ts", "a2");
    store.remove("/work/b.ts");
    store.write_from_disk("/work/c.ts", "c1");

    let diffs = store.diff_against(&prior);
    let kinds: Vec<(&str, ChangeKind)> = diffs
        .iter()
        .map(|d| (d.path.as_str(), d.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("/work/a.ts", ChangeKind::Changed),
            ("/work/b.ts", ChangeKind::Removed),
            ("/work/c.ts", ChangeKind::Added),
        ]
    );
}

#[test]
fn paths_are_normalized_on_every_operation() {
    let mut store = SnapshotStore::new();

    store.write_from_disk("C:\\Work\\App\\A.TS", "content");
    let snapshot = store.get("/work/app/a.ts").expect("normalized lookup");
    assert_eq!(snapshot.path, "/work/app/a.ts");
    assert!(store.remove("c:/work/app/a.ts"));
}
