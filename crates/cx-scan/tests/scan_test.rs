//! End-to-end scanner scenarios (§8 S1-S6), against an in-memory store.

use cx_core::entity::EntityStatus;
use cx_core::scan::{EntityFilter, ScanOptions};
use cx_core::version::Ref;
use cx_scan::Scanner;
use cx_store::Store;
use std::fs;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) {
    fs::write(dir.path().join(name), contents).unwrap();
}

/// S1 — fresh scan of a two-file Go project.
#[tokio::test]
async fn fresh_scan_of_two_file_project() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.go", "package p\nfunc F() { G() }\n");
    write(&dir, "b.go", "package p\nfunc G() {}\n");

    let store = Store::open_in_memory().await.unwrap();
    let scanner = Scanner::new().unwrap();
    let report = scanner.scan(&store, dir.path(), &ScanOptions::default()).await.unwrap();

    assert_eq!(report.files_scanned, 2);
    assert_eq!(report.entities_created, 2);
    assert_eq!(report.dependencies_created, 1);
    assert!(report.commit_hash.is_some());
    assert!(report.errors.is_empty());

    let entities = store.query_entities(&EntityFilter::default()).await.unwrap();
    assert_eq!(entities.len(), 2);
    assert!(entities.iter().all(|e| e.status == EntityStatus::Active));
}

/// S2 — incremental no-op: rescanning unchanged files mutates nothing.
#[tokio::test]
async fn incremental_rescan_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.go", "package p\nfunc F() { G() }\n");
    write(&dir, "b.go", "package p\nfunc G() {}\n");

    let store = Store::open_in_memory().await.unwrap();
    let scanner = Scanner::new().unwrap();
    scanner.scan(&store, dir.path(), &ScanOptions::default()).await.unwrap();

    let second = scanner.scan(&store, dir.path(), &ScanOptions::default()).await.unwrap();
    assert_eq!(second.entities_created, 0);
    assert_eq!(second.entities_updated_sig, 0);
    assert_eq!(second.entities_updated_body, 0);
    assert_eq!(second.entities_archived, 0);
    assert_eq!(second.dependencies_created, 0);
    assert_eq!(second.files_skipped, 2);
}

/// S3 — body-only edit: id and sig_hash stay put, body_hash changes, the
/// existing call edge is not duplicated.
#[tokio::test]
async fn body_only_edit_preserves_id_and_dedups_the_edge() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.go", "package p\nfunc F() { G() }\n");
    write(&dir, "b.go", "package p\nfunc G() {}\n");

    let store = Store::open_in_memory().await.unwrap();
    let scanner = Scanner::new().unwrap();
    scanner.scan(&store, dir.path(), &ScanOptions::default()).await.unwrap();

    let before = store.query_entities(&EntityFilter { name: Some("F".to_string()), ..Default::default() }).await.unwrap();
    let id_before = before[0].id.clone();
    let sig_before = before[0].sig_hash.clone();

    write(&dir, "a.go", "package p\nfunc F() { G(); G() }\n");
    let report = scanner.scan(&store, dir.path(), &ScanOptions::default()).await.unwrap();

    assert_eq!(report.entities_updated_body, 1);
    assert_eq!(report.entities_updated_sig, 0);
    assert_eq!(report.dependencies_created, 1);

    let after = store.query_entities(&EntityFilter { name: Some("F".to_string()), ..Default::default() }).await.unwrap();
    assert_eq!(after[0].id, id_before);
    assert_eq!(after[0].sig_hash, sig_before);
    assert_ne!(after[0].body_hash, before[0].body_hash);
}

/// S4 — rename: the old declaration archives, the new one gets a fresh id.
#[tokio::test]
async fn rename_archives_the_old_entity_and_mints_a_new_id() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.go", "package p\nfunc F() { G() }\n");
    write(&dir, "b.go", "package p\nfunc G() {}\n");

    let store = Store::open_in_memory().await.unwrap();
    let scanner = Scanner::new().unwrap();
    scanner.scan(&store, dir.path(), &ScanOptions::default()).await.unwrap();

    let g_before = store
        .query_entities(&EntityFilter { name: Some("G".to_string()), ..Default::default() })
        .await
        .unwrap();
    let g_id = g_before[0].id.clone();

    write(&dir, "b.go", "package p\nfunc H() {}\n");
    let report = scanner.scan(&store, dir.path(), &ScanOptions::default()).await.unwrap();
    assert_eq!(report.entities_archived, 1);
    assert_eq!(report.entities_created, 1);

    let archived = store.get_entity(&g_id).await.unwrap().unwrap();
    assert_eq!(archived.status, EntityStatus::Archived);

    let h = store
        .query_entities(&EntityFilter { name: Some("H".to_string()), ..Default::default() })
        .await
        .unwrap();
    assert_ne!(h[0].id, g_id);

    write(&dir, "a.go", "package p\nfunc F() { H() }\n");
    let report = scanner.scan(&store, dir.path(), &ScanOptions::default()).await.unwrap();
    assert_eq!(report.dependencies_created, 1);
}

/// S5 — subtree scan never touches entities outside the scanned path.
#[tokio::test]
async fn subtree_scan_leaves_the_rest_of_the_tree_alone() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("pkg1")).unwrap();
    fs::create_dir_all(dir.path().join("pkg2")).unwrap();
    fs::write(dir.path().join("pkg1/a.go"), "package pkg1\nfunc F() {}\n").unwrap();
    fs::write(dir.path().join("pkg2/b.go"), "package pkg2\nfunc G() {}\n").unwrap();

    let store = Store::open_in_memory().await.unwrap();
    let scanner = Scanner::new().unwrap();
    scanner.scan(&store, dir.path(), &ScanOptions::default()).await.unwrap();

    let report = scanner
        .scan(&store, &dir.path().join("pkg1"), &ScanOptions::default())
        .await
        .unwrap();
    assert_eq!(report.entities_archived, 0);

    let pkg2_entities = store
        .query_entities(&EntityFilter { file_path_prefix: Some("pkg2".to_string()), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(pkg2_entities.len(), 1);
    assert_eq!(pkg2_entities[0].status, EntityStatus::Active);
}

/// S6 — time travel: history before a rename shows no trace of the rename.
#[tokio::test]
async fn query_as_of_a_prior_commit_predates_a_later_rename() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.go", "package p\nfunc F() { G() }\n");
    write(&dir, "b.go", "package p\nfunc G() {}\n");

    let store = Store::open_in_memory().await.unwrap();
    let scanner = Scanner::new().unwrap();
    let first = scanner.scan(&store, dir.path(), &ScanOptions::default()).await.unwrap();
    let prior_commit = first.commit_hash.unwrap();

    write(&dir, "b.go", "package p\nfunc H() {}\n");
    scanner.scan(&store, dir.path(), &ScanOptions::default()).await.unwrap();

    let as_of = store
        .query_entities_as_of(&EntityFilter::default(), &Ref::Commit(prior_commit.clone()))
        .await
        .unwrap();
    let names: Vec<&str> = as_of.iter().map(|e| e.name.as_str()).collect();
    assert!(names.contains(&"F"));
    assert!(names.contains(&"G"));
    assert!(!names.contains(&"H"));

    let diff = store
        .diff(&Ref::Commit(prior_commit), &Ref::Head, "entities", &EntityFilter::default())
        .await
        .unwrap();
    assert!(diff.removed.iter().any(|c| c.name == "G"));
    assert!(diff.added.iter().any(|c| c.name == "H"));
}

/// Force re-scans even when the file is byte-for-byte unchanged.
#[tokio::test]
async fn force_option_reparses_unchanged_files() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.go", "package p\nfunc F() {}\n");

    let store = Store::open_in_memory().await.unwrap();
    let scanner = Scanner::new().unwrap();
    scanner.scan(&store, dir.path(), &ScanOptions::default()).await.unwrap();

    let forced = ScanOptions { force: true, ..Default::default() };
    let report = scanner.scan(&store, dir.path(), &forced).await.unwrap();
    assert_eq!(report.files_scanned, 1);
    assert_eq!(report.files_skipped, 0);
    assert_eq!(report.entities_unchanged, 1);
}

/// `dry_run` computes the report but persists nothing.
#[tokio::test]
async fn dry_run_persists_nothing() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.go", "package p\nfunc F() { G() }\n");
    write(&dir, "b.go", "package p\nfunc G() {}\n");

    let store = Store::open_in_memory().await.unwrap();
    let scanner = Scanner::new().unwrap();
    let dry = ScanOptions { dry_run: true, ..Default::default() };
    let report = scanner.scan(&store, dir.path(), &dry).await.unwrap();

    assert_eq!(report.entities_created, 2);
    assert!(report.commit_hash.is_none());

    let entities = store.query_entities(&EntityFilter::default()).await.unwrap();
    assert!(entities.is_empty());
}

/// A scan pre-cancelled before it starts stops after the first file
/// without erroring (§5 cancellation check between files).
#[tokio::test]
async fn pre_cancelled_scan_stops_after_the_first_file() {
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    let dir = TempDir::new().unwrap();
    write(&dir, "a.go", "package p\nfunc F() { G() }\n");
    write(&dir, "b.go", "package p\nfunc G() {}\n");

    let store = Store::open_in_memory().await.unwrap();
    let scanner = Scanner::new().unwrap();
    let cancel = Arc::new(AtomicBool::new(true));
    let report = scanner
        .scan_cancellable(&store, dir.path(), &ScanOptions::default(), cancel)
        .await
        .unwrap();

    assert_eq!(report.files_scanned, 0);
    assert!(report.errors.is_empty());
}
