mod helpers;

use helpers::{key, memory_mirror, sample_root, CODE};
use memoria::activity::LogLevel;
use memoria::brain::{discover, Brain};
use memoria::mirror::{MirrorClient, SyncProgress};
use memoria::scan::MemoryDir;
use memoria::sync::sync_all;

#[tokio::test]
async fn mirrors_every_brain() {
    let (mirror, backend) = memory_mirror();
    let root = sample_root();
    let brains = discover(&root).await.unwrap();

    let summary = sync_all(&mirror, CODE, &brains, &root, &mut |_, _| {})
        .await
        .unwrap();

    assert_eq!(summary.brains, 3);
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.uploaded, 3);
    assert_eq!(summary.failed, 0);
    assert!(summary.errors.is_empty());

    let mut keys = backend.object_keys();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            key("alpha", "deep/idea.txt"),
            key("alpha", "notes.md"),
            key("beta", "plan.md"),
        ]
    );
    // Empty brains still get a metadata row.
    assert_eq!(backend.brain_rows().len(), 3);

    let last = summary.log.entries().last().unwrap();
    assert_eq!(last.message, "Synced 3 brains, 3/3 files uploaded");
}

#[tokio::test]
async fn metadata_failure_does_not_stop_uploads() {
    let (mirror, backend) = memory_mirror();
    let root = MemoryDir::new("root")
        .dir(MemoryDir::new("one").file("1.md", "1"))
        .dir(MemoryDir::new("two").file("2.md", "2"))
        .dir(MemoryDir::new("three").file("3.md", "3"));
    let brains = discover(&root).await.unwrap();
    backend.fail_upserts_for("two");

    let summary = sync_all(&mirror, CODE, &brains, &root, &mut |_, _| {})
        .await
        .unwrap();

    assert_eq!(summary.metadata_failures, vec!["two".to_string()]);
    // Files of the failing brain and every later brain are still uploaded.
    assert_eq!(summary.uploaded, 3);
    assert!(backend.object(&key("two", "2.md")).is_some());
    assert!(backend.object(&key("three", "3.md")).is_some());

    let names: Vec<String> = backend.brain_rows().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["one", "three"]);
    assert!(summary.log.at_level(LogLevel::Error).count() >= 1);
}

#[tokio::test]
async fn file_failures_are_aggregated() {
    let (mirror, backend) = memory_mirror();
    let root = sample_root();
    let brains = discover(&root).await.unwrap();
    backend.fail_object(&key("alpha", "notes.md"));

    let summary = sync_all(&mirror, CODE, &brains, &root, &mut |_, _| {})
        .await
        .unwrap();

    assert_eq!(summary.uploaded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].starts_with("notes.md"));
}

#[tokio::test]
async fn placeholder_is_never_synced() {
    let (mirror, backend) = memory_mirror();
    let root = MemoryDir::new("root");
    let brains = vec![Brain::empty_placeholder()];

    let summary = sync_all(&mirror, CODE, &brains, &root, &mut |_, _| {})
        .await
        .unwrap();

    assert_eq!(summary.brains, 0);
    assert!(backend.brain_rows().is_empty());
    assert!(backend.object_keys().is_empty());
}

#[tokio::test]
async fn missing_brain_directory_is_logged_and_skipped() {
    let (mirror, backend) = memory_mirror();
    let root = MemoryDir::new("root").dir(MemoryDir::new("present").file("p.md", "p"));
    let brains = vec![
        Brain::discovered("vanished", 0, 10, 1),
        Brain::discovered("present", 1, 1, 1),
    ];

    let summary = sync_all(&mirror, CODE, &brains, &root, &mut |_, _| {})
        .await
        .unwrap();

    assert_eq!(summary.brains, 2);
    assert_eq!(summary.uploaded, 1);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].starts_with("./vanished"));
    // Metadata for the vanished brain was still written.
    assert_eq!(backend.brain_rows().len(), 2);
}

#[tokio::test]
async fn progress_is_reported_before_each_file() {
    let (mirror, _backend) = memory_mirror();
    let root = sample_root();
    let brains = discover(&root).await.unwrap();

    let mut seen: Vec<(String, SyncProgress)> = Vec::new();
    sync_all(&mirror, CODE, &brains, &root, &mut |brain, p| {
        seen.push((brain.to_string(), p))
    })
    .await
    .unwrap();

    assert_eq!(seen.len(), 3);
    let alpha: Vec<&SyncProgress> = seen
        .iter()
        .filter(|(b, _)| b == "alpha")
        .map(|(_, p)| p)
        .collect();
    assert_eq!(alpha.len(), 2);
    assert_eq!(alpha[0].completed, 0);
    assert_eq!(alpha[1].completed, 1);
    assert!(alpha.iter().all(|p| p.total == 2));
}

#[tokio::test]
async fn unconfigured_mirror_aborts_before_any_work() {
    let mirror = MirrorClient::unconfigured();
    let root = sample_root();
    let brains = discover(&root).await.unwrap();

    let mut calls = 0;
    let err = sync_all(&mirror, CODE, &brains, &root, &mut |_, _| calls += 1)
        .await
        .unwrap_err();
    assert!(err.is_not_configured());
    assert_eq!(calls, 0);
}
