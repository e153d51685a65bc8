mod helpers;

use helpers::{key, memory_mirror, CODE};
use memoria::brain::Brain;
use memoria::mirror::{MirrorClient, MirrorError, StorageEntry};
use memoria::scan::FileRecord;

fn record(path: &str, content: &str) -> FileRecord {
    FileRecord {
        path: path.to_string(),
        content: content.as_bytes().to_vec(),
    }
}

#[tokio::test]
async fn upsert_overwrites_by_code_and_name() {
    let (mirror, backend) = memory_mirror();

    let first = mirror
        .upsert_brain_metadata(CODE, &Brain::discovered("alpha", 0, 10, 1))
        .await
        .unwrap();
    let second = mirror
        .upsert_brain_metadata(CODE, &Brain::discovered("alpha", 2, 99, 7))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    let rows = backend.brain_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].mass_bytes, 99);
    assert_eq!(rows[0].neuron_count, 7);
    assert_eq!(rows[0].zone, "DEEP_VOID");

    // Same name under another code is a separate row.
    mirror
        .upsert_brain_metadata("XYZ-2345-ABCD", &Brain::discovered("alpha", 0, 1, 1))
        .await
        .unwrap();
    assert_eq!(backend.brain_rows().len(), 2);
    assert_eq!(mirror.list_brains(CODE).await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_brains_is_newest_first() {
    let (mirror, _backend) = memory_mirror();
    for name in ["first", "second", "third"] {
        mirror
            .upsert_brain_metadata(CODE, &Brain::discovered(name, 0, 0, 0))
            .await
            .unwrap();
    }

    let names: Vec<String> = mirror
        .list_brains(CODE)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["third", "second", "first"]);
    assert!(mirror.brain_exists(CODE).await.unwrap());
    assert!(!mirror.brain_exists("NOP-2345-NOPE").await.unwrap());
}

#[tokio::test]
async fn upload_list_download_round_trip() {
    let (mirror, backend) = memory_mirror();
    let files = vec![
        record("top.md", "top level"),
        record("notes/a.md", "note a"),
        record("notes/deep/b.bin", "\u{0}\u{1}binary"),
    ];

    let mut seen = Vec::new();
    let batch = mirror
        .upload_files(CODE, "alpha", files.clone(), &mut |p| seen.push(p))
        .await
        .unwrap();
    assert_eq!(batch.uploaded, 3);
    assert_eq!(batch.failed, 0);
    assert!(backend.object(&key("alpha", "notes/deep/b.bin")).is_some());

    // Progress precedes each file.
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0].completed, 0);
    assert_eq!(seen[2].completed, 2);
    assert!(seen.iter().all(|p| p.total == 3));
    assert_eq!(seen[1].current_file, "notes/a.md");

    let mut listed = mirror.list_files(CODE, "alpha").await.unwrap();
    listed.sort_by(|a, b| a.path.cmp(&b.path));
    let paths: Vec<&str> = listed.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["notes/a.md", "notes/deep/b.bin", "top.md"]);
    assert_eq!(listed[2].size, 9);

    for file in &files {
        let bytes = mirror.download_file(CODE, "alpha", &file.path).await.unwrap();
        assert_eq!(bytes, file.content);
    }
}

#[tokio::test]
async fn single_level_listing_reports_folders() {
    let (mirror, _backend) = memory_mirror();
    mirror
        .upload_files(
            CODE,
            "alpha",
            vec![record("a.md", "a"), record("sub/b.md", "b")],
            &mut |_| {},
        )
        .await
        .unwrap();

    let entries = mirror.list_entries(CODE, "alpha", "").await.unwrap();
    assert!(entries.contains(&StorageEntry::Folder { name: "sub".into() }));
    assert!(entries.contains(&StorageEntry::File {
        name: "a.md".into(),
        size: 1
    }));
}

#[tokio::test]
async fn reupload_overwrites() {
    let (mirror, backend) = memory_mirror();
    mirror
        .upload_file(CODE, "alpha", "a.md", b"old".to_vec())
        .await
        .unwrap();
    mirror
        .upload_file(CODE, "alpha", "a.md", b"new".to_vec())
        .await
        .unwrap();
    assert_eq!(backend.object(&key("alpha", "a.md")).unwrap(), b"new");
    assert_eq!(backend.object_keys().len(), 1);
}

#[tokio::test]
async fn upload_failure_is_returned_not_raised() {
    let (mirror, backend) = memory_mirror();
    backend.fail_object(&key("alpha", "bad.md"));

    let result = mirror
        .upload_file(CODE, "alpha", "bad.md", b"x".to_vec())
        .await
        .unwrap();
    assert!(!result.is_success());
    assert_eq!(result.path, "bad.md");

    let batch = mirror
        .upload_files(
            CODE,
            "alpha",
            vec![record("good.md", "g"), record("bad.md", "b")],
            &mut |_| {},
        )
        .await
        .unwrap();
    assert_eq!(batch.uploaded, 1);
    assert_eq!(batch.failed, 1);
    assert!(batch.errors[0].starts_with("bad.md: "));
}

#[tokio::test]
async fn delete_files_removes_only_that_brain() {
    let (mirror, backend) = memory_mirror();
    mirror
        .upload_files(
            CODE,
            "alpha",
            vec![record("a.md", "a"), record("x/b.md", "b")],
            &mut |_| {},
        )
        .await
        .unwrap();
    mirror
        .upload_file(CODE, "beta", "c.md", b"c".to_vec())
        .await
        .unwrap();

    let removed = mirror.delete_files(CODE, "alpha").await.unwrap();
    assert_eq!(removed, 2);
    assert_eq!(backend.object_keys(), vec![key("beta", "c.md")]);

    // Nothing left: no-op.
    assert_eq!(mirror.delete_files(CODE, "alpha").await.unwrap(), 0);
}

#[tokio::test]
async fn delete_brain_removes_row() {
    let (mirror, backend) = memory_mirror();
    mirror
        .upsert_brain_metadata(CODE, &Brain::discovered("alpha", 0, 0, 0))
        .await
        .unwrap();
    mirror.delete_brain(CODE, "alpha").await.unwrap();
    assert!(backend.brain_rows().is_empty());
}

#[tokio::test]
async fn missing_object_is_an_error() {
    let (mirror, _backend) = memory_mirror();
    let err = mirror.download_file(CODE, "alpha", "nope.md").await.unwrap_err();
    assert!(matches!(err, MirrorError::Backend { status: 404, .. }));
}

#[tokio::test]
async fn unconfigured_client_fails_every_operation() {
    let mirror = MirrorClient::unconfigured();
    assert!(!mirror.is_configured());

    let brain = Brain::discovered("alpha", 0, 0, 0);
    assert!(mirror
        .upsert_brain_metadata(CODE, &brain)
        .await
        .unwrap_err()
        .is_not_configured());
    assert!(mirror.list_brains(CODE).await.unwrap_err().is_not_configured());
    assert!(mirror
        .upload_file(CODE, "alpha", "a.md", vec![])
        .await
        .unwrap_err()
        .is_not_configured());
    assert!(mirror
        .list_files(CODE, "alpha")
        .await
        .unwrap_err()
        .is_not_configured());
    assert!(mirror
        .download_file(CODE, "alpha", "a.md")
        .await
        .unwrap_err()
        .is_not_configured());
}

#[tokio::test]
async fn unreachable_backend_is_not_a_configuration_error() {
    let (mirror, backend) = memory_mirror();
    backend.set_offline(true);
    let err = mirror.list_brains(CODE).await.unwrap_err();
    assert!(!err.is_not_configured());
}
