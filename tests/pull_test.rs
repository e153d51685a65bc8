mod helpers;

use helpers::{key, memory_mirror, CODE};
use memoria::brain::Brain;
use memoria::mirror::MirrorClient;
use memoria::pull::{find_brain, pull_brain, PullError, PullLayout};
use tempfile::TempDir;

const UUID: &str = "0b7e9c1a-2f44-4e1b-9d55-8a9a7c3f0e11";

fn layout(tmp: &TempDir) -> PullLayout {
    PullLayout {
        brain_dir: tmp.path().join("brain"),
        conversations_dir: tmp.path().join("conversations"),
    }
}

async fn seed(mirror: &MirrorClient, backend: &memoria::mirror::MemoryBackend) {
    mirror
        .upsert_brain_metadata(CODE, &Brain::discovered(UUID, 0, 12, 3))
        .await
        .unwrap();
    backend.insert_object(&key(UUID, "task.md"), b"# Task");
    backend.insert_object(&key(UUID, "notes/walkthrough.md"), b"steps");
    backend.insert_object(&key(UUID, "_conversation/history.pb"), b"\x08\x01");
}

#[tokio::test]
async fn pulls_files_and_conversation() {
    let (mirror, backend) = memory_mirror();
    seed(&mirror, &backend).await;
    let tmp = TempDir::new().unwrap();
    let layout = layout(&tmp);

    let mut progress = Vec::new();
    let report = pull_brain(&mirror, CODE, UUID, &layout, &mut |p| progress.push(p))
        .await
        .unwrap();

    assert_eq!(report.brain_name, UUID);
    assert_eq!(report.downloaded, 3);
    assert!(report.failures.is_empty());
    assert_eq!(progress.len(), 3);

    let dest = layout.brain_dir.join(UUID);
    assert_eq!(report.destination, dest);
    assert_eq!(std::fs::read(dest.join("task.md")).unwrap(), b"# Task");
    assert_eq!(
        std::fs::read(dest.join("notes").join("walkthrough.md")).unwrap(),
        b"steps"
    );

    let conversation = layout.conversations_dir.join(format!("{UUID}.pb"));
    assert_eq!(report.conversation.as_deref(), Some(conversation.as_path()));
    assert_eq!(std::fs::read(conversation).unwrap(), b"\x08\x01");
}

#[tokio::test]
async fn brain_without_conversation_still_pulls() {
    let (mirror, backend) = memory_mirror();
    mirror
        .upsert_brain_metadata(CODE, &Brain::discovered(UUID, 0, 1, 1))
        .await
        .unwrap();
    backend.insert_object(&key(UUID, "only.md"), b"x");
    let tmp = TempDir::new().unwrap();

    let report = pull_brain(&mirror, CODE, UUID, &layout(&tmp), &mut |_| {})
        .await
        .unwrap();
    assert_eq!(report.downloaded, 1);
    assert!(report.conversation.is_none());
}

#[tokio::test]
async fn unknown_brain_lists_available() {
    let (mirror, backend) = memory_mirror();
    seed(&mirror, &backend).await;
    let tmp = TempDir::new().unwrap();

    let err = pull_brain(&mirror, CODE, "not-a-real-uuid", &layout(&tmp), &mut |_| {})
        .await
        .unwrap_err();
    match err {
        PullError::UnknownBrain { available, .. } => {
            assert_eq!(available, vec![format!("{UUID} (./{UUID})")]);
        }
        other => panic!("expected UnknownBrain, got {other:?}"),
    }
    assert!(!tmp.path().join("brain").exists());
}

#[tokio::test]
async fn failed_download_is_reported_per_file() {
    let (mirror, backend) = memory_mirror();
    seed(&mirror, &backend).await;
    backend.fail_object(&key(UUID, "task.md"));
    let tmp = TempDir::new().unwrap();

    let report = pull_brain(&mirror, CODE, UUID, &layout(&tmp), &mut |_| {})
        .await
        .unwrap();
    assert_eq!(report.downloaded, 2);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].starts_with("task.md"));
}

#[tokio::test]
async fn path_like_uuid_is_rejected() {
    let (mirror, _backend) = memory_mirror();
    let tmp = TempDir::new().unwrap();
    let err = pull_brain(&mirror, CODE, "../escape", &layout(&tmp), &mut |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, PullError::InvalidUuid(_)));
}

#[tokio::test]
async fn find_brain_matches_inside_local_path() {
    let (mirror, _backend) = memory_mirror();
    mirror
        .upsert_brain_metadata(CODE, &Brain::discovered(UUID, 0, 0, 0))
        .await
        .unwrap();
    let records = mirror.list_brains(CODE).await.unwrap();

    let found = find_brain(&records, &UUID[..8]).unwrap();
    assert_eq!(found.uuid(), UUID);
    assert!(find_brain(&records, "ffffffff").is_none());
}
