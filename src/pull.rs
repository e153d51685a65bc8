//! Pull a mirrored brain back down onto this machine.
//!
//! The brain is located by the UUID embedded in its `local_path`, every stored file
//! is written under `<brain_dir>/<uuid>/`, and the first `*.pb` conversation file
//! kept under `<name>/_conversation` (if any) is placed at
//! `<conversations_dir>/<uuid>.pb`.

use serde::Serialize;
use std::path::{Component, Path, PathBuf};

use crate::mirror::{CloudBrainRecord, MirrorClient, MirrorError, SyncProgress};

/// Folder, relative to a brain, holding its conversation history.
pub const CONVERSATION_FOLDER: &str = "_conversation";

#[derive(Debug, thiserror::Error)]
pub enum PullError {
    #[error("brain with UUID {uuid} not found for sync code {sync_code}")]
    UnknownBrain {
        uuid: String,
        sync_code: String,
        /// `name (local_path)` of every brain that does exist.
        available: Vec<String>,
    },

    #[error("invalid brain UUID {0:?}")]
    InvalidUuid(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Mirror(#[from] MirrorError),
}

/// Destination directories for pulled data.
#[derive(Debug, Clone)]
pub struct PullLayout {
    pub brain_dir: PathBuf,
    pub conversations_dir: PathBuf,
}

impl PullLayout {
    pub fn from_config(config: &crate::config::MemoriaConfig) -> Self {
        Self {
            brain_dir: config.resolved_brain_dir(),
            conversations_dir: config.resolved_conversations_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PullReport {
    pub brain_name: String,
    pub destination: PathBuf,
    pub downloaded: usize,
    /// `"<path>: <reason>"` for each file that could not be downloaded or written.
    pub failures: Vec<String>,
    pub conversation: Option<PathBuf>,
}

/// The first brain whose `local_path` contains `uuid`.
pub fn find_brain<'a>(records: &'a [CloudBrainRecord], uuid: &str) -> Option<&'a CloudBrainRecord> {
    records.iter().find(|r| r.local_path.contains(uuid))
}

/// Download brain `uuid` stored under `sync_code` into `layout`.
///
/// Individual file failures are collected in the report; listing failures and
/// an unknown brain abort the pull.
pub async fn pull_brain(
    mirror: &MirrorClient,
    sync_code: &str,
    uuid: &str,
    layout: &PullLayout,
    on_progress: &mut dyn FnMut(SyncProgress),
) -> Result<PullReport, PullError> {
    if !is_single_component(uuid) {
        return Err(PullError::InvalidUuid(uuid.to_string()));
    }

    let records = mirror.list_brains(sync_code).await?;
    let brain = find_brain(&records, uuid).ok_or_else(|| PullError::UnknownBrain {
        uuid: uuid.to_string(),
        sync_code: sync_code.to_string(),
        available: records
            .iter()
            .map(|r| format!("{} ({})", r.name, r.local_path))
            .collect(),
    })?;

    let destination = layout.brain_dir.join(uuid);
    create_dir_all(&destination).await?;

    let files = mirror.list_files(sync_code, &brain.name).await?;
    tracing::info!(brain = %brain.name, files = files.len(), "downloading brain");

    let total = files.len();
    let mut downloaded = 0;
    let mut failures = Vec::new();

    for (completed, file) in files.iter().enumerate() {
        on_progress(SyncProgress {
            completed,
            total,
            current_file: file.path.clone(),
        });

        let Some(target) = safe_join(&destination, &file.path) else {
            tracing::warn!(path = %file.path, "refusing to write outside the brain folder");
            failures.push(format!("{}: unsafe path", file.path));
            continue;
        };

        match download_to(mirror, sync_code, &brain.name, &file.path, &target).await {
            Ok(()) => downloaded += 1,
            Err(e) => {
                tracing::warn!(path = %file.path, error = %e, "failed to download file");
                failures.push(format!("{}: {e}", file.path));
            }
        }
    }

    let conversation = pull_conversation(mirror, sync_code, &brain.name, uuid, layout).await;

    Ok(PullReport {
        brain_name: brain.name.clone(),
        destination,
        downloaded,
        failures,
        conversation,
    })
}

/// Fetch the conversation file, if any. Absence or failure is not an error.
async fn pull_conversation(
    mirror: &MirrorClient,
    sync_code: &str,
    brain_name: &str,
    uuid: &str,
    layout: &PullLayout,
) -> Option<PathBuf> {
    let folder = format!("{brain_name}/{CONVERSATION_FOLDER}");
    let files = match mirror.list_files(sync_code, &folder).await {
        Ok(files) => files,
        Err(e) => {
            tracing::debug!(error = %e, "no conversation file found");
            return None;
        }
    };
    let pb = files.into_iter().find(|f| f.name().ends_with(".pb"))?;

    if let Err(e) = create_dir_all(&layout.conversations_dir).await {
        tracing::warn!(error = %e, "failed to create conversations directory");
        return None;
    }
    let target = layout.conversations_dir.join(format!("{uuid}.pb"));
    match download_to(mirror, sync_code, &folder, &pb.path, &target).await {
        Ok(()) => Some(target),
        Err(e) => {
            tracing::warn!(error = %e, "failed to download conversation file");
            None
        }
    }
}

async fn download_to(
    mirror: &MirrorClient,
    sync_code: &str,
    brain_name: &str,
    path: &str,
    target: &Path,
) -> Result<(), PullError> {
    let bytes = mirror.download_file(sync_code, brain_name, path).await?;
    if let Some(parent) = target.parent() {
        create_dir_all(parent).await?;
    }
    tokio::fs::write(target, bytes)
        .await
        .map_err(|source| PullError::Io {
            path: target.to_path_buf(),
            source,
        })
}

async fn create_dir_all(path: &Path) -> Result<(), PullError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| PullError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Join a slash-separated relative path onto `root`, rejecting anything that
/// could escape it.
fn safe_join(root: &Path, relative: &str) -> Option<PathBuf> {
    let mut out = root.to_path_buf();
    for segment in relative.split('/') {
        if !is_single_component(segment) {
            return None;
        }
        out.push(segment);
    }
    Some(out)
}
