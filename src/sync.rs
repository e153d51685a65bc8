//! Sync orchestrator.
//!
//! [`sync_all`] mirrors each brain in turn: save its metadata row, read its files
//! from the mounted root, upload them one at a time. A failure on one brain or one
//! file is recorded and the batch moves on; only a missing backend configuration
//! aborts the run. There is no rollback: metadata can land without any files, and
//! files can land partially.

use serde::Serialize;

use crate::activity::{ActivityLog, LogModule};
use crate::brain::Brain;
use crate::mirror::{MirrorClient, MirrorError, SyncProgress};
use crate::scan::{self, DirHandle};

/// Outcome of a [`sync_all`] run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncSummary {
    /// Brains attempted (the empty-scan placeholder is never attempted).
    pub brains: usize,
    pub uploaded: usize,
    pub failed: usize,
    pub total_files: usize,
    /// Names of brains whose metadata row could not be saved.
    pub metadata_failures: Vec<String>,
    /// `"<path>: <reason>"` for each file or directory that could not be mirrored.
    pub errors: Vec<String>,
    pub log: ActivityLog,
}

/// Mirror `brains` (found under `root`) into the cloud under `sync_code`.
///
/// `on_progress` receives the brain name and a progress report before each upload.
pub async fn sync_all(
    mirror: &MirrorClient,
    sync_code: &str,
    brains: &[Brain],
    root: &dyn DirHandle,
    on_progress: &mut dyn FnMut(&str, SyncProgress),
) -> Result<SyncSummary, MirrorError> {
    mirror.ensure_configured()?;
    let mut summary = SyncSummary::default();

    for brain in brains.iter().filter(|b| !b.is_placeholder()) {
        summary.brains += 1;

        // 1. Metadata; failure does not stop the file upload
        if let Err(e) = mirror.upsert_brain_metadata(sync_code, brain).await {
            if e.is_not_configured() {
                return Err(e);
            }
            summary
                .log
                .error(LogModule::Net, format!("Failed to save {}: {e}", brain.name));
            summary.metadata_failures.push(brain.name.clone());
        }

        // 2. Collect files from the brain's folder
        let files = match root.open_dir(brain.dir_name()).await {
            Ok(handle) => scan::collect_files(handle.as_ref()).await,
            Err(e) => Err(e),
        };
        let files = match files {
            Ok(files) => files,
            Err(e) => {
                summary.log.warn(
                    LogModule::Fs,
                    format!("Could not access directory for {}: {e}", brain.name),
                );
                summary.errors.push(format!("{}: {e}", brain.local_path));
                continue;
            }
        };

        summary.total_files += files.len();
        if files.is_empty() {
            continue;
        }

        // 3. Upload sequentially
        summary.log.info(
            LogModule::Net,
            format!("Uploading {} files from {}...", files.len(), brain.name),
        );
        let mut report = |progress: SyncProgress| on_progress(&brain.name, progress);
        let batch = mirror
            .upload_files(sync_code, &brain.name, files, &mut report)
            .await?;

        // 4. Aggregate
        summary.uploaded += batch.uploaded;
        summary.failed += batch.failed;
        if batch.failed > 0 {
            summary.log.warn(
                LogModule::Net,
                format!("{} files failed to upload", batch.failed),
            );
        }
        summary.errors.extend(batch.errors);
    }

    summary.log.info(
        LogModule::Net,
        format!(
            "Synced {} brains, {}/{} files uploaded",
            summary.brains, summary.uploaded, summary.total_files
        ),
    );
    Ok(summary)
}
