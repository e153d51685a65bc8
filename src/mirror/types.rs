//! Records exchanged with the hosted backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::brain::Brain;

/// A row of the `brains` table. `(sync_code, name)` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudBrainRecord {
    pub id: String,
    pub sync_code: String,
    pub name: String,
    pub zone: String,
    pub local_path: String,
    pub mass_bytes: u64,
    pub neuron_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CloudBrainRecord {
    /// The brain's folder identifier (`local_path` without the leading `./`).
    pub fn uuid(&self) -> &str {
        self.local_path.strip_prefix("./").unwrap_or(&self.local_path)
    }
}

/// Body of a metadata upsert.
#[derive(Debug, Clone, Serialize)]
pub struct BrainUpsert {
    pub sync_code: String,
    pub name: String,
    pub zone: String,
    pub local_path: String,
    pub mass_bytes: u64,
    pub neuron_count: u64,
    pub updated_at: DateTime<Utc>,
}

impl BrainUpsert {
    pub fn new(sync_code: &str, brain: &Brain) -> Self {
        Self {
            sync_code: sync_code.to_string(),
            name: brain.name.clone(),
            zone: brain.zone.as_str().to_string(),
            local_path: brain.local_path.clone(),
            mass_bytes: brain.mass_bytes,
            neuron_count: brain.neuron_count,
            updated_at: Utc::now(),
        }
    }
}

/// One entry of a single-level storage listing.
///
/// On the wire a folder is an object with a null `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageEntry {
    File { name: String, size: u64 },
    Folder { name: String },
}

impl StorageEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } | Self::Folder { name } => name,
        }
    }
}

/// A file found by a recursive listing, addressed relative to the brain root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteFile {
    pub path: String,
    pub size: u64,
}

impl RemoteFile {
    /// Last path component.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Outcome of a single upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUploadResult {
    pub path: String,
    /// Failure reason, `None` on success.
    pub error: Option<String>,
}

impl FileUploadResult {
    pub fn uploaded(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            error: None,
        }
    }

    pub fn failed(path: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Progress report emitted before each file of a batch transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncProgress {
    pub completed: usize,
    pub total: usize,
    pub current_file: String,
}

/// Aggregate of one brain's uploads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadBatch {
    pub uploaded: usize,
    pub failed: usize,
    /// `"<path>: <reason>"` for each failure.
    pub errors: Vec<String>,
}
