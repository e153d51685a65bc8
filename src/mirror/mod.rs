//! Cloud mirror client.
//!
//! [`MirrorClient`] namespaces every brain row and object under a sync code and
//! delegates the actual storage to a [`CloudBackend`]: [`SupabaseBackend`] for
//! the hosted service, [`MemoryBackend`] for in-process use. A client built
//! without a backend fails every call with [`MirrorError::NotConfigured`].
//!
//! Object keys have the form `{sync_code}/{brain_name}/{file_path}`.

pub mod memory;
pub mod supabase;
pub mod types;

use async_trait::async_trait;
use std::sync::Arc;

use crate::brain::Brain;
use crate::config::BackendConfig;
use crate::scan::FileRecord;

pub use memory::MemoryBackend;
pub use supabase::SupabaseBackend;
pub use types::{
    BrainUpsert, CloudBrainRecord, FileUploadResult, RemoteFile, StorageEntry, SyncProgress,
    UploadBatch,
};

/// Maximum number of entries returned by one storage listing.
pub const LIST_LIMIT: usize = 1000;

#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// No backend URL/key configured. Distinct from an unreachable backend.
    #[error("cloud backend not configured (set backend.url and backend.anon_key)")]
    NotConfigured,

    #[error("invalid backend url: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("unexpected backend response: {0}")]
    Decode(String),
}

impl MirrorError {
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured)
    }
}

/// Raw storage operations against a hosted row store and object bucket.
#[async_trait]
pub trait CloudBackend: Send + Sync {
    /// Insert or overwrite the row keyed by `(sync_code, name)`.
    async fn upsert_brain(&self, row: &BrainUpsert) -> Result<CloudBrainRecord, MirrorError>;

    /// All rows for a sync code, newest `created_at` first.
    async fn select_brains(&self, sync_code: &str) -> Result<Vec<CloudBrainRecord>, MirrorError>;

    async fn any_brain(&self, sync_code: &str) -> Result<bool, MirrorError>;

    async fn delete_brain(&self, sync_code: &str, name: &str) -> Result<(), MirrorError>;

    async fn insert_credential(&self, sync_code: &str, password_hash: &str) -> Result<(), MirrorError>;

    /// Stored password hash for a sync code, `None` if no credential row exists.
    async fn select_credential(&self, sync_code: &str) -> Result<Option<String>, MirrorError>;

    /// Store an object, overwriting any existing one.
    async fn put_object(&self, key: &str, bytes: Vec<u8>) -> Result<(), MirrorError>;

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, MirrorError>;

    /// Immediate children of `prefix` (no trailing slash).
    async fn list_objects(&self, prefix: &str) -> Result<Vec<StorageEntry>, MirrorError>;

    async fn remove_objects(&self, keys: &[String]) -> Result<(), MirrorError>;
}

/// Storage key for a file of a brain. An empty `path` yields the brain prefix.
pub fn object_key(sync_code: &str, brain_name: &str, path: &str) -> String {
    if path.is_empty() {
        format!("{sync_code}/{brain_name}")
    } else {
        format!("{sync_code}/{brain_name}/{path}")
    }
}

/// Sync-code-scoped access to brain metadata and files.
#[derive(Clone, Default)]
pub struct MirrorClient {
    backend: Option<Arc<dyn CloudBackend>>,
}

impl MirrorClient {
    pub fn new(backend: Arc<dyn CloudBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// A client with no backend. Every operation returns [`MirrorError::NotConfigured`].
    pub fn unconfigured() -> Self {
        Self { backend: None }
    }

    /// Build a Supabase-backed client, or an unconfigured one when URL or key is missing.
    pub fn from_config(config: &BackendConfig) -> Result<Self, MirrorError> {
        if !config.is_configured() {
            tracing::debug!("backend not configured; cloud operations disabled");
            return Ok(Self::unconfigured());
        }
        let backend = SupabaseBackend::new(config)?;
        Ok(Self::new(Arc::new(backend)))
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Fail fast with [`MirrorError::NotConfigured`] when there is no backend.
    pub fn ensure_configured(&self) -> Result<(), MirrorError> {
        self.backend().map(|_| ())
    }

    fn backend(&self) -> Result<&dyn CloudBackend, MirrorError> {
        self.backend.as_deref().ok_or(MirrorError::NotConfigured)
    }

    /// Write or overwrite the metadata row for `brain`.
    pub async fn upsert_brain_metadata(
        &self,
        sync_code: &str,
        brain: &Brain,
    ) -> Result<CloudBrainRecord, MirrorError> {
        let backend = self.backend()?;
        let row = BrainUpsert::new(sync_code, brain);
        let record = backend.upsert_brain(&row).await?;
        tracing::debug!(brain = %record.name, "brain metadata saved");
        Ok(record)
    }

    /// All brains stored under `sync_code`, newest first.
    pub async fn list_brains(&self, sync_code: &str) -> Result<Vec<CloudBrainRecord>, MirrorError> {
        self.backend()?.select_brains(sync_code).await
    }

    /// True if at least one brain row exists for `sync_code`.
    pub async fn brain_exists(&self, sync_code: &str) -> Result<bool, MirrorError> {
        self.backend()?.any_brain(sync_code).await
    }

    pub async fn delete_brain(&self, sync_code: &str, name: &str) -> Result<(), MirrorError> {
        self.backend()?.delete_brain(sync_code, name).await
    }

    pub async fn create_credential(
        &self,
        sync_code: &str,
        password_hash: &str,
    ) -> Result<(), MirrorError> {
        self.backend()?.insert_credential(sync_code, password_hash).await
    }

    pub async fn credential_hash(&self, sync_code: &str) -> Result<Option<String>, MirrorError> {
        self.backend()?.select_credential(sync_code).await
    }

    /// Upload one file. Backend failures are reported in the result, not as `Err`.
    pub async fn upload_file(
        &self,
        sync_code: &str,
        brain_name: &str,
        path: &str,
        bytes: Vec<u8>,
    ) -> Result<FileUploadResult, MirrorError> {
        let backend = self.backend()?;
        let key = object_key(sync_code, brain_name, path);
        match backend.put_object(&key, bytes).await {
            Ok(()) => Ok(FileUploadResult::uploaded(path)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "upload failed");
                Ok(FileUploadResult::failed(path, e.to_string()))
            }
        }
    }

    /// Upload `files` one at a time, reporting progress before each.
    pub async fn upload_files(
        &self,
        sync_code: &str,
        brain_name: &str,
        files: Vec<FileRecord>,
        on_progress: &mut dyn FnMut(SyncProgress),
    ) -> Result<UploadBatch, MirrorError> {
        let total = files.len();
        let mut batch = UploadBatch::default();

        for (completed, file) in files.into_iter().enumerate() {
            on_progress(SyncProgress {
                completed,
                total,
                current_file: file.path.clone(),
            });

            let result = self
                .upload_file(sync_code, brain_name, &file.path, file.content)
                .await?;
            match result.error {
                None => batch.uploaded += 1,
                Some(reason) => {
                    batch.failed += 1;
                    batch.errors.push(format!("{}: {reason}", result.path));
                }
            }
        }

        Ok(batch)
    }

    /// One level of the storage tree under `{sync_code}/{brain_name}/{sub_path}`.
    pub async fn list_entries(
        &self,
        sync_code: &str,
        brain_name: &str,
        sub_path: &str,
    ) -> Result<Vec<StorageEntry>, MirrorError> {
        let prefix = object_key(sync_code, brain_name, sub_path);
        self.backend()?.list_objects(&prefix).await
    }

    /// Every file stored for a brain, descending into folder entries.
    pub async fn list_files(
        &self,
        sync_code: &str,
        brain_name: &str,
    ) -> Result<Vec<RemoteFile>, MirrorError> {
        let mut files = Vec::new();
        let mut pending = vec![String::new()];

        while let Some(sub_path) = pending.pop() {
            for entry in self.list_entries(sync_code, brain_name, &sub_path).await? {
                let path = if sub_path.is_empty() {
                    entry.name().to_string()
                } else {
                    format!("{sub_path}/{}", entry.name())
                };
                match entry {
                    StorageEntry::File { size, .. } => files.push(RemoteFile { path, size }),
                    StorageEntry::Folder { .. } => pending.push(path),
                }
            }
        }

        Ok(files)
    }

    pub async fn download_file(
        &self,
        sync_code: &str,
        brain_name: &str,
        path: &str,
    ) -> Result<Vec<u8>, MirrorError> {
        let key = object_key(sync_code, brain_name, path);
        self.backend()?.get_object(&key).await
    }

    /// Remove every stored file of a brain. Returns the number of objects removed.
    pub async fn delete_files(&self, sync_code: &str, brain_name: &str) -> Result<usize, MirrorError> {
        let files = self.list_files(sync_code, brain_name).await?;
        if files.is_empty() {
            return Ok(0);
        }
        let keys: Vec<String> = files
            .iter()
            .map(|f| object_key(sync_code, brain_name, &f.path))
            .collect();
        self.backend()?.remove_objects(&keys).await?;
        tracing::info!(brain = %brain_name, count = keys.len(), "cloud files deleted");
        Ok(keys.len())
    }
}
