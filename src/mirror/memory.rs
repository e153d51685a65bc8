//! In-process backend holding rows and objects in memory.
//!
//! Behaves like the hosted service for listing (folder entries for nested keys)
//! and conflict handling, and can be told to fail specific operations.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Mutex;

use super::types::{BrainUpsert, CloudBrainRecord, StorageEntry};
use super::{CloudBackend, MirrorError};

#[derive(Default)]
struct State {
    brains: Vec<CloudBrainRecord>,
    credentials: HashMap<String, String>,
    objects: BTreeMap<String, Vec<u8>>,
    failing_upserts: HashSet<String>,
    failing_objects: HashSet<String>,
    offline: bool,
}

#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make metadata upserts for brain `name` fail.
    pub fn fail_upserts_for(&self, name: &str) {
        self.lock().failing_upserts.insert(name.to_string());
    }

    /// Make writes and reads of object `key` fail.
    pub fn fail_object(&self, key: &str) {
        self.lock().failing_objects.insert(key.to_string());
    }

    /// Make every call fail as if the service were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Snapshot of all stored object keys.
    pub fn object_keys(&self) -> Vec<String> {
        self.lock().objects.keys().cloned().collect()
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().objects.get(key).cloned()
    }

    pub fn insert_object(&self, key: &str, bytes: &[u8]) {
        self.lock().objects.insert(key.to_string(), bytes.to_vec());
    }

    pub fn brain_rows(&self) -> Vec<CloudBrainRecord> {
        self.lock().brains.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock only means a test thread panicked mid-update.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn online(state: &State) -> Result<(), MirrorError> {
        if state.offline {
            return Err(MirrorError::Backend {
                status: 503,
                message: "service unavailable".into(),
            });
        }
        Ok(())
    }
}

fn object_error(key: &str) -> MirrorError {
    MirrorError::Backend {
        status: 500,
        message: format!("storage write rejected for {key}"),
    }
}

#[async_trait]
impl CloudBackend for MemoryBackend {
    async fn upsert_brain(&self, row: &BrainUpsert) -> Result<CloudBrainRecord, MirrorError> {
        let mut state = self.lock();
        Self::online(&state)?;
        if state.failing_upserts.contains(&row.name) {
            return Err(MirrorError::Backend {
                status: 400,
                message: format!("upsert rejected for {}", row.name),
            });
        }

        if let Some(existing) = state
            .brains
            .iter_mut()
            .find(|b| b.sync_code == row.sync_code && b.name == row.name)
        {
            existing.zone = row.zone.clone();
            existing.local_path = row.local_path.clone();
            existing.mass_bytes = row.mass_bytes;
            existing.neuron_count = row.neuron_count;
            existing.updated_at = row.updated_at;
            return Ok(existing.clone());
        }

        let record = CloudBrainRecord {
            id: uuid::Uuid::now_v7().to_string(),
            sync_code: row.sync_code.clone(),
            name: row.name.clone(),
            zone: row.zone.clone(),
            local_path: row.local_path.clone(),
            mass_bytes: row.mass_bytes,
            neuron_count: row.neuron_count,
            created_at: Utc::now(),
            updated_at: row.updated_at,
        };
        state.brains.push(record.clone());
        Ok(record)
    }

    async fn select_brains(&self, sync_code: &str) -> Result<Vec<CloudBrainRecord>, MirrorError> {
        let state = self.lock();
        Self::online(&state)?;
        // Later inserts first, then a stable sort keeps that order for equal timestamps.
        let mut rows: Vec<CloudBrainRecord> = state
            .brains
            .iter()
            .rev()
            .filter(|b| b.sync_code == sync_code)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn any_brain(&self, sync_code: &str) -> Result<bool, MirrorError> {
        let state = self.lock();
        Self::online(&state)?;
        Ok(state.brains.iter().any(|b| b.sync_code == sync_code))
    }

    async fn delete_brain(&self, sync_code: &str, name: &str) -> Result<(), MirrorError> {
        let mut state = self.lock();
        Self::online(&state)?;
        state
            .brains
            .retain(|b| !(b.sync_code == sync_code && b.name == name));
        Ok(())
    }

    async fn insert_credential(&self, sync_code: &str, password_hash: &str) -> Result<(), MirrorError> {
        let mut state = self.lock();
        Self::online(&state)?;
        if state.credentials.contains_key(sync_code) {
            return Err(MirrorError::Backend {
                status: 409,
                message: "duplicate key value violates unique constraint".into(),
            });
        }
        state
            .credentials
            .insert(sync_code.to_string(), password_hash.to_string());
        Ok(())
    }

    async fn select_credential(&self, sync_code: &str) -> Result<Option<String>, MirrorError> {
        let state = self.lock();
        Self::online(&state)?;
        Ok(state.credentials.get(sync_code).cloned())
    }

    async fn put_object(&self, key: &str, bytes: Vec<u8>) -> Result<(), MirrorError> {
        let mut state = self.lock();
        Self::online(&state)?;
        if state.failing_objects.contains(key) {
            return Err(object_error(key));
        }
        state.objects.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, MirrorError> {
        let state = self.lock();
        Self::online(&state)?;
        if state.failing_objects.contains(key) {
            return Err(object_error(key));
        }
        state.objects.get(key).cloned().ok_or_else(|| MirrorError::Backend {
            status: 404,
            message: "Object not found".into(),
        })
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<StorageEntry>, MirrorError> {
        let state = self.lock();
        Self::online(&state)?;

        let dir_prefix = format!("{prefix}/");
        let mut folders = BTreeSet::new();
        let mut entries = Vec::new();

        for (key, bytes) in state.objects.range(dir_prefix.clone()..) {
            let Some(rest) = key.strip_prefix(&dir_prefix) else {
                break;
            };
            match rest.split_once('/') {
                Some((folder, _)) => {
                    folders.insert(folder.to_string());
                }
                None => entries.push(StorageEntry::File {
                    name: rest.to_string(),
                    size: bytes.len() as u64,
                }),
            }
        }

        let mut listing: Vec<StorageEntry> = folders
            .into_iter()
            .map(|name| StorageEntry::Folder { name })
            .collect();
        listing.extend(entries);
        Ok(listing)
    }

    async fn remove_objects(&self, keys: &[String]) -> Result<(), MirrorError> {
        let mut state = self.lock();
        Self::online(&state)?;
        for key in keys {
            state.objects.remove(key);
        }
        Ok(())
    }
}
