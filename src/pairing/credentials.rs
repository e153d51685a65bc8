//! Locally persisted pairing credential.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::code::SyncCode;
use super::PairingError;

/// A sync code plus the password hash it was paired with (none for legacy codes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCredential {
    pub sync_code: SyncCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

/// TOML file holding the active credential between runs.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored credential, or `None` if nothing has been saved.
    pub fn load(&self) -> Result<Option<SyncCredential>, PairingError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path).map_err(|e| self.store_error(e))?;
        let credential = toml::from_str(&contents).map_err(|e| self.store_error(e))?;
        Ok(Some(credential))
    }

    pub fn save(&self, credential: &SyncCredential) -> Result<(), PairingError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.store_error(e))?;
        }
        let contents = toml::to_string(credential).map_err(|e| self.store_error(e))?;
        std::fs::write(&self.path, contents).map_err(|e| self.store_error(e))?;
        tracing::debug!(path = %self.path.display(), "credential saved");
        Ok(())
    }

    /// Remove the stored credential. Missing file is not an error.
    pub fn clear(&self) -> Result<(), PairingError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.store_error(e)),
        }
    }

    fn store_error(&self, e: impl std::fmt::Display) -> PairingError {
        PairingError::Store(format!("{}: {e}", self.path.display()))
    }
}
