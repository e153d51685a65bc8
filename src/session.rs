//! Session context.
//!
//! Owns everything a scan or sync needs: the mirror client, the stored pairing
//! credential, the mounted root directory, the brain registry of the last scan,
//! and the activity log. Callers create one and pass it explicitly.

use crate::activity::{ActivityLog, LogModule};
use crate::brain::{self, Brain, BrainRegistry};
use crate::config::MemoriaConfig;
use crate::mirror::{CloudBrainRecord, MirrorClient, MirrorError, SyncProgress};
use crate::pairing::{CredentialStore, PairingError, SyncCode, SyncCredential};
use crate::scan::{DirHandle, ScanError};
use crate::sync::{self, SyncSummary};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no sync code; run `memoria pair new` or `memoria pair join <CODE>`")]
    NoSyncCode,

    #[error("no directory mounted")]
    NoRootMounted,

    #[error("no brains to sync; the mounted directory has no folders")]
    NothingToSync,

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Mirror(#[from] MirrorError),

    #[error(transparent)]
    Pairing(#[from] PairingError),
}

pub struct Session {
    mirror: MirrorClient,
    store: CredentialStore,
    credential: Option<SyncCredential>,
    root: Option<Box<dyn DirHandle>>,
    registry: BrainRegistry,
    log: ActivityLog,
}

impl Session {
    /// Build a session from its parts, loading any stored credential.
    pub fn new(mirror: MirrorClient, store: CredentialStore) -> Result<Self, SessionError> {
        let credential = store.load()?;
        Ok(Self {
            mirror,
            store,
            credential,
            root: None,
            registry: BrainRegistry::new(),
            log: ActivityLog::new(),
        })
    }

    pub fn from_config(config: &MemoriaConfig) -> Result<Self, SessionError> {
        let mirror = MirrorClient::from_config(&config.backend)?;
        let store = CredentialStore::new(config.resolved_credentials_path());
        Self::new(mirror, store)
    }

    pub fn mirror(&self) -> &MirrorClient {
        &self.mirror
    }

    pub fn credential_store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn credential(&self) -> Option<&SyncCredential> {
        self.credential.as_ref()
    }

    pub fn sync_code(&self) -> Option<&SyncCode> {
        self.credential.as_ref().map(|c| &c.sync_code)
    }

    /// Persist and adopt a credential produced by the pairing flow.
    pub fn connect(&mut self, credential: SyncCredential) -> Result<(), SessionError> {
        self.store.save(&credential)?;
        self.log.info(
            LogModule::Core,
            format!("Connected with sync code {}", credential.sync_code),
        );
        self.credential = Some(credential);
        Ok(())
    }

    /// Use `code` for this session only, without persisting it.
    pub fn use_code(&mut self, code: SyncCode) {
        self.credential = Some(SyncCredential {
            sync_code: code,
            password_hash: None,
        });
    }

    /// Forget the stored credential.
    pub fn disconnect(&mut self) -> Result<(), SessionError> {
        self.store.clear()?;
        self.credential = None;
        self.log.info(LogModule::Core, "Disconnected");
        Ok(())
    }

    /// Mount `root` and scan it, replacing the registry.
    pub async fn mount(&mut self, root: Box<dyn DirHandle>) -> Result<&[Brain], SessionError> {
        let brains = brain::discover(root.as_ref()).await?;
        self.registry.replace(brains);
        self.root = Some(root);
        self.log.info(LogModule::Fs, "Local storage scanned successfully");
        Ok(self.registry.brains())
    }

    /// Re-scan the mounted root.
    pub async fn rescan(&mut self) -> Result<&[Brain], SessionError> {
        let root = self.root.as_deref().ok_or(SessionError::NoRootMounted)?;
        let brains = brain::discover(root).await?;
        self.registry.replace(brains);
        Ok(self.registry.brains())
    }

    pub fn registry(&self) -> &BrainRegistry {
        &self.registry
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    /// Brains stored in the cloud under the session's sync code.
    pub async fn cloud_brains(&self) -> Result<Vec<CloudBrainRecord>, SessionError> {
        let code = self.sync_code().ok_or(SessionError::NoSyncCode)?;
        Ok(self.mirror.list_brains(code.as_str()).await?)
    }

    /// Mirror every scanned brain. Taking `&mut self` keeps runs from overlapping.
    pub async fn sync(
        &mut self,
        on_progress: &mut dyn FnMut(&str, SyncProgress),
    ) -> Result<SyncSummary, SessionError> {
        let code = self.sync_code().ok_or(SessionError::NoSyncCode)?.clone();
        let root = self.root.as_deref().ok_or(SessionError::NoRootMounted)?;
        if self.registry.is_empty_result() || self.registry.brains().is_empty() {
            return Err(SessionError::NothingToSync);
        }

        let summary = sync::sync_all(
            &self.mirror,
            code.as_str(),
            self.registry.brains(),
            root,
            on_progress,
        )
        .await?;
        self.log.extend(summary.log.clone());
        Ok(summary)
    }
}
