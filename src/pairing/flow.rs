//! Pairing state machine: `Menu → New | Existing → Connected`.
//!
//! All input validation happens before any backend call. Joining checks that the
//! code exists first and only then compares the password hash.

use rand::Rng;

use super::code::{generate_code, hash_password, validate_new_password, CodeFormat, SyncCode, MIN_PASSWORD_LEN};
use super::credentials::{CredentialStore, SyncCredential};
use super::PairingError;
use crate::mirror::MirrorClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingState {
    Menu,
    /// A freshly generated code awaiting a password.
    New { code: SyncCode },
    /// Waiting for an existing code and its password.
    Existing,
    Connected { credential: SyncCredential },
}

pub struct PairingFlow<'a> {
    mirror: &'a MirrorClient,
    state: PairingState,
}

impl<'a> PairingFlow<'a> {
    pub fn new(mirror: &'a MirrorClient) -> Self {
        Self {
            mirror,
            state: PairingState::Menu,
        }
    }

    /// Start `Connected` if a credential is already stored, `Menu` otherwise.
    pub fn resume(mirror: &'a MirrorClient, credential: Option<SyncCredential>) -> Self {
        let state = match credential {
            Some(credential) => PairingState::Connected { credential },
            None => PairingState::Menu,
        };
        Self { mirror, state }
    }

    pub fn state(&self) -> &PairingState {
        &self.state
    }

    pub fn credential(&self) -> Option<&SyncCredential> {
        match &self.state {
            PairingState::Connected { credential } => Some(credential),
            _ => None,
        }
    }

    /// Generate a new code and move to `New`. Regenerating while in `New` replaces it.
    pub fn generate<R: Rng>(&mut self, rng: &mut R) -> Result<SyncCode, PairingError> {
        match self.state {
            PairingState::Menu | PairingState::New { .. } => {
                let code = generate_code(rng);
                self.state = PairingState::New { code: code.clone() };
                Ok(code)
            }
            _ => Err(PairingError::InvalidState("generate requires the menu")),
        }
    }

    pub fn choose_existing(&mut self) -> Result<(), PairingError> {
        match self.state {
            PairingState::Menu => {
                self.state = PairingState::Existing;
                Ok(())
            }
            _ => Err(PairingError::InvalidState("choose_existing requires the menu")),
        }
    }

    /// Return from `New` or `Existing` to `Menu`.
    pub fn back(&mut self) {
        if matches!(self.state, PairingState::New { .. } | PairingState::Existing) {
            self.state = PairingState::Menu;
        }
    }

    /// Register the generated code with a password and move to `Connected`.
    pub async fn create(&mut self, password: &str, confirm: &str) -> Result<&SyncCredential, PairingError> {
        let code = match &self.state {
            PairingState::New { code } => code.clone(),
            _ => return Err(PairingError::InvalidState("create requires a generated code")),
        };
        validate_new_password(password, confirm)?;

        let password_hash = hash_password(password);
        self.mirror
            .create_credential(code.as_str(), &password_hash)
            .await?;
        tracing::info!(code = %code, "sync code created");

        self.connect(SyncCredential {
            sync_code: code,
            password_hash: Some(password_hash),
        })
    }

    /// Join an existing code and move to `Connected`.
    ///
    /// Protected codes need the password they were created with. Legacy codes
    /// have no password and only need at least one stored brain.
    pub async fn join(&mut self, input: &str, password: &str) -> Result<&SyncCredential, PairingError> {
        if self.state != PairingState::Existing {
            return Err(PairingError::InvalidState("join requires the existing-code step"));
        }
        let code = SyncCode::parse(input)?;

        let credential = match code.format() {
            CodeFormat::Protected => {
                if password.chars().count() < MIN_PASSWORD_LEN {
                    return Err(PairingError::PasswordRequired);
                }
                let stored = self
                    .mirror
                    .credential_hash(code.as_str())
                    .await?
                    .ok_or(PairingError::NotFound)?;
                let password_hash = hash_password(password);
                if stored != password_hash {
                    return Err(PairingError::IncorrectPassword);
                }
                SyncCredential {
                    sync_code: code,
                    password_hash: Some(password_hash),
                }
            }
            CodeFormat::Legacy => {
                if !self.mirror.brain_exists(code.as_str()).await? {
                    return Err(PairingError::NotFound);
                }
                SyncCredential {
                    sync_code: code,
                    password_hash: None,
                }
            }
        };

        tracing::info!(code = %credential.sync_code, "joined existing sync code");
        self.connect(credential)
    }

    /// Forget the credential locally and return to `Menu`.
    pub fn disconnect(&mut self, store: &CredentialStore) -> Result<(), PairingError> {
        store.clear()?;
        self.state = PairingState::Menu;
        Ok(())
    }

    fn connect(&mut self, credential: SyncCredential) -> Result<&SyncCredential, PairingError> {
        self.state = PairingState::Connected { credential };
        self.credential()
            .ok_or(PairingError::InvalidState("credential missing after connect"))
    }
}
