//! Pairing codes and the credential flow that produces them.

pub mod code;
pub mod credentials;
pub mod flow;

pub use code::{generate_code, hash_password, CodeFormat, SyncCode};
pub use credentials::{CredentialStore, SyncCredential};
pub use flow::{PairingFlow, PairingState};

use crate::mirror::MirrorError;

#[derive(Debug, thiserror::Error)]
pub enum PairingError {
    #[error("invalid code format {0:?}, expected ABC-1234-DEFG")]
    InvalidFormat(String),

    #[error("password must be at least {} characters", code::MIN_PASSWORD_LEN)]
    PasswordTooShort,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("enter your password")]
    PasswordRequired,

    #[error("sync code not found")]
    NotFound,

    #[error("incorrect password")]
    IncorrectPassword,

    #[error("invalid pairing step: {0}")]
    InvalidState(&'static str),

    #[error("credential store: {0}")]
    Store(String),

    #[error(transparent)]
    Mirror(#[from] MirrorError),
}

impl PairingError {
    /// Errors the user can fix by changing their input.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat(_)
                | Self::PasswordTooShort
                | Self::PasswordMismatch
                | Self::PasswordRequired
        )
    }
}
