//! Sync code generation, parsing, and password hashing.

use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

use super::PairingError;

/// Letters used in generated codes. `I` and `O` are excluded as easily confused with digits.
pub const CODE_LETTERS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Digits used in generated codes. `0` and `1` are excluded.
pub const CODE_DIGITS: &[u8] = b"23456789";

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 4;

/// Which of the two accepted code shapes a code has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeFormat {
    /// `LLL-DDDD-LLLL`, paired with a password.
    Protected,
    /// `LLL-DDD-LLL`, issued before passwords existed. No password.
    Legacy,
}

fn protected_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{3}-[0-9]{4}-[A-Z]{4}$").expect("valid regex"))
}

fn legacy_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{3}-[0-9]{3}-[A-Z]{3}$").expect("valid regex"))
}

/// A validated sync code. The sole partition key into the cloud store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SyncCode(String);

impl SyncCode {
    /// Normalise (trim, upper-case) and validate user input.
    pub fn parse(input: &str) -> Result<Self, PairingError> {
        let clean = input.trim().to_ascii_uppercase();
        if protected_pattern().is_match(&clean) || legacy_pattern().is_match(&clean) {
            Ok(Self(clean))
        } else {
            Err(PairingError::InvalidFormat(input.trim().to_string()))
        }
    }

    pub fn format(&self) -> CodeFormat {
        if protected_pattern().is_match(&self.0) {
            CodeFormat::Protected
        } else {
            CodeFormat::Legacy
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SyncCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SyncCode {
    type Error = PairingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SyncCode> for String {
    fn from(code: SyncCode) -> Self {
        code.0
    }
}

/// Generate a new `LLL-DDDD-LLLL` code with an independent uniform draw per character.
pub fn generate_code<R: Rng>(rng: &mut R) -> SyncCode {
    let mut pick = |alphabet: &[u8], n: usize| -> String {
        (0..n)
            .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
            .collect()
    };
    let letters_a = pick(CODE_LETTERS, 3);
    let digits = pick(CODE_DIGITS, 4);
    let letters_b = pick(CODE_LETTERS, 4);
    SyncCode(format!("{letters_a}-{digits}-{letters_b}"))
}

/// Lowercase hex SHA-256 of the password's UTF-8 bytes.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Check a new password and its confirmation.
pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), PairingError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PairingError::PasswordTooShort);
    }
    if password != confirm {
        return Err(PairingError::PasswordMismatch);
    }
    Ok(())
}
