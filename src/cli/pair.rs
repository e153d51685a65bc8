//! CLI `pair` commands — create, join, show, or forget the sync code.

use anyhow::{bail, Result};

use memoria::config::MemoriaConfig;
use memoria::mirror::MirrorClient;
use memoria::pairing::{CodeFormat, CredentialStore, PairingError, PairingFlow, SyncCode};
use memoria::session::Session;

use super::prompt;

/// Password attempts before giving up.
const MAX_ATTEMPTS: usize = 3;

/// Generate a new code, protect it with a password, and store it.
pub async fn new(config: &MemoriaConfig) -> Result<()> {
    let mut session = Session::from_config(config)?;
    if let Some(code) = session.sync_code() {
        bail!("already paired with {code}; run `memoria pair disconnect` first");
    }

    let mut flow = PairingFlow::new(session.mirror());
    let code = flow.generate(&mut rand::rng())?;
    println!("Your new sync code: {code}");
    println!("Keep it safe. You will need it with the password to connect other devices.\n");

    let mut attempt = 0;
    let credential = loop {
        attempt += 1;
        let password = prompt("Password (min 4 characters): ")?;
        let confirm = prompt("Confirm password: ")?;
        match flow.create(&password, &confirm).await {
            Ok(credential) => break credential.clone(),
            Err(e) if e.is_input_error() && attempt < MAX_ATTEMPTS => println!("{e}\n"),
            Err(e) => return Err(e.into()),
        }
    };

    session.connect(credential)?;
    println!("\nPaired. Sync code {code} saved to {}", session.credential_store().path().display());
    Ok(())
}

/// Join an existing code.
pub async fn join(config: &MemoriaConfig, input: &str) -> Result<()> {
    let mut session = Session::from_config(config)?;
    // Reject a malformed code before asking for anything else.
    let code = SyncCode::parse(input)?;

    let mut flow = PairingFlow::new(session.mirror());
    flow.choose_existing()?;

    let credential = match code.format() {
        CodeFormat::Legacy => {
            println!("Legacy code without a password.");
            flow.join(code.as_str(), "").await?.clone()
        }
        CodeFormat::Protected => {
            let mut attempt = 0;
            loop {
                attempt += 1;
                let password = prompt("Password: ")?;
                match flow.join(code.as_str(), &password).await {
                    Ok(credential) => break credential.clone(),
                    Err(e @ (PairingError::PasswordRequired | PairingError::IncorrectPassword))
                        if attempt < MAX_ATTEMPTS =>
                    {
                        println!("{e}");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
    };

    session.connect(credential)?;
    println!("Connected with sync code {code}");
    Ok(())
}

/// Show the stored code.
pub fn status(config: &MemoriaConfig) -> Result<()> {
    let store = CredentialStore::new(config.resolved_credentials_path());
    match store.load()? {
        Some(credential) => {
            let kind = match credential.sync_code.format() {
                CodeFormat::Protected => "password protected",
                CodeFormat::Legacy => "legacy, no password",
            };
            println!("Sync code: {} ({kind})", credential.sync_code);
            println!("Stored in: {}", store.path().display());
        }
        None => println!("Not paired. Run `memoria pair new` or `memoria pair join <CODE>`."),
    }
    if !config.backend.is_configured() {
        println!("Cloud backend: not configured");
    }
    Ok(())
}

/// Forget the stored code. Cloud data is left untouched.
pub fn disconnect(config: &MemoriaConfig) -> Result<()> {
    // No backend needed to forget the code.
    let store = CredentialStore::new(config.resolved_credentials_path());
    let mut session = Session::new(MirrorClient::unconfigured(), store)?;
    if session.sync_code().is_none() {
        println!("Not paired.");
        return Ok(());
    }
    session.disconnect()?;
    println!("Disconnected. Cloud data was not deleted.");
    Ok(())
}
