//! CLI `purge` command — delete a brain's files and metadata from the cloud.

use anyhow::{bail, Result};

use memoria::config::MemoriaConfig;
use memoria::session::Session;

use super::{confirm, resolve_code};

pub async fn purge(config: &MemoriaConfig, brain: &str, code: Option<&str>, yes: bool) -> Result<()> {
    let mut session = Session::from_config(config)?;
    let code = resolve_code(code, &mut session)?;

    let records = session.cloud_brains().await?;
    if !records.iter().any(|r| r.name == brain) {
        bail!("no brain named {brain:?} for sync code {code}");
    }

    if !yes {
        println!("This permanently deletes every cloud file and the metadata of {brain:?}.");
        println!("Local files are not touched.");
        if !confirm("Continue?")? {
            bail!("purge cancelled");
        }
    }

    let mirror = session.mirror();
    let removed = mirror.delete_files(code.as_str(), brain).await?;
    mirror.delete_brain(code.as_str(), brain).await?;

    println!("Purged {brain}: {removed} file(s) and its metadata removed.");
    Ok(())
}
