//! CLI `brains` command — list what is stored in the cloud.

use anyhow::Result;

use memoria::config::MemoriaConfig;
use memoria::session::Session;

use super::{format_bytes, resolve_code};

pub async fn brains(config: &MemoriaConfig, code: Option<&str>) -> Result<()> {
    let mut session = Session::from_config(config)?;
    let code = resolve_code(code, &mut session)?;
    let records = session.cloud_brains().await?;

    if records.is_empty() {
        println!("No brains stored for {code}.");
        return Ok(());
    }

    println!("Brains for {code} ({}):\n", records.len());
    for r in &records {
        println!(
            "  {:<32} {:<14} {:>8} files {:>10}  updated {}",
            r.name,
            r.zone,
            r.neuron_count,
            format_bytes(r.mass_bytes),
            r.updated_at.format("%Y-%m-%d %H:%M")
        );
        println!("    uuid: {}", r.uuid());
    }
    Ok(())
}
