//! CLI `scan` command — list the brains under a directory.

use anyhow::{Context, Result};
use std::path::Path;

use memoria::brain::{self, BrainRegistry, Zone};
use memoria::scan::LocalDir;

use super::format_bytes;

pub async fn scan(
    root: &Path,
    query: Option<&str>,
    zone: Option<Zone>,
    json: bool,
) -> Result<()> {
    let dir = LocalDir::open(root)
        .await
        .with_context(|| format!("failed to open {}", root.display()))?;
    let mut registry = BrainRegistry::new();
    registry.replace(brain::discover(&dir).await?);

    let brains = registry.filter(query.unwrap_or(""), zone);

    if json {
        println!("{}", serde_json::to_string_pretty(&brains)?);
        return Ok(());
    }

    println!("Root: {}", root.display());
    if registry.is_empty_result() {
        println!("\nNo folders found.");
        return Ok(());
    }

    println!(
        "Brains: {} ({} files, {})",
        registry.brains().len(),
        registry.total_files(),
        format_bytes(registry.total_bytes())
    );
    println!();

    if brains.is_empty() {
        println!("No brains match the filter.");
        return Ok(());
    }

    println!(
        "  {:<32} {:<14} {:<15} {:>8} {:>10}",
        "NAME", "ZONE", "", "FILES", "SIZE"
    );
    for b in brains {
        println!(
            "  {:<32} {:<14} {:<15} {:>8} {:>10}",
            b.name,
            b.zone.as_str(),
            b.zone.label(),
            b.neuron_count,
            format_bytes(b.mass_bytes)
        );
    }

    Ok(())
}
