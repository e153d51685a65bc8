//! CLI `sync` command — mirror every brain under a directory.

use anyhow::{bail, Context, Result};
use std::path::Path;

use memoria::config::MemoriaConfig;
use memoria::mirror::SyncProgress;
use memoria::scan::LocalDir;
use memoria::session::Session;

use super::{format_bytes, progress_bar, resolve_code};

pub async fn sync(config: &MemoriaConfig, root: &Path, code: Option<&str>) -> Result<()> {
    let mut session = Session::from_config(config)?;
    if !session.mirror().is_configured() {
        bail!("cloud backend not configured; set backend.url and backend.anon_key");
    }
    let code = resolve_code(code, &mut session)?;

    let dir = LocalDir::open(root)
        .await
        .with_context(|| format!("failed to open {}", root.display()))?;
    let brains = session.mount(Box::new(dir)).await?;
    let total: u64 = brains
        .iter()
        .filter(|b| !b.is_placeholder())
        .map(|b| b.neuron_count)
        .sum();
    println!(
        "Syncing {} brain(s) from {} with code {code}",
        session.registry().brains().len(),
        root.display()
    );
    println!(
        "  {} files, {}",
        total,
        format_bytes(session.registry().total_bytes())
    );

    let pb = progress_bar(total);
    let mut current_brain = String::new();
    let mut done_before_brain = 0u64;
    let mut last_total = 0u64;
    let mut on_progress = |brain: &str, progress: SyncProgress| {
        if brain != current_brain {
            done_before_brain += last_total;
            current_brain = brain.to_string();
        }
        last_total = progress.total as u64;
        pb.set_position(done_before_brain + progress.completed as u64);
        pb.set_message(format!("{brain}/{}", progress.current_file));
    };

    let summary = session.sync(&mut on_progress).await;
    pb.finish_and_clear();
    let summary = summary?;

    println!(
        "Synced {} brains, {}/{} files uploaded",
        summary.brains, summary.uploaded, summary.total_files
    );
    for name in &summary.metadata_failures {
        println!("  metadata not saved: {name}");
    }
    if !summary.errors.is_empty() {
        println!("\n{} error(s):", summary.errors.len());
        for e in &summary.errors {
            println!("  {e}");
        }
    }

    Ok(())
}
