//! CLI `pull` command — restore a brain from the cloud onto this machine.

use anyhow::{bail, Result};

use memoria::config::MemoriaConfig;
use memoria::mirror::SyncProgress;
use memoria::pairing::SyncCode;
use memoria::pull::{pull_brain, PullError, PullLayout};
use memoria::session::Session;

use super::progress_bar;

pub async fn pull(
    config: &MemoriaConfig,
    code: Option<&str>,
    uuid: Option<&str>,
    list: bool,
    show_resume: bool,
) -> Result<()> {
    let Some(code) = code else {
        bail!("Sync code is required. Use --code YOUR_SYNC_CODE");
    };
    let code = SyncCode::parse(code)?;
    let mut session = Session::from_config(config)?;
    session.use_code(code.clone());

    if list {
        let records = session.cloud_brains().await?;
        if records.is_empty() {
            println!("No brains found for sync code {code}");
            return Ok(());
        }
        println!("Brains for {code}:\n");
        for r in &records {
            println!("  {}", r.name);
            println!("    UUID: {}", r.uuid());
            println!("    Files: {}", r.neuron_count);
            println!("    Updated: {}\n", r.updated_at.format("%Y-%m-%d %H:%M:%S"));
        }
        return Ok(());
    }

    let Some(uuid) = uuid else {
        bail!("Either --uuid or --list is required");
    };

    let layout = PullLayout::from_config(config);
    println!("Pulling brain {uuid}...");

    let mut pb = None;
    let mut on_progress = |progress: SyncProgress| {
        let bar = pb.get_or_insert_with(|| progress_bar(progress.total as u64));
        bar.set_position(progress.completed as u64);
        bar.set_message(progress.current_file);
    };
    let result = pull_brain(
        session.mirror(),
        code.as_str(),
        uuid,
        &layout,
        &mut on_progress,
    )
    .await;
    if let Some(bar) = &pb {
        bar.finish_and_clear();
    }

    let report = match result {
        Ok(report) => report,
        Err(PullError::UnknownBrain { available, .. }) => {
            println!("Brain not found. Available brains:");
            for name in &available {
                println!("  {name}");
            }
            bail!("brain with UUID {uuid} not found for sync code {code}");
        }
        Err(e) => return Err(e.into()),
    };

    println!("Found brain: {}", report.brain_name);
    println!(
        "Downloaded {} file(s) to {}",
        report.downloaded,
        report.destination.display()
    );
    if let Some(path) = &report.conversation {
        println!("Conversation restored to {}", path.display());
    }
    if !report.failures.is_empty() {
        println!("\n{} file(s) failed:", report.failures.len());
        for f in &report.failures {
            println!("  {f}");
        }
    }

    if show_resume {
        println!("\nResume with:\n  {} {uuid}", config.pull.resume_command);
    }
    Ok(())
}
