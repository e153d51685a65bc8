mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use memoria::brain::Zone;
use memoria::config::MemoriaConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "memoria", version, about = "Scan and mirror AI agent brain folders")]
struct Cli {
    /// Config file (default: ~/.memoria/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a directory and list the brains found in it
    Scan {
        /// Directory whose top-level folders are brains
        root: PathBuf,
        /// Only show brains whose name or path contains this text
        #[arg(long)]
        query: Option<String>,
        /// Only show brains in this zone
        #[arg(long)]
        zone: Option<Zone>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Mirror every brain under ROOT to the cloud
    Sync {
        root: PathBuf,
        /// Sync code to use instead of the stored one
        #[arg(long)]
        code: Option<String>,
    },
    /// Manage the pairing code
    Pair {
        #[command(subcommand)]
        action: PairAction,
    },
    /// List brains stored in the cloud
    Brains {
        #[arg(long)]
        code: Option<String>,
    },
    /// Download a brain from the cloud, or list the ones available
    Pull {
        /// Sync code from the dashboard
        #[arg(short, long)]
        code: Option<String>,
        /// Brain UUID to download
        #[arg(short, long)]
        uuid: Option<String>,
        /// List available brains for the sync code
        #[arg(short, long)]
        list: bool,
        /// Don't print the resume command after pulling
        #[arg(long)]
        no_resume: bool,
    },
    /// Delete a brain's files and metadata from the cloud
    Purge {
        /// Brain name as stored in the cloud
        brain: String,
        #[arg(long)]
        code: Option<String>,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum PairAction {
    /// Generate a new sync code protected by a password
    New,
    /// Join an existing sync code
    Join { code: String },
    /// Show the stored sync code
    Status,
    /// Forget the stored sync code
    Disconnect,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = match &cli.config {
        Some(path) => MemoriaConfig::load_from(path)?,
        None => MemoriaConfig::load()?,
    };

    // Log to stderr so stdout stays clean for --json output.
    let filter =
        EnvFilter::try_new(&config.log.level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Scan {
            root,
            query,
            zone,
            json,
        } => {
            cli::scan::scan(&root, query.as_deref(), zone, json).await?;
        }
        Command::Sync { root, code } => {
            cli::sync::sync(&config, &root, code.as_deref()).await?;
        }
        Command::Pair { action } => match action {
            PairAction::New => cli::pair::new(&config).await?,
            PairAction::Join { code } => cli::pair::join(&config, &code).await?,
            PairAction::Status => cli::pair::status(&config)?,
            PairAction::Disconnect => cli::pair::disconnect(&config)?,
        },
        Command::Brains { code } => {
            cli::brains::brains(&config, code.as_deref()).await?;
        }
        Command::Pull {
            code,
            uuid,
            list,
            no_resume,
        } => {
            cli::pull::pull(&config, code.as_deref(), uuid.as_deref(), list, !no_resume).await?;
        }
        Command::Purge { brain, code, yes } => {
            cli::purge::purge(&config, &brain, code.as_deref(), yes).await?;
        }
    }

    Ok(())
}
