use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "vault-drop")]
#[command(about = "File-drop ingestion pipeline for a vault", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Watch the vault's Inbox and turn dropped files into action records
    Watch {
        /// Path to the vault root
        vault_path: PathBuf,

        /// Seconds between checks (falls back to the config file, then 30)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Run a single check cycle and exit (for testing/cron)
        #[arg(long)]
        once: bool,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },
    /// Process pending action records into the dated archive
    Process {
        /// Path to the vault root
        vault_path: PathBuf,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,

        /// Show what would be done without making changes
        #[arg(long)]
        dry_run: bool,
    },
}
