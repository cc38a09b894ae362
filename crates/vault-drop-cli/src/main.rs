mod commands;
mod dashboard;
mod logging;
mod reporter;

use std::process;
use std::time::Duration;

use clap::Parser;
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use reporter::CliReporter;
use tracing::error;
use vault_drop_core::{config, FileSystemWatcher, Processor, VaultLayout, Watcher};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let args = Cli::parse();
    let verbose = match &args.command {
        Commands::Watch { verbose, .. } | Commands::Process { verbose, .. } => *verbose,
    };
    let _guard = logging::init_logger(verbose);

    let app_config = match config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    match args.command {
        Commands::Watch {
            vault_path,
            interval,
            once,
            ..
        } => {
            let layout = VaultLayout::new(&vault_path);
            let mut watcher = FileSystemWatcher::new(layout, &app_config)?;
            let reporter = CliReporter::new();

            if once {
                match watcher.run_once(&reporter) {
                    Ok(count) => {
                        println!(
                            "Processed {} file(s)",
                            count.to_string().green()
                        );
                    }
                    Err(err) => {
                        error!("Error: {}", err);
                        process::exit(1);
                    }
                }
            } else {
                let interval_secs =
                    interval.unwrap_or(app_config.check_interval_secs);
                let cancel = watcher.cancel_token();
                watcher.run(
                    Duration::from_secs(interval_secs),
                    &cancel,
                    &reporter,
                );
            }
        }
        Commands::Process {
            vault_path,
            dry_run,
            ..
        } => {
            let layout = VaultLayout::new(&vault_path);
            let processor = Processor::new(layout.clone(), dry_run);
            let reporter = CliReporter::new();

            let report = match processor.run(&reporter) {
                Ok(report) => report,
                Err(err) => {
                    error!("Error: {}", err);
                    process::exit(1);
                }
            };

            println!(
                "{} processed, {} failed, {} pending",
                report.processed.to_string().green(),
                report.failed.to_string().red(),
                report.pending_remaining.to_string().yellow(),
            );

            if report.processed > 0 && !dry_run {
                dashboard::update(&layout, &report);
            }

            if dry_run {
                println!("{}", "[DRY RUN] No changes were made".yellow());
            }

            if report.failed > 0 {
                process::exit(1);
            }
        }
    }

    Ok(())
}
