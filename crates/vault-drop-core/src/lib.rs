pub mod config;
pub mod error;
pub mod hasher;
pub mod ledger;
pub mod processor;
pub mod record;
pub mod reporter;
pub mod watcher;

pub use config::{AppConfig, VaultLayout};
pub use error::Error;
pub use ledger::DedupLedger;
pub use processor::{ProcessOutcome, ProcessReport, Processor};
pub use reporter::{PipelineReporter, SilentReporter};
pub use watcher::{DropItem, FileSystemWatcher, Watcher};
