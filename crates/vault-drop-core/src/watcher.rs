use crate::config::{AppConfig, VaultLayout};
use crate::error::Error;
use crate::hasher;
use crate::ledger::DedupLedger;
use crate::record::{self, ActionRecord, PAYLOAD_PREFIX, RECORD_EXTENSION};
use crate::reporter::PipelineReporter;
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// A candidate file seen in the source directory. Built per detection and
/// consumed immediately by materialization; never persisted.
#[derive(Debug, Clone)]
pub struct DropItem {
    pub source_path: PathBuf,
    pub name: String,
    pub size: u64,
    pub fingerprint: String,
    pub extension: String,
}

impl DropItem {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let metadata = fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let fingerprint = hasher::fingerprint_file(path)?;

        Ok(DropItem {
            source_path: path.to_path_buf(),
            name,
            size: metadata.len(),
            fingerprint,
            extension,
        })
    }

    pub fn category(&self) -> &'static str {
        record::category_for_extension(&self.extension)
    }
}

/// Capability contract every concrete watcher supplies.
///
/// `detect` inspects the data source and returns items not seen before,
/// erroring on transient I/O failure rather than silently returning an
/// empty list. `materialize` performs the side effect of creating one
/// item's action record in the working directory, returning `None` on
/// failure. The driver loop and single-pass mode are provided.
pub trait Watcher {
    type Item;

    fn detect(&mut self) -> Result<Vec<Self::Item>, Error>;

    fn materialize(&mut self, item: &Self::Item) -> Option<PathBuf>;

    fn item_name(&self, item: &Self::Item) -> String;

    /// One detect + materialize pass. Returns the number of records
    /// created.
    fn run_once(&mut self, reporter: &dyn PipelineReporter) -> Result<usize, Error> {
        let items = self.detect()?;
        reporter.on_items_detected(items.len());
        if items.is_empty() {
            debug!("No new items");
            return Ok(0);
        }

        info!("Found {} new item(s)", items.len());
        let mut created = 0;
        for item in &items {
            match self.materialize(item) {
                Some(record_path) => {
                    info!(
                        "Created: {}",
                        record_path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default()
                    );
                    reporter.on_record_created(&record_path);
                    created += 1;
                }
                None => {
                    reporter.on_materialize_failed(&self.item_name(item));
                }
            }
        }
        Ok(created)
    }

    /// Poll loop: detect, materialize each item, sleep, repeat.
    ///
    /// A failing poll is logged and the loop continues on the next
    /// interval. Cancellation is cooperative: the token is checked between
    /// polls and during the (sliced) interval sleep, so an in-flight
    /// materialize always completes before the loop exits.
    fn run(
        &mut self,
        interval: Duration,
        cancel: &AtomicBool,
        reporter: &dyn PipelineReporter,
    ) {
        info!("Watcher started, check interval: {}s", interval.as_secs());

        while !cancel.load(Ordering::Relaxed) {
            reporter.on_poll_start();
            if let Err(err) = self.run_once(reporter) {
                error!("Error processing items: {}", err);
            }

            let mut remaining = interval;
            while remaining > Duration::ZERO && !cancel.load(Ordering::Relaxed) {
                let slice = remaining.min(Duration::from_millis(250));
                thread::sleep(slice);
                remaining = remaining.saturating_sub(slice);
            }
        }

        info!("Watcher stopped");
    }
}

/// Watches the vault's `Inbox/` directory for dropped files.
///
/// Each new file is fingerprinted, checked against the dedup ledger,
/// relocated into `Needs_Action/` under a `FILE_` prefixed name, and
/// described by a companion action record.
pub struct FileSystemWatcher {
    layout: VaultLayout,
    ledger: DedupLedger,
    ignore_patterns: Vec<Pattern>,
    cancel: Arc<AtomicBool>,
}

impl FileSystemWatcher {
    pub fn new(layout: VaultLayout, config: &AppConfig) -> Result<Self, Error> {
        layout.ensure_watch_directories()?;
        let ledger = DedupLedger::load(&layout.ledger_file);

        let ignore_patterns = config
            .ignore_patterns
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(pattern) => Some(pattern),
                Err(err) => {
                    error!("Invalid glob pattern '{}': {}", glob, err);
                    None
                }
            })
            .collect();

        Ok(FileSystemWatcher {
            layout,
            ledger,
            ignore_patterns,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Shared token that stops the poll loop when set.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn ledger(&self) -> &DedupLedger {
        &self.ledger
    }

    fn create_action_record(&self, item: &DropItem) -> Result<PathBuf, Error> {
        let safe_name = item.name.replace(' ', "_");
        let stored_name = format!("{}{}", PAYLOAD_PREFIX, safe_name);
        let dest_path = self.layout.needs_action.join(&stored_name);

        // Copy then delete, so a failure never loses the original.
        fs::copy(&item.source_path, &dest_path)?;
        info!("Copied: {} -> {}", item.name, stored_name);
        fs::remove_file(&item.source_path)?;

        let category = item.category();
        let meta_path = dest_path.with_extension(RECORD_EXTENSION);
        fs::write(&meta_path, render_record(item, &stored_name, category))?;

        Ok(meta_path)
    }
}

impl Watcher for FileSystemWatcher {
    type Item = DropItem;

    fn detect(&mut self) -> Result<Vec<DropItem>, Error> {
        let mut items = Vec::new();
        if !self.layout.inbox.exists() {
            return Ok(items);
        }

        let mut added = false;
        for entry in fs::read_dir(&self.layout.inbox)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }

            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if name.starts_with('.') {
                continue;
            }
            if self
                .ignore_patterns
                .iter()
                .any(|pattern| pattern.matches_path(&path))
            {
                debug!("Ignoring {} (ignore pattern)", path.display());
                continue;
            }

            let item = DropItem::from_path(&path)?;
            if self.ledger.contains(&item.fingerprint) {
                debug!("Skipping {} (already processed)", item.name);
                continue;
            }

            // Recorded before the item is returned, so a crash mid-batch
            // never re-emits it on the next poll.
            self.ledger.add(item.fingerprint.clone());
            added = true;
            items.push(item);
        }

        if added {
            self.ledger.flush();
        }

        Ok(items)
    }

    fn materialize(&mut self, item: &DropItem) -> Option<PathBuf> {
        match self.create_action_record(item) {
            Ok(record_path) => Some(record_path),
            Err(err) => {
                warn!("Failed to create action record for {}: {}", item.name, err);
                None
            }
        }
    }

    fn item_name(&self, item: &DropItem) -> String {
        item.name.clone()
    }
}

fn render_record(item: &DropItem, stored_name: &str, category: &str) -> String {
    let header = ActionRecord::new("file_drop")
        .with_field("original_name", &item.name)
        .with_field("size", item.size)
        .with_field("category", category)
        .with_field("hash", &item.fingerprint);

    let checklist = record::render_checklist(record::suggested_actions(category));

    format!(
        "{frontmatter}\n\n\
         # File Drop: {name}\n\n\
         ## File Information\n\n\
         | Property | Value |\n\
         |----------|-------|\n\
         | Original Name | {name} |\n\
         | Stored As | {stored_name} |\n\
         | Size | {size} |\n\
         | Category | {category} |\n\
         | Hash | {hash} |\n\n\
         ## Description\n\n\
         A new file has been dropped into the Inbox for processing.\n\n\
         ## Suggested Actions\n\n\
         {checklist}\n\n\
         ---\n\n\
         *File moved from /Inbox to /Needs_Action automatically*\n",
        frontmatter = header.frontmatter(),
        name = item.name,
        stored_name = stored_name,
        size = record::format_size(item.size),
        category = category,
        hash = item.fingerprint,
        checklist = checklist,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::SilentReporter;
    use tempfile::tempdir;

    fn watcher_in(root: &Path) -> FileSystemWatcher {
        FileSystemWatcher::new(VaultLayout::new(root), &AppConfig::default()).unwrap()
    }

    #[test]
    fn hidden_files_are_not_detected() {
        let tmp = tempdir().unwrap();
        let mut watcher = watcher_in(tmp.path());
        fs::write(tmp.path().join("Inbox/.DS_Store"), "junk").unwrap();

        let items = watcher.detect().unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn ignore_patterns_filter_the_inbox() {
        let tmp = tempdir().unwrap();
        let config = AppConfig {
            ignore_patterns: vec!["**/*.tmp".to_string()],
            ..AppConfig::default()
        };
        let mut watcher =
            FileSystemWatcher::new(VaultLayout::new(tmp.path()), &config).unwrap();

        fs::write(tmp.path().join("Inbox/scratch.tmp"), "scratch").unwrap();
        fs::write(tmp.path().join("Inbox/keep.txt"), "keep").unwrap();

        let items = watcher.detect().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "keep.txt");
    }

    #[test]
    fn ledger_holds_the_fingerprint_after_a_run() {
        let tmp = tempdir().unwrap();
        let mut watcher = watcher_in(tmp.path());
        fs::write(tmp.path().join("Inbox/a.txt"), "alpha bytes").unwrap();

        watcher.run_once(&SilentReporter).unwrap();

        let expected =
            crate::hasher::fingerprint_reader("alpha bytes".as_bytes()).unwrap();
        assert!(watcher.ledger().contains(&expected));
        assert_eq!(watcher.ledger().len(), 1);
    }

    #[test]
    fn spaces_in_names_are_normalized() {
        let tmp = tempdir().unwrap();
        let mut watcher = watcher_in(tmp.path());
        fs::write(tmp.path().join("Inbox/my report.txt"), "contents").unwrap();

        let created = watcher.run_once(&SilentReporter).unwrap();
        assert_eq!(created, 1);
        assert!(tmp
            .path()
            .join("Needs_Action/FILE_my_report.txt")
            .exists());
        assert!(tmp.path().join("Needs_Action/FILE_my_report.md").exists());
        assert!(!tmp.path().join("Inbox/my report.txt").exists());
    }
}
