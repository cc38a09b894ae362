use crate::config::VaultLayout;
use crate::error::Error;
use crate::record::{self, RECORD_EXTENSION};
use crate::reporter::PipelineReporter;
use chrono::Local;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

lazy_static! {
    static ref AMOUNT_PATTERN: Regex =
        Regex::new(r"\$[\d,]+\.?\d*").expect("amount pattern compiles");
    static ref DATE_PATTERN: Regex =
        Regex::new(r"\d{4}-\d{2}-\d{2}").expect("date pattern compiles");
}

/// Extensions searched when associating a record with its payload file.
/// First match on the record's stem wins.
const SIDECAR_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "xls", "xlsx", "jpg", "png", "mp3", "mp4", "zip",
];

const SUMMARY_MAX_CHARS: usize = 200;
const SUMMARY_PLACEHOLDER: &str = "No summary available";

/// Outcome of processing one action record.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub original_name: String,
    pub category: String,
    pub summary: String,
    pub amount: Option<String>,
    pub date: Option<String>,
    pub status: String,
}

/// Aggregate result of one processor pass, consumed by the dashboard
/// updater and the CLI exit code.
#[derive(Debug, Default)]
pub struct ProcessReport {
    pub processed: usize,
    pub failed: usize,
    pub pending_remaining: usize,
    pub outcomes: Vec<ProcessOutcome>,
}

/// A parsed action record plus its optional sidecar payload.
struct ActionFile {
    record_path: PathBuf,
    frontmatter: HashMap<String, String>,
    content: String,
    sidecar: Option<PathBuf>,
}

/// Processes pending action records out of `Needs_Action/` into the dated
/// archive under `Done/`.
///
/// Each record is handled independently: a failure is logged and counted
/// without aborting the remaining records, and a failed record stays in
/// place to be retried on the next invocation.
pub struct Processor {
    layout: VaultLayout,
    dry_run: bool,
}

impl Processor {
    pub fn new(layout: VaultLayout, dry_run: bool) -> Self {
        Processor { layout, dry_run }
    }

    /// Process every pending record. A missing working directory yields an
    /// empty report rather than an error.
    pub fn run(&self, reporter: &dyn PipelineReporter) -> Result<ProcessReport, Error> {
        info!("Processor starting, vault: {}", self.layout.root.display());

        if !self.layout.needs_action.exists() {
            warn!("Needs_Action folder not found");
            return Ok(ProcessReport::default());
        }

        let record_paths = self.pending_records()?;
        if record_paths.is_empty() {
            info!("No pending records to process");
            return Ok(ProcessReport::default());
        }

        info!("Found {} pending record(s)", record_paths.len());
        reporter.on_process_start(record_paths.len());

        let total = record_paths.len();
        let mut report = ProcessReport::default();

        for (index, record_path) in record_paths.iter().enumerate() {
            let name = record_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            match self.process_record(record_path) {
                Ok(outcome) => {
                    report.processed += 1;
                    report.outcomes.push(outcome);
                    reporter.on_record_processed(&name, index + 1, total);
                }
                Err(err) => {
                    error!("Processing failed for {}: {}", name, err);
                    report.failed += 1;
                    reporter.on_record_failed(&name);
                }
            }
        }

        reporter.on_process_complete(report.processed, report.failed);
        report.pending_remaining = self.pending_records()?.len();

        info!("Processed {} record(s) successfully", report.processed);
        info!("Failed: {} record(s)", report.failed);

        Ok(report)
    }

    /// Records still waiting in the working directory, sorted by name.
    pub fn pending_records(&self) -> Result<Vec<PathBuf>, Error> {
        let mut paths = Vec::new();
        if !self.layout.needs_action.exists() {
            return Ok(paths);
        }

        for entry in fs::read_dir(&self.layout.needs_action)? {
            let path = entry?.path();
            let is_record = path.is_file()
                && path
                    .extension()
                    .map(|ext| ext == RECORD_EXTENSION)
                    .unwrap_or(false);
            if is_record {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }

    fn process_record(&self, record_path: &Path) -> Result<ProcessOutcome, Error> {
        let action = self.read_action_file(record_path)?;

        let category = action
            .frontmatter
            .get("category")
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());
        let original_name = action
            .frontmatter
            .get("original_name")
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());

        let (amount, date) = if category == "document" {
            extract_fields(&action.content)
        } else {
            (None, None)
        };
        let summary = summarize(&action.content);

        info!("Processing: {}", original_name);
        info!("  Category: {}", category);
        debug!("  Summary: {}", summary);
        if amount.is_some() || date.is_some() {
            info!("  Extracted: amount={:?} date={:?}", amount, date);
        }

        let done_folder = self
            .layout
            .done
            .join(Local::now().format("%Y-%m-%d").to_string());
        if !self.dry_run {
            fs::create_dir_all(&done_folder)?;
        }

        // The two relocations are independent: a payload that cannot be
        // moved (or was removed externally) never blocks the record.
        if let Some(sidecar) = &action.sidecar {
            let sidecar_name = sidecar
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if self.dry_run {
                info!("  [dry-run] Would move: {}", sidecar_name);
            } else {
                match move_into(sidecar, &done_folder) {
                    Ok(()) => info!("  Moved: {}", sidecar_name),
                    Err(err) => {
                        warn!("  Could not move payload {}: {}", sidecar_name, err)
                    }
                }
            }
        }

        let record_name = action
            .record_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.dry_run {
            info!("  [dry-run] Would move: {}", record_name);
        } else {
            move_into(&action.record_path, &done_folder)?;
            info!("  Moved: {}", record_name);
        }

        Ok(ProcessOutcome {
            original_name,
            category,
            summary,
            amount,
            date,
            status: "completed".to_string(),
        })
    }

    fn read_action_file(&self, record_path: &Path) -> Result<ActionFile, Error> {
        let content = fs::read_to_string(record_path)?;
        let frontmatter = record::parse_frontmatter(&content);
        let sidecar = find_sidecar(record_path);

        Ok(ActionFile {
            record_path: record_path.to_path_buf(),
            frontmatter,
            content,
            sidecar,
        })
    }
}

/// Find the payload file sharing the record's stem, if any.
fn find_sidecar(record_path: &Path) -> Option<PathBuf> {
    let stem = record_path.file_stem()?.to_string_lossy().into_owned();
    let dir = record_path.parent()?;

    for extension in SIDECAR_EXTENSIONS {
        let candidate = dir.join(format!("{}.{}", stem, extension));
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

/// Best-effort extraction of a currency amount and an ISO date from the
/// record body. Each yields at most one match; absence is not an error.
pub fn extract_fields(content: &str) -> (Option<String>, Option<String>) {
    let amount = AMOUNT_PATTERN
        .find(content)
        .map(|m| m.as_str().to_string());
    let date = DATE_PATTERN.find(content).map(|m| m.as_str().to_string());
    (amount, date)
}

/// First one or two usable body lines (non-empty, not a delimiter, not a
/// heading), joined and truncated to 200 characters with an ellipsis.
/// The frontmatter region is excluded, so header fields never leak into
/// the summary.
pub fn summarize(content: &str) -> String {
    let body = record::strip_frontmatter(content);
    let mut summary_lines: Vec<&str> = Vec::new();

    for line in body.lines() {
        let line = line.trim();
        if !line.is_empty() && !line.starts_with("---") && !line.starts_with('#') {
            summary_lines.push(line);
            if summary_lines.len() >= 2 {
                break;
            }
        }
    }

    if summary_lines.is_empty() {
        return SUMMARY_PLACEHOLDER.to_string();
    }

    let joined = summary_lines.join(" ");
    let truncated: String = joined.chars().take(SUMMARY_MAX_CHARS).collect();
    format!("{}...", truncated)
}

fn move_into(path: &Path, folder: &Path) -> io::Result<()> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path has no file name")
    })?;
    fs::rename(path, folder.join(file_name))
}
