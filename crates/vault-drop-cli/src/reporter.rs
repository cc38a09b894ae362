use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Mutex;
use vault_drop_core::PipelineReporter;

/// CLI pipeline reporter.
///
/// Watch phase prints per-item check marks; the processor pass gets an
/// indicatif progress bar (total records known upfront).
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }
}

impl Default for CliReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineReporter for CliReporter {
    fn on_items_detected(&self, count: usize) {
        if count > 0 {
            eprintln!("  {} new item(s) detected", count);
        }
    }

    fn on_record_created(&self, record_path: &Path) {
        eprintln!(
            "  \x1b[32m✓\x1b[0m Created {}",
            record_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        );
    }

    fn on_materialize_failed(&self, item_name: &str) {
        eprintln!("  \x1b[31m✗\x1b[0m Failed to materialize {}", item_name);
    }

    fn on_process_start(&self, total_records: usize) {
        let pb = ProgressBar::new(total_records as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} Processing [{bar:30.cyan/dim}] {pos}/{len} {msg}",
            )
            .unwrap()
            .progress_chars("━╸─")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        *self.bar.lock().unwrap() = Some(pb);
    }

    fn on_record_processed(&self, name: &str, index: usize, _total: usize) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            pb.set_position(index as u64);
            pb.set_message(name.to_string());
        }
    }

    fn on_record_failed(&self, name: &str) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            pb.inc(1);
        }
        drop(guard);
        eprintln!("  \x1b[31m✗\x1b[0m Failed {}", name);
    }

    fn on_process_complete(&self, processed: usize, failed: usize) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Processing complete: {} processed, {} failed",
            processed, failed
        );
    }
}
