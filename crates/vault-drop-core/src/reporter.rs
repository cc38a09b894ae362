use std::path::Path;

/// Trait for observing pipeline progress.
///
/// The CLI implements this with indicatif bars and tracing; tests use
/// `SilentReporter`. All methods have default no-op implementations, so
/// implementors only override what they care about.
pub trait PipelineReporter: Send + Sync {
    fn on_poll_start(&self) {}
    fn on_items_detected(&self, _count: usize) {}
    fn on_record_created(&self, _record_path: &Path) {}
    fn on_materialize_failed(&self, _item_name: &str) {}
    fn on_process_start(&self, _total_records: usize) {}
    fn on_record_processed(&self, _name: &str, _index: usize, _total: usize) {}
    fn on_record_failed(&self, _name: &str) {}
    fn on_process_complete(&self, _processed: usize, _failed: usize) {}
}

/// No-op reporter for silent operation.
pub struct SilentReporter;

impl PipelineReporter for SilentReporter {}
