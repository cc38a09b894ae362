use chrono::Local;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use tracing::{info, warn};
use vault_drop_core::{ProcessReport, VaultLayout};

lazy_static! {
    static ref LAST_UPDATED: Regex =
        Regex::new(r"last_updated: [^\n]+").expect("marker pattern compiles");
    static ref PENDING_ROW: Regex =
        Regex::new(r"\| Pending Tasks \| [^\n]+ \|").expect("marker pattern compiles");
}

const NOTIFICATIONS_HEADING: &str = "## 🔔 Recent Notifications\n";

/// Rewrite the fixed markers in `Dashboard.md` from a run's counters:
/// the `last_updated` line, the pending-tasks table row, and a new entry
/// under the notifications heading. A missing dashboard or a failed write
/// is logged and skipped; the core pipeline never depends on it.
pub fn update(layout: &VaultLayout, report: &ProcessReport) {
    if !layout.dashboard.exists() {
        info!("Dashboard.md not found, skipping update");
        return;
    }

    match rewrite_markers(layout, report) {
        Ok(()) => info!("Updated Dashboard.md"),
        Err(err) => warn!("Failed to update Dashboard.md: {}", err),
    }
}

fn rewrite_markers(layout: &VaultLayout, report: &ProcessReport) -> std::io::Result<()> {
    let mut content = fs::read_to_string(&layout.dashboard)?;
    let now = Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();

    content = LAST_UPDATED
        .replace(&content, format!("last_updated: {}", now))
        .into_owned();

    let pending = report.pending_remaining;
    let pending_status = if pending == 0 {
        "✅ Clear".to_string()
    } else {
        format!("⚠️ {} pending", pending)
    };
    content = PENDING_ROW
        .replace(
            &content,
            format!("| Pending Tasks | {} | {} |", pending, pending_status),
        )
        .into_owned();

    if report.processed > 0 && content.contains(NOTIFICATIONS_HEADING) {
        let notification =
            format!("- Processed {} file(s) at {}", report.processed, now);
        content = content.replace(
            NOTIFICATIONS_HEADING,
            &format!("{}\n{}\n", NOTIFICATIONS_HEADING, notification),
        );
    }

    fs::write(&layout.dashboard, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn sample_dashboard() -> &'static str {
        "---\nlast_updated: 2024-01-01T00:00:00\n---\n\n\
         # Dashboard\n\n\
         | Quick Status | Count | Status |\n\
         | Pending Tasks | 5 | ⚠️ 5 pending |\n\n\
         ## 🔔 Recent Notifications\n\n- older entry\n"
    }

    fn report(processed: usize, pending: usize) -> ProcessReport {
        ProcessReport {
            processed,
            failed: 0,
            pending_remaining: pending,
            outcomes: Vec::new(),
        }
    }

    #[test]
    fn markers_are_rewritten() {
        let tmp = tempdir().unwrap();
        let layout = VaultLayout::new(tmp.path());
        fs::write(&layout.dashboard, sample_dashboard()).unwrap();

        update(&layout, &report(3, 0));

        let content = fs::read_to_string(&layout.dashboard).unwrap();
        assert!(!content.contains("last_updated: 2024-01-01T00:00:00"));
        assert!(content.contains("| Pending Tasks | 0 | ✅ Clear |"));
        assert!(content.contains("- Processed 3 file(s) at "));
        assert!(content.contains("- older entry"));
    }

    #[test]
    fn pending_count_shows_warning_status() {
        let tmp = tempdir().unwrap();
        let layout = VaultLayout::new(tmp.path());
        fs::write(&layout.dashboard, sample_dashboard()).unwrap();

        update(&layout, &report(1, 2));

        let content = fs::read_to_string(&layout.dashboard).unwrap();
        assert!(content.contains("| Pending Tasks | 2 | ⚠️ 2 pending |"));
    }

    #[test]
    fn missing_dashboard_is_skipped() {
        let tmp = tempdir().unwrap();
        let layout = VaultLayout::new(&tmp.path().join("no-vault"));
        // Must not create the file or panic.
        update(&layout, &report(1, 0));
        assert!(!Path::new(&layout.dashboard).exists());
    }
}
