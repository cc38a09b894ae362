use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Persisted set of content fingerprints already materialized into action
/// records.
///
/// Backed by a newline-separated file that is rewritten in full on flush.
/// The set only grows — there is no eviction, so content stays deduplicated
/// even after its record has been archived. Unbounded growth is a known
/// limitation of this design.
pub struct DedupLedger {
    path: PathBuf,
    fingerprints: HashSet<String>,
    dirty: bool,
}

impl DedupLedger {
    /// Load the ledger from disk. A missing or unreadable file starts the
    /// ledger empty rather than failing the caller.
    pub fn load(path: &Path) -> Self {
        let fingerprints = match fs::read_to_string(path) {
            Ok(contents) => {
                let set: HashSet<String> = contents
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect();
                info!("Loaded {} processed fingerprints", set.len());
                set
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No ledger file at {}, starting empty", path.display());
                HashSet::new()
            }
            Err(err) => {
                warn!("Could not load ledger {}: {}", path.display(), err);
                HashSet::new()
            }
        };

        DedupLedger {
            path: path.to_path_buf(),
            fingerprints,
            dirty: false,
        }
    }

    pub fn contains(&self, fingerprint: &str) -> bool {
        self.fingerprints.contains(fingerprint)
    }

    /// Insert a fingerprint. Returns true when it was not present before.
    pub fn add(&mut self, fingerprint: String) -> bool {
        let inserted = self.fingerprints.insert(fingerprint);
        if inserted {
            self.dirty = true;
        }
        inserted
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    /// Persist the full set, overwriting prior content. Failure is logged
    /// and non-fatal: the in-memory set stays authoritative for this run.
    /// No-op when nothing changed since the last flush.
    pub fn flush(&mut self) {
        if !self.dirty {
            return;
        }

        let mut lines: Vec<&str> =
            self.fingerprints.iter().map(String::as_str).collect();
        lines.sort_unstable();

        match fs::write(&self.path, lines.join("\n")) {
            Ok(()) => {
                self.dirty = false;
                debug!(
                    "Flushed {} fingerprints to {}",
                    self.fingerprints.len(),
                    self.path.display()
                );
            }
            Err(err) => {
                warn!("Could not save ledger {}: {}", self.path.display(), err);
            }
        }
    }
}
