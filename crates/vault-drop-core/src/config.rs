use crate::error::Error;
use ::config::{Config, File as ConfigFile};
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

fn default_check_interval() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            check_interval_secs: default_check_interval(),
            ignore_patterns: Vec::new(),
        }
    }
}

/// Load configuration from an optional `Config` file in the working
/// directory. A missing file yields the defaults.
pub fn load_configuration() -> Result<AppConfig, Error> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .build()?;
    Ok(builder.try_deserialize::<AppConfig>()?)
}

/// The fixed directory layout inside a vault.
///
/// Inbox is polled by the watcher, Needs_Action holds pending action
/// records and their payloads, Done collects dated archive folders.
#[derive(Debug, Clone)]
pub struct VaultLayout {
    pub root: PathBuf,
    pub inbox: PathBuf,
    pub needs_action: PathBuf,
    pub done: PathBuf,
    pub dashboard: PathBuf,
    pub ledger_file: PathBuf,
}

impl VaultLayout {
    pub fn new(root: &Path) -> Self {
        VaultLayout {
            root: root.to_path_buf(),
            inbox: root.join("Inbox"),
            needs_action: root.join("Needs_Action"),
            done: root.join("Done"),
            dashboard: root.join("Dashboard.md"),
            ledger_file: root.join(".processed_files.cache"),
        }
    }

    /// Create the directories the watcher writes to.
    pub fn ensure_watch_directories(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.inbox)?;
        std::fs::create_dir_all(&self.needs_action)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_paths_derive_from_root() {
        let layout = VaultLayout::new(Path::new("/vault"));
        assert_eq!(layout.inbox, Path::new("/vault/Inbox"));
        assert_eq!(layout.needs_action, Path::new("/vault/Needs_Action"));
        assert_eq!(layout.done, Path::new("/vault/Done"));
        assert_eq!(layout.dashboard, Path::new("/vault/Dashboard.md"));
        assert_eq!(
            layout.ledger_file,
            Path::new("/vault/.processed_files.cache")
        );
    }

    #[test]
    fn default_config_values() {
        let config = AppConfig::default();
        assert_eq!(config.check_interval_secs, 30);
        assert!(config.ignore_patterns.is_empty());
    }
}
