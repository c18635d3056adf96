//! Where mathveil keeps its files
//!
//! One root directory holds everything:
//!
//! ```text
//! <root>/settings.json
//! <root>/logs/mathveil.log.YYYY-MM-DD
//! ```
//!
//! The default root is `$XDG_CONFIG_HOME/mathveil`, then `~/.config/mathveil`
//! (`%APPDATA%\mathveil` on Windows). Tests and the CLI can root it anywhere.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::JsonFileStore;

const APP_DIR: &str = "mathveil";
const SETTINGS_FILE: &str = "settings.json";
const LOGS_DIR: &str = "logs";

/// File name prefix of the daily rolling log
pub const LOG_FILE_PREFIX: &str = "mathveil.log";

/// The files under one config root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    root: PathBuf,
}

impl ConfigPaths {
    /// Paths under `root`, which need not exist yet
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The platform's config root
    pub fn discover() -> Result<Self> {
        platform_config_home()
            .map(|home| Self::at(home.join(APP_DIR)))
            .context("No config directory available")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    /// The settings store backed by [`settings_file`](Self::settings_file)
    pub fn settings_store(&self) -> JsonFileStore {
        JsonFileStore::new(self.settings_file())
    }

    /// Create the logs directory (and the root) if needed, returning it
    pub fn ensure_logs_dir(&self) -> Result<PathBuf> {
        let logs = self.logs_dir();
        fs::create_dir_all(&logs)
            .with_context(|| format!("Failed to create {}", logs.display()))?;
        Ok(logs)
    }
}

#[cfg(target_os = "windows")]
fn platform_config_home() -> Option<PathBuf> {
    env::var_os("APPDATA").map(PathBuf::from)
}

#[cfg(not(target_os = "windows"))]
fn platform_config_home() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_root() {
        let paths = ConfigPaths::at("/tmp/mv");
        assert_eq!(paths.settings_file(), Path::new("/tmp/mv/settings.json"));
        assert_eq!(paths.logs_dir(), Path::new("/tmp/mv/logs"));
        assert_eq!(paths.settings_store().path(), paths.settings_file());
    }

    #[test]
    fn test_ensure_logs_dir_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ConfigPaths::at(dir.path().join("fresh"));
        let logs = paths.ensure_logs_dir().unwrap();
        assert!(logs.is_dir());
        assert_eq!(logs.parent().unwrap(), paths.root());
    }
}
