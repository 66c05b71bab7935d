//! Application configuration file.
//!
//! A single JSON document holds the database location, the scheduler
//! settings and one section per downloader.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use autoget_core::DownloaderConfig;
use serde::Deserialize;

use crate::error::CliError;

/// Default seconds between progress sync passes.
pub const DEFAULT_PROGRESS_INTERVAL_SECS: u64 = 60;

/// Default local hour for the daily seeding policy pass.
pub const DEFAULT_DAILY_CHECK_HOUR: u32 = 8;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// SQLite database file.
    pub database_path: PathBuf,

    #[serde(default = "default_progress_interval_secs")]
    pub progress_interval_secs: u64,

    /// Local hour (0-23) at which the seeding policy runs.
    #[serde(default = "default_daily_check_hour")]
    pub daily_check_hour: u32,

    /// Downloaders keyed by name.
    pub downloaders: BTreeMap<String, DownloaderConfig>,
}

const fn default_progress_interval_secs() -> u64 {
    DEFAULT_PROGRESS_INTERVAL_SECS
}

const fn default_daily_check_hour() -> u32 {
    DEFAULT_DAILY_CHECK_HOUR
}

impl AppConfig {
    /// Read, parse and validate the file at `path`.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    /// Parse and validate a JSON document.
    pub fn from_json(raw: &str) -> Result<Self, CliError> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| CliError::Config(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CliError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(CliError::Config("database_path cannot be empty".to_string()));
        }
        if self.progress_interval_secs == 0 {
            return Err(CliError::Config(
                "progress_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.daily_check_hour > 23 {
            return Err(CliError::Config(format!(
                "daily_check_hour must be in 0..=23, got {}",
                self.daily_check_hour
            )));
        }
        if self.downloaders.is_empty() {
            return Err(CliError::Config("no downloaders configured".to_string()));
        }
        for (name, downloader) in &self.downloaders {
            downloader
                .validate(name)
                .map_err(|e| CliError::Config(e.to_string()))?;
        }
        Ok(())
    }

    /// Look up a downloader by name.
    pub fn downloader(&self, name: &str) -> Result<&DownloaderConfig, CliError> {
        self.downloaders
            .get(name)
            .ok_or_else(|| CliError::Arguments(format!("unknown downloader '{name}'")))
    }
}
