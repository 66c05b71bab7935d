//! Per-downloader configuration and validation.
//!
//! Pure data types deserialized from the application config file. The
//! composition root turns each [`DownloaderConfig`] into one reconciler.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default Transmission RPC endpoint.
pub const DEFAULT_TRANSMISSION_URL: &str = "http://localhost:9091/transmission/rpc";

/// Default timeout for a single RPC round trip.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for one named downloader endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DownloaderConfig {
    /// Connection and directory settings for the Transmission client.
    pub transmission: Option<TransmissionConfig>,

    /// When to stop seeding. `None` disables the daily seeding pass.
    pub seeding_policy: Option<SeedingPolicy>,
}

/// Transmission endpoint and the directories it works with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransmissionConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Where `.torrent` files are dropped for the client to pick up.
    #[serde(default)]
    pub torrents_dir: PathBuf,
    /// Where the client writes downloaded data.
    pub download_dir: PathBuf,
    /// Where completed files are copied to, one subdirectory per hash.
    pub finished_dir: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_url() -> String {
    DEFAULT_TRANSMISSION_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Stop seeding once a torrent uploads no more than
/// `upload_at_least_in_mb` MiB over `interval_in_days` days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedingPolicy {
    pub interval_in_days: u32,
    pub upload_at_least_in_mb: u64,
}

impl SeedingPolicy {
    /// Upload threshold in bytes (`MiB * 1024 * 1024`).
    #[must_use]
    pub const fn threshold_bytes(&self) -> i64 {
        #[allow(clippy::cast_possible_wrap)]
        let mb = self.upload_at_least_in_mb as i64;
        mb.saturating_mul(1024 * 1024)
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("downloader '{0}' has no transmission section")]
    MissingTransmission(String),

    #[error("downloader '{downloader}': {field} cannot be empty")]
    EmptyField {
        downloader: String,
        field: &'static str,
    },

    #[error("downloader '{0}': seeding interval must be at least 1 day")]
    InvalidSeedingInterval(String),

    #[error("downloader '{0}': timeout must be at least 1 second")]
    InvalidTimeout(String),
}

impl DownloaderConfig {
    /// Validate this downloader's settings.
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let transmission = self
            .transmission
            .as_ref()
            .ok_or_else(|| ConfigError::MissingTransmission(name.to_string()))?;

        let empty = |field: &'static str| ConfigError::EmptyField {
            downloader: name.to_string(),
            field,
        };
        if transmission.url.trim().is_empty() {
            return Err(empty("url"));
        }
        if transmission.download_dir.as_os_str().is_empty() {
            return Err(empty("download_dir"));
        }
        if transmission.finished_dir.as_os_str().is_empty() {
            return Err(empty("finished_dir"));
        }
        if transmission.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(name.to_string()));
        }

        if let Some(policy) = self.seeding_policy
            && policy.interval_in_days == 0
        {
            return Err(ConfigError::InvalidSeedingInterval(name.to_string()));
        }

        Ok(())
    }
}
