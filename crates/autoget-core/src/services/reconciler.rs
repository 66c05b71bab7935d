//! The per-downloader reconciler.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::SeedingPolicy;
use crate::ports::{DownloadStatusRepository, TorrentClientPort, TorrentSnapshot};

use super::progress_sync::BUSY_DOWNLOAD_SPEED;

/// Settings for one [`Reconciler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Root of the finished directory; files land in `<finished_dir>/<hash>/`.
    pub finished_dir: PathBuf,
    /// `None` turns the seeding policy pass into a no-op.
    pub seeding_policy: Option<SeedingPolicy>,
    /// Session download speed (bytes/s) above which finalization is skipped.
    pub busy_download_speed: u64,
}

impl ReconcilerConfig {
    /// Config with no seeding policy and the default busy threshold.
    pub fn new(finished_dir: impl Into<PathBuf>) -> Self {
        Self {
            finished_dir: finished_dir.into(),
            seeding_policy: None,
            busy_download_speed: BUSY_DOWNLOAD_SPEED,
        }
    }

    /// Set the seeding policy.
    #[must_use]
    pub fn with_seeding_policy(mut self, policy: Option<SeedingPolicy>) -> Self {
        self.seeding_policy = policy;
        self
    }

    /// Override the busy threshold.
    #[must_use]
    pub fn with_busy_download_speed(mut self, bytes_per_sec: u64) -> Self {
        self.busy_download_speed = bytes_per_sec;
        self
    }
}

/// Reconciles one torrent client against the local record store.
///
/// Holds its client handle and repository; nothing is shared between
/// downloaders. The two entry points are
/// [`run_progress_sync`](Self::run_progress_sync) and
/// [`run_seeding_policy`](Self::run_seeding_policy).
///
/// # Example
///
/// ```ignore
/// let reconciler = Reconciler::new("main", config, client, repo);
/// let report = reconciler.run_progress_sync().await?;
/// ```
pub struct Reconciler {
    pub(super) name: String,
    pub(super) config: ReconcilerConfig,
    pub(super) client: Arc<dyn TorrentClientPort>,
    pub(super) repo: Arc<dyn DownloadStatusRepository>,
}

impl Reconciler {
    pub fn new(
        name: impl Into<String>,
        config: ReconcilerConfig,
        client: Arc<dyn TorrentClientPort>,
        repo: Arc<dyn DownloadStatusRepository>,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            client,
            repo,
        }
    }

    /// Downloader name; also the ownership key on stored records.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn config(&self) -> &ReconcilerConfig {
        &self.config
    }
}

/// Index a client snapshot by torrent hash.
pub(super) fn index_by_hash(torrents: &[TorrentSnapshot]) -> HashMap<&str, &TorrentSnapshot> {
    torrents.iter().map(|t| (t.hash.as_str(), t)).collect()
}
