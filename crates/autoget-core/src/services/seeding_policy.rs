//! Daily seeding policy pass.
//!
//! For every torrent the client is seeding, the cumulative upload counter is
//! recorded under today's date. A torrent that uploaded no more than the
//! policy threshold since exactly `interval_in_days` ago is stopped. Stopped
//! torrents whose files were already copied out are then removed from the
//! client together with their local data.

use chrono::{DateTime, Local};
use tracing::{debug, error, info, warn};

use crate::config::SeedingPolicy;
use crate::domain::upload_history::local_day;
use crate::domain::{DownloadState, DownloadStatus, STORE_MAX_DAYS};
use crate::ports::{CoreError, RepositoryError, TorrentSnapshot};

use super::reconciler::{Reconciler, index_by_hash};

/// Outcome of one seeding policy run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedingPolicyReport {
    /// Seeding torrents whose upload counter was recorded.
    pub recorded: usize,
    /// Seeding torrents with no record yet; a record was created.
    pub discovered: usize,
    /// Torrents included in the stop command.
    pub stopped: usize,
    /// Records marked `Deleted` after the client removed them.
    pub purged: u64,
    /// History entries dropped for being too old.
    pub history_pruned: usize,
    /// Records deleted by the age-based retention.
    pub records_expired: u64,
    /// Per-record failures.
    pub failed: usize,
    /// The stop command was sent and the client rejected it.
    pub stop_failed: bool,
    /// The remove command was sent and the client rejected it.
    pub remove_failed: bool,
}

impl Reconciler {
    /// Run the seeding policy pass for today.
    ///
    /// A no-op when no policy is configured.
    ///
    /// # Errors
    ///
    /// Returns an error only when the client's torrent list cannot be
    /// fetched; no record is touched in that case.
    pub async fn run_seeding_policy(&self) -> Result<SeedingPolicyReport, CoreError> {
        self.run_seeding_policy_at(Local::now()).await
    }

    /// Run the seeding policy pass as if the local time were `now`.
    pub async fn run_seeding_policy_at(
        &self,
        now: DateTime<Local>,
    ) -> Result<SeedingPolicyReport, CoreError> {
        let Some(policy) = self.config.seeding_policy else {
            debug!(downloader = %self.name, "No seeding policy configured");
            return Ok(SeedingPolicyReport::default());
        };

        let torrents = self.client.list_all_torrents().await.map_err(|e| {
            error!(downloader = %self.name, error = %e, "Failed to list torrents, skipping seeding policy");
            e
        })?;
        let mut report = SeedingPolicyReport::default();

        let stop_ids = self.stop_pass(&torrents, policy, now, &mut report).await;
        if !stop_ids.is_empty()
            && let Err(e) = self.client.stop_torrents(&stop_ids).await
        {
            error!(downloader = %self.name, ids = ?stop_ids, error = %e, "Failed to stop torrents");
            report.stop_failed = true;
        }

        self.purge_pass(&torrents, &mut report).await;

        match self.repo.delete_older_than(&self.name, STORE_MAX_DAYS).await {
            Ok(n) => report.records_expired = n,
            Err(e) => warn!(downloader = %self.name, error = %e, "Failed to delete expired records"),
        }

        info!(
            downloader = %self.name,
            recorded = report.recorded,
            discovered = report.discovered,
            stopped = report.stopped,
            purged = report.purged,
            expired = report.records_expired,
            failed = report.failed,
            "Seeding policy complete"
        );
        Ok(report)
    }

    /// Record today's upload for every seeding torrent and return the client
    /// ids to stop.
    async fn stop_pass(
        &self,
        torrents: &[TorrentSnapshot],
        policy: SeedingPolicy,
        now: DateTime<Local>,
        report: &mut SeedingPolicyReport,
    ) -> Vec<i64> {
        let today = local_day(&now);
        let threshold = policy.threshold_bytes();
        let mut stop_ids = Vec::new();

        for torrent in torrents.iter().filter(|t| t.status.is_seeding()) {
            let mut record = match self.repo.get(&self.name, &torrent.hash).await {
                Ok(record) => record,
                Err(RepositoryError::NotFound(_)) => {
                    let mut record = DownloadStatus::discovered_seeding(&torrent.hash, &self.name);
                    record.upload_histories.record_on(today, torrent.uploaded_ever);
                    match self.repo.save(&record).await {
                        Ok(()) => report.discovered += 1,
                        Err(e) => {
                            report.failed += 1;
                            warn!(downloader = %self.name, hash = %torrent.hash, error = %e, "Failed to create record");
                        }
                    }
                    continue;
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(downloader = %self.name, hash = %torrent.hash, error = %e, "Failed to load record");
                    continue;
                }
            };

            if record.state == DownloadState::Deleted {
                warn!(downloader = %self.name, hash = %record.id, "Deleted download is seeding again, skipping");
                continue;
            }

            report.history_pruned += record
                .upload_histories
                .prune_relative_to(now.naive_local(), STORE_MAX_DAYS);
            record.upload_histories.record_on(today, torrent.uploaded_ever);
            if let Err(e) = self.repo.save(&record).await {
                report.failed += 1;
                warn!(downloader = %self.name, hash = %record.id, error = %e, "Failed to record upload");
                continue;
            }
            report.recorded += 1;

            // An earlier stop command failed; send it again.
            if record.state == DownloadState::Stopped {
                stop_ids.push(torrent.id);
                continue;
            }

            let Some(before) = record
                .upload_histories
                .value_days_before(today, policy.interval_in_days)
            else {
                debug!(downloader = %self.name, hash = %record.id, "Not enough upload history yet");
                continue;
            };

            let uploaded = torrent.uploaded_ever - before;
            if uploaded > threshold {
                continue;
            }

            if let Err(e) = record.advance_state(DownloadState::Stopped) {
                report.failed += 1;
                warn!(downloader = %self.name, error = %e, "Refusing state transition");
                continue;
            }
            if let Err(e) = self.repo.save(&record).await {
                report.failed += 1;
                warn!(downloader = %self.name, hash = %record.id, error = %e, "Failed to mark stopped");
                continue;
            }

            info!(
                downloader = %self.name,
                hash = %record.id,
                uploaded,
                days = policy.interval_in_days,
                "Upload below threshold, stopping"
            );
            stop_ids.push(torrent.id);
            report.stopped += 1;
        }

        stop_ids
    }

    /// Remove stopped, already-copied torrents from the client and mark them
    /// `Deleted`.
    async fn purge_pass(&self, torrents: &[TorrentSnapshot], report: &mut SeedingPolicyReport) {
        let purgeable = match self.repo.list_purgeable(&self.name).await {
            Ok(records) => records,
            Err(e) => {
                warn!(downloader = %self.name, error = %e, "Failed to list purgeable downloads");
                return;
            }
        };

        let by_hash = index_by_hash(torrents);
        let (ids, hashes): (Vec<i64>, Vec<String>) = purgeable
            .into_iter()
            .filter_map(|record| by_hash.get(record.id.as_str()).map(|t| (t.id, record.id)))
            .unzip();
        if ids.is_empty() {
            return;
        }

        if let Err(e) = self.client.remove_torrents(&ids, true).await {
            error!(downloader = %self.name, ids = ?ids, error = %e, "Failed to remove torrents");
            report.remove_failed = true;
            return;
        }

        match self
            .repo
            .update_state(&self.name, &hashes, DownloadState::Deleted)
            .await
        {
            Ok(n) => report.purged = n,
            Err(e) => {
                report.failed += hashes.len();
                warn!(downloader = %self.name, hashes = ?hashes, error = %e, "Failed to mark removed downloads deleted");
            }
        }
    }
}
