//! Progress & finalization sync, run every minute per downloader.
//!
//! Two phases against one client snapshot:
//!
//! 1. Mirror completion of `Started` records and promote them to `Seeding`
//!    once the client seeds them.
//! 2. Unless the client is busy downloading, copy completed torrents into
//!    the finished directory and mark them `Moved`.
//!
//! Only a failure to list the client's torrents aborts the cycle. Everything
//! else is logged per record and retried on the next run.

use std::collections::HashMap;

use tracing::{debug, error, info, warn};

use crate::domain::{DownloadState, MoveState};
use crate::ports::{CoreError, TorrentSnapshot};

use super::finalize::copy_torrent_files;
use super::reconciler::{Reconciler, index_by_hash};

/// Session download speed (bytes/s) above which the client counts as busy.
pub const BUSY_DOWNLOAD_SPEED: u64 = 2_000_000;

/// Outcome of one progress sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSyncReport {
    /// `Started` records whose progress was written.
    pub progress_updated: usize,
    /// Records promoted from `Started` to `Seeding`.
    pub advanced_to_seeding: usize,
    /// Records whose files were copied and marked `Moved`.
    pub finalized: usize,
    /// Records that failed to update or finalize.
    pub failed: usize,
    /// Finalization was not attempted this cycle.
    pub finalization_skipped: bool,
}

impl Reconciler {
    /// Run one progress & finalization cycle.
    ///
    /// # Errors
    ///
    /// Returns an error only when the client's torrent list cannot be
    /// fetched; no record is touched in that case.
    pub async fn run_progress_sync(&self) -> Result<ProgressSyncReport, CoreError> {
        let torrents = self.client.list_all_torrents().await.map_err(|e| {
            error!(downloader = %self.name, error = %e, "Failed to list torrents, skipping progress sync");
            e
        })?;
        let by_hash = index_by_hash(&torrents);
        let mut report = ProgressSyncReport::default();

        self.sync_started(&by_hash, &mut report).await;

        match self.client.session_stats().await {
            Err(e) => {
                warn!(downloader = %self.name, error = %e, "Failed to get session stats, skipping finalization");
                report.finalization_skipped = true;
            }
            Ok(stats) if stats.download_speed > self.config.busy_download_speed => {
                debug!(
                    downloader = %self.name,
                    download_speed = stats.download_speed,
                    "Client busy, skipping finalization"
                );
                report.finalization_skipped = true;
            }
            Ok(_) => self.finalize_unmoved(&by_hash, &mut report).await,
        }

        info!(
            downloader = %self.name,
            progress_updated = report.progress_updated,
            advanced = report.advanced_to_seeding,
            finalized = report.finalized,
            failed = report.failed,
            finalization_skipped = report.finalization_skipped,
            "Progress sync complete"
        );
        Ok(report)
    }

    async fn sync_started(
        &self,
        by_hash: &HashMap<&str, &TorrentSnapshot>,
        report: &mut ProgressSyncReport,
    ) {
        let started = match self.repo.list_started(&self.name).await {
            Ok(records) => records,
            Err(e) => {
                warn!(downloader = %self.name, error = %e, "Failed to list started downloads");
                return;
            }
        };

        for mut record in started {
            let Some(torrent) = by_hash.get(record.id.as_str()) else {
                continue;
            };

            record.set_progress_fraction(torrent.percent_done);
            let advanced = torrent.status.is_seeding()
                && matches!(record.advance_state(DownloadState::Seeding), Ok(true));

            match self
                .repo
                .update_progress(&self.name, &record.id, record.download_progress, record.state)
                .await
            {
                Ok(()) => {
                    report.progress_updated += 1;
                    if advanced {
                        report.advanced_to_seeding += 1;
                        debug!(downloader = %self.name, hash = %record.id, "Download complete, now seeding");
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(downloader = %self.name, hash = %record.id, error = %e, "Failed to save progress");
                }
            }
        }
    }

    async fn finalize_unmoved(
        &self,
        by_hash: &HashMap<&str, &TorrentSnapshot>,
        report: &mut ProgressSyncReport,
    ) {
        let unmoved = match self.repo.list_unmoved(&self.name).await {
            Ok(records) => records,
            Err(e) => {
                warn!(downloader = %self.name, error = %e, "Failed to list unmoved downloads");
                return;
            }
        };

        for mut record in unmoved {
            let Some(torrent) = by_hash.get(record.id.as_str()) else {
                continue;
            };

            if let Err(e) = copy_torrent_files(torrent, &self.config.finished_dir).await {
                report.failed += 1;
                warn!(downloader = %self.name, hash = %record.id, error = %e, "Failed to copy finished files");
                continue;
            }

            if let Err(e) = record.advance_move_state(MoveState::Moved) {
                report.failed += 1;
                warn!(downloader = %self.name, error = %e, "Refusing move state transition");
                continue;
            }

            match self
                .repo
                .update_move_state(&self.name, &record.id, record.move_state)
                .await
            {
                Ok(()) => {
                    report.finalized += 1;
                    info!(downloader = %self.name, hash = %record.id, files = torrent.files.len(), "Finalized download");
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(downloader = %self.name, hash = %record.id, error = %e, "Failed to save move state");
                }
            }
        }
    }
}
