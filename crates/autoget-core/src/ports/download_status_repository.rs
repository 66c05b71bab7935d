//! Download record store port definition.
//!
//! This port defines the interface for persisting [`DownloadStatus`] records.
//! It is pure data access: every policy decision lives in the reconciler.
//!
//! # Design
//!
//! - Every read and write is scoped by downloader name; a reconciler never
//!   sees or touches another downloader's rows
//! - Every write refreshes `updated_at`
//! - Writes never move `state` or `move_state` backwards, even when two
//!   passes race on the same row
//! - No multi-record transactions; one failed row never blocks the others

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{DownloadState, DownloadStatus, MoveState, NewDownload};

/// Port for persisting tracked downloads.
///
/// This trait is implemented by `autoget-db` and injected into the
/// reconciler.
///
/// # Usage
///
/// ```ignore
/// let repo: Arc<dyn DownloadStatusRepository> = /* ... */;
/// let started = repo.list_started("main").await?;
/// ```
#[async_trait]
pub trait DownloadStatusRepository: Send + Sync {
    /// Records in `Started` state (candidates for a progress update).
    async fn list_started(&self, downloader: &str) -> Result<Vec<DownloadStatus>, RepositoryError>;

    /// Records with `state >= Seeding` and `move_state = UnMoved`
    /// (candidates for file finalization).
    async fn list_unmoved(&self, downloader: &str) -> Result<Vec<DownloadStatus>, RepositoryError>;

    /// Records in `Stopped` state with `move_state >= Moved`
    /// (candidates for purge).
    async fn list_purgeable(
        &self,
        downloader: &str,
    ) -> Result<Vec<DownloadStatus>, RepositoryError>;

    /// All records, optionally restricted to one downloader, newest first.
    async fn list_all(
        &self,
        downloader: Option<&str>,
    ) -> Result<Vec<DownloadStatus>, RepositoryError>;

    /// Fetch a single record by hash.
    ///
    /// Returns `RepositoryError::NotFound` when no record exists for this
    /// downloader.
    async fn get(&self, downloader: &str, id: &str) -> Result<DownloadStatus, RepositoryError>;

    /// Start tracking a download in `Started` state.
    ///
    /// Returns `RepositoryError::AlreadyExists` if the hash is already tracked.
    async fn create(&self, download: &NewDownload) -> Result<DownloadStatus, RepositoryError>;

    /// Insert or update a record.
    ///
    /// Descriptive metadata and download progress are only written on
    /// insert; an update touches state, move state and upload history. Fails with
    /// `RepositoryError::Constraint` if the hash is owned by another downloader.
    async fn save(&self, status: &DownloadStatus) -> Result<(), RepositoryError>;

    /// Write only the progress-sync fields of a record.
    async fn update_progress(
        &self,
        downloader: &str,
        id: &str,
        download_progress: i32,
        state: DownloadState,
    ) -> Result<(), RepositoryError>;

    /// Write only the `move_state` of a record.
    async fn update_move_state(
        &self,
        downloader: &str,
        id: &str,
        move_state: MoveState,
    ) -> Result<(), RepositoryError>;

    /// Set `state` on every listed record of this downloader.
    ///
    /// Returns the number of rows updated.
    async fn update_state(
        &self,
        downloader: &str,
        ids: &[String],
        state: DownloadState,
    ) -> Result<u64, RepositoryError>;

    /// Delete this downloader's records not updated within `days` days.
    ///
    /// Returns the number of rows deleted.
    async fn delete_older_than(&self, downloader: &str, days: u32) -> Result<u64, RepositoryError>;
}
