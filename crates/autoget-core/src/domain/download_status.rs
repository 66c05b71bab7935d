//! Tracked download record and its state machines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::UploadHistory;

/// Lifecycle of a download on the torrent client.
///
/// Ordered: `Started < Seeding < Stopped < Deleted`. The discriminants are the
/// values persisted by the store, so range queries (`state >= Seeding`) follow
/// the lifecycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadState {
    /// Handed to the client, not yet complete.
    Started = 0,
    /// Complete and seeding.
    Seeding = 1,
    /// Seeding stopped by the seeding policy.
    Stopped = 2,
    /// Removed from the client together with its local data. Terminal.
    Deleted = 3,
}

impl DownloadState {
    /// Integer representation for database storage.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self as i64
    }

    /// Parse from the stored integer representation.
    #[must_use]
    pub const fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Started),
            1 => Some(Self::Seeding),
            2 => Some(Self::Stopped),
            3 => Some(Self::Deleted),
            _ => None,
        }
    }

    /// Display label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Seeding => "seeding",
            Self::Stopped => "stopped",
            Self::Deleted => "deleted",
        }
    }
}

/// Whether the downloaded files were copied out of the client's directory.
///
/// Independent of [`DownloadState`]. `Organized` is set by an external
/// organizer; the reconciler only ever reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveState {
    UnMoved = 0,
    Moved = 1,
    Organized = 2,
}

impl MoveState {
    /// Integer representation for database storage.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self as i64
    }

    /// Parse from the stored integer representation.
    #[must_use]
    pub const fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::UnMoved),
            1 => Some(Self::Moved),
            2 => Some(Self::Organized),
            _ => None,
        }
    }

    /// Display label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnMoved => "unmoved",
            Self::Moved => "moved",
            Self::Organized => "organized",
        }
    }
}

/// A transition that would move a record backwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateTransitionError {
    #[error("cannot move download {id} from {from} back to {to}")]
    State {
        id: String,
        from: &'static str,
        to: &'static str,
    },

    #[error("cannot move files of download {id} from {from} back to {to}")]
    Move {
        id: String,
        from: &'static str,
        to: &'static str,
    },
}

/// Data needed to start tracking a download.
///
/// Created by the download-launch path; the descriptive fields are write-once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDownload {
    /// Torrent content hash.
    pub id: String,
    /// Name of the owning downloader.
    pub downloader: String,
    pub res_indexer: String,
    pub res_title: String,
    pub res_title2: String,
    pub category: String,
    pub file_list: Vec<String>,
}

impl NewDownload {
    /// Create a new download with only the required fields.
    pub fn new(id: impl Into<String>, downloader: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            downloader: downloader.into(),
            ..Self::default()
        }
    }
}

/// One tracked torrent, keyed by its content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadStatus {
    /// Torrent content hash (primary key).
    pub id: String,
    /// Name of the owning downloader. A reconciler only touches its own records.
    pub downloader: String,
    /// Completion in permille, `0..=1000`.
    pub download_progress: i32,
    pub state: DownloadState,
    pub move_state: MoveState,
    pub upload_histories: UploadHistory,

    pub res_indexer: String,
    pub res_title: String,
    pub res_title2: String,
    pub category: String,
    pub file_list: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DownloadStatus {
    /// A freshly started download with no history.
    pub fn started(download: &NewDownload) -> Self {
        let now = Utc::now();
        Self {
            id: download.id.clone(),
            downloader: download.downloader.clone(),
            download_progress: 0,
            state: DownloadState::Started,
            move_state: MoveState::UnMoved,
            upload_histories: UploadHistory::new(),
            res_indexer: download.res_indexer.clone(),
            res_title: download.res_title.clone(),
            res_title2: download.res_title2.clone(),
            category: download.category.clone(),
            file_list: download.file_list.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// A record for a torrent found seeding on the client without one.
    pub fn discovered_seeding(id: impl Into<String>, downloader: impl Into<String>) -> Self {
        let mut status = Self::started(&NewDownload::new(id, downloader));
        status.download_progress = 1000;
        status.state = DownloadState::Seeding;
        status
    }

    /// Move `state` forward to `next`.
    ///
    /// Returns `Ok(true)` if the state changed and `Ok(false)` if it already
    /// was `next`.
    pub fn advance_state(&mut self, next: DownloadState) -> Result<bool, StateTransitionError> {
        if next < self.state {
            return Err(StateTransitionError::State {
                id: self.id.clone(),
                from: self.state.as_str(),
                to: next.as_str(),
            });
        }
        let changed = next != self.state;
        self.state = next;
        Ok(changed)
    }

    /// Move `move_state` forward to `next`.
    pub fn advance_move_state(&mut self, next: MoveState) -> Result<bool, StateTransitionError> {
        if next < self.move_state {
            return Err(StateTransitionError::Move {
                id: self.id.clone(),
                from: self.move_state.as_str(),
                to: next.as_str(),
            });
        }
        let changed = next != self.move_state;
        self.move_state = next;
        Ok(changed)
    }

    /// Set progress from a client-reported fraction, clamped to `0..=1000`.
    #[allow(clippy::cast_possible_truncation)] // clamped to 0..=1000 first
    pub fn set_progress_fraction(&mut self, percent_done: f64) {
        let permille = (percent_done * 1000.0).clamp(0.0, 1000.0);
        self.download_progress = permille as i32;
    }

    /// Whether local data may be destroyed on the client.
    pub fn is_purgeable(&self) -> bool {
        self.state == DownloadState::Stopped && self.move_state >= MoveState::Moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_ordering_matches_lifecycle() {
        assert!(DownloadState::Started < DownloadState::Seeding);
        assert!(DownloadState::Seeding < DownloadState::Stopped);
        assert!(DownloadState::Stopped < DownloadState::Deleted);
        assert!(MoveState::UnMoved < MoveState::Moved);
        assert!(MoveState::Moved < MoveState::Organized);
    }

    #[test]
    fn test_state_integer_roundtrip() {
        for state in [
            DownloadState::Started,
            DownloadState::Seeding,
            DownloadState::Stopped,
            DownloadState::Deleted,
        ] {
            assert_eq!(DownloadState::from_i64(state.as_i64()), Some(state));
        }
        assert_eq!(DownloadState::from_i64(7), None);
        assert_eq!(MoveState::from_i64(-1), None);
    }

    #[test]
    fn test_started_record_defaults() {
        let mut new = NewDownload::new("abc", "main");
        new.res_title = "Some Title".to_string();
        let status = DownloadStatus::started(&new);

        assert_eq!(status.state, DownloadState::Started);
        assert_eq!(status.move_state, MoveState::UnMoved);
        assert_eq!(status.download_progress, 0);
        assert!(status.upload_histories.is_empty());
        assert_eq!(status.res_title, "Some Title");
    }

    #[test]
    fn test_advance_state_forward_only() {
        let mut status = DownloadStatus::started(&NewDownload::new("abc", "main"));

        assert_eq!(status.advance_state(DownloadState::Seeding), Ok(true));
        assert_eq!(status.advance_state(DownloadState::Seeding), Ok(false));
        assert_eq!(status.advance_state(DownloadState::Stopped), Ok(true));

        let err = status.advance_state(DownloadState::Seeding).unwrap_err();
        assert!(err.to_string().contains("stopped"));
        assert_eq!(status.state, DownloadState::Stopped);
    }

    #[test]
    fn test_advance_move_state_never_regresses_organized() {
        let mut status = DownloadStatus::discovered_seeding("abc", "main");
        status.move_state = MoveState::Organized;

        assert!(status.advance_move_state(MoveState::Moved).is_err());
        assert_eq!(status.move_state, MoveState::Organized);
    }

    #[test]
    fn test_progress_fraction_is_clamped() {
        let mut status = DownloadStatus::started(&NewDownload::new("abc", "main"));

        status.set_progress_fraction(0.5);
        assert_eq!(status.download_progress, 500);

        status.set_progress_fraction(1.2);
        assert_eq!(status.download_progress, 1000);

        status.set_progress_fraction(-0.1);
        assert_eq!(status.download_progress, 0);
    }

    #[test]
    fn test_is_purgeable() {
        let mut status = DownloadStatus::discovered_seeding("abc", "main");
        assert!(!status.is_purgeable());

        status.state = DownloadState::Stopped;
        assert!(!status.is_purgeable());

        status.move_state = MoveState::Moved;
        assert!(status.is_purgeable());

        status.move_state = MoveState::Organized;
        assert!(status.is_purgeable());
    }
}
