//! Torrent client port definition.
//!
//! The reconciler only needs four operations from a torrent client. Adapters
//! normalise their wire format into these types before anything reaches the
//! core.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// Activity of a torrent as reported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TorrentStatus {
    Stopped,
    QueuedToCheck,
    Checking,
    QueuedToDownload,
    Downloading,
    QueuedToSeed,
    Seeding,
}

impl TorrentStatus {
    /// Whether the client is actively seeding the torrent.
    #[must_use]
    pub const fn is_seeding(self) -> bool {
        matches!(self, Self::Seeding)
    }
}

/// One file inside a torrent, relative to the torrent's download directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentFile {
    pub name: String,
    pub length: i64,
}

/// Point-in-time view of one torrent on the client.
#[derive(Debug, Clone, PartialEq)]
pub struct TorrentSnapshot {
    /// Client-side identifier used by stop/remove commands.
    pub id: i64,
    /// Content hash, the key of the local record.
    pub hash: String,
    pub name: String,
    pub status: TorrentStatus,
    /// Completion as a fraction in `0.0..=1.0`.
    pub percent_done: f64,
    /// Cumulative bytes uploaded over the torrent's lifetime.
    pub uploaded_ever: i64,
    pub download_dir: PathBuf,
    pub files: Vec<TorrentFile>,
}

/// Session-wide client statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Aggregate download throughput in bytes per second.
    pub download_speed: u64,
}

/// Errors from torrent client operations.
///
/// Implementation-specific errors (HTTP, JSON) are mapped to these.
#[derive(Debug, Error)]
pub enum TorrentClientError {
    /// Network or connectivity error.
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error
        message: String,
    },

    /// The client rejected the request.
    #[error("{method} failed: {result}")]
    RpcFailure {
        /// The remote method that failed
        method: String,
        /// The client's failure description
        result: String,
    },

    /// The client answered with something we could not understand.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// What was invalid
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Configuration {
        /// What's wrong with the configuration
        message: String,
    },
}

/// Port for the torrent client that owns the downloads.
///
/// Each call is a single round trip; there is no cancellation beyond the
/// transport's own timeout.
#[async_trait]
pub trait TorrentClientPort: Send + Sync {
    /// Every torrent the client currently knows about.
    async fn list_all_torrents(&self) -> Result<Vec<TorrentSnapshot>, TorrentClientError>;

    /// Session-level statistics.
    async fn session_stats(&self) -> Result<SessionStats, TorrentClientError>;

    /// Stop (pause) the given torrents.
    async fn stop_torrents(&self, ids: &[i64]) -> Result<(), TorrentClientError>;

    /// Remove the given torrents, optionally deleting their local data.
    async fn remove_torrents(
        &self,
        ids: &[i64],
        delete_local_data: bool,
    ) -> Result<(), TorrentClientError>;
}
