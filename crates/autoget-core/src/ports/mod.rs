//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the reconciler expects from
//! infrastructure. They contain no implementation details and use only domain
//! types.
//!
//! # Design Rules
//!
//! - No `sqlx` types in any signature
//! - No torrent-client wire shapes (status codes, RPC envelopes) in any signature
//! - Intent-based repository methods for the writes the reconciler performs

pub mod download_status_repository;
pub mod torrent_client;

use thiserror::Error;

pub use download_status_repository::DownloadStatusRepository;
pub use torrent_client::{
    SessionStats, TorrentClientError, TorrentClientPort, TorrentFile, TorrentSnapshot,
    TorrentStatus,
};

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details (e.g., sqlx errors)
/// and provides a clean interface for services to handle storage failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested entity was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An entity with the same identifier already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Storage backend error (database, filesystem, etc.).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A constraint was violated (e.g., the hash belongs to another downloader).
    #[error("Constraint violation: {0}")]
    Constraint(String),
}

/// Core error type for semantic domain errors.
///
/// Adapters map this to their own error types (CLI exit codes, log lines).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Torrent client operation failed.
    #[error(transparent)]
    TorrentClient(#[from] TorrentClientError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error (unexpected condition).
    #[error("Internal error: {0}")]
    Internal(String),
}
