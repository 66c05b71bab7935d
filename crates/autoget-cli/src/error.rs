//! CLI-specific error types and mappings.
//!
//! Maps core errors to exit codes and user-facing messages.

use autoget_core::{CoreError, RepositoryError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Core domain error.
    #[error("{0}")]
    Core(String),

    /// Invalid arguments (unknown downloader, duplicate hash, ...).
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Torrent client unreachable or refused a request.
    #[error("Torrent client error: {0}")]
    TorrentClient(String),
}

impl CliError {
    /// Map error to an exit code (see sysexits.h).
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Core(_) => 1,
            Self::Arguments(_) => 64,     // EX_USAGE
            Self::Config(_) => 78,        // EX_CONFIG
            Self::Database(_) => 73,      // EX_CANTCREAT (closest fit)
            Self::TorrentClient(_) => 69, // EX_UNAVAILABLE
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Repository(RepositoryError::AlreadyExists(id)) => {
                Self::Arguments(format!("{id} is already tracked"))
            }
            CoreError::Repository(repo_err) => Self::Database(repo_err.to_string()),
            CoreError::TorrentClient(client_err) => Self::TorrentClient(client_err.to_string()),
            CoreError::Configuration(msg) => Self::Config(msg),
            CoreError::Internal(msg) => Self::Core(msg),
        }
    }
}

impl From<RepositoryError> for CliError {
    fn from(err: RepositoryError) -> Self {
        CoreError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoget_core::TorrentClientError;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Config("x".into()).exit_code(), 78);
        assert_eq!(CliError::Arguments("x".into()).exit_code(), 64);
        assert_eq!(CliError::Core("x".into()).exit_code(), 1);
    }

    #[test]
    fn test_from_core_error() {
        let err: CliError = CoreError::TorrentClient(TorrentClientError::Network {
            message: "connection refused".into(),
        })
        .into();
        assert_eq!(err.exit_code(), 69);
        assert!(err.to_string().contains("connection refused"));

        let err: CliError = RepositoryError::AlreadyExists("abc".into()).into();
        assert!(matches!(err, CliError::Arguments(_)));

        let err: CliError = RepositoryError::Storage("disk full".into()).into();
        assert!(matches!(err, CliError::Database(_)));
    }
}
