#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export commonly used types for convenience
pub use config::{ConfigError, DownloaderConfig, SeedingPolicy, TransmissionConfig};
pub use domain::{
    DownloadState, DownloadStatus, HISTORY_DATE_FORMAT, MoveState, NewDownload, STORE_MAX_DAYS,
    StateTransitionError, UploadHistory,
};
pub use ports::{
    CoreError, DownloadStatusRepository, RepositoryError, SessionStats, TorrentClientError,
    TorrentClientPort, TorrentFile, TorrentSnapshot, TorrentStatus,
};
pub use services::{
    BUSY_DOWNLOAD_SPEED, FinalizeError, ProgressSyncReport, Reconciler, ReconcilerConfig,
    SeedingPolicyReport,
};
