//! Core domain types for tracked downloads.
//!
//! Pure data types with no I/O dependencies.
//!
//! # Structure
//!
//! - `download_status` - `DownloadStatus` and its two forward-only state machines
//! - `upload_history` - per-day cumulative upload series used by the seeding policy

pub mod download_status;
pub mod upload_history;

pub use download_status::{
    DownloadState, DownloadStatus, MoveState, NewDownload, StateTransitionError,
};
pub use upload_history::{HISTORY_DATE_FORMAT, STORE_MAX_DAYS, UploadHistory};
