//! Track command handler.
//!
//! Registers a download that was just handed to a torrent client, so the
//! progress loop starts following it.

use anyhow::Result;
use autoget_core::{DownloadStatus, NewDownload};

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Arguments for the track command.
#[derive(Debug, Clone, Default)]
pub struct TrackArgs {
    pub downloader: String,
    pub hash: String,
    pub title: String,
    pub title2: String,
    pub indexer: String,
    pub category: String,
    pub files: Vec<String>,
}

/// Create a `Started` record for the torrent.
pub async fn execute(ctx: &CliContext, args: TrackArgs) -> Result<DownloadStatus> {
    ctx.config.downloader(&args.downloader)?;

    let hash = args.hash.trim().to_lowercase();
    if hash.is_empty() {
        return Err(CliError::Arguments("hash cannot be empty".to_string()).into());
    }

    let download = NewDownload {
        id: hash,
        downloader: args.downloader,
        res_indexer: args.indexer,
        res_title: args.title,
        res_title2: args.title2,
        category: args.category,
        file_list: args.files,
    };

    let status = ctx.repo.create(&download).await.map_err(CliError::from)?;
    tracing::info!(downloader = %status.downloader, hash = %status.id, "Tracking download");
    println!("Tracking {} on {}", status.id, status.downloader);
    Ok(status)
}
