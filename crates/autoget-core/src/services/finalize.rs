//! File finalization: copy a completed torrent out of the client's directory.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::ports::TorrentSnapshot;

/// Why a torrent's files could not be copied.
#[derive(Debug, Error)]
pub enum FinalizeError {
    /// The client reported a file name that would land outside the
    /// destination directory.
    #[error("refusing to copy '{name}': path escapes the destination")]
    UnsafePath { name: String },

    #[error("failed to copy {from} to {to}: {source}")]
    Io {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Copy every file of `torrent` into `<finished_dir>/<hash>/<file name>`.
///
/// Stops at the first failure. Files copied before the failure stay on disk;
/// the caller retries the whole set on the next cycle.
///
/// Returns the number of files copied.
pub async fn copy_torrent_files(
    torrent: &TorrentSnapshot,
    finished_dir: &Path,
) -> Result<usize, FinalizeError> {
    let target_root = finished_dir.join(&torrent.hash);
    if !is_relative_name(Path::new(&torrent.hash)) {
        return Err(FinalizeError::UnsafePath {
            name: torrent.hash.clone(),
        });
    }
    create_dir(&target_root).await?;

    for file in &torrent.files {
        let relative = Path::new(&file.name);
        if !is_relative_name(relative) {
            return Err(FinalizeError::UnsafePath {
                name: file.name.clone(),
            });
        }

        let from = torrent.download_dir.join(relative);
        let to = target_root.join(relative);
        if let Some(parent) = to.parent() {
            create_dir(parent).await?;
        }

        tokio::fs::copy(&from, &to)
            .await
            .map_err(|source| FinalizeError::Io {
                from: from.clone(),
                to: to.clone(),
                source,
            })?;
        tracing::debug!(hash = %torrent.hash, file = %file.name, "Copied file");
    }

    Ok(torrent.files.len())
}

async fn create_dir(dir: &Path) -> Result<(), FinalizeError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| FinalizeError::Io {
            from: dir.to_path_buf(),
            to: dir.to_path_buf(),
            source,
        })
}

/// Names at least one entry and has no root or `..` component.
fn is_relative_name(path: &Path) -> bool {
    path.components().any(|c| matches!(c, Component::Normal(_)))
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
