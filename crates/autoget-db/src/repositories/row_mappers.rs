//! Row mapping helpers for `SQLite` queries.

use autoget_core::{DownloadState, DownloadStatus, MoveState, RepositoryError, UploadHistory};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;

/// Shared SELECT column list for download status queries.
pub const DOWNLOAD_STATUS_COLUMNS: &str = "id, downloader, download_progress, state, move_state, upload_histories, res_indexer, res_title, res_title2, category, file_list, created_at, updated_at";

/// Fixed-width RFC 3339 so that stored timestamps compare correctly as text.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Serialization(format!("bad timestamp '{raw}': {e}")))
}

/// Serialize a value into a JSON column.
pub fn to_json<T: serde::Serialize + ?Sized>(
    value: &T,
) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

/// Parse a database row into a `DownloadStatus`.
pub fn row_to_download_status(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<DownloadStatus, RepositoryError> {
    let id: String = row.try_get("id").map_err(map_column_error)?;

    let state_raw: i64 = row.try_get("state").map_err(map_column_error)?;
    let state = DownloadState::from_i64(state_raw).ok_or_else(|| {
        RepositoryError::Serialization(format!("download {id}: unknown state {state_raw}"))
    })?;

    let move_raw: i64 = row.try_get("move_state").map_err(map_column_error)?;
    let move_state = MoveState::from_i64(move_raw).ok_or_else(|| {
        RepositoryError::Serialization(format!("download {id}: unknown move state {move_raw}"))
    })?;

    let histories_json: String = row.try_get("upload_histories").map_err(map_column_error)?;
    let upload_histories: UploadHistory = serde_json::from_str(&histories_json)
        .map_err(|e| RepositoryError::Serialization(format!("download {id}: {e}")))?;

    let file_list_json: String = row.try_get("file_list").map_err(map_column_error)?;
    let file_list: Vec<String> = serde_json::from_str(&file_list_json)
        .map_err(|e| RepositoryError::Serialization(format!("download {id}: file list: {e}")))?;

    let created_at: String = row.try_get("created_at").map_err(map_column_error)?;
    let updated_at: String = row.try_get("updated_at").map_err(map_column_error)?;

    Ok(DownloadStatus {
        downloader: row.try_get("downloader").map_err(map_column_error)?,
        download_progress: row.try_get("download_progress").map_err(map_column_error)?,
        state,
        move_state,
        upload_histories,
        res_indexer: row.try_get("res_indexer").map_err(map_column_error)?,
        res_title: row.try_get("res_title").map_err(map_column_error)?,
        res_title2: row.try_get("res_title2").map_err(map_column_error)?,
        category: row.try_get("category").map_err(map_column_error)?,
        file_list,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
        id,
    })
}

pub fn map_column_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(format!("Column read error: {e}"))
}
