//! `SQLite` implementation of the `DownloadStatusRepository` trait.

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use autoget_core::{
    DownloadState, DownloadStatus, DownloadStatusRepository, MoveState, NewDownload,
    RepositoryError,
};

use super::row_mappers::{
    DOWNLOAD_STATUS_COLUMNS, format_timestamp, row_to_download_status, to_json,
};

/// `SQLite` implementation of the `DownloadStatusRepository` trait.
///
/// State columns are only ever raised (`MAX(old, new)`), never lowered.
pub struct SqliteDownloadStatusRepository {
    pool: SqlitePool,
}

impl SqliteDownloadStatusRepository {
    /// Create a new `SQLite` download status repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool (for testing only).
    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn list_where(
        &self,
        downloader: &str,
        condition: &str,
    ) -> Result<Vec<DownloadStatus>, RepositoryError> {
        let sql = format!(
            "SELECT {DOWNLOAD_STATUS_COLUMNS} FROM download_status \
             WHERE downloader = ? AND {condition} ORDER BY created_at ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(downloader)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        rows.iter().map(row_to_download_status).collect()
    }
}

#[async_trait]
impl DownloadStatusRepository for SqliteDownloadStatusRepository {
    async fn list_started(&self, downloader: &str) -> Result<Vec<DownloadStatus>, RepositoryError> {
        self.list_where(downloader, "state = 0").await
    }

    async fn list_unmoved(&self, downloader: &str) -> Result<Vec<DownloadStatus>, RepositoryError> {
        self.list_where(downloader, "state >= 1 AND move_state = 0")
            .await
    }

    async fn list_purgeable(
        &self,
        downloader: &str,
    ) -> Result<Vec<DownloadStatus>, RepositoryError> {
        self.list_where(downloader, "state = 2 AND move_state >= 1")
            .await
    }

    async fn list_all(
        &self,
        downloader: Option<&str>,
    ) -> Result<Vec<DownloadStatus>, RepositoryError> {
        let rows = match downloader {
            Some(name) => {
                let sql = format!(
                    "SELECT {DOWNLOAD_STATUS_COLUMNS} FROM download_status \
                     WHERE downloader = ? ORDER BY created_at DESC"
                );
                sqlx::query(&sql).bind(name).fetch_all(&self.pool).await
            }
            None => {
                let sql = format!(
                    "SELECT {DOWNLOAD_STATUS_COLUMNS} FROM download_status ORDER BY created_at DESC"
                );
                sqlx::query(&sql).fetch_all(&self.pool).await
            }
        }
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        rows.iter().map(row_to_download_status).collect()
    }

    async fn get(&self, downloader: &str, id: &str) -> Result<DownloadStatus, RepositoryError> {
        let sql = format!(
            "SELECT {DOWNLOAD_STATUS_COLUMNS} FROM download_status WHERE downloader = ? AND id = ?"
        );
        let row = sqlx::query(&sql)
            .bind(downloader)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?
            .ok_or_else(|| RepositoryError::NotFound(format!("Download '{id}'")))?;

        row_to_download_status(&row)
    }

    async fn create(&self, download: &NewDownload) -> Result<DownloadStatus, RepositoryError> {
        let status = DownloadStatus::started(download);
        let now = format_timestamp(status.created_at);

        let result = sqlx::query(
            r#"
            INSERT INTO download_status (
                id, downloader, download_progress, state, move_state,
                upload_histories, res_indexer, res_title, res_title2,
                category, file_list, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&status.id)
        .bind(&status.downloader)
        .bind(status.download_progress)
        .bind(status.state.as_i64())
        .bind(status.move_state.as_i64())
        .bind(to_json(&status.upload_histories)?)
        .bind(&status.res_indexer)
        .bind(&status.res_title)
        .bind(&status.res_title2)
        .bind(&status.category)
        .bind(to_json(&status.file_list)?)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(status),
            Err(sqlx::Error::Database(db_err))
                if db_err.message().contains("UNIQUE constraint failed") =>
            {
                Err(RepositoryError::AlreadyExists(format!(
                    "Download '{}'",
                    download.id
                )))
            }
            Err(e) => Err(RepositoryError::Storage(e.to_string())),
        }
    }

    async fn save(&self, status: &DownloadStatus) -> Result<(), RepositoryError> {
        // Metadata and progress are insert-only; progress belongs to update_progress.
        let result = sqlx::query(
            r#"
            INSERT INTO download_status (
                id, downloader, download_progress, state, move_state,
                upload_histories, res_indexer, res_title, res_title2,
                category, file_list, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                state = MAX(download_status.state, excluded.state),
                move_state = MAX(download_status.move_state, excluded.move_state),
                upload_histories = excluded.upload_histories,
                updated_at = excluded.updated_at
            WHERE download_status.downloader = excluded.downloader
            "#,
        )
        .bind(&status.id)
        .bind(&status.downloader)
        .bind(status.download_progress)
        .bind(status.state.as_i64())
        .bind(status.move_state.as_i64())
        .bind(to_json(&status.upload_histories)?)
        .bind(&status.res_indexer)
        .bind(&status.res_title)
        .bind(&status.res_title2)
        .bind(&status.category)
        .bind(to_json(&status.file_list)?)
        .bind(format_timestamp(status.created_at))
        .bind(format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Constraint(format!(
                "Download '{}' belongs to another downloader",
                status.id
            )));
        }

        Ok(())
    }

    async fn update_progress(
        &self,
        downloader: &str,
        id: &str,
        download_progress: i32,
        state: DownloadState,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE download_status
            SET download_progress = ?, state = MAX(state, ?), updated_at = ?
            WHERE downloader = ? AND id = ?
            "#,
        )
        .bind(download_progress)
        .bind(state.as_i64())
        .bind(format_timestamp(Utc::now()))
        .bind(downloader)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Download '{id}'")));
        }

        Ok(())
    }

    async fn update_move_state(
        &self,
        downloader: &str,
        id: &str,
        move_state: MoveState,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE download_status
            SET move_state = MAX(move_state, ?), updated_at = ?
            WHERE downloader = ? AND id = ?
            "#,
        )
        .bind(move_state.as_i64())
        .bind(format_timestamp(Utc::now()))
        .bind(downloader)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Download '{id}'")));
        }

        Ok(())
    }

    async fn update_state(
        &self,
        downloader: &str,
        ids: &[String],
        state: DownloadState,
    ) -> Result<u64, RepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE download_status SET state = MAX(state, ");
        query
            .push_bind(state.as_i64())
            .push("), updated_at = ")
            .push_bind(format_timestamp(Utc::now()))
            .push(" WHERE downloader = ")
            .push_bind(downloader)
            .push(" AND id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(")");

        let result = query
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn delete_older_than(&self, downloader: &str, days: u32) -> Result<u64, RepositoryError> {
        let cutoff = Utc::now() - TimeDelta::days(i64::from(days));

        let result =
            sqlx::query("DELETE FROM download_status WHERE downloader = ? AND updated_at < ?")
                .bind(downloader)
                .bind(format_timestamp(cutoff))
                .execute(&self.pool)
                .await
                .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
