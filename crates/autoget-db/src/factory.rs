//! Composition utilities for wiring the record store.
//!
//! Construction only; no domain logic lives here.

use std::path::Path;
use std::sync::Arc;

use sqlx::SqlitePool;

use autoget_core::DownloadStatusRepository;

use crate::repositories::SqliteDownloadStatusRepository;
use crate::setup::setup_database;

/// Factory for `SQLite`-backed repositories.
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Open the database at `db_path` and build the record store on it.
    ///
    /// # Errors
    ///
    /// Fails if the database cannot be opened or its schema created.
    pub async fn open(db_path: &Path) -> anyhow::Result<Arc<dyn DownloadStatusRepository>> {
        let pool = setup_database(db_path).await?;
        Ok(Self::download_status_repository(pool))
    }

    /// Create a download status repository from a pool.
    pub fn download_status_repository(pool: SqlitePool) -> Arc<dyn DownloadStatusRepository> {
        Arc::new(SqliteDownloadStatusRepository::new(pool))
    }
}

/// Test database helper for integration tests.
///
/// Provides an in-memory `SQLite` database with the production schema.
#[cfg(any(test, feature = "test-utils"))]
pub struct TestDb {
    pool: SqlitePool,
}

#[cfg(any(test, feature = "test-utils"))]
impl TestDb {
    /// Create a new in-memory test database with full schema.
    pub async fn new() -> anyhow::Result<Self> {
        let pool = crate::setup::setup_test_database().await?;
        Ok(Self { pool })
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create a download status repository using this test database.
    pub fn download_status_repository(&self) -> SqliteDownloadStatusRepository {
        SqliteDownloadStatusRepository::new(self.pool.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoget_core::NewDownload;

    #[tokio::test]
    async fn test_open_creates_usable_store() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RepositoryFactory::open(&dir.path().join("autoget.db"))
            .await
            .unwrap();

        repo.create(&NewDownload::new("hash1", "main")).await.unwrap();
        assert_eq!(repo.list_started("main").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_test_db_shares_one_database() {
        let db = TestDb::new().await.unwrap();
        db.download_status_repository()
            .create(&NewDownload::new("hash1", "main"))
            .await
            .unwrap();

        let found = db
            .download_status_repository()
            .get("main", "hash1")
            .await
            .unwrap();
        assert_eq!(found.id, "hash1");
    }
}
