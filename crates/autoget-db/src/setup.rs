//! Database setup and initialization.
//!
//! Entry points call [`setup_database`] with the configured database path.

use std::path::Path;

use anyhow::Result;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};

/// Opens (creating if needed) the `SQLite` database and ensures the schema
/// exists.
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The database file cannot be opened or created
/// - Schema creation fails
///
/// # Example
///
/// ```rust,no_run
/// use autoget_db::setup_database;
/// use std::path::Path;
///
/// # async fn example() -> anyhow::Result<()> {
/// let pool = setup_database(Path::new("/var/lib/autoget/autoget.db")).await?;
/// # Ok(())
/// # }
/// ```
pub async fn setup_database(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let pool = SqlitePool::connect_with(
        SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal),
    )
    .await?;

    create_schema(&pool).await?;
    tracing::debug!(path = %db_path.display(), "Database ready");

    Ok(pool)
}

/// Sets up an in-memory `SQLite` database for testing.
///
/// The pool holds a single connection that is never recycled: every
/// connection to `sqlite::memory:` is a separate, empty database.
#[cfg(any(test, feature = "test-utils"))]
pub async fn setup_test_database() -> Result<SqlitePool> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    create_schema(&pool).await?;
    Ok(pool)
}

/// Creates the schema. Safe to call repeatedly.
async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // state: 0 started, 1 seeding, 2 stopped, 3 deleted
    // move_state: 0 unmoved, 1 moved, 2 organized
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS download_status (
            id TEXT PRIMARY KEY NOT NULL,
            downloader TEXT NOT NULL,
            download_progress INTEGER NOT NULL DEFAULT 0,
            state INTEGER NOT NULL DEFAULT 0,
            move_state INTEGER NOT NULL DEFAULT 0,
            upload_histories TEXT NOT NULL DEFAULT '{}',
            res_indexer TEXT NOT NULL DEFAULT '',
            res_title TEXT NOT NULL DEFAULT '',
            res_title2 TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL DEFAULT '',
            file_list TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_download_status_downloader_state \
         ON download_status(downloader, state)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_download_status_updated_at \
         ON download_status(updated_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
