//! Document Store (DS): durable key-to-document collections.
//!
//! Backs two collections used by the ingestion core: `alliances` (keyed by
//! `alliance_id`, soft-deletable) and `job_status` (keyed by `job_id`), each
//! with `find`/`insert`/`upsert` semantics over a shared SQLite pool.

pub mod alliances;
mod error;
pub mod jobs;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::migrate::MigrateDatabase;
use std::str::FromStr;

pub use alliances::AllianceRecord;
pub use error::StoreError;
pub use jobs::JobStatusRow;

pub type Result<T> = std::result::Result<T, StoreError>;

/// SQLite-backed handle to both collections.
///
/// One pool is shared across collections; each collection's table is
/// created with `CREATE TABLE IF NOT EXISTS` on open rather than through
/// a `sqlx::migrate!` directory.
#[derive(Clone)]
pub struct DocumentStore {
    pool: SqlitePool,
}

impl DocumentStore {
    /// Open or create the backing SQLite database at `path` and ensure
    /// both collections' schemas exist.
    pub async fn open(path: &str) -> Result<Self> {
        let db_url = if path.starts_with("sqlite:") {
            path.to_string()
        } else {
            format!("sqlite://{path}?mode=rwc")
        };

        if !sqlx::Sqlite::database_exists(&db_url)
            .await
            .unwrap_or(false)
        {
            sqlx::Sqlite::create_database(&db_url).await?;
        }

        let options = SqliteConnectOptions::from_str(&db_url)?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        alliances::ensure_schema(&pool).await?;
        jobs::ensure_schema(&pool).await?;

        tracing::info!(path, "document store schema initialized");

        Ok(Self { pool })
    }

    /// Open an in-memory store, useful for tests.
    pub async fn open_in_memory() -> Result<Self> {
        Self::open(":memory:").await
    }

    pub fn alliances(&self) -> alliances::AllianceCollection<'_> {
        alliances::AllianceCollection::new(&self.pool)
    }

    pub fn jobs(&self) -> jobs::JobCollection<'_> {
        jobs::JobCollection::new(&self.pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn opens_in_memory_and_creates_schema() {
        let store = DocumentStore::open_in_memory().await.unwrap();
        let found = store.alliances().find(99_000_001).await.unwrap();
        assert!(found.is_none());
    }
}
