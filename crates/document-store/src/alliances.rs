//! `alliances` collection: one row per alliance, soft-deletable.

use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

/// Alliance Record (durable).
///
/// `alliance_id` is the primary key; `deleted_at` is never set by this
/// core (external tools only) but is honored on every read as a soft
/// delete filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllianceRecord {
    pub alliance_id: i64,
    pub name: String,
    pub ticker: String,
    pub date_founded: DateTime<Utc>,
    pub creator_corporation_id: i64,
    pub creator_character_id: i64,
    pub executor_corporation_id: Option<i64>,
    pub faction_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

pub(crate) async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS alliances (
            alliance_id INTEGER PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            ticker TEXT NOT NULL,
            date_founded TEXT NOT NULL,
            creator_corporation_id INTEGER NOT NULL,
            creator_character_id INTEGER NOT NULL,
            executor_corporation_id INTEGER,
            faction_id INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<AllianceRecord> {
    Ok(AllianceRecord {
        alliance_id: row.try_get("alliance_id")?,
        name: row.try_get("name")?,
        ticker: row.try_get("ticker")?,
        date_founded: row.try_get("date_founded")?,
        creator_corporation_id: row.try_get("creator_corporation_id")?,
        creator_character_id: row.try_get("creator_character_id")?,
        executor_corporation_id: row.try_get("executor_corporation_id")?,
        faction_id: row.try_get("faction_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}

/// Handle to the `alliances` collection, scoped to one connection pool.
pub struct AllianceCollection<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AllianceCollection<'a> {
    pub(crate) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// `find(alliance_id)`, filtering out soft-deleted records.
    pub async fn find(&self, alliance_id: i64) -> Result<Option<AllianceRecord>> {
        let row = sqlx::query(
            "SELECT * FROM alliances WHERE alliance_id = ? AND deleted_at IS NULL",
        )
        .bind(alliance_id)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(row_to_record).transpose()
    }

    /// `upsert(filter=alliance_id, patch)`: creates-or-updates by unique
    /// index on `alliance_id`.
    pub async fn upsert(&self, record: &AllianceRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO alliances (
                alliance_id, name, ticker, date_founded,
                creator_corporation_id, creator_character_id,
                executor_corporation_id, faction_id,
                created_at, updated_at, deleted_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (alliance_id) DO UPDATE SET
                name = excluded.name,
                ticker = excluded.ticker,
                date_founded = excluded.date_founded,
                creator_corporation_id = excluded.creator_corporation_id,
                creator_character_id = excluded.creator_character_id,
                executor_corporation_id = excluded.executor_corporation_id,
                faction_id = excluded.faction_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(record.alliance_id)
        .bind(&record.name)
        .bind(&record.ticker)
        .bind(record.date_founded)
        .bind(record.creator_corporation_id)
        .bind(record.creator_character_id)
        .bind(record.executor_corporation_id)
        .bind(record.faction_id)
        .bind(record.created_at)
        .bind(record.updated_at)
        .bind(record.deleted_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// `true` iff a (non-deleted) row for `alliance_id` already exists.
    /// Used by the Bulk Alliance Importer to classify created vs updated.
    pub async fn exists(&self, alliance_id: i64) -> Result<bool> {
        Ok(self.find(alliance_id).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocumentStore;

    fn sample(id: i64) -> AllianceRecord {
        let now = Utc::now();
        AllianceRecord {
            alliance_id: id,
            name: "Test Alliance".into(),
            ticker: "TEST".into(),
            date_founded: now,
            creator_corporation_id: 1,
            creator_character_id: 2,
            executor_corporation_id: Some(3),
            faction_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn upsert_then_find_roundtrips() {
        let store = DocumentStore::open_in_memory().await.unwrap();
        let rec = sample(99_000_001);
        store.alliances().upsert(&rec).await.unwrap();

        let found = store.alliances().find(99_000_001).await.unwrap().unwrap();
        assert_eq!(found.name, "Test Alliance");
        assert!(store.alliances().exists(99_000_001).await.unwrap());
    }

    #[tokio::test]
    async fn upsert_is_idempotent_on_alliance_id() {
        let store = DocumentStore::open_in_memory().await.unwrap();
        let mut rec = sample(99_000_002);
        store.alliances().upsert(&rec).await.unwrap();

        rec.name = "Renamed Alliance".into();
        store.alliances().upsert(&rec).await.unwrap();

        let found = store.alliances().find(99_000_002).await.unwrap().unwrap();
        assert_eq!(found.name, "Renamed Alliance");
    }

    #[tokio::test]
    async fn unknown_alliance_is_not_found() {
        let store = DocumentStore::open_in_memory().await.unwrap();
        assert!(store.alliances().find(99_999_999).await.unwrap().is_none());
    }
}
