//! `job_status` collection: durable job lifecycle rows.
//!
//! The Document Store stores job status as an opaque row plus a
//! JSON-serialized progress document; it does not know about
//! `status_fabric::Progress`'s shape, avoiding a dependency cycle between
//! `document-store` and `status-fabric`. The latter serializes/
//! deserializes the progress document on either side of this boundary.

use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use sqlx::{Row, SqlitePool};

/// A durable snapshot of one job's status row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusRow {
    pub job_id: String,
    pub kind: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub progress: Json,
}

pub(crate) async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS job_status (
            job_id TEXT PRIMARY KEY NOT NULL,
            kind TEXT NOT NULL,
            state TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            started_at TEXT,
            ended_at TEXT,
            error TEXT,
            progress TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn row_to_status(row: &sqlx::sqlite::SqliteRow) -> Result<JobStatusRow> {
    let progress_text: String = row.try_get("progress")?;
    Ok(JobStatusRow {
        job_id: row.try_get("job_id")?,
        kind: row.try_get("kind")?,
        state: row.try_get("state")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        started_at: row.try_get("started_at")?,
        ended_at: row.try_get("ended_at")?,
        error: row.try_get("error")?,
        progress: serde_json::from_str(&progress_text)?,
    })
}

/// Handle to the `job_status` collection, scoped to one connection pool.
pub struct JobCollection<'a> {
    pool: &'a SqlitePool,
}

impl<'a> JobCollection<'a> {
    pub(crate) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, job_id: &str) -> Result<Option<JobStatusRow>> {
        let row = sqlx::query("SELECT * FROM job_status WHERE job_id = ?")
            .bind(job_id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(row_to_status).transpose()
    }

    /// `upsert(filter=job_id, patch)`. Used by the Status Fabric on every
    /// `CreateJob`/`UpdateStatus`/`FailJob`/`CompleteJob` call.
    pub async fn upsert(&self, status: &JobStatusRow) -> Result<()> {
        let progress_text = serde_json::to_string(&status.progress)?;

        sqlx::query(
            r#"
            INSERT INTO job_status (
                job_id, kind, state, created_at, updated_at,
                started_at, ended_at, error, progress
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (job_id) DO UPDATE SET
                kind = excluded.kind,
                state = excluded.state,
                updated_at = excluded.updated_at,
                started_at = excluded.started_at,
                ended_at = excluded.ended_at,
                error = excluded.error,
                progress = excluded.progress
            "#,
        )
        .bind(&status.job_id)
        .bind(&status.kind)
        .bind(&status.state)
        .bind(status.created_at)
        .bind(status.updated_at)
        .bind(status.started_at)
        .bind(status.ended_at)
        .bind(&status.error)
        .bind(progress_text)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocumentStore;

    fn sample(job_id: &str) -> JobStatusRow {
        let now = Utc::now();
        JobStatusRow {
            job_id: job_id.to_string(),
            kind: "sde_import".into(),
            state: "pending".into(),
            created_at: now,
            updated_at: now,
            started_at: None,
            ended_at: None,
            error: None,
            progress: serde_json::json!({"total_steps": 0, "completed_steps": 0}),
        }
    }

    #[tokio::test]
    async fn upsert_then_find_roundtrips() {
        let store = DocumentStore::open_in_memory().await.unwrap();
        let row = sample("job-1");
        store.jobs().upsert(&row).await.unwrap();

        let found = store.jobs().find("job-1").await.unwrap().unwrap();
        assert_eq!(found.state, "pending");
    }

    #[tokio::test]
    async fn restart_recovery_reads_last_persisted_snapshot() {
        let store = DocumentStore::open_in_memory().await.unwrap();
        let mut row = sample("job-2");
        store.jobs().upsert(&row).await.unwrap();

        row.state = "running".into();
        row.started_at = Some(Utc::now());
        store.jobs().upsert(&row).await.unwrap();

        let found = store.jobs().find("job-2").await.unwrap().unwrap();
        assert_eq!(found.state, "running");
        assert!(found.started_at.is_some());
    }
}
