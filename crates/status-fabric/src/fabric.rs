//! The Status Fabric: job lifecycle, dual-write to the Document
//! Store and an in-memory fast path, restart recovery.
//!
//! `UpdateStatus` writes through synchronously and only logs-and-continues
//! on a Document Store error: "must not fail the job on DS error...
//! the in-memory record remains authoritative". The in-memory map is a
//! lock-free concurrent map of `Arc<JobSnapshot>` so readers never block
//! writers: mutators publish a new snapshot pointer per write, readers
//! are wait-free.

use crate::error::FabricError;
use crate::model::{JobKind, JobSnapshot, JobState, Progress};
use chrono::Utc;
use dashmap::DashMap;
use ingest_document_store::{DocumentStore, JobStatusRow};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// How long a terminal job snapshot stays in the in-memory fast path
/// after completion before the background sweeper evicts it.
///
/// Terminal entries are "removed" from the in-memory map, but no fixed
/// deadline is mandated; this project picks 60 seconds so
/// a caller polling immediately after completion still observes the fast
/// path (see DESIGN.md, "Open Question resolutions").
pub const EVICTION_GRACE: Duration = Duration::from_secs(60);

pub type Result<T> = std::result::Result<T, FabricError>;

/// Owns the in-memory fast path and the Document Store handle for the
/// `job_status` collection.
#[derive(Clone)]
pub struct StatusFabric {
    store: DocumentStore,
    memory: Arc<DashMap<String, (Arc<JobSnapshot>, chrono::DateTime<Utc>)>>,
}

impl StatusFabric {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            store,
            memory: Arc::new(DashMap::new()),
        }
    }

    /// `CreateJob(kind, initialProgress) -> job_id`.
    pub async fn create_job(&self, kind: JobKind, progress: Progress) -> Result<String> {
        let job_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let snapshot = JobSnapshot::new(job_id.clone(), kind, progress, now);

        self.store.jobs().upsert(&to_row(&snapshot)?).await?;
        self.memory
            .insert(job_id.clone(), (Arc::new(snapshot), now));

        tracing::info!(job_id = %job_id, kind = %kind, "job created");
        Ok(job_id)
    }

    /// `UpdateStatus(snapshot)`: sets `updated_at`, writes through
    /// to the in-memory map unconditionally, and best-effort upserts into
    /// the Document Store. A store failure is logged and swallowed.
    pub async fn update_status(&self, mut snapshot: JobSnapshot) -> JobSnapshot {
        snapshot.updated_at = Utc::now();
        let eviction_at = Utc::now();
        let arc = Arc::new(snapshot.clone());
        self.memory
            .insert(snapshot.job_id.clone(), (arc, eviction_at));

        match to_row(&snapshot) {
            Ok(row) => {
                if let Err(err) = self.store.jobs().upsert(&row).await {
                    tracing::warn!(
                        job_id = %snapshot.job_id,
                        error = %err,
                        "failed to persist job status; in-memory record remains authoritative"
                    );
                }
            }
            Err(err) => {
                tracing::warn!(job_id = %snapshot.job_id, error = %err, "failed to serialize job progress");
            }
        }

        snapshot
    }

    /// First transition into `running`: sets `started_at` if unset.
    pub async fn mark_running(&self, mut snapshot: JobSnapshot) -> JobSnapshot {
        snapshot.state = JobState::Running;
        if snapshot.started_at.is_none() {
            snapshot.started_at = Some(Utc::now());
        }
        self.update_status(snapshot).await
    }

    /// `FailJob(snapshot, error)`.
    pub async fn fail_job(&self, mut snapshot: JobSnapshot, error: impl Into<String>) -> JobSnapshot {
        let now = Utc::now();
        snapshot.state = JobState::Failed;
        snapshot.ended_at = Some(now);
        snapshot.error = Some(error.into());
        self.update_status(snapshot).await
    }

    /// `CompleteJob(snapshot)`.
    pub async fn complete_job(&self, mut snapshot: JobSnapshot) -> JobSnapshot {
        let now = Utc::now();
        snapshot.state = JobState::Completed;
        snapshot.ended_at = Some(now);
        snapshot.error = None;
        snapshot.progress.current_step = "...completed successfully".to_string();
        self.update_status(snapshot).await
    }

    /// `GetStatus(job_id) -> snapshot`: in-memory fast path first,
    /// falling back to the Document Store; `not_found` if neither has it.
    pub async fn get_status(&self, job_id: &str) -> Result<JobSnapshot> {
        if let Some(entry) = self.memory.get(job_id) {
            return Ok((*entry.0).clone());
        }

        let row = self
            .store
            .jobs()
            .find(job_id)
            .await?
            .ok_or_else(|| FabricError::NotFound(job_id.to_string()))?;

        from_row(&row)
    }

    /// Background sweep: evict terminal snapshots older than
    /// `EVICTION_GRACE` from the in-memory map. Intended to be driven by
    /// a `tokio::time::interval` loop owned by the process entrypoint
    /// rather than spawned internally by the constructor.
    pub fn sweep_expired_terminal_entries(&self) {
        let now = Utc::now();
        self.memory.retain(|_, (snapshot, marked_at)| {
            if !snapshot.state.is_terminal() {
                return true;
            }
            let age = now.signed_duration_since(*marked_at);
            age.to_std().unwrap_or(Duration::ZERO) < EVICTION_GRACE
        });
    }

    /// Run the eviction sweep on a fixed interval until the returned
    /// handle is dropped or the process exits.
    pub fn spawn_eviction_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let fabric = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                fabric.sweep_expired_terminal_entries();
            }
        })
    }
}

fn to_row(snapshot: &JobSnapshot) -> Result<JobStatusRow> {
    Ok(JobStatusRow {
        job_id: snapshot.job_id.clone(),
        kind: snapshot.kind.to_string(),
        state: snapshot.state.to_string(),
        created_at: snapshot.created_at,
        updated_at: snapshot.updated_at,
        started_at: snapshot.started_at,
        ended_at: snapshot.ended_at,
        error: snapshot.error.clone(),
        progress: serde_json::to_value(&snapshot.progress)?,
    })
}

fn from_row(row: &JobStatusRow) -> Result<JobSnapshot> {
    let kind = JobKind::from_str(&row.kind)
        .map_err(|_| FabricError::NotFound(row.job_id.clone()))?;
    let state = JobState::from_str(&row.state)
        .map_err(|_| FabricError::NotFound(row.job_id.clone()))?;
    let progress: Progress = serde_json::from_value(row.progress.clone())?;

    Ok(JobSnapshot {
        job_id: row.job_id.clone(),
        kind,
        state,
        created_at: row.created_at,
        updated_at: row.updated_at,
        started_at: row.started_at,
        ended_at: row.ended_at,
        error: row.error.clone(),
        progress,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingest_document_store::DocumentStore;
    use std::time::Duration as StdDuration;

    async fn fabric() -> StatusFabric {
        let store = DocumentStore::open_in_memory().await.unwrap();
        StatusFabric::new(store)
    }

    #[tokio::test]
    async fn create_then_get_status_returns_pending() {
        let fabric = fabric().await;
        let job_id = fabric
            .create_job(JobKind::SdeImport, Progress::new(["agents".to_string()]))
            .await
            .unwrap();

        let snapshot = fabric.get_status(&job_id).await.unwrap();
        assert_eq!(snapshot.state, JobState::Pending);
        assert_eq!(snapshot.progress.total_steps, 1);
    }

    #[tokio::test]
    async fn unknown_job_id_is_not_found() {
        let fabric = fabric().await;
        let err = fabric.get_status("missing").await.unwrap_err();
        assert!(matches!(err, FabricError::NotFound(_)));
    }

    #[tokio::test]
    async fn updated_at_is_monotonic_across_updates() {
        let fabric = fabric().await;
        let job_id = fabric
            .create_job(JobKind::AllianceBulkImport, Progress::default())
            .await
            .unwrap();

        let first = fabric.get_status(&job_id).await.unwrap();
        tokio::time::sleep(StdDuration::from_millis(5)).await;
        let running = fabric.mark_running(first.clone()).await;

        assert!(running.updated_at >= first.updated_at);
        assert_eq!(running.state, JobState::Running);
        assert!(running.started_at.is_some());
    }

    #[tokio::test]
    async fn fail_job_sets_terminal_fields() {
        let fabric = fabric().await;
        let job_id = fabric
            .create_job(JobKind::SdeUpdate, Progress::default())
            .await
            .unwrap();
        let snapshot = fabric.get_status(&job_id).await.unwrap();

        let failed = fabric.fail_job(snapshot, "boom").await;
        assert_eq!(failed.state, JobState::Failed);
        assert_eq!(failed.error.as_deref(), Some("boom"));
        assert!(failed.ended_at.is_some());
        assert!(failed.check_invariants());
    }

    #[tokio::test]
    async fn complete_job_sets_terminal_fields_and_clears_error() {
        let fabric = fabric().await;
        let job_id = fabric
            .create_job(JobKind::SdeUpdate, Progress::default())
            .await
            .unwrap();
        let snapshot = fabric.get_status(&job_id).await.unwrap();

        let completed = fabric.complete_job(snapshot).await;
        assert_eq!(completed.state, JobState::Completed);
        assert!(completed.error.is_none());
        assert!(completed.check_invariants());
    }

    #[tokio::test]
    async fn restart_recovery_falls_back_to_document_store() {
        let store = DocumentStore::open_in_memory().await.unwrap();
        let fabric = StatusFabric::new(store.clone());
        let job_id = fabric
            .create_job(JobKind::SdeImport, Progress::default())
            .await
            .unwrap();

        // Simulate process restart: a fresh StatusFabric over the same
        // store has no in-memory entry and must fall back to the DS.
        let restarted = StatusFabric::new(store);
        let snapshot = restarted.get_status(&job_id).await.unwrap();
        assert_eq!(snapshot.job_id, job_id);
    }

    #[tokio::test]
    async fn eviction_sweep_removes_old_terminal_entries_only() {
        let fabric = fabric().await;
        let job_id = fabric
            .create_job(JobKind::SdeUpdate, Progress::default())
            .await
            .unwrap();
        let snapshot = fabric.get_status(&job_id).await.unwrap();
        let completed = fabric.complete_job(snapshot).await;

        // Manually age the entry past the grace period.
        fabric
            .memory
            .insert(job_id.clone(), (Arc::new(completed), Utc::now() - chrono::Duration::seconds(61)));

        fabric.sweep_expired_terminal_entries();
        assert!(fabric.memory.get(&job_id).is_none());

        // But the Document Store still has the row (restart recovery).
        let recovered = fabric.get_status(&job_id).await.unwrap();
        assert_eq!(recovered.state, JobState::Completed);
    }
}
