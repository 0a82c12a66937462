//! Durable and in-memory shapes for job status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Which long-running component owns a job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    SdeImport,
    AllianceBulkImport,
    SdeUpdate,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobKind::SdeImport => "sde_import",
            JobKind::AllianceBulkImport => "alliance_bulk_import",
            JobKind::SdeUpdate => "sde_update",
        };
        write!(f, "{s}")
    }
}

impl FromStr for JobKind {
    type Err = anyhow_like::ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sde_import" => Ok(JobKind::SdeImport),
            "alliance_bulk_import" => Ok(JobKind::AllianceBulkImport),
            "sde_update" => Ok(JobKind::SdeUpdate),
            other => Err(anyhow_like::ParseKindError(other.to_string())),
        }
    }
}

/// Job lifecycle state. `pending -> running -> {completed, failed}`, no
/// other transitions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Pending => "pending",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

impl FromStr for JobState {
    type Err = anyhow_like::ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobState::Pending),
            "running" => Ok(JobState::Running),
            "completed" => Ok(JobState::Completed),
            "failed" => Ok(JobState::Failed),
            other => Err(anyhow_like::ParseKindError(other.to_string())),
        }
    }
}

/// State of a single family within a job's progress document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FamilyState {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for FamilyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FamilyState::Pending => "pending",
            FamilyState::Processing => "processing",
            FamilyState::Completed => "completed",
            FamilyState::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Per-family progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FamilyStatus {
    pub name: String,
    pub state: FamilyState,
    /// Total items to process; populated at family start.
    pub count: u64,
    /// Items written or skipped so far.
    pub processed: u64,
    pub error: Option<String>,
}

impl FamilyStatus {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: FamilyState::Pending,
            count: 0,
            processed: 0,
            error: None,
        }
    }

    /// `100 * processed / count` when `count > 0`, else 0.
    pub fn percent_complete(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            100.0 * self.processed as f64 / self.count as f64
        }
    }
}

/// The structured progress sub-document of a job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Progress {
    pub total_steps: u64,
    pub completed_steps: u64,
    pub current_step: String,
    /// Keyed by family name; `BTreeMap` for deterministic serialization.
    pub families: BTreeMap<String, FamilyStatus>,
}

impl Progress {
    pub fn new(family_names: impl IntoIterator<Item = String>) -> Self {
        let families: BTreeMap<String, FamilyStatus> = family_names
            .into_iter()
            .map(|name| (name.clone(), FamilyStatus::pending(name)))
            .collect();
        Self {
            total_steps: families.len() as u64,
            completed_steps: 0,
            current_step: String::new(),
            families,
        }
    }

    /// `100 * completed_steps / total_steps` when `total_steps > 0`, else 0.
    pub fn percent_complete(&self) -> f64 {
        if self.total_steps == 0 {
            0.0
        } else {
            100.0 * self.completed_steps as f64 / self.total_steps as f64
        }
    }
}

/// A complete job status snapshot, the unit of work passed
/// to `CreateJob`/`UpdateStatus`/`FailJob`/`CompleteJob`/`GetStatus`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobSnapshot {
    pub job_id: String,
    pub kind: JobKind,
    pub state: JobState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub progress: Progress,
}

impl JobSnapshot {
    pub fn new(job_id: String, kind: JobKind, progress: Progress, now: DateTime<Utc>) -> Self {
        Self {
            job_id,
            kind,
            state: JobState::Pending,
            created_at: now,
            updated_at: now,
            started_at: None,
            ended_at: None,
            error: None,
            progress,
        }
    }

    /// `state = completed => ended_at set and error empty`;
    /// `state = failed => ended_at set and error non-empty`;
    /// `updated_at >= started_at >= created_at`.
    pub fn check_invariants(&self) -> bool {
        let terminal_ok = match self.state {
            JobState::Completed => self.ended_at.is_some() && self.error.is_none(),
            JobState::Failed => self.ended_at.is_some() && self.error.as_deref().is_some_and(|e| !e.is_empty()),
            _ => true,
        };
        let monotone = self.updated_at >= self.started_at.unwrap_or(self.created_at)
            && self.started_at.unwrap_or(self.created_at) >= self.created_at;
        terminal_ok && monotone
    }
}

/// A lightweight local stand-in for `anyhow::Error` so this crate does not
/// need to pull in `anyhow` just to parse two small enums.
pub(crate) mod anyhow_like {
    use std::fmt;

    #[derive(Debug)]
    pub struct ParseKindError(pub String);

    impl fmt::Display for ParseKindError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "invalid value: {}", self.0)
        }
    }

    impl std::error::Error for ParseKindError {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_kind_roundtrips() {
        assert_eq!(JobKind::SdeImport.to_string(), "sde_import");
        assert_eq!(
            JobKind::from_str("alliance_bulk_import").unwrap(),
            JobKind::AllianceBulkImport
        );
        assert!(JobKind::from_str("bogus").is_err());
    }

    #[test]
    fn progress_percent_complete_guards_division_by_zero() {
        let progress = Progress::default();
        assert_eq!(progress.percent_complete(), 0.0);
    }

    #[test]
    fn family_status_percent_complete() {
        let mut fs = FamilyStatus::pending("agents");
        fs.count = 4;
        fs.processed = 1;
        assert_eq!(fs.percent_complete(), 25.0);
    }

    #[test]
    fn snapshot_invariants_hold_for_completed_state() {
        let now = Utc::now();
        let mut snap = JobSnapshot::new("job-1".into(), JobKind::SdeImport, Progress::default(), now);
        snap.state = JobState::Completed;
        snap.ended_at = Some(now);
        assert!(snap.check_invariants());
    }

    #[test]
    fn snapshot_invariants_reject_failed_without_error() {
        let now = Utc::now();
        let mut snap = JobSnapshot::new("job-1".into(), JobKind::SdeImport, Progress::default(), now);
        snap.state = JobState::Failed;
        snap.ended_at = Some(now);
        assert!(!snap.check_invariants());
    }
}
