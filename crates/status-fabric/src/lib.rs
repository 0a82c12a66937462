//! Status Fabric: job lifecycle, dual-write to the Document Store and an
//! in-memory fast path, restart recovery.
//!
//! A per-job status record with a nested per-family progress document
//! (see DESIGN.md for the full grounding rationale).

mod error;
mod fabric;
mod model;

pub use error::FabricError;
pub use fabric::{StatusFabric, EVICTION_GRACE};
pub use model::{FamilyState, FamilyStatus, JobKind, JobSnapshot, JobState, Progress};
