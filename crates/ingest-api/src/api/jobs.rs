//! `GET /api/jobs/{id}`: poll a job's current status snapshot.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use status_fabric::{FabricError, JobSnapshot};

pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobSnapshot>, ApiError> {
    let snapshot = state.fabric.get_status(&job_id).await.map_err(|err| match err {
        FabricError::NotFound(id) => ApiError::NotFound(format!("job not found: {id}")),
        other => ApiError::Internal(anyhow::anyhow!(other)),
    })?;
    Ok(Json(snapshot))
}
