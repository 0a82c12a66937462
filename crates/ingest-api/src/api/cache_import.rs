//! `POST /api/cache-import`: validate and enqueue a Keyed-Cache
//! Import Pipeline run. The worker is detached with its own
//! `CancellationToken` rather than the request's, so it
//! outlives this handler's response.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use ingest_core::{start_cache_import, CacheImportRequest};
use ingest_resilience::pacing::clamp_batch_size;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Serialize)]
pub struct StartJobResponse {
    pub job_id: String,
}

pub async fn start_cache_import_handler(
    State(state): State<AppState>,
    Json(request): Json<CacheImportRequest>,
) -> Result<Json<StartJobResponse>, ApiError> {
    let (job_id, families) = start_cache_import(&state.fabric, &request).await?;

    let fabric = state.fabric.clone();
    let cache = state.cache.clone();
    let catalog = state.catalog.clone();
    let force = request.force;
    let batch_size = clamp_batch_size(request.batch_size);
    let worker_job_id = job_id.clone();
    let cancel = CancellationToken::new();

    tokio::spawn(async move {
        if let Err(err) = ingest_core::run_cache_import(
            &fabric,
            &cache,
            &catalog,
            &worker_job_id,
            &families,
            force,
            batch_size,
            cancel,
        )
        .await
        {
            tracing::warn!(job_id = %worker_job_id, error = %err, "cache import worker failed");
        }
    });

    Ok(Json(StartJobResponse { job_id }))
}
