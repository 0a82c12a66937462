//! `POST /api/sde/apply` and `GET /api/sde/check`.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use sde_data::{ApplyUpdateOutcome, UpdateCheck};

pub async fn check_sde_update(
    State(state): State<AppState>,
) -> Result<Json<UpdateCheck>, ApiError> {
    let check = state.updater.check_for_update(&state.data_dir).await?;
    Ok(Json(check))
}

pub async fn apply_sde_update(
    State(state): State<AppState>,
) -> Result<Json<ApplyUpdateOutcome>, ApiError> {
    match state.updater.apply_update(&state.data_dir).await {
        Ok(outcome) => {
            tracing::info!(
                fingerprint = %outcome.new_fingerprint,
                files_written = outcome.files_written,
                "sde update applied"
            );
            if let Err(err) = state.catalog.reload_all().await {
                tracing::warn!(error = %err, "sde update applied but catalog reload failed");
            }
            Ok(Json(outcome))
        }
        Err((err, log)) => {
            tracing::error!(error = %err, steps = log.len(), "sde update failed");
            Err(err.into())
        }
    }
}
