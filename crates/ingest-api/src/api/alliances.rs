//! `POST /api/alliances/bulk-import` and `GET /api/alliances/{id}`.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use ingest_core::{alliance_detail::get_alliance_detail, run_bulk_import, BulkImportStats};
use ingest_document_store::alliances::AllianceRecord;

/// Runs synchronously: the Bulk Alliance Importer does not interact with
/// the Status Fabric, so there is no job to poll here.
pub async fn start_bulk_import(
    State(state): State<AppState>,
) -> Result<Json<BulkImportStats>, ApiError> {
    let stats = run_bulk_import(&state.client, &state.store).await?;
    tracing::info!(
        total = stats.total,
        created = stats.created,
        updated = stats.updated,
        failed = stats.failed,
        "bulk alliance import finished"
    );
    Ok(Json(stats))
}

pub async fn get_alliance(
    State(state): State<AppState>,
    Path(alliance_id): Path<i64>,
) -> Result<Json<AllianceRecord>, ApiError> {
    let record = get_alliance_detail(&state.store, &state.client, alliance_id).await?;
    Ok(Json(record))
}
