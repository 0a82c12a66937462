//! `axum::Router` assembly for the HTTP surface: six routes, no
//! auth layer, no CORS, no WebSocket upgrade.

use crate::api::{alliances, cache_import, jobs, sde};
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/cache-import", post(cache_import::start_cache_import_handler))
        .route("/api/jobs/:id", get(jobs::get_job_status))
        .route("/api/alliances/bulk-import", post(alliances::start_bulk_import))
        .route("/api/alliances/:id", get(alliances::get_alliance))
        .route("/api/sde/apply", post(sde::apply_sde_update))
        .route("/api/sde/check", get(sde::check_sde_update))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
