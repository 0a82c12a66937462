//! Shared application state: one handle per leaf/core component, cloned
//! into every handler via `axum::extract::State`.

use alliance_client::AllianceClient;
use ingest_document_store::DocumentStore;
use keyed_cache::KeyedCache;
use sde_data::{DataDir, SdeUpdater, SdlCatalog};
use status_fabric::StatusFabric;

#[derive(Clone)]
pub struct AppState {
    pub store: DocumentStore,
    pub fabric: StatusFabric,
    pub client: AllianceClient,
    pub cache: KeyedCache,
    pub catalog: SdlCatalog,
    pub updater: SdeUpdater,
    pub data_dir: DataDir,
}
