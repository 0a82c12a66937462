use thiserror::Error;

/// Errors surfaced by the orchestration layer. `Validation` and
/// `NotFound` are synchronous; the rest only ever occur inside a
/// detached worker, where they become a `failed` status transition
/// rather than unwinding the task.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid argument: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("job cancelled")]
    Cancelled,

    #[error(transparent)]
    Store(#[from] ingest_document_store::StoreError),

    #[error(transparent)]
    Fabric(#[from] status_fabric::FabricError),

    #[error(transparent)]
    Upstream(#[from] alliance_client::ClientError),

    #[error(transparent)]
    Cache(#[from] keyed_cache::CacheError),

    #[error(transparent)]
    Sde(#[from] sde_data::SdeError),
}
