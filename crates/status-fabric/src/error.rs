use thiserror::Error;

#[derive(Debug, Error)]
pub enum FabricError {
    #[error("job not found: {0}")]
    NotFound(String),

    #[error("document store error: {0}")]
    Store(#[from] ingest_document_store::StoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
