use thiserror::Error;

/// Errors surfaced by the Document Store leaf.
///
/// Maps onto the `store-transient` kind in the error taxonomy:
/// callers decide per call-site whether a failure here is fatal (keyed
/// cache flush), counted-and-skipped (bulk alliance upsert), or
/// logged-and-swallowed (status updates, read-through upsert).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("document not found")]
    NotFound,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
