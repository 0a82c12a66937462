use thiserror::Error;

/// Errors surfaced by the Keyed Cache. Every variant wraps a
/// transport-level failure; there is no "not found" case here because
/// `GET` on a missing key is a normal `None`, not an error.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("pipeline partially failed: {0}")]
    PipelineFailed(String),
}
