//! Error types for the Upstream API Client.

use thiserror::Error;

/// Errors surfaced by the UAC. `NotFound` and `TransientUpstream`
/// must stay distinguishable: the importer counts the latter per-id and
/// continues, while the former is a definitive "this id does not exist".
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("upstream returned not-found")]
    NotFound,

    #[error("transient upstream error: {0}")]
    TransientUpstream(#[from] reqwest::Error),

    #[error("malformed upstream payload: {0}")]
    Data(String),
}

impl ClientError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::TransientUpstream(_))
    }
}
