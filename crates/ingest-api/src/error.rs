//! HTTP error boundary: one enum, one `IntoResponse` impl, internal
//! details swallowed from the client on a 500 but always logged server-side.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid argument: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("job cancelled")]
    Cancelled,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<ingest_core::CoreError> for ApiError {
    fn from(err: ingest_core::CoreError) -> Self {
        match err {
            ingest_core::CoreError::Validation(msg) => ApiError::Validation(msg),
            ingest_core::CoreError::NotFound(msg) => ApiError::NotFound(msg),
            ingest_core::CoreError::Cancelled => ApiError::Cancelled,
            other => ApiError::Internal(anyhow::anyhow!(other)),
        }
    }
}

impl From<sde_data::SdeError> for ApiError {
    fn from(err: sde_data::SdeError) -> Self {
        ApiError::Internal(anyhow::anyhow!(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "internal error serving request");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
