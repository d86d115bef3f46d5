use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use quill_core::EngineError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Request-level failure taxonomy. Every variant is recovered at the handler
/// boundary and rendered as a structured JSON body; only `Internal` is
/// logged, with a generic message sent to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("invalid note id")]
    InvalidId,

    #[error("no changes provided")]
    NoChanges,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Precondition(&'static str),

    #[error("{0}")]
    AuthMismatch(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: bool,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            ApiError::InvalidId => (StatusCode::BAD_REQUEST, "invalid_id"),
            ApiError::NoChanges => (StatusCode::BAD_REQUEST, "no_changes"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Precondition(_) => (StatusCode::CONFLICT, "precondition"),
            ApiError::AuthMismatch(_) => (StatusCode::BAD_REQUEST, "auth_mismatch"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            ApiError::Internal(e) => {
                error!("Internal error: {:#}", e);
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(ErrorBody {
                error: true,
                code,
                message,
            }),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Validation(msg) => ApiError::Validation(msg),
            EngineError::NoChanges => ApiError::NoChanges,
        }
    }
}

pub(crate) fn join_error(e: tokio::task::JoinError) -> ApiError {
    ApiError::Internal(anyhow::anyhow!("spawn_blocking join error: {}", e))
}
