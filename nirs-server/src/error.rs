//! Error handling

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nirs_core::PipelineError;
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    // Query parameters that parse but are out of range
    #[error("invalid parameters: {0}")]
    InvalidParameters(#[from] ValidationErrors),

    // Query string that does not parse
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    // Request body that is not JSON
    #[error("invalid JSON body: {0}")]
    InvalidBody(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Pipeline(err) => {
                let status = match err {
                    _ if err.is_client_error() => StatusCode::BAD_REQUEST,
                    PipelineError::CollaboratorTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let message = match err {
                    PipelineError::Storage(detail) => {
                        tracing::error!("Storage error: {}", detail);
                        "Dataset storage failed".to_string()
                    }
                    PipelineError::CollaboratorFailed(_) | PipelineError::Signing(_) => {
                        tracing::error!("Pipeline error: {}", err);
                        err.to_string()
                    }
                    _ => err.to_string(),
                };
                (status, err.kind(), message)
            }
            AppError::InvalidParameters(_) | AppError::InvalidQuery(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_parameters", self.to_string())
            }
            // Unparseable JSON is a malformed submission
            AppError::InvalidBody(_) => (StatusCode::BAD_REQUEST, "shape_error", self.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "Internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = self.parts();

        let body = Json(json!({
            "error": {
                "kind": kind,
                "message": message,
            },
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidQuery(rejection.body_text())
    }
}
