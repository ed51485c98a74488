//! Error types for moodstream-api
//!
//! HTTP mapping follows a fixed taxonomy: input validation maps to 400,
//! missing identity to 401, empty results to 404, and every
//! dependency/persistence failure to a 500 whose cause is logged but
//! never echoed to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::generator::GenerateError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or malformed identity (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream dependency failure (500, cause logged only)
    #[error("Upstream error: {0}")]
    Upstream(#[source] anyhow::Error),

    /// Database failure (500, cause logged only)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    /// Wrap an external-service error for the generic 500 path
    pub fn upstream(err: impl Into<anyhow::Error>) -> Self {
        ApiError::Upstream(err.into())
    }
}

impl From<GenerateError> for ApiError {
    fn from(err: GenerateError) -> Self {
        match err {
            GenerateError::NoCandidates => {
                ApiError::NotFound("No tracks found matching your criteria".to_string())
            }
            GenerateError::Database(e) => ApiError::Database(e),
            other => ApiError::Upstream(other.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Upstream(ref err) => {
                tracing::error!(error = ?err, "upstream dependency failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Database(ref err) => {
                tracing::error!(error = %err, "database failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
