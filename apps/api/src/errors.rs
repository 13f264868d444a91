use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ingest::normalizer::NormalizationError;
use crate::search::executor::QueryValidationError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Oracle unavailability is deliberately absent: NL translation degrades to
/// the keyword fallback instead of failing the request. Absent candidate
/// ids on similarity/network lookups return empty results with a flag, not
/// `NotFound`, since "candidate since removed" is an expected race with
/// pool updates.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Normalization error: {0}")]
    Normalization(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Graph symmetry or ordering invariant violated. Should never occur;
    /// surfaced as a defect, not a user-facing condition.
    #[error("Internal inconsistency: {0}")]
    Inconsistency(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<QueryValidationError> for AppError {
    fn from(e: QueryValidationError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<NormalizationError> for AppError {
    fn from(e: NormalizationError) -> Self {
        AppError::Normalization(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Normalization(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NORMALIZATION_ERROR",
                msg.clone(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Inconsistency(msg) => {
                tracing::error!("Internal inconsistency: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_INCONSISTENCY",
                    "An internal invariant was violated".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
