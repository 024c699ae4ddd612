use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::AppError;

/// Errors surfaced to HTTP callers.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(AppError),
    EnrichmentFailed { issue_id: String, error: AppError },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(error) => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response(),
            ApiError::EnrichmentFailed { issue_id, error } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "failed",
                    "issueId": issue_id,
                    "error": error.to_string(),
                })),
            )
                .into_response(),
        }
    }
}
