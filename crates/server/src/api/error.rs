//! Error responses shared by the API handlers.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use ticketrush_core::SessionError;

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Rejection returned by every fallible handler.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub fn session_not_found(id: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, format!("session not found: {}", id))
}

/// Map a session error to its HTTP status.
pub fn session_error(err: SessionError) -> ApiError {
    let status = match err {
        SessionError::InvalidState { .. } => StatusCode::CONFLICT,
        SessionError::InvalidInput(_) => StatusCode::BAD_REQUEST,
    };
    api_error(status, err.to_string())
}
