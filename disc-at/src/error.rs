//! Error types for disc-at
//!
//! Maps the workflow error taxonomy onto HTTP responses with a
//! `{"error": {"code", "message"}}` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use disc_common::Error as CommonError;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

/// Message shared by unknown tokens and ownership mismatches
pub const INVALID_LINK_MESSAGE: &str = "invalid test link";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Test link exists but has no result yet (409)
    #[error("Test not complete: {0}")]
    NotComplete(String),

    /// disc-common error
    #[error(transparent)]
    Common(#[from] CommonError),
}

impl ApiError {
    /// Batch defects the respondent can correct and resubmit
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Common(err) if err.is_validation())
    }

    /// Status, code and client-facing message
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::NotComplete(msg) => (StatusCode::CONFLICT, "NOT_COMPLETE", msg.clone()),
            ApiError::Common(err) => match err {
                // Same answer for both so a token cannot be probed
                CommonError::NotFound(_) | CommonError::AccessDenied(_) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    INVALID_LINK_MESSAGE.to_string(),
                ),
                CommonError::AlreadyCompleted(_) => (
                    StatusCode::CONFLICT,
                    "ALREADY_COMPLETED",
                    "test already completed".to_string(),
                ),
                CommonError::InvalidTransition { .. } => (
                    StatusCode::CONFLICT,
                    "INVALID_TRANSITION",
                    err.to_string(),
                ),
                CommonError::IncompleteBatch { .. } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "INCOMPLETE_BATCH",
                    err.to_string(),
                ),
                CommonError::MalformedAnswer { .. } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "MALFORMED_ANSWER",
                    err.to_string(),
                ),
                CommonError::InvalidInput(msg) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "INVALID_INPUT",
                    msg.clone(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal error".to_string(),
                ),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = self.parts();

        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else if self.is_validation() {
            debug!(error = %self, "Rejected answer batch");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
