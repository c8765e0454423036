//! Error response handling for authentication middleware.
//!
//! Bodies follow the shape account clients already expect:
//! `{"detail": "..."}` for auth, permission and lookup failures, and
//! `{"non_field_errors": [...]}` for rejected login credentials.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AuthError;

/// Message returned for any 5xx error. Details stay in the logs.
pub const SERVER_ERROR_MESSAGE: &str = "A server error occurred.";

/// Message returned for an unknown resource.
pub const NOT_FOUND_MESSAGE: &str = "Not found.";

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = status_code(&self);

        if status.is_server_error() {
            tracing::error!(error = %self, category = %self.category(), "request failed");
        } else if let Some(reason) = self.token_rejection() {
            tracing::debug!(reason = reason.reason(), "authentication failed");
        }

        (status, Json(error_body(&self))).into_response()
    }
}

/// HTTP status for an `AuthError`.
#[must_use]
pub fn status_code(error: &AuthError) -> StatusCode {
    match error {
        AuthError::AuthenticationFailed { .. }
        | AuthError::NotAuthenticated
        | AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
        AuthError::InvalidCredentials | AuthError::Conflict { .. } => StatusCode::BAD_REQUEST,
        AuthError::NotFound { .. } => StatusCode::NOT_FOUND,
        AuthError::Storage { .. }
        | AuthError::Configuration { .. }
        | AuthError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// JSON body for an `AuthError`.
#[must_use]
pub fn error_body(error: &AuthError) -> serde_json::Value {
    match error {
        AuthError::InvalidCredentials => json!({ "non_field_errors": [error.to_string()] }),
        AuthError::NotFound { .. } => detail_json(NOT_FOUND_MESSAGE),
        AuthError::Storage { .. } | AuthError::Configuration { .. } | AuthError::Internal { .. } => {
            detail_json(SERVER_ERROR_MESSAGE)
        }
        _ => detail_json(&error.to_string()),
    }
}

/// Creates a `{"detail": ...}` body.
#[must_use]
pub fn detail_json(detail: &str) -> serde_json::Value {
    json!({ "detail": detail })
}

// =============================================================================
// Tests
// =============================================================================
