//! HTTP middleware for authentication.
//!
//! - [`auth`] resolves the token header once per request
//! - [`error`] renders `AuthError` as a JSON response

pub mod auth;
pub mod error;

pub use auth::{AuthState, Identity, authentication_middleware};
pub use error::{detail_json, error_body, status_code};
