//! Token issuing and verification.
//!
//! - [`jwt`] signs and decodes tokens
//! - [`verifier`] resolves a request's token header to a stored user

pub mod jwt;
pub mod verifier;

pub use jwt::{TokenClaims, TokenRejection, TokenService};
pub use verifier::TokenVerifier;
