//! # accounts-auth
//!
//! Token authentication and ownership authorization for the accounts service.
//!
//! This crate provides:
//! - Signed, time-bound account tokens (HMAC JWS)
//! - Resolution of a request's token header to a stored user
//! - An ownership guard for per-account mutations
//! - Login credential validation with Argon2 password hashes
//! - The user storage trait implemented by the storage backends
//!
//! ## Modules
//!
//! - [`config`] - Token configuration
//! - [`token`] - Token issuing, decoding and verification
//! - [`guard`] - Ownership authorization
//! - [`credentials`] - Username/password validation
//! - [`password`] - Argon2 hashing helpers
//! - [`middleware`] - Axum authentication layer and error responses
//! - [`storage`] - User model and storage trait

pub mod config;
pub mod credentials;
pub mod error;
pub mod guard;
pub mod middleware;
pub mod password;
pub mod storage;
pub mod token;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::{AuthConfig, ConfigError, SigningAlgorithm, TokenConfig};
pub use credentials::{CredentialValidator, LoginOutcome};
pub use error::{AuthError, ErrorCategory, USERNAME_TAKEN};
pub use guard::{OwnershipGuard, is_safe_method};
pub use middleware::{AuthState, Identity, authentication_middleware};
pub use storage::{NewUser, ProfileUpdate, PublicUser, User, UserId, UserStorage};
pub use token::{TokenClaims, TokenRejection, TokenService, TokenVerifier};

/// Type alias for authentication/authorization results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use accounts_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{AuthConfig, ConfigError, SigningAlgorithm, TokenConfig};
    pub use crate::credentials::{CredentialValidator, LoginOutcome};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::guard::OwnershipGuard;
    pub use crate::middleware::{AuthState, Identity, authentication_middleware};
    pub use crate::storage::{NewUser, ProfileUpdate, PublicUser, User, UserId, UserStorage};
    pub use crate::token::{TokenService, TokenVerifier};
}
