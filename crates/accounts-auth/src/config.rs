//! Authentication configuration.
//!
//! The token section is fixed at process start and injected into the
//! [`TokenService`](crate::token::TokenService) at construction. Nothing in
//! this crate reads configuration from global state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Minimum recommended secret length for HMAC signing, in bytes.
pub const RECOMMENDED_SECRET_LEN: usize = 32;

/// Root authentication configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [auth.token]
/// secret = "change-me-to-a-long-random-string"
/// algorithm = "HS256"
/// header = "Authorization"
/// lifetime = "12h"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Token signing and transport configuration.
    pub token: TokenConfig,
}

/// Token signing and transport configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Shared HMAC secret. Required.
    pub secret: String,

    /// HMAC algorithm used for signing and expected on verification.
    pub algorithm: SigningAlgorithm,

    /// Request header carrying the encoded token.
    pub header: String,

    /// Optional authentication scheme prefix (e.g. `Bearer`).
    /// When unset the header value is the raw token.
    pub scheme: Option<String>,

    /// Token lifetime. When unset, tokens carry no `exp` claim.
    #[serde(with = "humantime_serde")]
    pub lifetime: Option<Duration>,

    /// Clock skew tolerated when checking `nbf` and `exp`.
    #[serde(with = "humantime_serde")]
    pub leeway: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            algorithm: SigningAlgorithm::HS256,
            header: "Authorization".to_string(),
            scheme: None,
            lifetime: None,
            leeway: Duration::ZERO,
        }
    }
}

impl TokenConfig {
    /// Creates a token configuration with the given secret and defaults
    /// for everything else.
    #[must_use]
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Self::default()
        }
    }
}

// The secret must never end up in logs.
impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("header", &self.header)
            .field("scheme", &self.scheme)
            .field("lifetime", &self.lifetime)
            .field("leeway", &self.leeway)
            .finish()
    }
}

/// Supported HMAC signing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
pub enum SigningAlgorithm {
    /// HMAC with SHA-256.
    #[default]
    HS256,
    /// HMAC with SHA-384.
    HS384,
    /// HMAC with SHA-512.
    HS512,
}

impl SigningAlgorithm {
    /// Converts to the `jsonwebtoken` Algorithm type.
    #[must_use]
    pub fn to_jwt_algorithm(self) -> jsonwebtoken::Algorithm {
        match self {
            Self::HS256 => jsonwebtoken::Algorithm::HS256,
            Self::HS384 => jsonwebtoken::Algorithm::HS384,
            Self::HS512 => jsonwebtoken::Algorithm::HS512,
        }
    }

    /// Returns the algorithm name as used in JWT headers.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the token secret is empty, and
    /// `ConfigError::InvalidValue` if the header name or scheme is blank or
    /// the lifetime is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let token = &self.token;

        if token.secret.is_empty() {
            return Err(ConfigError::Missing("auth.token.secret".to_string()));
        }
        if token.secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                len = token.secret.len(),
                recommended = RECOMMENDED_SECRET_LEN,
                "auth.token.secret is shorter than recommended"
            );
        }

        if token.header.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "auth.token.header cannot be empty".to_string(),
            ));
        }
        if axum::http::HeaderName::from_bytes(token.header.as_bytes()).is_err() {
            return Err(ConfigError::InvalidValue(format!(
                "auth.token.header '{}' is not a valid header name",
                token.header
            )));
        }

        if let Some(scheme) = &token.scheme
            && scheme.trim().is_empty()
        {
            return Err(ConfigError::InvalidValue(
                "auth.token.scheme cannot be blank when set".to_string(),
            ));
        }

        if token.lifetime.is_some_and(|l| l.is_zero()) {
            return Err(ConfigError::InvalidValue(
                "auth.token.lifetime must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}
