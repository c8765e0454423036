//! Authentication and authorization error types.
//!
//! Every token decoding failure collapses into a single public
//! [`AuthError::AuthenticationFailed`] whose message is always
//! `"Invalid token"`. The concrete [`TokenRejection`] is kept on the variant
//! so it can be logged and asserted on, but it never reaches the client.

use std::fmt;

use crate::token::TokenRejection;

/// Message returned for any rejected token.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid token";

/// Message returned when an anonymous caller attempts a mutation.
pub const NOT_AUTHENTICATED_MESSAGE: &str = "Authentication credentials were not provided.";

/// Message returned when an authenticated caller is not the owner.
pub const FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action.";

/// Message returned for any failed login.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Username or password invalid.";

/// Message returned when a username is already registered.
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// Errors that can occur during authentication and authorization operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A token was supplied but could not be resolved to a user.
    #[error("{}", INVALID_TOKEN_MESSAGE)]
    AuthenticationFailed {
        /// Internal reason, for logs only.
        reason: TokenRejection,
    },

    /// A mutation was attempted without any asserted identity.
    #[error("{}", NOT_AUTHENTICATED_MESSAGE)]
    NotAuthenticated,

    /// The authenticated user does not own the target resource.
    #[error("{message}")]
    Forbidden {
        /// Description of why access is forbidden.
        message: String,
    },

    /// Unknown username or wrong password. The two are deliberately
    /// indistinguishable.
    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    InvalidCredentials,

    /// A uniqueness constraint was violated.
    #[error("{message}")]
    Conflict {
        /// Description of the conflict.
        message: String,
    },

    /// The requested resource does not exist.
    #[error("{resource} not found")]
    NotFound {
        /// The kind of resource that was looked up.
        resource: String,
    },

    /// An error occurred while storing or retrieving user data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The auth configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `AuthenticationFailed` error.
    #[must_use]
    pub fn authentication_failed(reason: TokenRejection) -> Self {
        Self::AuthenticationFailed { reason }
    }

    /// Creates a new `Forbidden` error with the standard message.
    #[must_use]
    pub fn forbidden() -> Self {
        Self::Forbidden {
            message: FORBIDDEN_MESSAGE.to_string(),
        }
    }

    /// Creates a new `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the internal token rejection reason, if any.
    #[must_use]
    pub fn token_rejection(&self) -> Option<TokenRejection> {
        match self {
            Self::AuthenticationFailed { reason } => Some(*reason),
            _ => None,
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. }
                | Self::NotAuthenticated
                | Self::Forbidden { .. }
                | Self::InvalidCredentials
                | Self::Conflict { .. }
                | Self::NotFound { .. }
        )
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Configuration { .. } | Self::Internal { .. }
        )
    }

    /// Returns `true` if this is an authentication error.
    #[must_use]
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. } | Self::NotAuthenticated | Self::InvalidCredentials
        )
    }

    /// Returns `true` if this is an authorization error.
    #[must_use]
    pub fn is_authorization_error(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AuthenticationFailed { .. } => ErrorCategory::Token,
            Self::NotAuthenticated => ErrorCategory::Authentication,
            Self::Forbidden { .. } => ErrorCategory::Authorization,
            Self::InvalidCredentials => ErrorCategory::Authentication,
            Self::Conflict { .. } => ErrorCategory::Validation,
            Self::NotFound { .. } => ErrorCategory::Validation,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

impl From<crate::config::ConfigError> for AuthError {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}

/// Categories of authentication/authorization errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Authentication-related errors (identity verification).
    Authentication,
    /// Authorization-related errors (ownership checks).
    Authorization,
    /// Token-related errors (signature, claims, identity lookup).
    Token,
    /// Request validation errors.
    Validation,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Configuration errors.
    Configuration,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Authorization => write!(f, "authorization"),
            Self::Token => write!(f, "token"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_failed_hides_reason() {
        for reason in [
            TokenRejection::Malformed,
            TokenRejection::Signature,
            TokenRejection::Algorithm,
            TokenRejection::NotYetValid,
            TokenRejection::Expired,
            TokenRejection::UnknownIdentity,
        ] {
            let err = AuthError::authentication_failed(reason);
            assert_eq!(err.to_string(), INVALID_TOKEN_MESSAGE);
            assert_eq!(err.token_rejection(), Some(reason));
        }
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AuthError::NotAuthenticated.to_string(),
            NOT_AUTHENTICATED_MESSAGE
        );
        assert_eq!(AuthError::forbidden().to_string(), FORBIDDEN_MESSAGE);
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            INVALID_CREDENTIALS_MESSAGE
        );
        assert_eq!(AuthError::not_found("User").to_string(), "User not found");
        assert_eq!(
            AuthError::storage("connection reset").to_string(),
            "Storage error: connection reset"
        );
    }

    #[test]
    fn test_client_vs_server_errors() {
        assert!(AuthError::NotAuthenticated.is_client_error());
        assert!(AuthError::InvalidCredentials.is_client_error());
        assert!(AuthError::conflict("taken").is_client_error());
        assert!(!AuthError::storage("db").is_client_error());

        assert!(AuthError::storage("db").is_server_error());
        assert!(AuthError::internal("boom").is_server_error());
        assert!(!AuthError::forbidden().is_server_error());
    }

    #[test]
    fn test_authentication_vs_authorization() {
        let failed = AuthError::authentication_failed(TokenRejection::Signature);
        assert!(failed.is_authentication_error());
        assert!(!failed.is_authorization_error());

        assert!(AuthError::forbidden().is_authorization_error());
        assert!(!AuthError::forbidden().is_authentication_error());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            AuthError::authentication_failed(TokenRejection::Expired).category(),
            ErrorCategory::Token
        );
        assert_eq!(
            AuthError::NotAuthenticated.category(),
            ErrorCategory::Authentication
        );
        assert_eq!(
            AuthError::forbidden().category(),
            ErrorCategory::Authorization
        );
        assert_eq!(
            AuthError::storage("x").category(),
            ErrorCategory::Infrastructure
        );
        assert_eq!(ErrorCategory::Token.to_string(), "token");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: AuthError = crate::config::ConfigError::Missing("auth.token.secret".into()).into();
        assert!(matches!(err, AuthError::Configuration { .. }));
        assert!(err.to_string().contains("auth.token.secret"));
    }
}
