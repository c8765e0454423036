//! JWT token issuing and decoding.
//!
//! Tokens are compact JWS strings signed with a single shared HMAC secret.
//! The payload carries the user id and a not-before timestamp, plus an
//! expiry when a lifetime is configured:
//!
//! ```json
//! {"id": 42, "nbf": 1700000000}
//! ```
//!
//! ## Example
//!
//! ```
//! use accounts_auth::config::TokenConfig;
//! use accounts_auth::storage::UserId;
//! use accounts_auth::token::TokenService;
//!
//! let service = TokenService::new(&TokenConfig::with_secret("0123456789abcdef0123456789abcdef"));
//! let token = service.issue(UserId(42)).unwrap();
//! let claims = service.decode(&token).unwrap();
//! assert_eq!(claims.id, UserId(42));
//! ```

use std::fmt;

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AuthResult;
use crate::config::{SigningAlgorithm, TokenConfig};
use crate::error::AuthError;
use crate::storage::UserId;

// ============================================================================
// Rejection Reasons
// ============================================================================

/// Why a token was rejected.
///
/// All reasons surface to clients as the same `"Invalid token"` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenRejection {
    /// Not a decodable JWS, or the claims are missing or mistyped.
    Malformed,
    /// The signature does not match the configured secret.
    Signature,
    /// The header algorithm differs from the configured one.
    Algorithm,
    /// `nbf` lies in the future.
    NotYetValid,
    /// `exp` lies in the past.
    Expired,
    /// The token is valid but its user no longer exists.
    UnknownIdentity,
}

impl TokenRejection {
    /// Stable reason code used in logs.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::Signature => "signature",
            Self::Algorithm => "algorithm",
            Self::NotYetValid => "not_yet_valid",
            Self::Expired => "expired",
            Self::UnknownIdentity => "unknown_identity",
        }
    }
}

impl fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

impl From<&jsonwebtoken::errors::Error> for TokenRejection {
    fn from(err: &jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => Self::Signature,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => Self::Algorithm,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Malformed,
        }
    }
}

// ============================================================================
// Token Claims
// ============================================================================

/// Claims carried by an account token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Identity the token asserts.
    pub id: UserId,

    /// Not valid before (Unix timestamp).
    pub nbf: i64,

    /// Expiration time (Unix timestamp). Only set when a lifetime is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

// ============================================================================
// Token Service
// ============================================================================

/// Issues and decodes account tokens.
///
/// Built once from an immutable [`TokenConfig`] and shared behind an `Arc`.
pub struct TokenService {
    algorithm: SigningAlgorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime_secs: Option<i64>,
    header: String,
    scheme: Option<String>,
}

impl TokenService {
    /// Creates a token service from configuration.
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        let secret = config.secret.as_bytes();
        let lifetime_secs = config
            .lifetime
            .map(|lifetime| i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX));

        let mut validation = Validation::new(config.algorithm.to_jwt_algorithm());
        validation.leeway = config.leeway.as_secs();
        validation.validate_nbf = true;
        validation.validate_aud = false;
        if lifetime_secs.is_some() {
            validation.validate_exp = true;
            validation.set_required_spec_claims(&["nbf", "exp"]);
        } else {
            validation.validate_exp = false;
            validation.set_required_spec_claims(&["nbf"]);
        }

        Self {
            algorithm: config.algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime_secs,
            header: config.header.clone(),
            scheme: config.scheme.clone(),
        }
    }

    /// Builds the claims for a token issued to `id` at `now`.
    #[must_use]
    pub fn claims_at(&self, id: UserId, now: i64) -> TokenClaims {
        TokenClaims {
            id,
            nbf: now,
            exp: self.lifetime_secs.map(|secs| now.saturating_add(secs)),
        }
    }

    /// Issues a token for `id`, valid from now.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if encoding fails.
    pub fn issue(&self, id: UserId) -> AuthResult<String> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        self.encode(&self.claims_at(id, now))
    }

    /// Signs arbitrary claims with the configured algorithm and secret.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if encoding fails.
    pub fn encode(&self, claims: &TokenClaims) -> AuthResult<String> {
        let header = Header::new(self.algorithm.to_jwt_algorithm());
        encode(&header, claims, &self.encoding_key)
            .map_err(|e| AuthError::internal(format!("failed to encode token: {e}")))
    }

    /// Checks signature, algorithm and time claims and returns the payload.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AuthenticationFailed` carrying the rejection reason.
    pub fn decode(&self, token: &str) -> AuthResult<TokenClaims> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::authentication_failed(TokenRejection::from(&e)))
    }

    /// Configured signing algorithm.
    #[must_use]
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Name of the request header that carries tokens.
    #[must_use]
    pub fn header_name(&self) -> &str {
        &self.header
    }

    /// Scheme prefix expected before the token, if any.
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("lifetime_secs", &self.lifetime_secs)
            .field("header", &self.header)
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}
