//! Resolves inbound tokens to stored users.

use std::sync::Arc;

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::{User, UserStorage};
use crate::token::jwt::{TokenRejection, TokenService};

/// Turns the raw token header into a user, or rejects it.
#[derive(Clone)]
pub struct TokenVerifier {
    tokens: Arc<TokenService>,
    users: Arc<dyn UserStorage>,
}

impl TokenVerifier {
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn UserStorage>) -> Self {
        Self { tokens, users }
    }

    /// The token service this verifier decodes with.
    #[must_use]
    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    /// Resolves the value of the token header.
    ///
    /// - `None` (header absent) resolves to `Ok(None)`: no identity asserted.
    /// - A present value must carry a valid token for an existing user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AuthenticationFailed` for an empty, malformed or
    /// rejected token, and `AuthError::Storage` if the user lookup fails.
    pub async fn resolve(&self, header_value: Option<&str>) -> AuthResult<Option<User>> {
        match header_value {
            None => Ok(None),
            Some(raw) => {
                let token = self.strip_scheme(raw).map_err(AuthError::authentication_failed)?;
                self.verify(token).await.map(Some)
            }
        }
    }

    /// Verifies a bare token and loads its user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AuthenticationFailed` if the token is rejected or
    /// its user no longer exists. Storage failures propagate unchanged.
    pub async fn verify(&self, token: &str) -> AuthResult<User> {
        let claims = self.tokens.decode(token).inspect_err(|e| {
            if let Some(reason) = e.token_rejection() {
                tracing::debug!(reason = reason.reason(), "token rejected");
            }
        })?;

        match self.users.find_by_id(claims.id).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => {
                tracing::debug!(
                    user_id = %claims.id,
                    reason = TokenRejection::UnknownIdentity.reason(),
                    "token rejected"
                );
                Err(AuthError::authentication_failed(
                    TokenRejection::UnknownIdentity,
                ))
            }
            Err(e) => {
                tracing::error!(user_id = %claims.id, error = %e, "user lookup failed during token verification");
                Err(e)
            }
        }
    }

    fn strip_scheme<'a>(&self, raw: &'a str) -> Result<&'a str, TokenRejection> {
        let raw = raw.trim();
        let token = match self.tokens.scheme() {
            None => raw,
            Some(scheme) => {
                let (prefix, rest) = raw.split_once(' ').ok_or(TokenRejection::Malformed)?;
                if !prefix.eq_ignore_ascii_case(scheme) {
                    return Err(TokenRejection::Malformed);
                }
                rest.trim()
            }
        };

        if token.is_empty() {
            Err(TokenRejection::Malformed)
        } else {
            Ok(token)
        }
    }
}
