//! Token authentication layer and identity extractor.
//!
//! The layer runs once per request, before handler dispatch, and stores the
//! resolved [`Identity`] in the request extensions. A request without the
//! token header passes through as anonymous; a request whose header does not
//! resolve to a user is rejected immediately.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, middleware, routing::get};
//! use accounts_auth::middleware::{AuthState, Identity, authentication_middleware};
//!
//! async fn whoami(identity: Identity) -> String {
//!     identity.user().map(|u| u.username.clone()).unwrap_or_default()
//! }
//!
//! let app = Router::new()
//!     .route("/whoami", get(whoami))
//!     .layer(middleware::from_fn_with_state(auth_state, authentication_middleware));
//! ```

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, HeaderName, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::{User, UserId};
use crate::token::{TokenRejection, TokenVerifier};

// =============================================================================
// Auth State
// =============================================================================

/// State required by [`authentication_middleware`].
#[derive(Clone)]
pub struct AuthState {
    /// Resolves token header values to users.
    pub verifier: TokenVerifier,

    /// Header the token is read from.
    pub header: HeaderName,
}

impl AuthState {
    /// Creates the state, reading the header name from the verifier's
    /// token configuration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the header name is invalid.
    pub fn new(verifier: TokenVerifier) -> AuthResult<Self> {
        let name = verifier.tokens().header_name();
        let header = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            AuthError::configuration(format!("invalid token header name '{name}'"))
        })?;
        Ok(Self { verifier, header })
    }

    /// Resolves the identity asserted by a set of request headers.
    ///
    /// # Errors
    ///
    /// See [`TokenVerifier::resolve`]. A header value that is not visible
    /// ASCII is rejected as malformed.
    pub async fn authenticate(&self, headers: &HeaderMap) -> AuthResult<Identity> {
        let value = match headers.get(&self.header) {
            None => None,
            Some(value) => Some(value.to_str().map_err(|_| {
                AuthError::authentication_failed(TokenRejection::Malformed)
            })?),
        };

        self.verifier.resolve(value).await.map(Identity)
    }
}

// =============================================================================
// Middleware
// =============================================================================

/// Authenticates the request and stores the [`Identity`] in its extensions.
pub async fn authentication_middleware(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.authenticate(request.headers()).await {
        Ok(identity) => {
            if let Some(user) = identity.user() {
                tracing::debug!(user_id = %user.id, "request authenticated");
            }
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

// =============================================================================
// Identity Extractor
// =============================================================================

/// The user a request acts as, or `None` for anonymous requests.
#[derive(Debug, Clone, Default)]
pub struct Identity(pub Option<User>);

impl Identity {
    /// The authenticated user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    /// Id of the authenticated user, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.0.as_ref().map(|u| u.id)
    }

    /// Returns `true` if no identity was asserted.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.0.is_none()
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or_else(|| AuthError::internal("authentication middleware is not installed"))
    }
}
