//! Ownership guard.
//!
//! Read-only methods are open to everyone. Anything else is allowed only
//! when the acting user is the owner of the target account.

use axum::http::Method;

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::UserId;

/// Returns `true` for methods that never mutate state.
#[must_use]
pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Per-object permission check for account resources.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnershipGuard;

impl OwnershipGuard {
    /// Decides whether `acting` may perform `method` on the account owned by
    /// `owner`.
    #[must_use]
    pub fn authorize(&self, acting: Option<UserId>, owner: UserId, method: &Method) -> bool {
        is_safe_method(method) || acting == Some(owner)
    }

    /// Like [`authorize`](Self::authorize) but reports the kind of denial.
    ///
    /// # Errors
    ///
    /// `AuthError::NotAuthenticated` for an anonymous caller,
    /// `AuthError::Forbidden` for an authenticated non-owner.
    pub fn ensure(&self, acting: Option<UserId>, owner: UserId, method: &Method) -> AuthResult<()> {
        if self.authorize(acting, owner, method) {
            return Ok(());
        }

        tracing::debug!(
            acting = ?acting.map(UserId::get),
            owner = owner.get(),
            method = %method,
            "ownership check denied"
        );

        match acting {
            None => Err(AuthError::NotAuthenticated),
            Some(_) => Err(AuthError::forbidden()),
        }
    }
}
