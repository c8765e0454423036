//! Password hashing and verification.
//!
//! Passwords are stored as Argon2id PHC strings. Hashing and verification are
//! CPU-bound, so the async wrappers move the work onto the blocking thread
//! pool.
//!
//! ```
//! use accounts_auth::password::{hash_password, verify_password};
//!
//! let hash = hash_password("secret1").unwrap();
//! assert!(hash.starts_with("$argon2id$"));
//! assert!(verify_password("secret1", &hash));
//! assert!(!verify_password("secret2", &hash));
//! ```

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::AuthResult;
use crate::error::AuthError;

/// Hash used for unknown usernames so a failed lookup costs the same as a
/// wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("accounts-dummy-password").ok());

/// Hash a password for storage using Argon2id with a random salt.
///
/// # Errors
///
/// Returns `AuthError::Internal` if hashing fails (rare).
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::internal(format!("password hashing failed: {e}")))
}

/// Verify a password against a stored PHC hash.
///
/// An unparseable stored hash never matches.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is not a valid PHC string");
            false
        }
    }
}

/// Runs one verification against a fixed hash and discards the result.
pub fn verify_dummy(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

/// [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(password: String) -> AuthResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::internal(format!("password hashing task failed: {e}")))?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(password: String, hash: String) -> AuthResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::internal(format!("password verification task failed: {e}")))
}

/// [`verify_dummy`] on the blocking pool.
pub async fn verify_dummy_blocking(password: String) -> AuthResult<()> {
    tokio::task::spawn_blocking(move || verify_dummy(&password))
        .await
        .map_err(|e| AuthError::internal(format!("password verification task failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_salted() {
        let a = hash_password("secret1").unwrap();
        let b = hash_password("secret1").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("secret1", &a));
        assert!(verify_password("secret1", &b));
    }

    #[test]
    fn test_wrong_password_does_not_verify() {
        let hash = hash_password("secret1").unwrap();
        assert!(!verify_password("Secret1", &hash));
        assert!(!verify_password("", &hash));
    }

    #[test]
    fn test_invalid_stored_hash_never_matches() {
        assert!(!verify_password("secret1", "not-a-phc-string"));
        assert!(!verify_password("secret1", ""));
    }

    #[test]
    fn test_dummy_hash_is_available() {
        assert!(DUMMY_HASH.is_some());
        verify_dummy("anything");
    }

    #[tokio::test]
    async fn test_blocking_wrappers() {
        let hash = hash_password_blocking("secret1".to_string()).await.unwrap();
        assert!(
            verify_password_blocking("secret1".to_string(), hash.clone())
                .await
                .unwrap()
        );
        assert!(
            !verify_password_blocking("nope".to_string(), hash)
                .await
                .unwrap()
        );
        verify_dummy_blocking("nope".to_string()).await.unwrap();
    }
}
