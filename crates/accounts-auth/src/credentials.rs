//! Login credential validation.

use std::sync::Arc;

use serde::Serialize;

use crate::AuthResult;
use crate::error::AuthError;
use crate::password;
use crate::storage::{PublicUser, UserStorage};
use crate::token::TokenService;

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub user: PublicUser,
    pub token: String,
}

/// Checks a username/password pair and issues a token on success.
#[derive(Clone)]
pub struct CredentialValidator {
    users: Arc<dyn UserStorage>,
    tokens: Arc<TokenService>,
}

impl CredentialValidator {
    pub fn new(users: Arc<dyn UserStorage>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Validates credentials.
    ///
    /// An unknown username still costs one hash verification so it cannot be
    /// told apart from a wrong password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown user or a wrong
    /// password, and storage or internal errors unchanged.
    pub async fn validate(&self, username: &str, password: &str) -> AuthResult<LoginOutcome> {
        let Some(user) = self.users.find_by_username(username).await? else {
            password::verify_dummy_blocking(password.to_string()).await?;
            tracing::debug!("login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let matches =
            password::verify_password_blocking(password.to_string(), user.password_hash.clone())
                .await?;
        if !matches {
            tracing::debug!(user_id = %user.id, "login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id)?;
        tracing::info!(user_id = %user.id, "user logged in");

        Ok(LoginOutcome {
            user: user.into(),
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;
    use crate::storage::NewUser;
    use crate::testutil::MemoryUsers;

    async fn setup() -> (CredentialValidator, Arc<TokenService>) {
        let users = Arc::new(MemoryUsers::default());
        let hash = password::hash_password("secret1").unwrap();
        users
            .create(NewUser::new("alice", hash).email("alice@example.com"))
            .await
            .unwrap();
        let tokens = Arc::new(TokenService::new(&TokenConfig::with_secret(
            "0123456789abcdef0123456789abcdef",
        )));
        (CredentialValidator::new(users, tokens.clone()), tokens)
    }

    #[tokio::test]
    async fn test_valid_credentials() {
        let (validator, tokens) = setup().await;
        let outcome = validator.validate("alice", "secret1").await.unwrap();
        assert_eq!(outcome.user.username, "alice");
        assert_eq!(outcome.user.email, "alice@example.com");

        let claims = tokens.decode(&outcome.token).unwrap();
        assert_eq!(claims.id, outcome.user.id);
    }

    #[tokio::test]
    async fn test_outcome_serialization_has_no_password() {
        let (validator, _) = setup().await;
        let outcome = validator.validate("alice", "secret1").await.unwrap();
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_are_identical() {
        let (validator, _) = setup().await;
        let wrong = validator.validate("alice", "wrong").await.unwrap_err();
        let unknown = validator.validate("mallory", "secret1").await.unwrap_err();
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert_eq!(wrong.to_string(), "Username or password invalid.");
    }

    #[tokio::test]
    async fn test_username_is_case_sensitive() {
        let (validator, _) = setup().await;
        assert!(validator.validate("Alice", "secret1").await.is_err());
    }
}
