//! User model and storage trait.
//!
//! Defines the user record, its public view, and the interface for user
//! persistence. Implementations are provided by storage backends
//! (`accounts-auth-postgres`, `accounts-db-memory`).

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AuthResult;
use crate::error::AuthError;
use crate::password;

// =============================================================================
// Identity
// =============================================================================

/// Numeric identifier of a user record, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// Returns the raw numeric value.
    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// User Types
// =============================================================================

/// A stored user account.
///
/// The password hash is never serialized; expose users through
/// [`PublicUser`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier.
    pub id: UserId,

    /// Unique login name.
    pub username: String,

    /// Argon2 PHC hash of the password.
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Given name, empty when unset.
    #[serde(default)]
    pub first_name: String,

    /// Family name, empty when unset.
    #[serde(default)]
    pub last_name: String,

    /// Email address, empty when unset.
    #[serde(default)]
    pub email: String,

    /// When the account was created.
    #[serde(with = "time::serde::rfc3339")]
    pub date_joined: OffsetDateTime,

    /// When the account was last modified.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Returns the public view of this user.
    #[must_use]
    pub fn to_public(&self) -> PublicUser {
        PublicUser::from(self)
    }
}

/// Fields of a user that may leave the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
        }
    }
}

/// A user that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl NewUser {
    /// Creates a new user with the given username and password hash and
    /// empty profile fields.
    #[must_use]
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
        }
    }

    /// Sets the first and last name.
    #[must_use]
    pub fn name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }
}

/// Partial profile update. `None` leaves the field unchanged.
///
/// The username is not part of the update: it is fixed at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl ProfileUpdate {
    /// Returns `true` if no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.email.is_none()
    }

    /// Applies the update to a user record and bumps `updated_at`.
    pub fn apply(&self, user: &mut User) {
        if let Some(first_name) = &self.first_name {
            user.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &self.last_name {
            user.last_name.clone_from(last_name);
        }
        if let Some(email) = &self.email {
            user.email.clone_from(email);
        }
        user.updated_at = OffsetDateTime::now_utc();
    }
}

// =============================================================================
// User Storage Trait
// =============================================================================

/// Storage operations for users.
///
/// # Example
///
/// ```ignore
/// use accounts_auth::storage::UserStorage;
///
/// async fn example(storage: &dyn UserStorage) -> AuthResult<()> {
///     if let Some(user) = storage.find_by_username("alice").await? {
///         println!("Found user: {}", user.id);
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Find a user by their unique ID.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>>;

    /// Find a user by their username. Matching is exact.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>>;

    /// Create a new user and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Conflict` if the username is taken, or an error if
    /// the storage operation fails.
    async fn create(&self, user: NewUser) -> AuthResult<User>;

    /// Apply a profile update and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` if the user doesn't exist.
    async fn update(&self, id: UserId, update: &ProfileUpdate) -> AuthResult<User>;

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` if the user doesn't exist.
    async fn delete(&self, id: UserId) -> AuthResult<()>;

    /// Number of stored users.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn count(&self) -> AuthResult<u64>;

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` if the user doesn't exist.
    async fn set_password_hash(&self, id: UserId, password_hash: &str) -> AuthResult<()>;

    /// Hash `password` and store it for the user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` if the user doesn't exist.
    async fn set_password(&self, id: UserId, password: &str) -> AuthResult<()> {
        let hash = password::hash_password_blocking(password.to_string()).await?;
        self.set_password_hash(id, &hash).await
    }

    /// Verify a user's password against the stored hash.
    ///
    /// Returns `Ok(false)` if the password doesn't match.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` if the user doesn't exist.
    async fn verify_password(&self, id: UserId, password: &str) -> AuthResult<bool> {
        let user = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::not_found("User"))?;
        password::verify_password_blocking(password.to_string(), user.password_hash).await
    }
}
