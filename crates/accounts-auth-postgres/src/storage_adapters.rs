//! Arc-owning storage adapter for use with authentication middleware.
//!
//! Wraps the borrowing [`UserRepository`] and owns an `Arc<PgPool>`, so it
//! can be shared as `Arc<dyn UserStorage>`.

use std::sync::Arc;

use async_trait::async_trait;

use accounts_auth::{
    AuthError, AuthResult, NewUser, ProfileUpdate, USERNAME_TAKEN, User, UserId,
    UserStorage as UserStorageTrait,
};

use crate::PgPool;
use crate::StorageError;
use crate::user::UserRepository;

/// Maps backend errors onto the auth error model.
fn to_auth_error(err: StorageError) -> AuthError {
    match err {
        StorageError::NotFound(_) => AuthError::not_found("User"),
        StorageError::Conflict(_) => AuthError::conflict(USERNAME_TAKEN),
        StorageError::Database(e) => {
            tracing::error!(error = %e, "user storage query failed");
            AuthError::storage(e.to_string())
        }
    }
}

// =============================================================================
// Arc-Owning User Storage
// =============================================================================

/// Arc-owning PostgreSQL user storage adapter.
#[derive(Clone)]
pub struct PostgresUserStorage {
    pool: Arc<PgPool>,
}

impl PostgresUserStorage {
    /// Create a new Arc-owning user storage.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    fn repo(&self) -> UserRepository<'_> {
        UserRepository::new(&self.pool)
    }
}

#[async_trait]
impl UserStorageTrait for PostgresUserStorage {
    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>> {
        let row = self.repo().find_by_id(id.get()).await.map_err(to_auth_error)?;
        Ok(row.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let row = self
            .repo()
            .find_by_username(username)
            .await
            .map_err(to_auth_error)?;
        Ok(row.map(User::from))
    }

    async fn create(&self, user: NewUser) -> AuthResult<User> {
        let row = self.repo().create(&user).await.map_err(to_auth_error)?;
        tracing::debug!(user_id = row.id, "user created");
        Ok(row.into())
    }

    async fn update(&self, id: UserId, update: &ProfileUpdate) -> AuthResult<User> {
        let row = self
            .repo()
            .update(id.get(), update)
            .await
            .map_err(to_auth_error)?;
        Ok(row.into())
    }

    async fn delete(&self, id: UserId) -> AuthResult<()> {
        self.repo().delete(id.get()).await.map_err(to_auth_error)
    }

    async fn count(&self) -> AuthResult<u64> {
        let count = self.repo().count().await.map_err(to_auth_error)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn set_password_hash(&self, id: UserId, password_hash: &str) -> AuthResult<()> {
        self.repo()
            .set_password_hash(id.get(), password_hash)
            .await
            .map_err(to_auth_error)
    }
}
