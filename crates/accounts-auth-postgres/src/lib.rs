//! PostgreSQL storage backend for accounts-auth
//!
//! Stores user accounts in a single `users` table, created on start-up if it
//! does not exist yet.
//!
//! # Example
//!
//! ```ignore
//! use accounts_auth_postgres::PostgresAuthStorage;
//!
//! let storage = PostgresAuthStorage::connect("postgres://localhost/accounts", 10).await?;
//! storage.ensure_schema().await?;
//!
//! let users = storage.users();
//! let alice = users.find_by_username("alice").await?;
//! ```

pub mod storage_adapters;
pub mod user;

use std::sync::Arc;

use sqlx_core::pool::Pool;
use sqlx_postgres::Postgres;

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

pub use storage_adapters::PostgresUserStorage;
pub use user::{UserRepository, UserRow};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx_core::Error),

    /// Requested record was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Record already exists (conflict).
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl StorageError {
    /// Create a `NotFound` error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// Create a `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Returns `true` if this is a `NotFound` error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` if this is a `Conflict` error.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Returns `true` if this is a database error.
    #[must_use]
    pub fn is_database_error(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// PostgreSQL Auth Storage
// =============================================================================

/// PostgreSQL storage backend for account data.
#[derive(Debug, Clone)]
pub struct PostgresAuthStorage {
    pool: Arc<PgPool>,
}

impl PostgresAuthStorage {
    /// Create new storage with an existing connection pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Create new storage by connecting to the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub async fn connect(database_url: &str, pool_size: u32) -> StorageResult<Self> {
        use sqlx_core::pool::PoolOptions;
        let pool = PoolOptions::<Postgres>::new()
            .max_connections(pool_size)
            .connect(database_url)
            .await?;
        Ok(Self::new(Arc::new(pool)))
    }

    /// Create the `users` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL fails.
    pub async fn ensure_schema(&self) -> StorageResult<()> {
        UserRepository::new(&self.pool).create_table_if_not_exists().await?;
        tracing::debug!("users table ready");
        Ok(())
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// `UserStorage` implementation sharing this pool.
    #[must_use]
    pub fn users(&self) -> PostgresUserStorage {
        PostgresUserStorage::new(Arc::clone(&self.pool))
    }
}
