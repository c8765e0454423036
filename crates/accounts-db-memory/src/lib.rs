//! In-memory user storage backend for the accounts service.
//!
//! This crate provides an in-memory implementation of the `UserStorage`
//! trait from `accounts-auth`. Data lives for the lifetime of the process.
//!
//! # Example
//!
//! ```ignore
//! use accounts_auth::{NewUser, UserStorage};
//! use accounts_db_memory::InMemoryUserStorage;
//!
//! let storage = InMemoryUserStorage::new();
//! let user = storage.create(NewUser::new("alice", hash)).await?;
//! ```

pub mod storage;

pub use accounts_auth::UserStorage;
pub use storage::InMemoryUserStorage;

/// Type alias for a shareable UserStorage instance.
pub type DynUserStorage = std::sync::Arc<dyn UserStorage>;

/// Creates a new in-memory UserStorage instance.
pub fn create_user_storage() -> DynUserStorage {
    std::sync::Arc::new(InMemoryUserStorage::new())
}
