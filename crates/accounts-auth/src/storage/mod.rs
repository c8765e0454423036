//! Storage traits for account data.
//!
//! # Implementations
//!
//! Storage implementations are provided in separate crates:
//!
//! - `accounts-auth-postgres` - PostgreSQL storage backend
//! - `accounts-db-memory` - in-memory backend for development and tests

pub mod user;

pub use user::{NewUser, ProfileUpdate, PublicUser, User, UserId, UserStorage};
