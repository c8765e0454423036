//! User table access.

use accounts_auth::{NewUser, ProfileUpdate, User, UserId};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;

use crate::{PgPool, StorageError, StorageResult};

/// Column list shared by every query that returns a full row.
const USER_COLUMNS: &str =
    "id, username, password_hash, first_name, last_name, email, date_joined, updated_at";

type UserTuple = (
    i64,
    String,
    String,
    String,
    String,
    String,
    OffsetDateTime,
    OffsetDateTime,
);

// =============================================================================
// Types
// =============================================================================

/// User record from database.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_joined: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl UserRow {
    /// Create from database tuple.
    fn from_tuple(row: UserTuple) -> Self {
        Self {
            id: row.0,
            username: row.1,
            password_hash: row.2,
            first_name: row.3,
            last_name: row.4,
            email: row.5,
            date_joined: row.6,
            updated_at: row.7,
        }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId(row.id),
            username: row.username,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            date_joined: row.date_joined,
            updated_at: row.updated_at,
        }
    }
}

// =============================================================================
// User Repository
// =============================================================================

/// User table operations on a borrowed pool.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new repository with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create the `users` table.
    /// Should be called during server bootstrap.
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL fails.
    pub async fn create_table_if_not_exists(&self) -> StorageResult<()> {
        query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                first_name TEXT NOT NULL DEFAULT '',
                last_name TEXT NOT NULL DEFAULT '',
                email TEXT NOT NULL DEFAULT '',
                date_joined TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Find a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> StorageResult<Option<UserRow>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row: Option<UserTuple> = query_as(&sql).bind(id).fetch_optional(self.pool).await?;

        Ok(row.map(UserRow::from_tuple))
    }

    /// Find a user by exact username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_username(&self, username: &str) -> StorageResult<Option<UserRow>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let row: Option<UserTuple> = query_as(&sql)
            .bind(username)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(UserRow::from_tuple))
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the username is taken.
    pub async fn create(&self, user: &NewUser) -> StorageResult<UserRow> {
        let sql = format!(
            "INSERT INTO users (username, password_hash, first_name, last_name, email) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        );
        let row: UserTuple = query_as(&sql)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                if let sqlx_core::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return StorageError::conflict(format!(
                        "User with username '{}' already exists",
                        user.username
                    ));
                }
                StorageError::from(e)
            })?;

        Ok(UserRow::from_tuple(row))
    }

    /// Apply a profile update. Omitted fields keep their stored value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user doesn't exist.
    pub async fn update(&self, id: i64, update: &ProfileUpdate) -> StorageResult<UserRow> {
        let sql = format!(
            "UPDATE users \
             SET first_name = COALESCE($2, first_name), \
                 last_name = COALESCE($3, last_name), \
                 email = COALESCE($4, email), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let row: Option<UserTuple> = query_as(&sql)
            .bind(id)
            .bind(update.first_name.as_deref())
            .bind(update.last_name.as_deref())
            .bind(update.email.as_deref())
            .fetch_optional(self.pool)
            .await?;

        row.map(UserRow::from_tuple)
            .ok_or_else(|| StorageError::not_found(format!("User {id}")))
    }

    /// Replace the stored password hash.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user doesn't exist.
    pub async fn set_password_hash(&self, id: i64, password_hash: &str) -> StorageResult<()> {
        let result = query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(format!("User {id}")));
        }

        Ok(())
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user doesn't exist.
    pub async fn delete(&self, id: i64) -> StorageResult<()> {
        let result = query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(format!("User {id}")));
        }

        Ok(())
    }

    /// Count all users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self) -> StorageResult<i64> {
        let count: (i64,) = query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;

        Ok(count.0)
    }
}
