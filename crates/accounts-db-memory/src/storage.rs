use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};

use accounts_auth::{
    AuthError, AuthResult, NewUser, ProfileUpdate, USERNAME_TAKEN, User, UserId, UserStorage,
};
use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    /// username -> id
    by_username: HashMap<String, UserId>,
}

/// In-memory user storage.
///
/// Both tables sit behind a single lock, so the username uniqueness check
/// and the insert happen atomically.
#[derive(Debug)]
pub struct InMemoryUserStorage {
    tables: RwLock<Tables>,
    /// Atomic counter for generating user ids
    id_counter: AtomicI64,
}

impl InMemoryUserStorage {
    /// Creates an empty store. The first user gets id 1.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            id_counter: AtomicI64::new(1),
        }
    }

    fn next_id(&self) -> UserId {
        UserId(self.id_counter.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for InMemoryUserStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStorage for InMemoryUserStorage {
    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_username
            .get(username)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn create(&self, user: NewUser) -> AuthResult<User> {
        let mut tables = self.tables.write().await;
        if tables.by_username.contains_key(&user.username) {
            return Err(AuthError::conflict(USERNAME_TAKEN));
        }

        let now = OffsetDateTime::now_utc();
        let stored = User {
            id: self.next_id(),
            username: user.username,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            date_joined: now,
            updated_at: now,
        };

        tables.by_username.insert(stored.username.clone(), stored.id);
        tables.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: UserId, update: &ProfileUpdate) -> AuthResult<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| AuthError::not_found("User"))?;
        update.apply(user);
        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> AuthResult<()> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .remove(&id)
            .ok_or_else(|| AuthError::not_found("User"))?;
        tables.by_username.remove(&user.username);
        Ok(())
    }

    async fn count(&self) -> AuthResult<u64> {
        Ok(self.tables.read().await.users.len() as u64)
    }

    async fn set_password_hash(&self, id: UserId, password_hash: &str) -> AuthResult<()> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| AuthError::not_found("User"))?;
        user.password_hash = password_hash.to_string();
        user.updated_at = OffsetDateTime::now_utc();
        Ok(())
    }
}
