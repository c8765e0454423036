//! Minimal user store for unit tests in this crate.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::{NewUser, ProfileUpdate, User, UserId, UserStorage};

#[derive(Default)]
pub(crate) struct MemoryUsers {
    users: Mutex<BTreeMap<UserId, User>>,
    next_id: AtomicI64,
    fail: AtomicBool,
}

impl MemoryUsers {
    /// Makes every subsequent lookup fail with a storage error.
    pub(crate) fn fail_lookups(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> AuthResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            Err(AuthError::storage("connection refused"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserStorage for MemoryUsers {
    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>> {
        self.check()?;
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> AuthResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.username == user.username) {
            return Err(AuthError::conflict("username taken"));
        }
        let id = UserId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let now = OffsetDateTime::now_utc();
        let stored = User {
            id,
            username: user.username,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            date_joined: now,
            updated_at: now,
        };
        users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: UserId, update: &ProfileUpdate) -> AuthResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).ok_or_else(|| AuthError::not_found("User"))?;
        update.apply(user);
        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> AuthResult<()> {
        self.users
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AuthError::not_found("User"))
    }

    async fn count(&self) -> AuthResult<u64> {
        Ok(self.users.lock().unwrap().len() as u64)
    }

    async fn set_password_hash(&self, id: UserId, password_hash: &str) -> AuthResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).ok_or_else(|| AuthError::not_found("User"))?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }
}
