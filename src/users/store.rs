//! In-memory user storage.

use std::collections::BTreeMap;
use std::sync::RwLock;
use chrono::Utc;
use thiserror::Error;

use crate::users::model::{User, UserUpdate};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("user not found")]
    NotFound,
    #[error("user with this email or username already exists")]
    Conflict,
}

#[derive(Default)]
struct Inner {
    users: BTreeMap<u64, User>,
    next_id: u64,
}

impl Inner {
    fn live(&self) -> impl Iterator<Item = &User> {
        self.users.values().filter(|u| !u.is_deleted())
    }

    /// Whether a live user other than `except` holds the username or email.
    fn is_taken(&self, username: Option<&str>, email: Option<&str>, except: Option<u64>) -> bool {
        self.live().any(|u| {
            Some(u.id) != except
                && (username == Some(u.username.as_str()) || email == Some(u.email.as_str()))
        })
    }
}

/// Thread-safe user table.
///
/// Deleted users are kept with a `deleted_at` marker and hidden from every
/// query; their username and email become available again.
#[derive(Default)]
pub struct UserStore {
    inner: RwLock<Inner>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new user. Uniqueness check and insert happen under one lock.
    pub fn create(&self, username: &str, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut inner = self.inner.write().expect("user store lock poisoned");
        if inner.is_taken(Some(username), Some(email), None) {
            return Err(StoreError::Conflict);
        }

        inner.next_id += 1;
        let now = Utc::now();
        let user = User {
            id: inner.next_id,
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    /// Whether a live user already holds `username` or `email`.
    pub fn exists(&self, username: &str, email: &str) -> bool {
        let inner = self.inner.read().expect("user store lock poisoned");
        inner.is_taken(Some(username), Some(email), None)
    }

    pub fn find_by_id(&self, id: u64) -> Option<User> {
        let inner = self.inner.read().expect("user store lock poisoned");
        inner.users.get(&id).filter(|u| !u.is_deleted()).cloned()
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let inner = self.inner.read().expect("user store lock poisoned");
        let user = inner.live().find(|u| u.email == email).cloned();
        user
    }

    /// All live users except `id`, ordered by id.
    pub fn list_except(&self, id: u64) -> Vec<User> {
        let inner = self.inner.read().expect("user store lock poisoned");
        inner.live().filter(|u| u.id != id).cloned().collect()
    }

    pub fn update(&self, id: u64, update: UserUpdate) -> Result<User, StoreError> {
        let mut inner = self.inner.write().expect("user store lock poisoned");
        if inner.users.get(&id).map_or(true, User::is_deleted) {
            return Err(StoreError::NotFound);
        }
        if inner.is_taken(update.username.as_deref(), update.email.as_deref(), Some(id)) {
            return Err(StoreError::Conflict);
        }

        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(username) = update.username {
            user.username = username;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    pub fn soft_delete(&self, id: u64) -> Result<(), StoreError> {
        let mut inner = self.inner.write().expect("user store lock poisoned");
        match inner.users.get_mut(&id) {
            Some(user) if !user.is_deleted() => {
                user.deleted_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(StoreError::NotFound),
        }
    }

    /// Number of live users.
    pub fn count(&self) -> usize {
        self.inner.read().expect("user store lock poisoned").live().count()
    }
}
