//! Per-process user store.
//!
//! Accounts live in memory for the lifetime of the process. The store owns
//! the password hashes; callers only ever see [`User`].

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use platzi_core::{Email, UserId, Username};

use super::AuthError;
use crate::models::User;

/// A user about to be inserted, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub email: Email,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Default)]
struct UserStoreInner {
    last_id: i64,
    users: HashMap<UserId, StoredUser>,
    by_username: HashMap<String, UserId>,
}

/// In-memory user table with a unique username index.
#[derive(Default)]
pub struct UserStore {
    inner: RwLock<UserStoreInner>,
}

impl UserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user, assigning the next ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UsernameTaken` if the username is already used.
    pub async fn insert(&self, new: NewUser) -> Result<User, AuthError> {
        let mut inner = self.inner.write().await;
        if inner.by_username.contains_key(new.username.as_str()) {
            return Err(AuthError::UsernameTaken);
        }

        inner.last_id += 1;
        let id = UserId::new(inner.last_id);
        let user = User {
            id,
            username: new.username,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            date_joined: Utc::now(),
        };

        inner
            .by_username
            .insert(user.username.as_str().to_string(), id);
        inner.users.insert(
            id,
            StoredUser {
                user: user.clone(),
                password_hash: new.password_hash,
            },
        );
        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: UserId) -> Option<User> {
        self.inner.read().await.users.get(&id).map(|s| s.user.clone())
    }

    /// Get a user and their password hash by exact username.
    pub async fn get_with_password_hash(&self, username: &str) -> Option<(User, String)> {
        let inner = self.inner.read().await;
        let id = inner.by_username.get(username)?;
        inner
            .users
            .get(id)
            .map(|s| (s.user.clone(), s.password_hash.clone()))
    }

    /// Whether `username` is registered.
    pub async fn contains_username(&self, username: &str) -> bool {
        self.inner.read().await.by_username.contains_key(username)
    }

    /// Number of registered users.
    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
