//! API token registry.
//!
//! Maps opaque tokens to user IDs. Each user holds at most one token: issuing
//! again returns the existing one, and a new token is only minted after the
//! old one is revoked.

use std::collections::HashMap;

use tokio::sync::RwLock;

use platzi_core::UserId;

use crate::models::AuthToken;

#[derive(Default)]
struct TokenRegistryInner {
    by_token: HashMap<String, UserId>,
    by_user: HashMap<UserId, AuthToken>,
}

/// Token → user mapping, indexed both ways.
#[derive(Default)]
pub struct TokenRegistry {
    inner: RwLock<TokenRegistryInner>,
}

impl TokenRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the user's token, creating one if they have none.
    pub async fn get_or_create(&self, user_id: UserId) -> AuthToken {
        let mut inner = self.inner.write().await;
        if let Some(token) = inner.by_user.get(&user_id) {
            return token.clone();
        }

        let token = AuthToken::generate();
        inner.by_token.insert(token.as_str().to_string(), user_id);
        inner.by_user.insert(user_id, token.clone());
        token
    }

    /// The user a token belongs to, if it is live.
    pub async fn resolve(&self, token: &str) -> Option<UserId> {
        self.inner.read().await.by_token.get(token).copied()
    }

    /// Delete a token. Returns `false` if it was not live.
    pub async fn revoke(&self, token: &str) -> bool {
        let mut inner = self.inner.write().await;
        match inner.by_token.remove(token) {
            Some(user_id) => {
                inner.by_user.remove(&user_id);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_or_create_reuses_token() {
        let registry = TokenRegistry::new();
        let first = registry.get_or_create(UserId::new(1)).await;
        let second = registry.get_or_create(UserId::new(1)).await;
        assert_eq!(first, second);

        let other = registry.get_or_create(UserId::new(2)).await;
        assert_ne!(first, other);
    }

    #[tokio::test]
    async fn test_resolve_and_revoke() {
        let registry = TokenRegistry::new();
        let token = registry.get_or_create(UserId::new(7)).await;
        assert_eq!(registry.resolve(token.as_str()).await, Some(UserId::new(7)));

        assert!(registry.revoke(token.as_str()).await);
        assert_eq!(registry.resolve(token.as_str()).await, None);
        assert!(!registry.revoke(token.as_str()).await);
    }

    #[tokio::test]
    async fn test_new_token_after_revoke() {
        let registry = TokenRegistry::new();
        let old = registry.get_or_create(UserId::new(3)).await;
        registry.revoke(old.as_str()).await;
        let new = registry.get_or_create(UserId::new(3)).await;
        assert_ne!(old, new);
        assert_eq!(registry.resolve(new.as_str()).await, Some(UserId::new(3)));
    }
}
