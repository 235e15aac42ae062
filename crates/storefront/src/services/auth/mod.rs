//! Authentication service.
//!
//! Password accounts backed by the in-memory [`UserStore`], with API bearer
//! tokens from the [`TokenRegistry`].

mod error;
pub mod store;
pub mod tokens;

pub use error::AuthError;
pub use store::{NewUser, UserStore};
pub use tokens::TokenRegistry;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::forms::ValidRegistration;
use crate::models::{AuthToken, User};

/// Authentication service.
///
/// Handles registration, password login, and token issue/revocation.
pub struct AuthService<'a> {
    users: &'a UserStore,
    tokens: &'a TokenRegistry,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a UserStore, tokens: &'a TokenRegistry) -> Self {
        Self { users, tokens }
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Create an account from validated registration data.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UsernameTaken` if the username is already
    /// registered, or `AuthError::PasswordHash` if hashing fails.
    pub async fn register(&self, registration: ValidRegistration) -> Result<User, AuthError> {
        // Cheap pre-check so a duplicate does not pay for a hash.
        if self
            .users
            .contains_username(registration.username.as_str())
            .await
        {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = hash_password(&registration.password)?;

        let user = self
            .users
            .insert(NewUser {
                username: registration.username,
                email: registration.email,
                password_hash,
                first_name: registration.first_name,
                last_name: registration.last_name,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Check a username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the user does not exist or
    /// the password is wrong.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let (user, password_hash) = self
            .users
            .get_with_password_hash(username)
            .await
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// Whether `username` is free to register. No side effects.
    pub async fn username_available(&self, username: &str) -> bool {
        !self.users.contains_username(username).await
    }

    // =========================================================================
    // API Tokens
    // =========================================================================

    /// Return the user's token, creating it on first use.
    pub async fn issue_token(&self, user: &User) -> AuthToken {
        self.tokens.get_or_create(user.id).await
    }

    /// Resolve a bearer token to its user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthenticated` if the token is unknown or its
    /// user no longer exists.
    pub async fn authenticate_token(&self, token: &str) -> Result<User, AuthError> {
        let user_id = self
            .tokens
            .resolve(token)
            .await
            .ok_or(AuthError::Unauthenticated)?;
        self.users
            .get(user_id)
            .await
            .ok_or(AuthError::Unauthenticated)
    }

    /// Delete a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthenticated` if the token was not live.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        if self.tokens.revoke(token).await {
            Ok(())
        } else {
            Err(AuthError::Unauthenticated)
        }
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::forms::{NameRequirement, RegistrationForm};

    fn registration(username: &str) -> ValidRegistration {
        RegistrationForm {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "correct-horse".to_string(),
            password2: "correct-horse".to_string(),
            first_name: String::new(),
            last_name: String::new(),
        }
        .validate(NameRequirement::Optional)
        .unwrap()
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (users, tokens) = (UserStore::new(), TokenRegistry::new());
        let auth = AuthService::new(&users, &tokens);

        let user = auth.register(registration("ana")).await.unwrap();
        let logged_in = auth.login("ana", "correct-horse").await.unwrap();
        assert_eq!(user.id, logged_in.id);
    }

    #[tokio::test]
    async fn test_second_registration_fails() {
        let (users, tokens) = (UserStore::new(), TokenRegistry::new());
        let auth = AuthService::new(&users, &tokens);

        auth.register(registration("ana")).await.unwrap();
        let err = auth.register(registration("ana")).await.unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));
        assert_eq!(users.len().await, 1);
    }

    #[tokio::test]
    async fn test_bad_credentials_are_indistinguishable() {
        let (users, tokens) = (UserStore::new(), TokenRegistry::new());
        let auth = AuthService::new(&users, &tokens);
        auth.register(registration("ana")).await.unwrap();

        assert!(matches!(
            auth.login("ana", "wrong-password").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody", "correct-horse").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_token_lifecycle() {
        let (users, tokens) = (UserStore::new(), TokenRegistry::new());
        let auth = AuthService::new(&users, &tokens);
        let user = auth.register(registration("ana")).await.unwrap();

        let token = auth.issue_token(&user).await;
        assert_eq!(auth.issue_token(&user).await, token);
        assert_eq!(auth.authenticate_token(token.as_str()).await.unwrap(), user);

        auth.logout(token.as_str()).await.unwrap();
        assert!(matches!(
            auth.authenticate_token(token.as_str()).await,
            Err(AuthError::Unauthenticated)
        ));
        assert!(matches!(
            auth.logout(token.as_str()).await,
            Err(AuthError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_username_available() {
        let (users, tokens) = (UserStore::new(), TokenRegistry::new());
        let auth = AuthService::new(&users, &tokens);
        assert!(auth.username_available("ana").await);
        auth.register(registration("ana")).await.unwrap();
        assert!(!auth.username_available("ana").await);
        assert!(auth.username_available("bob").await);
    }

    #[test]
    fn test_hash_roundtrip() {
        let hash = hash_password("password123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("password123", &hash).is_ok());
        assert!(verify_password("password124", &hash).is_err());
    }
}
