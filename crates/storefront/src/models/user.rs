//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use platzi_core::{Email, UserId, Username};

/// A registered account.
///
/// Serializes to the public profile returned by the API; the password hash
/// lives only in the user store and never reaches this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// "First Last", or the username when no name was given.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.to_string()
        } else {
            full.to_string()
        }
    }
}

/// Opaque API bearer token: 40 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    /// Generate a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        let bytes: [u8; 20] = rand::random();
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
