//! Authentication error types.

use thiserror::Error;

use crate::forms::FormErrors;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password or unknown username; the two are not distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No token was sent, or the token is unknown or revoked.
    #[error("authentication credentials were not provided or are invalid")]
    Unauthenticated,

    /// The username is already registered.
    #[error("username already exists")]
    UsernameTaken,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Express the error the way a form displays it, if it is a user error.
    #[must_use]
    pub fn as_form_errors(&self) -> Option<FormErrors> {
        match self {
            Self::UsernameTaken => Some(FormErrors::single(
                "username",
                "A user with that username already exists.",
            )),
            Self::InvalidCredentials => {
                let mut errors = FormErrors::new();
                errors.add_non_field("Unable to log in with provided credentials.");
                Some(errors)
            }
            _ => None,
        }
    }
}
