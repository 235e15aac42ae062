//! Registration and login forms.

use serde::Deserialize;

use platzi_core::{Email, Username};

use super::{FormErrors, required};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Whether first and last name must be filled in.
///
/// The HTML sign-up form requires them; the JSON API treats them as optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRequirement {
    Required,
    Optional,
}

/// Raw registration input, from either an HTML form or a JSON body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(default, deserialize_with = "super::nullable_string")]
    pub username: String,
    #[serde(default, deserialize_with = "super::nullable_string")]
    pub email: String,
    /// The HTML form posts this as `password1`.
    #[serde(default, alias = "password1", deserialize_with = "super::nullable_string")]
    pub password: String,
    #[serde(default, deserialize_with = "super::nullable_string")]
    pub password2: String,
    #[serde(default, deserialize_with = "super::nullable_string")]
    pub first_name: String,
    #[serde(default, deserialize_with = "super::nullable_string")]
    pub last_name: String,
}

/// Cleaned registration data. Username availability is not checked here.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub username: Username,
    pub email: Email,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegistrationForm {
    /// Validate every field and collect all errors at once.
    ///
    /// # Errors
    ///
    /// Returns `FormErrors` keyed by field name if any rule fails.
    pub fn validate(&self, names: NameRequirement) -> Result<ValidRegistration, FormErrors> {
        let mut errors = FormErrors::new();

        let username = required(&mut errors, "username", &self.username).and_then(|raw| {
            Username::parse(raw)
                .map_err(|e| errors.add("username", capitalize(&e.to_string())))
                .ok()
        });

        let email = required(&mut errors, "email", &self.email).and_then(|raw| {
            Email::parse(raw)
                .map_err(|_| errors.add("email", "Enter a valid email address."))
                .ok()
        });

        // Passwords are never trimmed.
        if self.password.is_empty() {
            errors.add("password", super::REQUIRED);
        } else if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!(
                    "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
                ),
            );
        }

        if self.password2.is_empty() {
            errors.add("password2", super::REQUIRED);
        } else if !self.password.is_empty() && self.password != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        }

        let (first_name, last_name) = match names {
            NameRequirement::Required => (
                required(&mut errors, "first_name", &self.first_name).unwrap_or_default(),
                required(&mut errors, "last_name", &self.last_name).unwrap_or_default(),
            ),
            NameRequirement::Optional => (self.first_name.trim(), self.last_name.trim()),
        };

        match (username, email) {
            (Some(username), Some(email)) if errors.is_empty() => Ok(ValidRegistration {
                username,
                email,
                password: self.password.clone(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            }),
            _ => Err(errors),
        }
    }
}

/// Raw login input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default, deserialize_with = "super::nullable_string")]
    pub username: String,
    #[serde(default, deserialize_with = "super::nullable_string")]
    pub password: String,
}

/// Login input with both fields present.
#[derive(Debug, Clone)]
pub struct ValidLogin {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    /// Check presence only; format is not enforced at login.
    ///
    /// # Errors
    ///
    /// Returns `FormErrors` if either field is empty.
    pub fn validate(&self) -> Result<ValidLogin, FormErrors> {
        let mut errors = FormErrors::new();
        let username = required(&mut errors, "username", &self.username).unwrap_or_default();
        if self.password.is_empty() {
            errors.add("password", super::REQUIRED);
        }
        errors.into_result(|| ValidLogin {
            username: username.to_string(),
            password: self.password.clone(),
        })
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        let mut out: String = first.to_uppercase().collect();
        out.push_str(chars.as_str());
        out.push('.');
        out
    })
}
