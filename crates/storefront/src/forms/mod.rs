//! Form validation.
//!
//! Each form is a plain `Deserialize` struct of raw strings (so a bad value
//! never fails extraction) with a `validate` method that either returns a
//! typed, cleaned value or a [`FormErrors`] map. Validation is all-or-nothing.

pub mod account;
pub mod product;

pub use account::{LoginForm, NameRequirement, RegistrationForm, ValidLogin, ValidRegistration};
pub use product::{CategoryChoice, ProductDraft, ProductForm};

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Key under which errors not tied to a single field are reported.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Message for a missing required field.
pub const REQUIRED: &str = "This field is required.";

/// Field-keyed validation errors.
///
/// Serializes as `{"field": ["message", ...]}`, with cross-field and
/// upstream errors under [`NON_FIELD_ERRORS`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a single field error.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record an error against `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Record an error that is not about any one field.
    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD_ERRORS, message);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `field` has at least one error.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// All messages for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    /// First message for `field`; what the HTML forms display.
    #[must_use]
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }

    /// Messages under [`NON_FIELD_ERRORS`].
    #[must_use]
    pub fn non_field(&self) -> &[String] {
        self.get(NON_FIELD_ERRORS)
    }

    /// `Ok(value)` when no errors were recorded, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` if any error was recorded.
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for FormErrors {}

/// Reads a string field that may be absent or `null` as empty.
fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Trimmed value, or a "required" error recorded against `field`.
fn required<'a>(errors: &mut FormErrors, field: &str, value: &'a str) -> Option<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        None
    } else {
        Some(value)
    }
}
