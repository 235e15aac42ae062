//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding. JSON API handlers return `Result<T, AppError>`;
//! every error body has the shape `{"success": false, "message": ..., "errors"?: ...}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::forms::FormErrors;
use crate::services::auth::AuthError;

/// Application-level error type for the store front.
#[derive(Debug, Error)]
pub enum AppError {
    /// Submitted data failed validation.
    #[error("Validation error: {errors}")]
    Validation {
        message: &'static str,
        errors: FormErrors,
    },

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Validation failure with a summary message.
    #[must_use]
    pub const fn validation(message: &'static str, errors: FormErrors) -> Self {
        Self::Validation { message, errors }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Auth(err) => match err {
                AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
                AuthError::InvalidCredentials | AuthError::UsernameTaken => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Auth(AuthError::PasswordHash)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let body = match self {
            Self::Validation { message, errors } => json!({
                "success": false,
                "message": message,
                "errors": errors,
            }),
            Self::Auth(err) => match err.as_form_errors() {
                Some(errors) => json!({
                    "success": false,
                    "message": "Authentication failed",
                    "errors": errors,
                }),
                None if status == StatusCode::UNAUTHORIZED => json!({
                    "success": false,
                    "message": "Authentication credentials were not provided or are invalid.",
                }),
                None => json!({"success": false, "message": "Internal server error"}),
            },
            Self::BadRequest(message) => json!({"success": false, "message": message}),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("username is required".to_string());
        assert_eq!(err.to_string(), "Bad request: username is required");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::validation("Registration failed", FormErrors::new())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::Unauthenticated)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UsernameTaken)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::PasswordHash)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
