//! Request body extractor for the JSON API.

use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::forms::FormErrors;

/// Summary message for a body that could not be read.
pub const MALFORMED_BODY: &str = "Malformed request body";

/// Deserialized API request body.
///
/// Accepts `application/json` and `application/x-www-form-urlencoded`.
/// Anything unreadable is rejected as a `400` with the usual
/// `{"success": false, "message", "errors"}` body, the parser's complaint
/// reported under `non_field_errors`.
#[derive(Debug, Clone)]
pub struct ApiBody<T>(pub T);

impl<S, T> FromRequest<S> for ApiBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let detail = if is_form_encoded(&req) {
            match Form::<T>::from_request(req, state).await {
                Ok(Form(value)) => return Ok(Self(value)),
                Err(rejection) => rejection.body_text(),
            }
        } else {
            match Json::<T>::from_request(req, state).await {
                Ok(Json(value)) => return Ok(Self(value)),
                Err(rejection) => rejection.body_text(),
            }
        };

        tracing::debug!(%detail, "Rejected API request body");
        let mut errors = FormErrors::new();
        errors.add_non_field(detail);
        Err(AppError::validation(MALFORMED_BODY, errors))
    }
}

fn is_form_encoded(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}
