//! Authentication middleware and extractors.
//!
//! Two mechanisms coexist:
//!
//! - JSON API requests carry `Authorization: Token <key>` (or `Bearer <key>`),
//!   resolved against the token registry by [`RequireToken`].
//! - HTML pages use the cookie session; [`OptionalAuth`] reads the
//!   [`CurrentUser`] stored there at login.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{CurrentUser, User, session_keys};
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Extractor that requires a valid API token.
///
/// Rejects with `401` when the header is missing, malformed, or names a
/// token that is not live.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(RequireToken { user, .. }: RequireToken) -> impl IntoResponse {
///     Json(user)
/// }
/// ```
pub struct RequireToken {
    pub user: User,
    /// The raw token key, needed for logout.
    pub token: String,
}

impl FromRequestParts<AppState> for RequireToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(token_from_header)
            .ok_or(AuthError::Unauthenticated)?;

        let user = state.auth().authenticate_token(token).await?;

        Ok(Self {
            user,
            token: token.to_string(),
        })
    }
}

/// Key part of a `Token <key>` or `Bearer <key>` header value.
fn token_from_header(value: &str) -> Option<&str> {
    let (scheme, key) = value.trim().split_once(' ')?;
    let key = key.trim();
    let known = scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer");
    (known && !key.is_empty()).then_some(key)
}

/// Extractor that optionally gets the session user.
///
/// Never rejects; anonymous visitors get `None`.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Helper to log a user into the session.
///
/// Cycles the session ID first so a pre-login cookie cannot be fixed.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the session user (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    session.cycle_id().await
}
