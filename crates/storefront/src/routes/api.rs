//! JSON account API.
//!
//! Token-authenticated endpoints for registration, login, logout, profile
//! lookup and username availability. Successful logins also populate the
//! cookie session so the HTML pages see the same user. Request bodies may be
//! JSON or form-encoded.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::{info, warn};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::forms::{LoginForm, NameRequirement, RegistrationForm};
use crate::middleware::{ApiBody, RequireToken, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Query parameters for the username check.
#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    #[serde(default)]
    pub username: String,
}

/// Turn a user-facing `AuthError` into a field-error response under `message`.
fn as_validation(message: &'static str) -> impl Fn(AuthError) -> AppError {
    move |err| match err.as_form_errors() {
        Some(errors) => AppError::validation(message, errors),
        None => AppError::Auth(err),
    }
}

async fn remember_in_session(session: &Session, user: &User) {
    let current = CurrentUser {
        id: user.id,
        username: user.username.clone(),
    };
    if let Err(e) = set_current_user(session, &current).await {
        warn!(user_id = %user.id, error = %e, "Failed to set session user");
    }
}

/// `POST /api/register/`
///
/// Returns `201` with the new user and their token.
pub async fn register(
    State(state): State<AppState>,
    ApiBody(form): ApiBody<RegistrationForm>,
) -> Result<(StatusCode, Json<Value>)> {
    const FAILED: &str = "Registration failed";

    let registration = form
        .validate(NameRequirement::Optional)
        .map_err(|errors| AppError::validation(FAILED, errors))?;

    let auth = state.auth();
    let user = auth
        .register(registration)
        .await
        .map_err(as_validation(FAILED))?;
    let token = auth.issue_token(&user).await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "user": user,
            "token": token,
        })),
    ))
}

/// `POST /api/login/`
///
/// Returns the user's existing token, or a new one if they had none.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiBody(form): ApiBody<LoginForm>,
) -> Result<Json<Value>> {
    const FAILED: &str = "Login failed";

    let credentials = form
        .validate()
        .map_err(|errors| AppError::validation(FAILED, errors))?;

    let auth = state.auth();
    let user = auth
        .login(&credentials.username, &credentials.password)
        .await
        .map_err(as_validation(FAILED))?;
    let token = auth.issue_token(&user).await;

    remember_in_session(&session, &user).await;
    set_sentry_user(&user.id, user.username.as_str());

    Ok(Json(json!({
        "success": true,
        "message": "Authentication successful",
        "user": user,
        "token": token,
    })))
}

/// `POST /api/logout/`
///
/// Revokes the presented token and clears the session. Once the token has
/// authenticated, the call reports success even if revocation or session
/// cleanup fails.
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    RequireToken { user, token }: RequireToken,
) -> Json<Value> {
    if let Err(e) = state.auth().logout(&token).await {
        warn!(user_id = %user.id, error = %e, "Token already revoked at logout");
    }
    if let Err(e) = clear_current_user(&session).await {
        warn!(user_id = %user.id, error = %e, "Failed to clear session at logout");
    }
    clear_sentry_user();
    info!(user_id = %user.id, "User logged out via API");

    Json(json!({
        "success": true,
        "message": "Logged out successfully",
    }))
}

/// `GET /api/profile/`
pub async fn profile(RequireToken { user, .. }: RequireToken) -> Json<Value> {
    Json(json!({
        "success": true,
        "user": user,
    }))
}

/// `GET /api/check-username/?username=`
///
/// The name is looked up exactly as given; only a missing or empty value is
/// rejected.
pub async fn check_username(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> Result<Json<Value>> {
    if query.username.is_empty() {
        return Err(AppError::BadRequest(
            "A username must be provided".to_string(),
        ));
    }

    let available = state.auth().username_available(&query.username).await;

    let message = if available {
        "Username is available"
    } else {
        "Username is not available"
    };

    Ok(Json(json!({
        "success": true,
        "available": available,
        "message": message,
    })))
}
