//! Authentication route handlers.
//!
//! Form-based registration, login and logout for the HTML pages, backed by
//! the same account store as the JSON API.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use super::Layout;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::forms::{FormErrors, LoginForm, NameRequirement, RegistrationForm};
use crate::middleware::{OptionalAuth, clear_current_user, push_flash, set_current_user};
use crate::models::{CurrentUser, Flash, User};
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Shown when the login form's credentials do not match an account.
pub const LOGIN_FAILED: &str = "Incorrect username or password.";

/// Shown when something outside the user's control breaks a form submission.
const SOMETHING_WENT_WRONG: &str = "Something went wrong. Please try again.";

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for the login page.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

impl NextQuery {
    /// The `next` target, if it is a local absolute path.
    ///
    /// Anything that could leave the site (`//host`, `/\host`, schemes) is
    /// dropped.
    #[must_use]
    pub fn safe_next(&self) -> Option<&str> {
        self.next.as_deref().filter(|next| is_local_path(next))
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.starts_with("/\\")
        && !path.chars().any(char::is_control)
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub username: String,
    pub next: Option<String>,
    pub errors: FormErrors,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub form: RegistrationForm,
    pub errors: FormErrors,
}

async fn log_in(session: &Session, user: &User) -> Result<(), tower_sessions::session::Error> {
    let current = CurrentUser {
        id: user.id,
        username: user.username.clone(),
    };
    set_current_user(session, &current).await?;
    set_sentry_user(&user.id, user.username.as_str());
    Ok(())
}

async fn flash(session: &Session, message: Flash) {
    if let Err(e) = push_flash(session, message).await {
        tracing::warn!(error = %e, "Failed to queue flash message");
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(session: Session, OptionalAuth(user): OptionalAuth) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    RegisterTemplate {
        layout: Layout::load(&session, None).await,
        form: RegistrationForm::default(),
        errors: FormErrors::new(),
    }
    .into_response()
}

/// Handle registration form submission.
///
/// On success the new user is logged in and sent home with a welcome message.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current): OptionalAuth,
    Form(form): Form<RegistrationForm>,
) -> Response {
    if current.is_some() {
        return Redirect::to("/").into_response();
    }

    let result = match form.validate(NameRequirement::Required) {
        Ok(registration) => state.auth().register(registration).await.map_err(|e| {
            e.as_form_errors().unwrap_or_else(|| {
                tracing::error!(error = %e, "Registration failed");
                let mut errors = FormErrors::new();
                errors.add_non_field(SOMETHING_WENT_WRONG);
                errors
            })
        }),
        Err(errors) => Err(errors),
    };

    match result {
        Ok(user) => {
            if let Err(e) = log_in(&session, &user).await {
                tracing::error!(user_id = %user.id, error = %e, "Failed to set session");
                return Redirect::to("/login").into_response();
            }
            flash(
                &session,
                Flash::success(format!(
                    "Your account has been created. Welcome, {}!",
                    user.display_name()
                )),
            )
            .await;
            Redirect::to("/").into_response()
        }
        Err(errors) => {
            // Never echo passwords back into the form
            let form = RegistrationForm {
                password: String::new(),
                password2: String::new(),
                ..form
            };
            RegisterTemplate {
                layout: Layout::load(&session, None).await,
                form,
                errors,
            }
            .into_response()
        }
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<NextQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        layout: Layout::load(&session, None).await,
        username: String::new(),
        next: query.safe_next().map(str::to_string),
        errors: FormErrors::new(),
    }
    .into_response()
}

/// Handle login form submission.
///
/// Redirects to `next` when it is a local path, otherwise home.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current): OptionalAuth,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Response {
    if current.is_some() {
        return Redirect::to("/").into_response();
    }

    let result = match form.validate() {
        Ok(credentials) => state
            .auth()
            .login(&credentials.username, &credentials.password)
            .await
            .map_err(|e| {
                let mut errors = FormErrors::new();
                if matches!(e, AuthError::InvalidCredentials) {
                    errors.add_non_field(LOGIN_FAILED);
                } else {
                    tracing::error!(error = %e, "Login failed");
                    errors.add_non_field(SOMETHING_WENT_WRONG);
                }
                errors
            }),
        Err(errors) => Err(errors),
    };

    match result {
        Ok(user) => {
            if let Err(e) = log_in(&session, &user).await {
                tracing::error!(user_id = %user.id, error = %e, "Failed to set session");
                return Redirect::to("/login").into_response();
            }
            flash(
                &session,
                Flash::success(format!("Welcome back, {}!", user.username)),
            )
            .await;
            Redirect::to(query.safe_next().unwrap_or("/")).into_response()
        }
        Err(errors) => {
            tracing::info!(username = %form.username.trim(), "Login rejected");
            LoginTemplate {
                layout: Layout::load(&session, None).await,
                username: form.username,
                next: query.safe_next().map(str::to_string),
                errors,
            }
            .into_response()
        }
    }
}

// =============================================================================
// Logout Routes
// =============================================================================

/// `GET /logout` only redirects; logging out requires a POST.
pub async fn logout_redirect() -> Redirect {
    Redirect::to("/")
}

/// Handle logout.
///
/// Session errors are logged and the user is sent home regardless.
pub async fn logout(session: Session, OptionalAuth(user): OptionalAuth) -> Redirect {
    if let Err(e) = clear_current_user(&session).await {
        tracing::warn!(error = %e, "Failed to clear session");
    }
    clear_sentry_user();

    if let Some(user) = user {
        tracing::info!(user_id = %user.id, "User logged out");
        flash(&session, Flash::info("You have been logged out.")).await;
    }

    Redirect::to("/")
}
