//! HTTP route handlers for the store front.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page
//! GET  /health                    - Health check
//!
//! # Products (proxied to the catalog API)
//! GET  /productos/                - Product listing (?category=, ?q=)
//! GET  /crear/                    - New product form
//! POST /crear/                    - Create product
//! GET  /actualizar/{id}/          - Edit product form
//! POST /actualizar/{id}/          - Update product
//! GET  /eliminar/{id}/            - Redirect to listing
//! POST /eliminar/{id}/            - Delete product
//!
//! # Auth (cookie session)
//! GET  /register                  - Registration page
//! POST /register                  - Registration action
//! GET  /login                     - Login page (?next=)
//! POST /login                     - Login action
//! GET  /logout                    - Redirect home
//! POST /logout                    - Logout action
//!
//! # JSON API (token auth)
//! POST /api/register/             - Create account, returns token
//! POST /api/login/                - Authenticate, returns token
//! POST /api/logout/               - Revoke token
//! GET  /api/profile/              - Current user
//! GET  /api/check-username/       - Username availability
//! ```

pub mod api;
pub mod auth;
pub mod home;
pub mod products;

use axum::{
    Router,
    extract::Request,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tower_sessions::Session;

use crate::middleware::{
    create_session_layer, request_id_middleware, security_headers_middleware, take_flashes,
};
use crate::models::{CurrentUser, Flash};
use crate::state::AppState;

/// Values every page's base template needs.
pub struct Layout {
    pub username: Option<String>,
    pub flashes: Vec<Flash>,
}

impl Layout {
    /// Build the layout, consuming any pending flash messages.
    pub async fn load(session: &Session, user: Option<&CurrentUser>) -> Self {
        Self {
            username: user.map(|u| u.username.to_string()),
            flashes: take_flashes(session).await,
        }
    }
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/register/", post(api::register))
        .route("/login/", post(api::login))
        .route("/logout/", post(api::logout))
        .route("/profile/", get(api::profile))
        .route("/check-username/", get(api::check_username))
}

/// Create the HTML auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout_redirect).post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/productos/", get(products::index))
        .route("/crear/", get(products::new).post(products::create))
        .route(
            "/actualizar/{id}/",
            get(products::edit).post(products::update),
        )
        .route(
            "/eliminar/{id}/",
            get(products::delete_redirect).post(products::delete),
        )
}

/// Create all routes for the store front.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .merge(product_routes())
        .merge(auth_routes())
        .nest("/api", api_routes())
}

/// Build the complete application: routes, middleware and state.
///
/// Sentry layers are added by the binary, outside this router, so tests can
/// drive the app without a Sentry hub.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the catalog API.
async fn health() -> &'static str {
    "ok"
}
