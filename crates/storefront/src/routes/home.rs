//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tower_sessions::Session;

use super::Layout;
use crate::filters;
use crate::middleware::OptionalAuth;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
}

/// Display the home page.
pub async fn home(session: Session, OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    HomeTemplate {
        layout: Layout::load(&session, user.as_ref()).await,
    }
}
