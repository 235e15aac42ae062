//! Integration tests for the Platzi store front.
//!
//! Each test gets its own [`TestContext`]: a fresh store front (empty account
//! store, empty sessions) served on an ephemeral port, with a `wiremock`
//! server standing in for the catalog API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p platzi-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `api_accounts` - JSON account API and token lifecycle
//! - `web_auth` - HTML registration, login and logout with cookie sessions
//! - `product_pages` - Product listing and CRUD against the mocked catalog
//! - `health` - Single-request checks via `tower::ServiceExt::oneshot`

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::time::Duration;

use platzi_storefront::config::{CatalogConfig, StorefrontConfig};
use platzi_storefront::state::AppState;
use reqwest::{Client, Response, redirect::Policy};
use serde_json::{Value, json};
use wiremock::MockServer;

/// Catalog timeout used by tests; short so timeout tests stay fast.
pub const CATALOG_TIMEOUT: Duration = Duration::from_millis(500);

/// Password that satisfies the registration rules.
pub const PASSWORD: &str = "correct-horse-9";

/// A running store front plus its mocked catalog API.
pub struct TestContext {
    /// Cookie-keeping client that does not follow redirects.
    pub client: Client,
    pub base_url: String,
    pub catalog: MockServer,
    pub state: AppState,
}

impl TestContext {
    /// Start a catalog mock and a store front pointed at it.
    pub async fn new() -> Self {
        let catalog = MockServer::start().await;
        let catalog_config = CatalogConfig::new(&catalog.uri())
            .expect("mock server URI is a valid base URL")
            .with_timeout(CATALOG_TIMEOUT);
        let state = AppState::new(StorefrontConfig::for_catalog(catalog_config));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("listener has an address");
        let app = platzi_storefront::app(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server error");
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: format!("http://{addr}"),
            catalog,
            state,
        }
    }

    /// Absolute URL for a store front path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Register `username` through the JSON API and return the response body.
    pub async fn register_api(&self, username: &str) -> Value {
        let resp = self
            .post_json(
                "/api/register/",
                &json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": PASSWORD,
                    "password2": PASSWORD,
                }),
            )
            .await;
        assert_eq!(resp.status(), 201, "registration of {username} failed");
        resp.json().await.expect("registration body is JSON")
    }

    /// Register and log in `username` through the HTML forms.
    pub async fn register_web(&self, username: &str) -> Response {
        let email = format!("{username}@example.com");
        self.post_form(
            "/register",
            &[
                ("username", username),
                ("email", &email),
                ("first_name", "Test"),
                ("last_name", "User"),
                ("password1", PASSWORD),
                ("password2", PASSWORD),
            ],
        )
        .await
    }
}

/// `Location` header of a redirect response.
#[must_use]
pub fn location(resp: &Response) -> &str {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// A product as the catalog API returns it.
#[must_use]
pub fn product_json(id: i64, title: &str, category_id: i64, category: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "price": 10,
        "description": format!("{title} description"),
        "category": {"id": category_id, "name": category, "image": "https://img.example.com/c.png"},
        "images": [format!("https://img.example.com/{id}.png")],
        "creationAt": "2024-01-01T00:00:00.000Z",
    })
}

/// The two-product catalog used across listing tests.
#[must_use]
pub fn sample_products() -> Value {
    json!([
        product_json(1, "Shirt", 1, "Clothes"),
        product_json(2, "Mug", 2, "Home"),
    ])
}

/// Category list matching [`sample_products`].
#[must_use]
pub fn sample_categories() -> Value {
    json!([
        {"id": 1, "name": "Clothes"},
        {"id": 2, "name": "Home"},
    ])
}
