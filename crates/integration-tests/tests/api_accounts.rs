//! Integration tests for the JSON account API.

use platzi_integration_tests::{PASSWORD, TestContext};
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn body(resp: reqwest::Response) -> Value {
    resp.json().await.expect("response body is JSON")
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_returns_user_and_token() {
    let ctx = TestContext::new().await;

    let body = ctx.register_api("ana").await;

    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["username"], "ana");
    assert_eq!(body["user"]["email"], "ana@example.com");
    assert!(body["user"].get("password_hash").is_none());
    let token = body["token"].as_str().expect("token is a string");
    assert_eq!(token.len(), 40);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_short_password_creates_no_user() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .post_json(
            "/api/register/",
            &json!({
                "username": "ana",
                "email": "ana@example.com",
                "password": "short",
                "password2": "short",
            }),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Registration failed");
    assert!(body["errors"]["password"].is_array());
    assert!(ctx.state.users().is_empty().await);
}

#[tokio::test]
async fn test_password_mismatch_creates_no_user() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .post_json(
            "/api/register/",
            &json!({
                "username": "ana",
                "email": "ana@example.com",
                "password": PASSWORD,
                "password2": "something-else",
            }),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body(resp).await;
    assert_eq!(
        body["errors"]["password2"][0],
        "The two password fields didn't match."
    );
    assert!(ctx.state.users().is_empty().await);
}

#[tokio::test]
async fn test_duplicate_username_fails_second_time() {
    let ctx = TestContext::new().await;
    ctx.register_api("ana").await;

    let resp = ctx
        .post_json(
            "/api/register/",
            &json!({
                "username": "ana",
                "email": "other@example.com",
                "password": PASSWORD,
                "password2": PASSWORD,
            }),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body(resp).await;
    assert_eq!(
        body["errors"]["username"][0],
        "A user with that username already exists."
    );
    assert_eq!(ctx.state.users().len().await, 1);
}

#[tokio::test]
async fn test_register_accepts_null_names() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .post_json(
            "/api/register/",
            &json!({
                "username": "ana",
                "email": "ana@example.com",
                "password": PASSWORD,
                "password2": PASSWORD,
                "first_name": null,
                "last_name": null,
            }),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(body(resp).await["user"]["first_name"], "");
}

#[tokio::test]
async fn test_register_accepts_form_body() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .post_form(
            "/api/register/",
            &[
                ("username", "ana"),
                ("email", "ana@example.com"),
                ("password", PASSWORD),
                ("password2", PASSWORD),
            ],
        )
        .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body(resp).await;
    assert_eq!(body["user"]["username"], "ana");
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn test_malformed_body_gets_json_error() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .post(ctx.url("/api/register/"))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error = body(resp).await;
    assert_eq!(error["success"], false);
    assert_eq!(error["message"], "Malformed request body");
    assert!(error["errors"]["non_field_errors"][0].is_string());
    assert!(ctx.state.users().is_empty().await);

    // No content type at all is rejected the same way
    let resp = ctx
        .client
        .post(ctx.url("/api/login/"))
        .body("username=ana")
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(resp).await["success"], false);
}

// ============================================================================
// Login and tokens
// ============================================================================

#[tokio::test]
async fn test_login_reuses_registration_token() {
    let ctx = TestContext::new().await;
    let registered = ctx.register_api("ana").await;

    let resp = ctx
        .post_json(
            "/api/login/",
            &json!({"username": "ana", "password": PASSWORD}),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["token"], registered["token"]);
    assert_eq!(body["user"]["id"], registered["user"]["id"]);
}

#[tokio::test]
async fn test_login_with_bad_credentials() {
    let ctx = TestContext::new().await;
    ctx.register_api("ana").await;

    for (username, password) in [("ana", "wrong-password"), ("nobody", PASSWORD)] {
        let resp = ctx
            .post_json(
                "/api/login/",
                &json!({"username": username, "password": password}),
            )
            .await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body(resp).await;
        assert_eq!(body["message"], "Login failed");
        assert_eq!(
            body["errors"]["non_field_errors"][0],
            "Unable to log in with provided credentials."
        );
    }
}

#[tokio::test]
async fn test_profile_requires_token() {
    let ctx = TestContext::new().await;
    let registered = ctx.register_api("ana").await;
    let token = registered["token"].as_str().expect("token");

    let resp = ctx
        .client
        .get(ctx.url("/api/profile/"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = ctx
        .client
        .get(ctx.url("/api/profile/"))
        .header("Authorization", format!("Token {token}"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["username"], "ana");

    let resp = ctx
        .client
        .get(ctx.url("/api/profile/"))
        .header("Authorization", format!("Bearer {token}"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_accepts_form_body() {
    let ctx = TestContext::new().await;
    let registered = ctx.register_api("ana").await;

    let resp = ctx
        .post_form("/api/login/", &[("username", "ana"), ("password", PASSWORD)])
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body(resp).await["token"], registered["token"]);
}

#[tokio::test]
async fn test_logout_clears_login_session() {
    let ctx = TestContext::new().await;
    ctx.register_api("ana").await;

    let resp = ctx
        .post_json(
            "/api/login/",
            &json!({"username": "ana", "password": PASSWORD}),
        )
        .await;
    let token = body(resp).await["token"]
        .as_str()
        .expect("token")
        .to_string();

    // The API login also signs the browser session in
    let home = ctx.get("/").await.text().await.expect("home page");
    assert!(home.contains("Log out"));

    let resp = ctx
        .client
        .post(ctx.url("/api/logout/"))
        .header("Authorization", format!("Token {token}"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::OK);

    let home = ctx.get("/").await.text().await.expect("home page");
    assert!(!home.contains("Log out"));
    assert!(home.contains("href=\"/login\""));
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let ctx = TestContext::new().await;
    let registered = ctx.register_api("ana").await;
    let token = registered["token"].as_str().expect("token");
    let auth = format!("Token {token}");

    let resp = ctx
        .client
        .post(ctx.url("/api/logout/"))
        .header("Authorization", &auth)
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body(resp).await["success"], true);

    let resp = ctx
        .client
        .get(ctx.url("/api/profile/"))
        .header("Authorization", &auth)
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // The revoked token cannot log out again
    let resp = ctx
        .client
        .post(ctx.url("/api/logout/"))
        .header("Authorization", &auth)
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_after_logout_issues_new_token() {
    let ctx = TestContext::new().await;
    let registered = ctx.register_api("ana").await;
    let old = registered["token"].as_str().expect("token");

    ctx.client
        .post(ctx.url("/api/logout/"))
        .header("Authorization", format!("Token {old}"))
        .send()
        .await
        .expect("request");

    let resp = ctx
        .post_json(
            "/api/login/",
            &json!({"username": "ana", "password": PASSWORD}),
        )
        .await;
    let body = body(resp).await;
    assert_ne!(body["token"].as_str(), Some(old));
}

// ============================================================================
// Username availability
// ============================================================================

#[tokio::test]
async fn test_check_username() {
    let ctx = TestContext::new().await;
    ctx.register_api("ana").await;

    let resp = ctx.get("/api/check-username/?username=ana").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let taken = body(resp).await;
    assert_eq!(taken["success"], true);
    assert_eq!(taken["available"], false);

    let free = body(ctx.get("/api/check-username/?username=bob").await).await;
    assert_eq!(free["available"], true);

    // Checking has no side effects
    assert_eq!(ctx.state.users().len().await, 1);
}

#[tokio::test]
async fn test_check_username_requires_parameter() {
    let ctx = TestContext::new().await;

    for path in ["/api/check-username/", "/api/check-username/?username="] {
        let resp = ctx.get(path).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "path {path}");
        assert_eq!(body(resp).await["success"], false);
    }
}
