//! Sign-in, registration and protected routes.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use beerbro_integration_tests::{PASSWORD, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_protected_pages_redirect_to_login() {
    let mut app = TestApp::new();

    for path in [
        "/checkout",
        "/orders",
        "/profile",
        "/admin",
        "/admin/products",
        "/admin/orders",
        "/admin/users",
        "/admin/locations",
    ] {
        let response = app.get(path).await;
        assert!(response.redirects_to_login(), "{path}: {:?}", response.status);
    }
}

#[tokio::test]
async fn test_login_redirect_keeps_next() {
    let mut app = TestApp::new();

    let response = app.get("/orders").await;
    assert_eq!(response.location(), "/auth/login?next=%2Forders");

    let response = app.get("/admin/orders").await;
    assert_eq!(response.location(), "/auth/login?next=%2Fadmin%2Forders");
}

#[tokio::test]
async fn test_api_requires_session() {
    let mut app = TestApp::new();

    let response = app.get("/api/auth/me").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.json()["error"].is_string());

    let response = app.get("/api/orders?userId=anyone").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_form_signs_in() {
    let mut app = TestApp::new();

    let response = app
        .post_form(
            "/auth/register",
            &[
                ("email", "ada@example.com"),
                ("password", PASSWORD),
                ("password_confirm", PASSWORD),
                ("display_name", "Ada"),
                ("next", "/orders"),
            ],
        )
        .await;
    assert!(response.status.is_redirection());
    assert_eq!(response.location(), "/orders");

    let me = app.get("/api/auth/me").await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.json()["email"], "ada@example.com");
    assert_eq!(me.json()["role"], "customer");

    assert_eq!(app.get("/orders").await.status, StatusCode::OK);
    assert_eq!(app.get("/profile").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_form_rejects_mismatched_passwords() {
    let mut app = TestApp::new();

    let response = app
        .post_form(
            "/auth/register",
            &[
                ("email", "ada@example.com"),
                ("password", PASSWORD),
                ("password_confirm", "something else entirely"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Passwords do not match"));
    assert_eq!(app.get("/api/auth/me").await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_rejects_offsite_next() {
    let mut app = TestApp::new();

    let response = app
        .post_form(
            "/auth/register",
            &[
                ("email", "ada@example.com"),
                ("password", PASSWORD),
                ("password_confirm", PASSWORD),
                ("next", "https://evil.example/"),
            ],
        )
        .await;
    assert_eq!(response.location(), "/");
}

#[tokio::test]
async fn test_login_form() {
    let mut app = TestApp::new();
    app.register("ada@example.com").await;
    app.logout().await;

    let wrong = app
        .post_form(
            "/auth/login",
            &[("email", "ada@example.com"), ("password", "not the password")],
        )
        .await;
    assert_eq!(wrong.status, StatusCode::OK);
    assert!(wrong.body.contains("Invalid email or password"));

    let right = app
        .post_form(
            "/auth/login",
            &[
                ("email", "ada@example.com"),
                ("password", PASSWORD),
                ("next", "/profile"),
            ],
        )
        .await;
    assert_eq!(right.location(), "/profile");
    assert_eq!(app.get("/profile").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_api_register_and_login() {
    let mut app = TestApp::new();
    let uid = app.register("ada@example.com").await;

    let duplicate = app
        .new_visitor()
        .json(
            Method::POST,
            "/api/auth/register",
            &json!({ "email": "ADA@example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let weak = app
        .new_visitor()
        .json(
            Method::POST,
            "/api/auth/register",
            &json!({ "email": "bob@example.com", "password": "short" }),
        )
        .await;
    assert_eq!(weak.status, StatusCode::BAD_REQUEST);

    app.logout().await;
    assert_eq!(app.get("/api/auth/me").await.status, StatusCode::UNAUTHORIZED);

    let bad = app
        .json(
            Method::POST,
            "/api/auth/login",
            &json!({ "email": "ada@example.com", "password": "wrong password" }),
        )
        .await;
    assert_eq!(bad.status, StatusCode::UNAUTHORIZED);
    assert_eq!(bad.json()["error"], "Invalid email or password");

    let good = app.login("ada@example.com").await;
    assert_eq!(good.status, StatusCode::OK);
    assert_eq!(good.json()["uid"], uid.as_str());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let mut app = TestApp::new();

    let response = app
        .json(Method::POST, "/api/auth/login", &json!({ "email": 42 }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["error"].is_string());
}
