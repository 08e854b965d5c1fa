//! Admin console and admin API access.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use beerbro_core::Role;
use beerbro_integration_tests::TestApp;
use serde_json::json;

const ADMIN_PAGES: [&str; 6] = [
    "/admin",
    "/admin/products",
    "/admin/products/new",
    "/admin/orders",
    "/admin/users",
    "/admin/locations",
];

#[tokio::test]
async fn test_admin_pages_reject_customers() {
    let mut app = TestApp::new();
    app.register("ada@example.com").await;

    for path in ADMIN_PAGES {
        let response = app.get(path).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{path}");
        assert!(response.body.contains("<html"), "{path}");
        assert!(response.body.contains("Access denied"), "{path}");
    }
}

#[tokio::test]
async fn test_admin_pages_load_for_admins() {
    let mut app = TestApp::new();
    app.register_admin("ops@example.com").await;
    app.add_product("Hop Lane IPA", "4.50", 3, "IPA").await;

    for path in ADMIN_PAGES {
        let response = app.get(path).await;
        assert_eq!(response.status, StatusCode::OK, "{path}");
    }
    assert!(app.get("/admin/products").await.body.contains("Hop Lane IPA"));
}

#[tokio::test]
async fn test_admin_api_rejects_customers() {
    let mut app = TestApp::new();
    app.register("ada@example.com").await;

    for path in [
        "/api/admin/stats",
        "/api/admin/products",
        "/api/admin/orders",
        "/api/admin/users",
        "/api/admin/locations",
    ] {
        let response = app.get(path).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{path}");
        assert!(response.json()["error"].is_string(), "{path}");
    }

    let create = app
        .json(
            Method::POST,
            "/api/products",
            &json!({ "name": "Sneaky Lager", "price": 1, "category": "Lager" }),
        )
        .await;
    assert_eq!(create.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_role_change_applies_at_next_login() {
    let mut app = TestApp::new();
    app.register("ada@example.com").await;
    assert_eq!(app.get("/api/admin/stats").await.status, StatusCode::FORBIDDEN);

    app.set_role("ada@example.com", Role::Admin).await;
    assert_eq!(app.get("/api/admin/stats").await.status, StatusCode::FORBIDDEN);

    app.logout().await;
    app.login("ada@example.com").await;
    assert_eq!(app.get("/api/admin/stats").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_stats() {
    let mut app = TestApp::new();
    app.register_admin("ops@example.com").await;
    app.add_product("Hop Lane IPA", "4.50", 3, "IPA").await;
    app.add_product("Riverside Pilsner", "3.25", 80, "Lager").await;
    app.add_location("Downtown", &["97201"], "4.99", "0").await;

    let stats = app.get("/api/admin/stats").await.json();
    assert_eq!(stats["totalProducts"], 2);
    assert_eq!(stats["activeProducts"], 2);
    assert_eq!(stats["lowStockProducts"], 1);
    assert_eq!(stats["totalUsers"], 1);
    assert_eq!(stats["totalOrders"], 0);
    assert_eq!(stats["activeLocations"], 1);
}

#[tokio::test]
async fn test_grant_and_revoke_through_api() {
    let mut app = TestApp::new();
    let admin_uid = app.register_admin("ops@example.com").await;
    let mut customer = app.new_visitor();
    let customer_uid = customer.register("ada@example.com").await;

    let granted = app
        .json(
            Method::PATCH,
            &format!("/api/admin/users/{customer_uid}/role"),
            &json!({ "role": "admin" }),
        )
        .await;
    assert_eq!(granted.status, StatusCode::OK);
    assert_eq!(granted.json()["customClaims"]["role"], "admin");

    let revoked = app
        .json(
            Method::PATCH,
            &format!("/api/admin/users/{customer_uid}/role"),
            &json!({ "role": "customer" }),
        )
        .await;
    assert_eq!(revoked.status, StatusCode::OK);
    assert!(revoked.json()["customClaims"]["role"].is_null());

    let self_demotion = app
        .json(
            Method::PATCH,
            &format!("/api/admin/users/{admin_uid}/role"),
            &json!({ "role": "customer" }),
        )
        .await;
    assert_eq!(self_demotion.status, StatusCode::BAD_REQUEST);

    let missing = app
        .json(
            Method::PATCH,
            "/api/admin/users/nobody/role",
            &json!({ "role": "admin" }),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_product_form() {
    let mut app = TestApp::new();
    app.register_admin("ops@example.com").await;

    let created = app
        .post_form(
            "/admin/products",
            &[
                ("name", "Haze Runner"),
                ("description", "Juicy"),
                ("price", "5.25"),
                ("category", "IPA"),
                ("brand", "Fogbank Ales"),
                ("stock", "64"),
                ("is_active", "on"),
            ],
        )
        .await;
    assert!(created.status.is_redirection());
    assert!(created.location().contains("success="));

    let products = app.get("/api/admin/products").await.json();
    assert_eq!(products.as_array().unwrap().len(), 1);
    assert_eq!(products[0]["name"], "Haze Runner");
    assert_eq!(products[0]["stock"], 64);

    let invalid = app
        .post_form(
            "/admin/products",
            &[("name", "No Price"), ("price", "free"), ("category", "IPA")],
        )
        .await;
    assert!(invalid.location().starts_with("/admin/products/new?error="));
}

#[tokio::test]
async fn test_locations_api() {
    let mut app = TestApp::new();
    app.register_admin("ops@example.com").await;

    let created = app
        .json(
            Method::POST,
            "/api/admin/locations",
            &json!({
                "name": "Eastside",
                "city": "Portland",
                "state": "OR",
                "postalCodes": ["97214", " 97232 "],
                "deliveryFee": 5.99
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    let location = created.json();
    let id = location["id"].as_str().unwrap().to_owned();
    assert_eq!(location["postalCodes"], json!(["97214", "97232"]));

    let public = app.new_visitor().get("/api/locations").await.json();
    assert_eq!(public.as_array().unwrap().len(), 1);

    let deactivated = app
        .json(
            Method::PATCH,
            &format!("/api/admin/locations/{id}"),
            &json!({ "isActive": false }),
        )
        .await;
    assert_eq!(deactivated.status, StatusCode::OK);
    let public = app.new_visitor().get("/api/locations").await.json();
    assert!(public.as_array().unwrap().is_empty());

    let deleted = app.delete(&format!("/api/admin/locations/{id}")).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    let again = app.delete(&format!("/api/admin/locations/{id}")).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}
