//! Product, category and location API.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use beerbro_integration_tests::TestApp;
use beerbro_storefront::db::{Collection, DocumentStore};
use serde_json::json;

#[tokio::test]
async fn test_product_lookup_miss_is_404() {
    let mut app = TestApp::new();

    let response = app.get("/api/products/missing").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.json()["error"].is_string());
}

#[tokio::test]
async fn test_legacy_documents_are_normalized() {
    let mut app = TestApp::new();
    app.store()
        .set(
            Collection::Products,
            "legacy",
            json!({
                "title": "Old Ale",
                "unitPrice": "7.25",
                "stockQuantity": 3,
                "brewery": "Legacy Co",
                "alcoholContent": 8.1
            }),
        )
        .await
        .unwrap();
    app.store()
        .set(Collection::Products, "bare", json!({}))
        .await
        .unwrap();

    let legacy = app.get("/api/products/legacy").await;
    assert_eq!(legacy.status, StatusCode::OK);
    let legacy = legacy.json();
    assert_eq!(legacy["id"], "legacy");
    assert_eq!(legacy["name"], "Old Ale");
    assert_eq!(legacy["price"], 7.25);
    assert_eq!(legacy["brand"], "Legacy Co");
    assert_eq!(legacy["stock"], 3);
    assert_eq!(legacy["abv"], 8.1);
    assert_eq!(legacy["category"], "Uncategorized");
    assert_eq!(legacy["isActive"], true);

    let bare = app.get("/api/products/bare").await.json();
    assert_eq!(bare["price"], 0.0);
    assert_eq!(bare["stock"], 0);
    assert!(bare["imageUrl"].is_null());

    assert_eq!(app.get("/products/legacy").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_list_filters() {
    let mut app = TestApp::new();
    app.add_product("Hop Lane IPA", "4.50", 10, "IPA").await;
    app.add_product("Haze Runner", "5.25", 10, "IPA").await;
    app.add_product("Midnight Oat Stout", "5.50", 10, "Stout").await;

    let all = app.get("/api/products").await.json();
    assert_eq!(all.as_array().unwrap().len(), 3);

    let ipas = app.get("/api/products?category=ipa").await.json();
    assert_eq!(ipas.as_array().unwrap().len(), 2);

    let search = app.get("/api/products?search=OAT").await.json();
    assert_eq!(search.as_array().unwrap().len(), 1);
    assert_eq!(search[0]["name"], "Midnight Oat Stout");

    let limited = app.get("/api/products?limit=1").await.json();
    assert_eq!(limited.as_array().unwrap().len(), 1);

    let bad = app.get("/api/products?limit=lots").await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_lifecycle() {
    let mut app = TestApp::new();
    app.register_admin("ops@example.com").await;

    let created = app
        .json(
            Method::POST,
            "/api/products",
            &json!({
                "name": "Citrus Wit",
                "price": 3.95,
                "category": "Wheat",
                "stock": 5,
                "abv": 4.9
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    let id = created.json()["id"].as_str().unwrap().to_owned();
    let path = format!("/api/products/{id}");

    let mut visitor = app.new_visitor();
    let fetched = visitor.get(&path).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json()["price"], 3.95);

    let patched = app
        .json(Method::PATCH, &path, &json!({ "price": 4.25, "isActive": false }))
        .await;
    assert_eq!(patched.status, StatusCode::OK);
    assert_eq!(patched.json()["price"], 4.25);

    assert_eq!(visitor.get(&path).await.status, StatusCode::NOT_FOUND);
    let listing = visitor.get("/api/products").await.json();
    assert!(listing.as_array().unwrap().is_empty());

    assert_eq!(app.delete(&path).await.status, StatusCode::NO_CONTENT);
    assert_eq!(app.delete(&path).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_validation() {
    let mut app = TestApp::new();
    app.register_admin("ops@example.com").await;

    let negative = app
        .json(
            Method::POST,
            "/api/products",
            &json!({ "name": "Refund Ale", "price": -1, "category": "Ale" }),
        )
        .await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);

    let nameless = app
        .json(
            Method::POST,
            "/api/products",
            &json!({ "name": "  ", "price": 1, "category": "Ale" }),
        )
        .await;
    assert_eq!(nameless.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_categories() {
    let mut app = TestApp::new();
    app.register_admin("ops@example.com").await;

    let created = app
        .json(
            Method::POST,
            "/api/categories",
            &json!({ "name": "Barrel Aged", "description": "Oak and time" }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    assert_eq!(created.json()["slug"], "barrel-aged");

    let duplicate = app
        .json(Method::POST, "/api/categories", &json!({ "name": "Barrel aged" }))
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let listed = app.new_visitor().get("/api/categories").await.json();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["name"], "Barrel Aged");
}
