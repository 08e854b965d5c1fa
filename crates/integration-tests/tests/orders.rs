//! Checkout, order access and status changes.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use beerbro_integration_tests::TestApp;
use beerbro_storefront::db::{Collection, DocumentStore};
use serde_json::{Value, json};

fn address(postal_code: &str) -> Value {
    json!({
        "fullName": "Ada Lovelace",
        "phone": "5550102030",
        "line1": "1 Hop Lane",
        "city": "Portland",
        "state": "OR",
        "postalCode": postal_code
    })
}

fn order_body(product_id: &str, quantity: u32, postal_code: &str) -> Value {
    json!({
        "items": [{ "productId": product_id, "quantity": quantity }],
        "shippingAddress": address(postal_code)
    })
}

#[tokio::test]
async fn test_checkout_totals_and_stock() {
    let mut app = TestApp::new();
    let uid = app.register("ada@example.com").await;
    let ipa = app.add_product("Hop Lane IPA", "4.50", 10, "IPA").await;
    app.add_location("Downtown", &["97201"], "5.00", "10").await;

    let response = app
        .json(
            Method::POST,
            "/api/orders",
            &order_body(ipa.id.as_str(), 3, "97201"),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    let order = response.json();
    assert_eq!(order["userId"], uid.as_str());
    assert_eq!(order["subtotal"], 13.5);
    assert_eq!(order["deliveryFee"], 5.0);
    assert_eq!(order["total"], 18.5);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["paymentMethod"], "cash_on_delivery");
    assert_eq!(order["items"][0]["name"], "Hop Lane IPA");

    assert_eq!(app.product(&ipa).await.stock, 7);

    let mine = app.get(&format!("/api/orders?userId={uid}")).await;
    assert_eq!(mine.status, StatusCode::OK);
    assert_eq!(mine.json().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_checkout_rejections() {
    let mut app = TestApp::new();
    app.register("ada@example.com").await;
    let ipa = app.add_product("Hop Lane IPA", "4.50", 2, "IPA").await;
    app.add_location("Downtown", &["97201"], "5.00", "5").await;

    let too_many = app
        .json(Method::POST, "/api/orders", &order_body(ipa.id.as_str(), 3, "97201"))
        .await;
    assert_eq!(too_many.status, StatusCode::CONFLICT);

    let not_served = app
        .json(Method::POST, "/api/orders", &order_body(ipa.id.as_str(), 2, "10001"))
        .await;
    assert_eq!(not_served.status, StatusCode::BAD_REQUEST);

    let below_minimum = app
        .json(Method::POST, "/api/orders", &order_body(ipa.id.as_str(), 1, "97201"))
        .await;
    assert_eq!(below_minimum.status, StatusCode::BAD_REQUEST);

    let unknown = app
        .json(Method::POST, "/api/orders", &order_body("ghost", 1, "97201"))
        .await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);

    let empty = app
        .json(
            Method::POST,
            "/api/orders",
            &json!({ "items": [], "shippingAddress": address("97201") }),
        )
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    assert_eq!(app.product(&ipa).await.stock, 2);
}

#[tokio::test]
async fn test_order_list_requires_user_id() {
    let mut app = TestApp::new();
    app.register("ada@example.com").await;

    let response = app.get("/api/orders").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["error"].is_string());
}

#[tokio::test]
async fn test_orders_are_private() {
    let mut app = TestApp::new();
    let ada = app.register("ada@example.com").await;
    let ipa = app.add_product("Hop Lane IPA", "4.50", 10, "IPA").await;
    app.add_location("Downtown", &["97201"], "5.00", "0").await;
    let order = app
        .json(Method::POST, "/api/orders", &order_body(ipa.id.as_str(), 1, "97201"))
        .await
        .json();
    let order_id = order["id"].as_str().unwrap().to_owned();

    let mut bob = app.new_visitor();
    bob.register("bob@example.com").await;
    assert_eq!(
        bob.get(&format!("/api/orders?userId={ada}")).await.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        bob.get(&format!("/api/orders/{order_id}")).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        bob.get(&format!("/orders/{order_id}")).await.status,
        StatusCode::NOT_FOUND
    );

    let mut admin = app.new_visitor();
    admin.register_admin("ops@example.com").await;
    assert_eq!(
        admin.get(&format!("/api/orders?userId={ada}")).await.status,
        StatusCode::OK
    );
    assert_eq!(
        admin.get(&format!("/api/orders/{order_id}")).await.status,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_terminal_status_is_locked() {
    let mut app = TestApp::new();
    app.register("ada@example.com").await;
    let ipa = app.add_product("Hop Lane IPA", "4.50", 10, "IPA").await;
    app.add_location("Downtown", &["97201"], "5.00", "0").await;
    let order = app
        .json(Method::POST, "/api/orders", &order_body(ipa.id.as_str(), 1, "97201"))
        .await
        .json();
    let path = format!("/api/orders/{}", order["id"].as_str().unwrap());

    let by_customer = app
        .json(Method::PATCH, &path, &json!({ "status": "delivered" }))
        .await;
    assert_eq!(by_customer.status, StatusCode::FORBIDDEN);

    let mut admin = app.new_visitor();
    admin.register_admin("ops@example.com").await;

    let confirmed = admin
        .json(Method::PATCH, &path, &json!({ "status": "confirmed" }))
        .await;
    assert_eq!(confirmed.status, StatusCode::OK);
    assert_eq!(confirmed.json()["status"], "confirmed");

    let delivered = admin
        .json(Method::PATCH, &path, &json!({ "status": "delivered" }))
        .await;
    assert_eq!(delivered.status, StatusCode::OK);

    let reopened = admin
        .json(Method::PATCH, &path, &json!({ "status": "pending" }))
        .await;
    assert_eq!(reopened.status, StatusCode::BAD_REQUEST);

    let unknown = admin
        .json(Method::PATCH, &path, &json!({ "status": "lost" }))
        .await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);

    let pending = admin.get("/api/admin/orders?status=pending").await.json();
    assert!(pending.as_array().unwrap().is_empty());
    let delivered = admin.get("/api/admin/orders?status=delivered").await.json();
    assert_eq!(delivered.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cart_and_checkout_pages() {
    let mut app = TestApp::new();
    let ipa = app.add_product("Hop Lane IPA", "4.50", 10, "IPA").await;
    app.add_location("Downtown", &["97201"], "5.00", "0").await;

    let added = app
        .post_form("/cart/add", &[("product_id", ipa.id.as_str()), ("quantity", "2")])
        .await;
    assert!(added.status.is_redirection());
    assert!(added.location().starts_with("/cart"));
    assert!(app.get("/cart").await.body.contains("Hop Lane IPA"));

    assert!(app.get("/checkout").await.redirects_to_login());

    app.register("ada@example.com").await;
    assert_eq!(app.get("/checkout").await.status, StatusCode::OK);

    let placed = app
        .post_form(
            "/checkout",
            &[
                ("full_name", "Ada Lovelace"),
                ("phone", "5550102030"),
                ("line1", "1 Hop Lane"),
                ("city", "Portland"),
                ("state", "OR"),
                ("postal_code", "97201"),
            ],
        )
        .await;
    assert!(placed.status.is_redirection());
    let location = placed.location().to_owned();
    assert!(location.starts_with("/orders/"), "{location}");

    let order_page = app.get(&location).await;
    assert_eq!(order_page.status, StatusCode::OK);
    assert!(order_page.body.contains("Hop Lane IPA"));

    assert_eq!(app.product(&ipa).await.stock, 8);
    assert!(!app.get("/cart").await.body.contains("Hop Lane IPA"));
    assert!(app.get("/orders").await.body.contains("/orders/"));
}

#[tokio::test]
async fn test_checkout_page_with_empty_cart() {
    let mut app = TestApp::new();
    app.register("ada@example.com").await;

    let response = app.get("/checkout").await;
    assert!(response.status.is_redirection());
    assert_eq!(response.location(), "/cart");
}

#[tokio::test]
async fn test_oversized_quantity_is_rejected() {
    let mut app = TestApp::new();
    app.register("ada@example.com").await;
    let ipa = app.add_product("Hop Lane IPA", "1.00", 500, "IPA").await;
    app.add_location("Downtown", &["97201"], "0", "0").await;

    let response = app
        .json(Method::POST, "/api/orders", &order_body(ipa.id.as_str(), 150, "97201"))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.body);
    assert!(response.json()["error"].is_string());
    assert_eq!(app.product(&ipa).await.stock, 500);
}

#[tokio::test]
async fn test_checkout_with_saved_address() {
    let mut app = TestApp::new();
    let uid = app.register("ada@example.com").await;
    let ipa = app.add_product("Hop Lane IPA", "4.50", 10, "IPA").await;
    app.add_location("Eastside", &["97214"], "3.00", "0").await;

    let saved = app
        .json(
            Method::POST,
            &format!("/api/users/{uid}/addresses"),
            &address("97214"),
        )
        .await;
    assert_eq!(saved.status, StatusCode::CREATED, "{}", saved.body);
    let address_id = saved.json()["id"].as_str().unwrap().to_owned();

    let response = app
        .json(
            Method::POST,
            "/api/orders",
            &json!({
                "items": [{ "productId": ipa.id.as_str(), "quantity": 2 }],
                "addressId": address_id
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    let order = response.json();
    assert_eq!(order["shippingAddress"]["postalCode"], "97214");
    assert_eq!(order["total"], 12.0);

    let unknown = app
        .json(
            Method::POST,
            "/api/orders",
            &json!({
                "items": [{ "productId": ipa.id.as_str(), "quantity": 1 }],
                "addressId": "no-such-address"
            }),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_explicit_location_must_be_active() {
    let mut app = TestApp::new();
    app.register("ada@example.com").await;
    let ipa = app.add_product("Hop Lane IPA", "4.50", 10, "IPA").await;
    let downtown = app.add_location("Downtown", &["97201"], "5.00", "0").await;
    let closed = app.add_location("Closed", &["97201"], "1.00", "0").await;
    app.store()
        .merge(
            Collection::Locations,
            closed.id.as_str(),
            json!({ "isActive": false }),
        )
        .await
        .unwrap()
        .unwrap();

    let mut body = order_body(ipa.id.as_str(), 1, "97201");
    body["locationId"] = json!(closed.id.as_str());
    let rejected = app.json(Method::POST, "/api/orders", &body).await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST, "{}", rejected.body);
    assert_eq!(app.product(&ipa).await.stock, 10);

    body["locationId"] = json!(downtown.id.as_str());
    let placed = app.json(Method::POST, "/api/orders", &body).await;
    assert_eq!(placed.status, StatusCode::CREATED, "{}", placed.body);
    let order = placed.json();
    assert_eq!(order["locationId"], downtown.id.as_str());
    assert_eq!(order["deliveryFee"], 5.0);
}
