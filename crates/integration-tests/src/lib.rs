//! Integration test harness for BeerBro.
//!
//! Tests drive the full storefront router in-process with
//! `tower::ServiceExt::oneshot`, backed by the in-memory document store and
//! an in-memory session store. No database or running server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p beerbro-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `pages` - Storefront pages, meta tags, health checks
//! - `auth` - Sign-in, registration and protected routes
//! - `admin` - Admin console and admin API access
//! - `catalog_api` - Product, category and location API
//! - `orders` - Checkout, order access and status changes
//! - `users` - Profile and address book API

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use beerbro_core::models::{LocationInput, Product, ProductInput, ServiceLocation};
use beerbro_core::{Email, Role};
use beerbro_storefront::config::AppConfig;
use beerbro_storefront::db::{
    DocumentStore, LocationRepository, MemoryDocumentStore, ProductRepository, UserRepository,
};
use beerbro_storefront::state::AppState;

/// Password used by every test account.
pub const PASSWORD: &str = "correct horse battery staple";

/// Name of the session cookie.
const SESSION_COOKIE: &str = "bb_session";

/// Largest response body a test reads.
const BODY_LIMIT: usize = 4 * 1024 * 1024;

/// Configuration for tests: memory store, no rate limiting.
#[must_use]
pub fn test_config() -> AppConfig {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("BEERBRO_STORE", "memory"),
        ("BEERBRO_BASE_URL", "http://localhost:3000"),
        ("BEERBRO_SESSION_SECRET", "Kq8vZ2mX7pL4wR9tB3nH6jD1fG5sY0cA"),
        ("BEERBRO_RATE_LIMIT", "false"),
    ]);
    AppConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_owned())).unwrap()
}

/// A response with its body read into memory.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Parse the body as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|e| panic!("body is not JSON ({e}): {}", self.body))
    }

    /// The `Location` header of a redirect.
    #[must_use]
    pub fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    /// Whether this is a redirect to the login page.
    #[must_use]
    pub fn redirects_to_login(&self) -> bool {
        self.status.is_redirection() && self.location().starts_with("/auth/login")
    }
}

/// One browser-like client against a fresh application.
///
/// The session cookie is carried from response to request, so consecutive
/// calls behave like one visitor.
pub struct TestApp {
    router: Router,
    store: Arc<MemoryDocumentStore>,
    cookie: Option<String>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// A fresh application with empty stores.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(MemoryDocumentStore::new());
        let state = AppState::new(test_config(), store.clone());
        Self {
            router: beerbro_storefront::app(state, MemoryStore::default()),
            store,
            cookie: None,
        }
    }

    /// The backing document store.
    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Another visitor on the same application, without a session.
    #[must_use]
    pub fn new_visitor(&self) -> Self {
        Self {
            router: self.router.clone(),
            store: self.store.clone(),
            cookie: None,
        }
    }

    /// Send a request, attaching and then refreshing the session cookie.
    pub async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();
        for value in response.headers().get_all(header::SET_COOKIE) {
            let pair = value.to_str().unwrap().split(';').next().unwrap_or_default();
            if pair.starts_with(SESSION_COOKIE) {
                self.cookie = Some(pair.to_owned());
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    /// Submit an HTML form.
    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Send a JSON body.
    pub async fn json(&mut self, method: Method, uri: &str, body: &Value) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        let request = Request::delete(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    /// Register through the API and stay signed in. Returns the user id.
    pub async fn register(&mut self, email: &str) -> String {
        let response = self
            .json(
                Method::POST,
                "/api/auth/register",
                &serde_json::json!({ "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.json()["uid"].as_str().unwrap().to_owned()
    }

    /// Sign in through the API.
    pub async fn login(&mut self, email: &str) -> TestResponse {
        self.json(
            Method::POST,
            "/api/auth/login",
            &serde_json::json!({ "email": email, "password": PASSWORD }),
        )
        .await
    }

    /// Sign out through the API.
    pub async fn logout(&mut self) {
        let request = Request::post("/api/auth/logout")
            .body(Body::empty())
            .unwrap();
        let response = self.send(request).await;
        assert_eq!(response.status, StatusCode::NO_CONTENT);
    }

    /// Register, grant the admin claim, and sign in again so the session
    /// carries it. Returns the user id.
    pub async fn register_admin(&mut self, email: &str) -> String {
        let uid = self.register(email).await;
        self.set_role(email, Role::Admin).await;
        self.logout().await;
        let response = self.login(email).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        uid
    }

    /// Change a user's claim directly in the store.
    pub async fn set_role(&self, email: &str, role: Role) {
        let users = UserRepository::new(self.store());
        let user = users
            .get_by_email(&Email::parse(email).unwrap())
            .await
            .unwrap()
            .unwrap();
        users.set_role(&user.uid, role).await.unwrap();
    }

    /// Insert a product straight into the store.
    pub async fn add_product(
        &self,
        name: &str,
        price: &str,
        stock: u32,
        category: &str,
    ) -> Product {
        let input = ProductInput {
            name: name.to_owned(),
            description: format!("{name} from the test brewery"),
            price: price.parse().unwrap(),
            category: category.to_owned(),
            brand: "Test Brewing".to_owned(),
            image_url: None,
            stock,
            abv: None,
            volume_ml: None,
            is_active: true,
            featured: false,
        };
        ProductRepository::new(self.store())
            .create(&input)
            .await
            .unwrap()
    }

    /// Insert an active delivery location straight into the store.
    pub async fn add_location(
        &self,
        name: &str,
        postal_codes: &[&str],
        fee: &str,
        minimum: &str,
    ) -> ServiceLocation {
        let input = LocationInput {
            name: name.to_owned(),
            city: "Portland".to_owned(),
            state: "OR".to_owned(),
            postal_codes: postal_codes.iter().map(|c| (*c).to_owned()).collect(),
            delivery_fee: fee.parse().unwrap(),
            min_order_amount: minimum.parse().unwrap(),
            is_active: true,
        };
        LocationRepository::new(self.store())
            .create(&input)
            .await
            .unwrap()
    }

    /// Re-read a product from the store.
    pub async fn product(&self, product: &Product) -> Product {
        ProductRepository::new(self.store())
            .get(&product.id)
            .await
            .unwrap()
            .unwrap()
    }
}
