//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (store ping)
//!
//! # Storefront
//! GET  /                       - Home page
//! GET  /products?category=     - Product listing
//! GET  /products/{id}          - Product detail
//! GET  /search?q=              - Search results
//!
//! # Cart & checkout
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add a product
//! POST /cart/update            - Set a line quantity (0 removes)
//! POST /cart/remove            - Remove a line
//! GET  /checkout               - Checkout form (sign-in required)
//! POST /checkout               - Place order
//!
//! # Account (sign-in required)
//! GET  /orders                 - Order history
//! GET  /orders/{id}            - Order detail
//! GET  /profile                - Profile and addresses
//! POST /profile                - Update profile
//! POST /profile/addresses      - Add address
//! POST /profile/addresses/{id}/delete - Remove address
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Admin console (admin claim required)
//! /admin/...                   - See [`admin`]
//!
//! # JSON API
//! /api/...                     - See [`api`]
//! ```

pub mod admin;
pub mod api;
pub mod auth;
pub mod cart;
pub mod home;
pub mod orders;
pub mod page;
pub mod products;
pub mod profile;
pub mod search;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_sessions::Session;

use crate::error::{AppError, Result};
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth page routes router.
pub fn auth_routes(rate_limit: bool) -> Router<AppState> {
    let router = Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout));

    match auth_rate_limiter().filter(|_| rate_limit) {
        Some(limiter) => router.layer(limiter),
        None => router,
    }
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::show).post(profile::update))
        .route("/addresses", post(profile::add_address))
        .route("/addresses/{id}/delete", post(profile::delete_address))
}

/// Create all routes, pages and API.
pub fn routes(rate_limit: bool) -> Router<AppState> {
    Router::new()
        // Health checks
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        // Storefront
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .route("/search", get(search::search_page))
        .nest("/cart", cart_routes())
        .route("/checkout", get(cart::checkout_page).post(cart::place_order))
        // Account
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .nest("/profile", profile_routes())
        .nest("/auth", auth_routes(rate_limit))
        // Admin console
        .nest("/admin", admin::router())
        // JSON API
        .merge(api::router(rate_limit))
        .fallback(fallback)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the document store is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Unknown paths: JSON 404 under `/api`, the 404 page elsewhere.
async fn fallback(State(state): State<AppState>, session: Session, uri: Uri) -> Result<Response> {
    if uri.path().starts_with("/api/") {
        return Ok(AppError::NotFound("Not found".to_string()).into_response());
    }
    page::not_found(&state, &session).await
}
