//! Admin console pages.
//!
//! Every handler takes [`RequireAdmin`](crate::middleware::RequireAdmin):
//! signed-out visitors are sent to the login page, signed-in customers get
//! a 403.
//!
//! ```text
//! GET  /admin                          - Dashboard (stats + recent orders)
//! GET  /admin/products                 - Product list
//! GET  /admin/products/new             - New product form
//! POST /admin/products                 - Create product
//! GET  /admin/products/{id}/edit       - Edit product form
//! POST /admin/products/{id}            - Update product
//! POST /admin/products/{id}/delete     - Delete product
//! GET  /admin/orders?status=           - Order list
//! POST /admin/orders/{id}/status       - Update order status
//! GET  /admin/users                    - User list
//! POST /admin/users/{uid}/role         - Grant or revoke the admin claim
//! GET  /admin/locations                - Service locations + create form
//! POST /admin/locations                - Create location
//! POST /admin/locations/{id}/delete    - Delete location
//! ```

pub mod dashboard;
pub mod locations;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the admin console router (mounted at `/admin`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/products", get(products::index).post(products::create))
        .route("/products/new", get(products::new))
        .route("/products/{id}", post(products::update))
        .route("/products/{id}/edit", get(products::edit))
        .route("/products/{id}/delete", post(products::delete))
        .route("/orders", get(orders::index))
        .route("/orders/{id}/status", post(orders::update_status))
        .route("/users", get(users::index))
        .route("/users/{uid}/role", post(users::set_role))
        .route("/locations", get(locations::index).post(locations::create))
        .route("/locations/{id}/delete", post(locations::delete))
}
