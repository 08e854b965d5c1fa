//! JSON API under `/api`.
//!
//! Every error body is `{"error": "<message>"}`, including malformed JSON
//! and query strings, via the [`ApiJson`] and [`ApiQuery`] extractors.

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod orders;
pub mod users;

use axum::{Router, extract::FromRequest, extract::FromRequestParts};

use crate::error::AppError;
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// JSON body extractor that rejects with [`AppError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor that rejects with [`AppError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Build the complete API router.
pub fn router(rate_limit: bool) -> Router<AppState> {
    let auth = match auth_rate_limiter().filter(|_| rate_limit) {
        Some(limiter) => auth::router().layer(limiter),
        None => auth::router(),
    };

    Router::new()
        .merge(catalog::router())
        .merge(orders::router())
        .merge(users::router())
        .merge(admin::router())
        .merge(auth)
}
