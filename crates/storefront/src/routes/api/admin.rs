//! Admin API. Every route requires the `admin` claim.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
};
use serde::Deserialize;
use tracing::instrument;

use beerbro_core::models::{
    AdminStats, LocationInput, LocationPatch, Order, Product, ServiceLocation, User,
};
use beerbro_core::{LocationId, OrderStatus, Role, UserId};

use super::{ApiJson, ApiQuery};
use crate::db::{LocationRepository, OrderRepository, ProductRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::CurrentUser;
use crate::services::stats::admin_stats;
use crate::state::AppState;

/// Build the admin API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/stats", get(stats))
        .route("/api/admin/products", get(list_products))
        .route("/api/admin/orders", get(list_orders))
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/{uid}/role", patch(set_role))
        .route(
            "/api/admin/locations",
            get(list_locations).post(create_location),
        )
        .route(
            "/api/admin/locations/{id}",
            patch(update_location).delete(delete_location),
        )
}

/// `GET /api/admin/stats`.
pub async fn stats(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<AdminStats>> {
    let stats = admin_stats(state.store(), state.config().low_stock_threshold).await?;
    Ok(Json(stats))
}

/// `GET /api/admin/products` - including inactive products.
pub async fn list_products(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(ProductRepository::new(state.store()).list_all().await?))
}

/// Query of `GET /api/admin/orders`.
#[derive(Debug, Deserialize)]
pub struct AdminOrdersQuery {
    pub status: Option<OrderStatus>,
}

/// `GET /api/admin/orders?status=`.
pub async fn list_orders(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AdminOrdersQuery>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(
        OrderRepository::new(state.store())
            .list(query.status)
            .await?,
    ))
}

/// `GET /api/admin/users`.
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>> {
    Ok(Json(UserRepository::new(state.store()).list().await?))
}

/// Body of `PATCH /api/admin/users/{uid}/role`.
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: Role,
}

/// `PATCH /api/admin/users/{uid}/role`.
#[instrument(skip(admin, state), fields(admin = %admin.uid))]
pub async fn set_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(uid): Path<String>,
    ApiJson(body): ApiJson<RoleRequest>,
) -> Result<Json<User>> {
    let user = change_role(&state, &admin, &UserId::new(uid), body.role).await?;
    Ok(Json(user))
}

/// Set or clear the `admin` claim. Takes effect at the user's next sign-in.
///
/// # Errors
///
/// Returns `AppError::BadRequest` when an admin tries to drop their own
/// claim, and `AppError::Database` with `NotFound` for an unknown uid.
pub async fn change_role(
    state: &AppState,
    admin: &CurrentUser,
    uid: &UserId,
    role: Role,
) -> Result<User> {
    if &admin.uid == uid && !role.is_admin() {
        return Err(AppError::BadRequest(
            "You cannot remove your own admin role".to_string(),
        ));
    }
    let user = UserRepository::new(state.store()).set_role(uid, role).await?;
    tracing::info!(uid = %uid, role = %role, "Role claim updated");
    Ok(user)
}

/// `GET /api/admin/locations` - including inactive locations.
pub async fn list_locations(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<ServiceLocation>>> {
    Ok(Json(LocationRepository::new(state.store()).list().await?))
}

/// `POST /api/admin/locations`.
#[instrument(skip(admin, state, input), fields(admin = %admin.uid))]
pub async fn create_location(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LocationInput>,
) -> Result<(StatusCode, Json<ServiceLocation>)> {
    input.validate()?;
    let location = LocationRepository::new(state.store()).create(&input).await?;
    tracing::info!(location_id = %location.id, "Service location created");
    Ok((StatusCode::CREATED, Json(location)))
}

/// `PATCH /api/admin/locations/{id}`.
#[instrument(skip(admin, state, patch), fields(admin = %admin.uid))]
pub async fn update_location(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<LocationPatch>,
) -> Result<Json<ServiceLocation>> {
    patch.validate()?;
    let location = LocationRepository::new(state.store())
        .update(&LocationId::new(id), &patch)
        .await?;
    Ok(Json(location))
}

/// `DELETE /api/admin/locations/{id}`.
#[instrument(skip(admin, state), fields(admin = %admin.uid))]
pub async fn delete_location(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    if LocationRepository::new(state.store())
        .delete(&LocationId::new(id))
        .await?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Location not found".to_string()))
    }
}
