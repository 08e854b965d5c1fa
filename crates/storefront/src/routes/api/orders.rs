//! Orders API.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use beerbro_core::models::{CheckoutRequest, Order, OrderStatusPatch};
use beerbro_core::{OrderId, UserId};

use super::{ApiJson, ApiQuery};
use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireUser};
use crate::services::CheckoutService;
use crate::state::AppState;

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/{id}", get(get_order).patch(update_order_status))
}

/// Query of `GET /api/orders`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersQuery {
    pub user_id: Option<String>,
}

/// `GET /api/orders?userId=` - a user's orders, newest first.
#[instrument(skip(user, state), fields(uid = %user.uid))]
pub async fn list_orders(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<OrdersQuery>,
) -> Result<Json<Vec<Order>>> {
    let user_id = query
        .user_id
        .filter(|id| !id.trim().is_empty())
        .map(UserId::new)
        .ok_or_else(|| AppError::BadRequest("userId is required".to_string()))?;
    if !user.can_access(&user_id) {
        return Err(AppError::Forbidden(
            "You can only view your own orders".to_string(),
        ));
    }

    let orders = OrderRepository::new(state.store())
        .list_for_user(&user_id)
        .await?;
    Ok(Json(orders))
}

/// `POST /api/orders` - place an order for the signed-in user.
#[instrument(skip(user, state, request), fields(uid = %user.uid))]
pub async fn create_order(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = CheckoutService::new(state.store())
        .place_order(&user.uid, request)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /api/orders/{id}` - owner or admin; anyone else gets 404.
#[instrument(skip(user, state), fields(uid = %user.uid))]
pub async fn get_order(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    OrderRepository::new(state.store())
        .get(&OrderId::new(id))
        .await?
        .filter(|order| user.can_access(&order.user_id))
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

/// `PATCH /api/orders/{id}` (admin) - status change. Delivered and
/// cancelled orders are locked.
#[instrument(skip(admin, state), fields(admin = %admin.uid))]
pub async fn update_order_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<OrderStatusPatch>,
) -> Result<Json<Order>> {
    let order = set_order_status(&state, &OrderId::new(id), &patch).await?;
    Ok(Json(order))
}

/// Shared by the API and the admin console.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown order and a validation error
/// when the order is in a terminal state.
pub async fn set_order_status(
    state: &AppState,
    id: &OrderId,
    patch: &OrderStatusPatch,
) -> Result<Order> {
    let orders = OrderRepository::new(state.store());
    let current = orders
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    patch.check(current.status)?;

    let updated = orders.set_status(id, patch.status).await?;
    tracing::info!(order_id = %id, from = %current.status, to = %updated.status, "Order status changed");
    Ok(updated)
}
