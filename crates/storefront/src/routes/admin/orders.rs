//! Admin order management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use beerbro_core::models::{Order, OrderStatusPatch};
use beerbro_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::api::orders::set_order_status;
use crate::routes::page::{self, Page};
use crate::state::AppState;

/// Query of the order list.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Status form.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: OrderStatus,
}

/// Order list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders.html")]
pub struct OrdersTemplate {
    pub page: Page,
    pub current_path: &'static str,
    pub orders: Vec<Order>,
    pub statuses: [OrderStatus; 6],
    /// Status filter as text, empty for all orders.
    pub current_status: &'static str,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// `GET /admin/orders?status=`.
#[instrument(skip_all, fields(admin = %admin.uid))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<OrdersQuery>,
) -> Result<OrdersTemplate> {
    let current_status = match query.status.as_deref().and_then(page::non_blank) {
        Some(s) => Some(s.parse::<OrderStatus>().map_err(AppError::BadRequest)?),
        None => None,
    };
    let orders = OrderRepository::new(state.store())
        .list(current_status)
        .await?;
    let page = Page::load(&state, &session, "Orders", "Manage BeerBro orders.").await?;

    Ok(OrdersTemplate {
        page,
        current_path: "/admin/orders",
        orders,
        statuses: OrderStatus::ALL,
        current_status: current_status.map_or("", OrderStatus::as_str),
        error: query.error,
        success: query.success,
    })
}

/// `POST /admin/orders/{id}/status`. Terminal orders are refused with a
/// flash message.
#[instrument(skip(admin, state), fields(admin = %admin.uid))]
pub async fn update_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let patch = OrderStatusPatch {
        status: form.status,
    };
    match set_order_status(&state, &OrderId::new(id), &patch).await {
        Ok(order) => Ok(page::redirect_with_success(
            "/admin/orders",
            &format!("Order {} is now {}", order.id, order.status.label()),
        )),
        Err(e) if e.status().is_client_error() => {
            Ok(page::redirect_with_error("/admin/orders", &e.public_message()))
        }
        Err(e) => Err(e),
    }
}
