//! Order history pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use beerbro_core::OrderId;
use beerbro_core::models::Order;

use super::page::{self, MessageQuery, Page};
use crate::db::OrderRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireUser;
use crate::state::AppState;

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub page: Page,
    pub orders: Vec<Order>,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub page: Page,
    pub order: Order,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// `GET /orders` - the signed-in user's orders, newest first.
#[instrument(skip_all, fields(uid = %user.uid))]
pub async fn index(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    session: Session,
) -> Result<OrdersIndexTemplate> {
    let orders = OrderRepository::new(state.store())
        .list_for_user(&user.uid)
        .await?;
    let page = Page::load(
        &state,
        &session,
        "Your orders",
        "Track your BeerBro orders.",
    )
    .await?;
    Ok(OrdersIndexTemplate { page, orders })
}

/// `GET /orders/{id}` - owner or admin; anyone else sees the 404 page.
#[instrument(skip(user, state, session), fields(uid = %user.uid))]
pub async fn show(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<MessageQuery>,
) -> Result<Response> {
    let Some(order) = OrderRepository::new(state.store())
        .get(&OrderId::new(id))
        .await?
        .filter(|o| user.can_access(&o.user_id))
    else {
        return page::not_found(&state, &session).await;
    };

    let page = Page::load(
        &state,
        &session,
        format!("Order {}", order.id),
        "Details of your BeerBro order.",
    )
    .await?;
    Ok(OrderShowTemplate {
        page,
        order,
        error: query.error,
        success: query.success,
    }
    .into_response())
}
