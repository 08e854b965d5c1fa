//! Cart and checkout pages.
//!
//! The cart lives in the session as `[{productId, quantity}]`. Checkout
//! turns it into a [`CheckoutRequest`] and hands it to the same service the
//! JSON API uses.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use beerbro_core::models::{Address, AddressInput, CheckoutRequest, ServiceLocation};
use beerbro_core::{AddressId, LocationId, ProductId};

use super::page::{self, MessageQuery, Page, non_blank};
use crate::db::{LocationRepository, ProductRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireUser;
use crate::services::cart::{self, ResolvedCart};
use crate::services::{CheckoutError, CheckoutService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Add-to-cart form.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub product_id: String,
    #[serde(default = "one")]
    pub quantity: u32,
}

const fn one() -> u32 {
    1
}

/// Quantity update form. Zero removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    pub product_id: String,
    pub quantity: u32,
}

/// Remove-line form.
#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    pub product_id: String,
}

/// Checkout form. A chosen saved address wins over the inline fields.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub address_id: String,
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub location_id: String,
    pub notes: String,
}

impl CheckoutForm {
    fn into_request(self, items: Vec<beerbro_core::models::CartLine>) -> CheckoutRequest {
        let address_id = non_blank(&self.address_id).map(AddressId::new);
        let shipping_address = address_id.is_none().then(|| AddressInput {
            label: None,
            full_name: self.full_name,
            phone: self.phone,
            line1: self.line1,
            line2: non_blank(&self.line2),
            city: self.city,
            state: self.state,
            postal_code: self.postal_code,
            is_default: false,
        });
        CheckoutRequest {
            items,
            shipping_address,
            address_id,
            location_id: non_blank(&self.location_id).map(LocationId::new),
            notes: non_blank(&self.notes),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub page: Page,
    pub cart: ResolvedCart,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/checkout.html")]
pub struct CheckoutTemplate {
    pub page: Page,
    pub cart: ResolvedCart,
    pub addresses: Vec<Address>,
    pub locations: Vec<ServiceLocation>,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Cart Routes
// =============================================================================

/// `GET /cart`.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<MessageQuery>,
) -> Result<CartTemplate> {
    let (_, resolved) = cart::resolve(&session, state.store()).await?;
    let page = Page::load(
        &state,
        &session,
        "Your cart",
        "Review the beers in your BeerBro cart.",
    )
    .await?;

    Ok(CartTemplate {
        page,
        cart: resolved,
        error: query.error,
        success: query.success,
    })
}

/// `POST /cart/add`. Quantities are clamped to 1..=99.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddForm>,
) -> Result<Response> {
    let product_id = ProductId::new(form.product_id);
    let available = ProductRepository::new(state.store())
        .get(&product_id)
        .await?
        .is_some_and(|p| p.is_active);
    if !available {
        return Ok(page::redirect_with_error("/cart", "That beer is no longer available"));
    }

    let mut cart = cart::load(&session).await?;
    cart.add(product_id, form.quantity);
    cart::save(&session, &cart).await?;
    Ok(page::redirect_with_success("/cart", "Added to cart"))
}

/// `POST /cart/update`.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateForm>) -> Result<Redirect> {
    let mut cart = cart::load(&session).await?;
    cart.update(&ProductId::new(form.product_id), form.quantity);
    cart::save(&session, &cart).await?;
    Ok(Redirect::to("/cart"))
}

/// `POST /cart/remove`.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveForm>) -> Result<Redirect> {
    let mut cart = cart::load(&session).await?;
    if cart.remove(&ProductId::new(form.product_id)) {
        cart::save(&session, &cart).await?;
    }
    Ok(Redirect::to("/cart"))
}

// =============================================================================
// Checkout Routes
// =============================================================================

/// `GET /checkout`.
#[instrument(skip_all, fields(uid = %user.uid))]
pub async fn checkout_page(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<MessageQuery>,
) -> Result<Response> {
    let (_, resolved) = cart::resolve(&session, state.store()).await?;
    if resolved.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let addresses = UserRepository::new(state.store())
        .get(&user.uid)
        .await?
        .map(|u| u.addresses)
        .unwrap_or_default();
    let locations = LocationRepository::new(state.store()).list_active().await?;
    let page = Page::load(
        &state,
        &session,
        "Checkout",
        "Choose a delivery address and place your BeerBro order.",
    )
    .await?;

    Ok(CheckoutTemplate {
        page,
        cart: resolved,
        addresses,
        locations,
        error: query.error,
        success: query.success,
    }
    .into_response())
}

/// `POST /checkout` - place the order, clear the cart, show the order.
#[instrument(skip_all, fields(uid = %user.uid))]
pub async fn place_order(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let (cart, _) = cart::resolve(&session, state.store()).await?;
    let request = form.into_request(cart.lines().to_vec());

    match CheckoutService::new(state.store())
        .place_order(&user.uid, request)
        .await
    {
        Ok(order) => {
            cart::clear(&session).await?;
            Ok(page::redirect_with_success(
                &format!("/orders/{}", order.id),
                "Thanks! Your order has been placed.",
            ))
        }
        Err(CheckoutError::Repository(e)) => Err(AppError::Database(e)),
        Err(e) => {
            tracing::info!(error = %e, "Checkout rejected");
            Ok(page::redirect_with_error("/checkout", &e.to_string()))
        }
    }
}
