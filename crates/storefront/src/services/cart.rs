//! Session cart.
//!
//! The cart is stored in the session as `[{productId, quantity}]`. Reading
//! it resolves each line against the catalog and drops lines whose product
//! is gone or inactive.

use rust_decimal::Decimal;
use tower_sessions::Session;

use beerbro_core::models::{Cart, Product};

use crate::db::{DocumentStore, ProductRepository, RepositoryError};
use crate::models::session_keys;

/// Errors reading or writing the session cart.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A cart line joined with its product.
#[derive(Debug, Clone)]
pub struct ResolvedLine {
    pub product: Product,
    pub quantity: u32,
}

impl ResolvedLine {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// The cart as shown to the shopper.
#[derive(Debug, Clone, Default)]
pub struct ResolvedCart {
    pub lines: Vec<ResolvedLine>,
}

impl ResolvedCart {
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(ResolvedLine::line_total).sum()
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Load the raw cart from the session.
///
/// # Errors
///
/// Returns `CartError::Session` if the session store fails.
pub async fn load(session: &Session) -> Result<Cart, CartError> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Store the cart in the session.
///
/// # Errors
///
/// Returns `CartError::Session` if the session store fails.
pub async fn save(session: &Session, cart: &Cart) -> Result<(), CartError> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns `CartError::Session` if the session store fails.
pub async fn clear(session: &Session) -> Result<(), CartError> {
    session.remove::<Cart>(session_keys::CART).await?;
    Ok(())
}

/// Load the cart and join it with the catalog.
///
/// Lines for missing or inactive products are dropped from the session.
///
/// # Errors
///
/// Returns `CartError` if the session or the store fails.
pub async fn resolve(
    session: &Session,
    store: &dyn DocumentStore,
) -> Result<(Cart, ResolvedCart), CartError> {
    let mut cart = load(session).await?;
    let products = ProductRepository::new(store);

    let mut resolved = ResolvedCart::default();
    for line in cart.lines() {
        if let Some(product) = products.get(&line.product_id).await?.filter(|p| p.is_active) {
            resolved.lines.push(ResolvedLine {
                product,
                quantity: line.quantity,
            });
        }
    }

    if resolved.lines.len() != cart.lines().len() {
        cart.retain(|line| resolved.lines.iter().any(|r| r.product.id == line.product_id));
        save(session, &cart).await?;
    }
    Ok((cart, resolved))
}
