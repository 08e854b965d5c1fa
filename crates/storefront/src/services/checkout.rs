//! Checkout: turn cart lines into a priced, persisted order.

use beerbro_core::models::{
    Address, Cart, CheckoutRequest, LocationError, NewOrder, Order, OrderItem, OrderTotals,
    PricingError, resolve_location,
};
use beerbro_core::{ProductId, UserId, ValidationError};
use thiserror::Error;

use crate::db::{
    DocumentStore, LocationRepository, OrderRepository, ProductRepository, RepositoryError,
    UserRepository,
};

/// Why an order could not be placed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("saved address not found")]
    AddressNotFound,

    #[error("product {0} is not available")]
    ProductUnavailable(ProductId),

    #[error("only {available} of {name} left in stock")]
    InsufficientStock { name: String, available: u32 },

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Places orders for signed-in users.
pub struct CheckoutService<'a> {
    products: ProductRepository<'a>,
    locations: LocationRepository<'a>,
    orders: OrderRepository<'a>,
    users: UserRepository<'a>,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            products: ProductRepository::new(store),
            locations: LocationRepository::new(store),
            orders: OrderRepository::new(store),
            users: UserRepository::new(store),
        }
    }

    /// Validate, price and persist an order, then decrement stock.
    ///
    /// Stock is decremented with plain merges after the order is written;
    /// there is no transaction spanning the two.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError`] describing the first check that failed.
    pub async fn place_order(
        &self,
        user_id: &UserId,
        request: CheckoutRequest,
    ) -> Result<Order, CheckoutError> {
        if request.items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        request.validate()?;

        let shipping_address = self.shipping_address(user_id, &request).await?;
        let cart = Cart::from(request.items);
        let items = self.order_items(&cart).await?;

        let locations = self.locations.list().await?;
        let location = resolve_location(
            &locations,
            request.location_id.as_ref(),
            &shipping_address.postal_code,
        )?;
        let totals = OrderTotals::compute(&items, location)?;

        let order = self
            .orders
            .create(&NewOrder {
                user_id,
                items: &items,
                totals,
                shipping_address: &shipping_address,
                location_id: &location.id,
                notes: request.notes.as_deref(),
            })
            .await?;

        for item in &items {
            self.decrement_stock(&item.product_id, item.quantity).await?;
        }

        tracing::info!(
            order_id = %order.id,
            user_id = %user_id,
            total = %order.total,
            items = order.items.len(),
            "Order placed"
        );
        Ok(order)
    }

    async fn shipping_address(
        &self,
        user_id: &UserId,
        request: &CheckoutRequest,
    ) -> Result<Address, CheckoutError> {
        if let Some(input) = &request.shipping_address {
            return Ok(input.clone().into_address());
        }
        let Some(address_id) = &request.address_id else {
            return Err(CheckoutError::AddressNotFound);
        };
        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or(CheckoutError::AddressNotFound)?;
        user.addresses
            .into_iter()
            .find(|a| &a.id == address_id)
            .ok_or(CheckoutError::AddressNotFound)
    }

    async fn order_items(&self, cart: &Cart) -> Result<Vec<OrderItem>, CheckoutError> {
        let mut items = Vec::with_capacity(cart.lines().len());
        for line in cart.lines() {
            let product = self
                .products
                .get(&line.product_id)
                .await?
                .filter(|p| p.is_active)
                .ok_or_else(|| CheckoutError::ProductUnavailable(line.product_id.clone()))?;
            if line.quantity > product.stock {
                return Err(CheckoutError::InsufficientStock {
                    name: product.name,
                    available: product.stock,
                });
            }
            items.push(OrderItem {
                product_id: product.id,
                name: product.name,
                price: product.price,
                quantity: line.quantity,
                image_url: product.image_url,
            });
        }
        Ok(items)
    }

    async fn decrement_stock(&self, id: &ProductId, quantity: u32) -> Result<(), CheckoutError> {
        match self.products.get(id).await? {
            Some(product) => {
                self.products
                    .set_stock(id, product.stock.saturating_sub(quantity))
                    .await?;
            }
            None => tracing::warn!(product_id = %id, "Product vanished before stock update"),
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::{Value, json};

    use super::*;
    use crate::db::{Collection, MemoryDocumentStore};

    async fn seeded() -> MemoryDocumentStore {
        let store = MemoryDocumentStore::new();
        store
            .set(
                Collection::Products,
                "ipa",
                json!({"name": "Hazy IPA", "price": 4.5, "stock": 10}),
            )
            .await
            .unwrap();
        store
            .set(
                Collection::Products,
                "gone",
                json!({"name": "Retired", "price": 3, "stock": 10, "isActive": false}),
            )
            .await
            .unwrap();
        store
            .set(
                Collection::Locations,
                "downtown",
                json!({
                    "name": "Downtown", "city": "Portland", "state": "OR",
                    "postalCodes": ["97201"], "deliveryFee": 5, "minOrderAmount": 8,
                    "isActive": true
                }),
            )
            .await
            .unwrap();
        store
    }

    fn request(items: Value, postal_code: &str) -> CheckoutRequest {
        serde_json::from_value(json!({
            "items": items,
            "shippingAddress": {
                "fullName": "Ada Brewer", "phone": "5550102030", "line1": "1 Hop Lane",
                "city": "Portland", "state": "OR", "postalCode": postal_code
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_place_order_prices_and_decrements_stock() {
        let store = seeded().await;
        let checkout = CheckoutService::new(&store);
        let order = checkout
            .place_order(
                &UserId::new("u1"),
                request(json!([{"productId": "ipa", "quantity": 3}]), "97201"),
            )
            .await
            .unwrap();
        assert_eq!(order.subtotal, Decimal::new(135, 1));
        assert_eq!(order.delivery_fee, Decimal::from(5));
        assert_eq!(order.total, Decimal::new(185, 1));
        assert_eq!(order.location_id.as_ref().unwrap().as_str(), "downtown");

        let ipa = ProductRepository::new(&store)
            .get(&ProductId::new("ipa"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ipa.stock, 7);
    }

    #[tokio::test]
    async fn test_rejections() {
        let store = seeded().await;
        let checkout = CheckoutService::new(&store);
        let uid = UserId::new("u1");

        let empty = checkout.place_order(&uid, request(json!([]), "97201")).await;
        assert!(matches!(empty, Err(CheckoutError::EmptyCart)));

        let inactive = checkout
            .place_order(&uid, request(json!([{"productId": "gone", "quantity": 1}]), "97201"))
            .await;
        assert!(matches!(inactive, Err(CheckoutError::ProductUnavailable(_))));

        let too_many = checkout
            .place_order(&uid, request(json!([{"productId": "ipa", "quantity": 11}]), "97201"))
            .await;
        assert!(matches!(too_many, Err(CheckoutError::InsufficientStock { available: 10, .. })));

        let unserved = checkout
            .place_order(&uid, request(json!([{"productId": "ipa", "quantity": 2}]), "10001"))
            .await;
        assert!(matches!(unserved, Err(CheckoutError::Location(_))));

        let below_min = checkout
            .place_order(&uid, request(json!([{"productId": "ipa", "quantity": 1}]), "97201"))
            .await;
        assert!(matches!(below_min, Err(CheckoutError::Pricing(_))));

        assert_eq!(store.count(Collection::Orders).await.unwrap(), 0);
    }
}
