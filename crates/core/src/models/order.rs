//! Orders, order pricing and status changes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::address::{Address, AddressInput};
use super::cart::{CartLine, MAX_QUANTITY};
use super::location::ServiceLocation;
use super::product::decimal_json;
use crate::types::{AddressId, LocationId, OrderId, OrderStatus, PaymentMethod, ProductId, UserId};
use crate::validation::{self, ValidationError, ValidationResult};

/// Maximum length of checkout notes.
pub const MAX_NOTES: usize = 500;

/// A product line frozen at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl OrderItem {
    /// `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub delivery_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    pub shipping_address: Address,
    #[serde(default)]
    pub location_id: Option<LocationId>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Whether `user_id` placed this order.
    #[must_use]
    pub fn belongs_to(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}

/// Money breakdown of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

/// Why an order cannot be priced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("order has no items")]
    Empty,
    #[error("minimum order amount for {location} is {minimum}")]
    BelowMinimum { location: String, minimum: Decimal },
}

impl OrderTotals {
    /// Price `items` for delivery from `location`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError`] for an empty order or a subtotal below the
    /// location minimum.
    pub fn compute(items: &[OrderItem], location: &ServiceLocation) -> Result<Self, PricingError> {
        if items.is_empty() {
            return Err(PricingError::Empty);
        }
        let subtotal: Decimal = items.iter().map(OrderItem::line_total).sum();
        if subtotal < location.min_order_amount {
            return Err(PricingError::BelowMinimum {
                location: location.name.clone(),
                minimum: location.min_order_amount.round_dp(2),
            });
        }
        Ok(Self {
            subtotal,
            delivery_fee: location.delivery_fee,
            total: subtotal + location.delivery_fee,
        })
    }
}

/// Everything needed to write a new order document.
#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    pub user_id: &'a UserId,
    pub items: &'a [OrderItem],
    pub totals: OrderTotals,
    pub shipping_address: &'a Address,
    pub location_id: &'a LocationId,
    pub notes: Option<&'a str>,
}

impl NewOrder<'_> {
    /// Canonical document body. New orders are always pending and cash on delivery.
    #[must_use]
    pub fn to_document(&self) -> Value {
        json!({
            "userId": self.user_id,
            "items": self.items,
            "subtotal": decimal_json(self.totals.subtotal),
            "deliveryFee": decimal_json(self.totals.delivery_fee),
            "total": decimal_json(self.totals.total),
            "status": OrderStatus::Pending,
            "shippingAddress": self.shipping_address,
            "locationId": self.location_id,
            "paymentMethod": PaymentMethod::CashOnDelivery,
            "notes": self.notes.map(str::trim).filter(|n| !n.is_empty()),
        })
    }
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<CartLine>,
    /// Inline shipping address.
    #[serde(default)]
    pub shipping_address: Option<AddressInput>,
    /// A saved address on the user profile.
    #[serde(default)]
    pub address_id: Option<AddressId>,
    #[serde(default)]
    pub location_id: Option<LocationId>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CheckoutRequest {
    /// Check the shape of the request. Stock and pricing are checked later.
    ///
    /// # Errors
    ///
    /// Returns the first field that breaks a rule.
    pub fn validate(&self) -> ValidationResult {
        if self.items.is_empty() {
            return Err(ValidationError::new("items", "cart is empty"));
        }
        if self.items.iter().any(|line| line.quantity == 0) {
            return Err(ValidationError::new("items", "quantity must be at least 1"));
        }
        if self.items.iter().any(|line| line.quantity > MAX_QUANTITY) {
            return Err(ValidationError::new(
                "items",
                format!("quantity cannot exceed {MAX_QUANTITY}"),
            ));
        }
        match (&self.shipping_address, &self.address_id) {
            (Some(address), _) => address.validate()?,
            (None, Some(_)) => {}
            (None, None) => {
                return Err(ValidationError::new(
                    "shippingAddress",
                    "a shipping address or addressId is required",
                ));
            }
        }
        validation::optional_max_len("notes", self.notes.as_deref(), MAX_NOTES)
    }
}

/// Body of `PATCH /api/orders/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusPatch {
    pub status: OrderStatus,
}

impl OrderStatusPatch {
    /// Check the transition from `current`.
    ///
    /// # Errors
    ///
    /// Returns an error when `current` is terminal and the status changes.
    pub fn check(&self, current: OrderStatus) -> ValidationResult {
        if current.can_transition_to(self.status) {
            Ok(())
        } else {
            Err(ValidationError::new(
                "status",
                format!(
                    "order is {} and cannot be changed to {}",
                    current.as_str(),
                    self.status.as_str()
                ),
            ))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(price: Decimal, quantity: u32) -> OrderItem {
        OrderItem {
            product_id: ProductId::new("p1"),
            name: "Hazy IPA".to_owned(),
            price,
            quantity,
            image_url: None,
        }
    }

    fn location(fee: Decimal, min: Decimal) -> ServiceLocation {
        ServiceLocation {
            id: LocationId::new("loc"),
            name: "Downtown".to_owned(),
            city: "Portland".to_owned(),
            state: "OR".to_owned(),
            postal_codes: vec!["97201".to_owned()],
            delivery_fee: fee,
            min_order_amount: min,
            is_active: true,
        }
    }

    #[test]
    fn test_totals() {
        let items = [item(Decimal::new(450, 2), 2), item(Decimal::new(1299, 2), 1)];
        let totals = OrderTotals::compute(&items, &location(Decimal::new(500, 2), Decimal::from(10)))
            .unwrap();
        assert_eq!(totals.subtotal, Decimal::new(2199, 2));
        assert_eq!(totals.delivery_fee, Decimal::new(500, 2));
        assert_eq!(totals.total, Decimal::new(2699, 2));
    }

    #[test]
    fn test_below_minimum() {
        let items = [item(Decimal::new(450, 2), 1)];
        let err = OrderTotals::compute(&items, &location(Decimal::ZERO, Decimal::from(20)))
            .unwrap_err();
        assert_eq!(err.to_string(), "minimum order amount for Downtown is 20");
    }

    #[test]
    fn test_empty_order() {
        assert_eq!(
            OrderTotals::compute(&[], &location(Decimal::ZERO, Decimal::ZERO)),
            Err(PricingError::Empty)
        );
    }

    #[test]
    fn test_terminal_status_is_locked() {
        let to_confirmed = OrderStatusPatch {
            status: OrderStatus::Confirmed,
        };
        assert!(to_confirmed.check(OrderStatus::Pending).is_ok());
        assert!(to_confirmed.check(OrderStatus::Delivered).is_err());
        assert!(to_confirmed.check(OrderStatus::Cancelled).is_err());

        let same = OrderStatusPatch {
            status: OrderStatus::Delivered,
        };
        assert!(same.check(OrderStatus::Delivered).is_ok());
    }

    #[test]
    fn test_checkout_request_needs_address() {
        let request: CheckoutRequest = serde_json::from_value(json!({
            "items": [{"productId": "p1", "quantity": 1}]
        }))
        .unwrap();
        assert_eq!(request.validate().unwrap_err().field, "shippingAddress");

        let saved: CheckoutRequest = serde_json::from_value(json!({
            "items": [{"productId": "p1", "quantity": 1}],
            "addressId": "a1"
        }))
        .unwrap();
        assert!(saved.validate().is_ok());
    }

    #[test]
    fn test_checkout_request_rejects_oversized_quantity() {
        let request: CheckoutRequest = serde_json::from_value(json!({
            "items": [{"productId": "p1", "quantity": 150}],
            "addressId": "a1"
        }))
        .unwrap();
        assert_eq!(request.validate().unwrap_err().field, "items");
    }

    #[test]
    fn test_new_order_document() {
        let items = [item(Decimal::new(450, 2), 2)];
        let totals = OrderTotals::compute(&items, &location(Decimal::ONE, Decimal::ZERO)).unwrap();
        let address: Address = serde_json::from_value(json!({
            "id": "a1",
            "fullName": "Ada Brewer",
            "phone": "5550102030",
            "line1": "1 Hop Lane",
            "city": "Portland",
            "state": "OR",
            "postalCode": "97201"
        }))
        .unwrap();
        let user_id = UserId::new("u1");
        let location_id = LocationId::new("loc");
        let doc = NewOrder {
            user_id: &user_id,
            items: &items,
            totals,
            shipping_address: &address,
            location_id: &location_id,
            notes: Some("  "),
        }
        .to_document();
        assert_eq!(doc["status"], json!("pending"));
        assert_eq!(doc["paymentMethod"], json!("cash_on_delivery"));
        assert_eq!(doc["total"], json!(10));
        assert_eq!(doc["items"][0]["price"], json!(4.5));
        assert!(doc["notes"].is_null());
    }
}
