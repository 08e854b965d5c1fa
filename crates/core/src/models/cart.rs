//! Session cart.
//!
//! The cart only holds product references and quantities. Prices and names
//! are looked up again whenever the cart is shown or checked out.

use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Largest quantity a single cart line may hold.
pub const MAX_QUANTITY: u32 = 99;

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// The cart stored in the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

/// Clamp a requested quantity into `1..=MAX_QUANTITY`.
#[must_use]
pub fn clamp_quantity(quantity: u32) -> u32 {
    quantity.clamp(1, MAX_QUANTITY)
}

impl Cart {
    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Add `quantity` of a product, merging with an existing line.
    pub fn add(&mut self, product_id: ProductId, quantity: u32) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = clamp_quantity(line.quantity.saturating_add(quantity));
        } else {
            self.lines.push(CartLine {
                product_id,
                quantity: clamp_quantity(quantity),
            });
        }
    }

    /// Set the quantity of a line. Zero removes it.
    pub fn update(&mut self, product_id: &ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| &l.product_id == product_id) {
            line.quantity = clamp_quantity(quantity);
        }
    }

    /// Remove a line. Returns whether it was present.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.product_id != product_id);
        self.lines.len() != before
    }

    /// Keep only lines for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&CartLine) -> bool) {
        self.lines.retain(keep);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl From<Vec<CartLine>> for Cart {
    fn from(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::default();
        for line in lines.into_iter().filter(|l| l.quantity > 0) {
            cart.add(line.product_id, line.quantity);
        }
        cart
    }
}
