//! Admin dashboard aggregates.

use rust_decimal::Decimal;
use serde::Serialize;

use super::location::ServiceLocation;
use super::order::Order;
use super::product::Product;
use crate::types::OrderStatus;

/// Number of orders shown on the dashboard.
pub const RECENT_ORDERS: usize = 5;

/// Dashboard numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_products: usize,
    pub active_products: usize,
    pub total_orders: usize,
    pub pending_orders: usize,
    pub total_users: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    pub low_stock_products: usize,
    pub active_locations: usize,
    pub recent_orders: Vec<Order>,
}

impl AdminStats {
    /// Aggregate over full collections.
    ///
    /// `orders` must be newest first. Revenue counts every order that was
    /// not cancelled. Low stock only counts active products.
    #[must_use]
    pub fn compute(
        products: &[Product],
        orders: &[Order],
        total_users: usize,
        locations: &[ServiceLocation],
        low_stock_threshold: u32,
    ) -> Self {
        Self {
            total_products: products.len(),
            active_products: products.iter().filter(|p| p.is_active).count(),
            total_orders: orders.len(),
            pending_orders: orders
                .iter()
                .filter(|o| o.status == OrderStatus::Pending)
                .count(),
            total_users,
            total_revenue: orders
                .iter()
                .filter(|o| o.status.counts_as_revenue())
                .map(|o| o.total)
                .sum(),
            low_stock_products: products
                .iter()
                .filter(|p| p.is_active && p.is_low_stock(low_stock_threshold))
                .count(),
            active_locations: locations.iter().filter(|l| l.is_active).count(),
            recent_orders: orders.iter().take(RECENT_ORDERS).cloned().collect(),
        }
    }
}
