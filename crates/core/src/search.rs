//! Product search and catalog filtering.
//!
//! Search is a plain case-insensitive substring match over every product.
//! The catalog is small enough that there is no index.

use serde::Deserialize;

use crate::models::Product;

/// Whether `product` matches an already-lowercased, non-empty `needle`.
fn matches(product: &Product, needle: &str) -> bool {
    [
        product.name.as_str(),
        product.description.as_str(),
        product.category.as_str(),
        product.brand.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Active products whose name, description, category or brand contains
/// `query`. A blank query matches nothing. Input order is kept.
#[must_use]
pub fn search(products: Vec<Product>, query: &str) -> Vec<Product> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    products
        .into_iter()
        .filter(|p| p.is_active && matches(p, &needle))
        .collect()
}

/// Query string of `GET /api/products` and the products page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub limit: Option<usize>,
}

impl ProductQuery {
    /// Filter a storefront listing. Filters compose; inactive products are
    /// always dropped.
    #[must_use]
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        let mut products = match self.search.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => search(products, q),
            _ => products.into_iter().filter(|p| p.is_active).collect(),
        };
        if let Some(category) = self.category.as_deref().filter(|c| !c.trim().is_empty()) {
            products.retain(|p| p.in_category(category));
        }
        if let Some(featured) = self.featured {
            products.retain(|p| p.featured == featured);
        }
        if let Some(limit) = self.limit {
            products.truncate(limit);
        }
        products
    }
}
