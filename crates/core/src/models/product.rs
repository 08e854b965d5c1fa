//! Products and the tolerant product read path.
//!
//! Catalog documents were written by several generations of admin tooling and
//! seed scripts, so the same fact can live under different keys (`imageUrl`
//! vs `image`, `stock` vs `stockQuantity`, prices as numbers or strings).
//! [`Product::normalize`] folds all of them into one shape. Writes always use
//! the canonical keys produced by [`ProductInput::to_document`].

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::types::ProductId;
use crate::validation::{self, ValidationError, ValidationResult};

const MAX_NAME: usize = 120;
const MAX_DESCRIPTION: usize = 4000;
const MAX_LABEL: usize = 80;

/// Fallback name for documents that carry none.
pub const UNTITLED: &str = "Untitled";
/// Fallback category for documents that carry none.
pub const UNCATEGORIZED: &str = "Uncategorized";

// Canonical key first, then the legacy aliases read in order.
const NAME_KEYS: &[&str] = &["name", "title"];
const DESCRIPTION_KEYS: &[&str] = &["description", "desc"];
const PRICE_KEYS: &[&str] = &["price", "unitPrice"];
const CATEGORY_KEYS: &[&str] = &["category", "categoryName", "type"];
const BRAND_KEYS: &[&str] = &["brand", "brewery"];
const IMAGE_KEYS: &[&str] = &["imageUrl", "image", "images", "thumbnail"];
const STOCK_KEYS: &[&str] = &["stock", "stockQuantity", "quantity", "inventory"];
const ABV_KEYS: &[&str] = &["abv", "alcoholContent", "alcohol"];
const VOLUME_KEYS: &[&str] = &["volumeMl", "volume", "size"];
const ACTIVE_KEYS: &[&str] = &["isActive", "active"];
const FEATURED_KEYS: &[&str] = &["featured", "isFeatured"];

/// A catalog product, normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub category: String,
    pub brand: String,
    pub image_url: Option<String>,
    pub stock: u32,
    /// Alcohol by volume, in percent.
    #[serde(with = "rust_decimal::serde::float_option", default)]
    pub abv: Option<Decimal>,
    pub volume_ml: Option<u32>,
    pub is_active: bool,
    pub featured: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Build a product from a raw catalog document, tolerating legacy keys.
    ///
    /// Never fails: missing or malformed values fall back to defaults.
    #[must_use]
    pub fn normalize(id: ProductId, data: &Value) -> Self {
        let empty = Map::new();
        let fields = data.as_object().unwrap_or(&empty);

        Self {
            id,
            name: first_string(fields, NAME_KEYS).unwrap_or_else(|| UNTITLED.to_owned()),
            description: first_string(fields, DESCRIPTION_KEYS).unwrap_or_default(),
            price: first_decimal(fields, PRICE_KEYS)
                .filter(|p| !p.is_sign_negative())
                .unwrap_or(Decimal::ZERO),
            category: first_string(fields, CATEGORY_KEYS)
                .unwrap_or_else(|| UNCATEGORIZED.to_owned()),
            brand: first_string(fields, BRAND_KEYS).unwrap_or_default(),
            image_url: image_of(fields),
            stock: first_integer(fields, STOCK_KEYS).map_or(0, clamp_u32),
            abv: first_decimal(fields, ABV_KEYS),
            volume_ml: first_integer(fields, VOLUME_KEYS)
                .filter(|v| *v > 0)
                .map(clamp_u32),
            is_active: first_bool(fields, ACTIVE_KEYS).unwrap_or(true),
            featured: first_bool(fields, FEATURED_KEYS).unwrap_or(false),
            created_at: None,
            updated_at: None,
        }
    }

    /// Attach document timestamps.
    #[must_use]
    pub fn with_timestamps(
        mut self,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        self.created_at = Some(created_at);
        self.updated_at = Some(updated_at);
        self
    }

    /// Whether at least one unit can be ordered.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Whether stock is below the restock threshold.
    #[must_use]
    pub const fn is_low_stock(&self, threshold: u32) -> bool {
        self.stock < threshold
    }

    /// Case-insensitive category comparison.
    #[must_use]
    pub fn in_category(&self, category: &str) -> bool {
        self.category.eq_ignore_ascii_case(category.trim())
    }
}

fn clamp_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

fn non_empty(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

fn first_string(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| fields.get(*key).and_then(non_empty))
        .map(str::to_owned)
}

fn image_of(fields: &Map<String, Value>) -> Option<String> {
    first_string(fields, &IMAGE_KEYS[..2])
        .or_else(|| {
            fields
                .get(IMAGE_KEYS[2])
                .and_then(Value::as_array)
                .and_then(|images| images.iter().find_map(non_empty))
                .map(str::to_owned)
        })
        .or_else(|| first_string(fields, &IMAGE_KEYS[3..]))
}

/// Parse numbers written as `12.5`, `"12.5"`, `"$12.50"`, `"4.5%"` or `"330 ml"`.
fn parse_decimal_text(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%' || c.is_whitespace())
        .trim_start_matches(|c: char| !(c.is_ascii_digit() || c == '-' || c == '.'))
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

fn decimal_of(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal_text(&n.to_string()),
        Value::String(s) => parse_decimal_text(s),
        _ => None,
    }
}

fn first_decimal(fields: &Map<String, Value>, keys: &[&str]) -> Option<Decimal> {
    keys.iter().find_map(|key| fields.get(*key).and_then(decimal_of))
}

fn first_integer(fields: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| {
        let value = fields.get(*key)?;
        if let Some(n) = value.as_i64() {
            return Some(n);
        }
        decimal_of(value).and_then(|d| d.trunc().to_i64())
    })
}

fn first_bool(fields: &Map<String, Value>, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|key| match fields.get(*key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    })
}

// =============================================================================
// Write-side request bodies
// =============================================================================

/// Body of `POST /api/products`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub category: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub abv: Option<Decimal>,
    #[serde(default)]
    pub volume_ml: Option<u32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub featured: bool,
}

const fn default_true() -> bool {
    true
}

impl ProductInput {
    /// Check field rules.
    ///
    /// # Errors
    ///
    /// Returns the first field that breaks a rule.
    pub fn validate(&self) -> ValidationResult {
        validation::required("name", &self.name, MAX_NAME)?;
        validation::max_len("description", &self.description, MAX_DESCRIPTION)?;
        validation::non_negative("price", self.price)?;
        validation::required("category", &self.category, MAX_LABEL)?;
        validation::max_len("brand", &self.brand, MAX_LABEL)?;
        validation::image_url("imageUrl", self.image_url.as_deref())?;
        validate_abv(self.abv)?;
        Ok(())
    }

    /// Canonical document body.
    #[must_use]
    pub fn to_document(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "description": self.description.trim(),
            "price": decimal_json(self.price),
            "category": self.category.trim(),
            "brand": self.brand.trim(),
            "imageUrl": self.image_url.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            "stock": self.stock,
            "abv": self.abv.map(decimal_json),
            "volumeMl": self.volume_ml,
            "isActive": self.is_active,
            "featured": self.featured,
        })
    }
}

/// Body of `PATCH /api/products/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub stock: Option<u32>,
    pub abv: Option<Decimal>,
    pub volume_ml: Option<u32>,
    pub is_active: Option<bool>,
    pub featured: Option<bool>,
}

impl ProductPatch {
    /// Check field rules for the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns the first field that breaks a rule.
    pub fn validate(&self) -> ValidationResult {
        if let Some(name) = &self.name {
            validation::required("name", name, MAX_NAME)?;
        }
        validation::optional_max_len("description", self.description.as_deref(), MAX_DESCRIPTION)?;
        if let Some(price) = self.price {
            validation::non_negative("price", price)?;
        }
        if let Some(category) = &self.category {
            validation::required("category", category, MAX_LABEL)?;
        }
        validation::optional_max_len("brand", self.brand.as_deref(), MAX_LABEL)?;
        validation::image_url("imageUrl", self.image_url.as_deref())?;
        validate_abv(self.abv)?;
        if self.is_empty() {
            return Err(ValidationError::new("body", "no fields to update"));
        }
        Ok(())
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.brand.is_none()
            && self.image_url.is_none()
            && self.stock.is_none()
            && self.abv.is_none()
            && self.volume_ml.is_none()
            && self.is_active.is_none()
            && self.featured.is_none()
    }

    /// Partial document with canonical keys for the present fields only.
    ///
    /// Each written field also nulls its legacy aliases, so a cleared
    /// canonical value is not shadowed by an older key on read.
    #[must_use]
    pub fn to_patch(&self) -> Value {
        let mut patch = Map::new();
        let mut put = |keys: &[&str], value: Value| {
            if let Some((canonical, aliases)) = keys.split_first() {
                for alias in aliases {
                    patch.insert((*alias).to_owned(), Value::Null);
                }
                patch.insert((*canonical).to_owned(), value);
            }
        };
        if let Some(v) = &self.name {
            put(NAME_KEYS, json!(v.trim()));
        }
        if let Some(v) = &self.description {
            put(DESCRIPTION_KEYS, json!(v.trim()));
        }
        if let Some(v) = self.price {
            put(PRICE_KEYS, decimal_json(v));
        }
        if let Some(v) = &self.category {
            put(CATEGORY_KEYS, json!(v.trim()));
        }
        if let Some(v) = &self.brand {
            put(BRAND_KEYS, json!(v.trim()));
        }
        if let Some(v) = &self.image_url {
            let trimmed = v.trim();
            put(
                IMAGE_KEYS,
                if trimmed.is_empty() { Value::Null } else { json!(trimmed) },
            );
        }
        if let Some(v) = self.stock {
            put(STOCK_KEYS, json!(v));
        }
        if let Some(v) = self.abv {
            put(ABV_KEYS, decimal_json(v));
        }
        if let Some(v) = self.volume_ml {
            put(VOLUME_KEYS, json!(v));
        }
        if let Some(v) = self.is_active {
            put(ACTIVE_KEYS, json!(v));
        }
        if let Some(v) = self.featured {
            put(FEATURED_KEYS, json!(v));
        }
        Value::Object(patch)
    }
}

fn validate_abv(abv: Option<Decimal>) -> ValidationResult {
    match abv {
        Some(v) if v.is_sign_negative() || v > Decimal::from(100) => {
            Err(ValidationError::new("abv", "must be between 0 and 100"))
        }
        _ => Ok(()),
    }
}

/// Decimal as a JSON number, matching how the catalog stores amounts.
#[must_use]
pub fn decimal_json(value: Decimal) -> Value {
    serde_json::Number::from_str(&value.normalize().to_string())
        .map_or_else(|_| json!(value.to_string()), Value::Number)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(data: &Value) -> Product {
        Product::normalize(ProductId::new("p1"), data)
    }

    #[test]
    fn test_normalize_canonical_document() {
        let p = product(&json!({
            "name": "Hazy IPA",
            "description": "Juicy",
            "price": 4.5,
            "category": "IPA",
            "brand": "Hop Co",
            "imageUrl": "https://cdn.example.com/ipa.png",
            "stock": 24,
            "abv": 6.5,
            "volumeMl": 330,
            "isActive": true,
            "featured": true
        }));
        assert_eq!(p.name, "Hazy IPA");
        assert_eq!(p.price, Decimal::new(45, 1));
        assert_eq!(p.image_url.as_deref(), Some("https://cdn.example.com/ipa.png"));
        assert_eq!(p.stock, 24);
        assert_eq!(p.abv, Some(Decimal::new(65, 1)));
        assert_eq!(p.volume_ml, Some(330));
        assert!(p.featured);
    }

    #[test]
    fn test_normalize_legacy_keys() {
        let p = product(&json!({
            "title": "Old Stout",
            "unitPrice": "$7.25",
            "categoryName": "Stout",
            "brewery": "Dark Works",
            "image": "",
            "images": ["", "/static/stout.png"],
            "stockQuantity": "12",
            "alcoholContent": "8%",
            "volume": "500 ml",
            "active": "false"
        }));
        assert_eq!(p.name, "Old Stout");
        assert_eq!(p.price, Decimal::new(725, 2));
        assert_eq!(p.category, "Stout");
        assert_eq!(p.brand, "Dark Works");
        assert_eq!(p.image_url.as_deref(), Some("/static/stout.png"));
        assert_eq!(p.stock, 12);
        assert_eq!(p.abv, Some(Decimal::from(8)));
        assert_eq!(p.volume_ml, Some(500));
        assert!(!p.is_active);
    }

    #[test]
    fn test_normalize_defaults_for_empty_document() {
        let p = product(&json!({}));
        assert_eq!(p.name, UNTITLED);
        assert_eq!(p.category, UNCATEGORIZED);
        assert_eq!(p.price, Decimal::ZERO);
        assert_eq!(p.stock, 0);
        assert!(p.is_active);
        assert!(!p.featured);
        assert!(p.image_url.is_none());
    }

    #[test]
    fn test_normalize_clamps_negative_values() {
        let p = product(&json!({"stock": -3, "price": -1}));
        assert_eq!(p.stock, 0);
        assert_eq!(p.price, Decimal::ZERO);
    }

    #[test]
    fn test_stock_prefers_first_key_present() {
        let p = product(&json!({"stock": 2, "stockQuantity": 50}));
        assert_eq!(p.stock, 2);
        let p = product(&json!({"inventory": 9.9}));
        assert_eq!(p.stock, 9);
    }

    #[test]
    fn test_input_validation() {
        let mut input: ProductInput = serde_json::from_value(json!({
            "name": "Pils",
            "price": 3,
            "category": "Lager"
        }))
        .unwrap();
        assert!(input.validate().is_ok());
        assert!(input.is_active);

        input.price = Decimal::new(-1, 0);
        assert_eq!(input.validate().unwrap_err().field, "price");

        input.price = Decimal::ONE;
        input.abv = Some(Decimal::from(120));
        assert_eq!(input.validate().unwrap_err().field, "abv");
    }

    #[test]
    fn test_input_document_round_trips_through_normalize() {
        let input: ProductInput = serde_json::from_value(json!({
            "name": " Pils ",
            "price": "3.50",
            "category": "Lager",
            "stock": 10
        }))
        .unwrap();
        let p = product(&input.to_document());
        assert_eq!(p.name, "Pils");
        assert_eq!(p.price, Decimal::new(35, 1));
        assert_eq!(p.stock, 10);
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let patch: ProductPatch = serde_json::from_value(json!({"stock": 5, "imageUrl": ""})).unwrap();
        assert!(patch.validate().is_ok());
        let body = patch.to_patch();
        assert_eq!(body["stock"], json!(5));
        assert_eq!(body["imageUrl"], Value::Null);
        assert_eq!(body["stockQuantity"], Value::Null);
        assert_eq!(body["thumbnail"], Value::Null);
        assert!(body.get("name").is_none());
    }

    #[test]
    fn test_empty_patch_is_rejected() {
        let patch = ProductPatch::default();
        assert_eq!(patch.validate().unwrap_err().field, "body");
    }

    #[test]
    fn test_serializes_prices_as_numbers() {
        let p = product(&json!({"name": "A", "price": 2.5}));
        let out = serde_json::to_value(&p).unwrap();
        assert_eq!(out["price"], json!(2.5));
        assert_eq!(out["isActive"], json!(true));
    }
}
