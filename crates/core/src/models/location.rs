//! Service locations: the areas the shop delivers to.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::product::decimal_json;
use crate::types::LocationId;
use crate::validation::{self, ValidationError, ValidationResult, normalize_postal_code};

/// A delivery area with its fee and minimum order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLocation {
    pub id: LocationId,
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_codes: Vec<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub delivery_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float", default)]
    pub min_order_amount: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

impl ServiceLocation {
    /// Whether this location delivers to `postal_code`.
    #[must_use]
    pub fn serves(&self, postal_code: &str) -> bool {
        let wanted = normalize_postal_code(postal_code);
        self.postal_codes
            .iter()
            .any(|code| normalize_postal_code(code) == wanted)
    }
}

/// Why a delivery location could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    /// The requested location does not exist or is inactive.
    #[error("service location is not available")]
    Unavailable,
    /// No active location serves the postal code.
    #[error("delivery is not available for postal code {0}")]
    NotServed(String),
}

/// Pick the location for an order.
///
/// An explicit `location_id` must name an active location. Otherwise the
/// first active location serving the postal code wins.
///
/// # Errors
///
/// Returns [`LocationError`] when nothing matches.
pub fn resolve_location<'a>(
    locations: &'a [ServiceLocation],
    location_id: Option<&LocationId>,
    postal_code: &str,
) -> Result<&'a ServiceLocation, LocationError> {
    if let Some(id) = location_id {
        return locations
            .iter()
            .find(|l| &l.id == id && l.is_active)
            .ok_or(LocationError::Unavailable);
    }
    locations
        .iter()
        .find(|l| l.is_active && l.serves(postal_code))
        .ok_or_else(|| LocationError::NotServed(postal_code.trim().to_owned()))
}

/// Body of `POST /api/admin/locations`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInput {
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub postal_codes: Vec<String>,
    pub delivery_fee: Decimal,
    #[serde(default)]
    pub min_order_amount: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl LocationInput {
    /// Check field rules.
    ///
    /// # Errors
    ///
    /// Returns the first field that breaks a rule.
    pub fn validate(&self) -> ValidationResult {
        validation::required("name", &self.name, 80)?;
        validation::required("city", &self.city, 80)?;
        validation::max_len("state", &self.state, 80)?;
        validate_codes(&self.postal_codes)?;
        validation::non_negative("deliveryFee", self.delivery_fee)?;
        validation::non_negative("minOrderAmount", self.min_order_amount)
    }

    /// Canonical document body.
    #[must_use]
    pub fn to_document(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "city": self.city.trim(),
            "state": self.state.trim(),
            "postalCodes": clean_codes(&self.postal_codes),
            "deliveryFee": decimal_json(self.delivery_fee),
            "minOrderAmount": decimal_json(self.min_order_amount),
            "isActive": self.is_active,
        })
    }
}

/// Body of `PATCH /api/admin/locations/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPatch {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_codes: Option<Vec<String>>,
    pub delivery_fee: Option<Decimal>,
    pub min_order_amount: Option<Decimal>,
    pub is_active: Option<bool>,
}

impl LocationPatch {
    /// Check field rules for the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns the first field that breaks a rule.
    pub fn validate(&self) -> ValidationResult {
        if let Some(name) = &self.name {
            validation::required("name", name, 80)?;
        }
        if let Some(city) = &self.city {
            validation::required("city", city, 80)?;
        }
        if let Some(codes) = &self.postal_codes {
            validate_codes(codes)?;
        }
        if let Some(fee) = self.delivery_fee {
            validation::non_negative("deliveryFee", fee)?;
        }
        if let Some(min) = self.min_order_amount {
            validation::non_negative("minOrderAmount", min)?;
        }
        Ok(())
    }

    /// Partial document for the present fields.
    #[must_use]
    pub fn to_patch(&self) -> Value {
        let mut patch = Map::new();
        if let Some(v) = &self.name {
            patch.insert("name".into(), json!(v.trim()));
        }
        if let Some(v) = &self.city {
            patch.insert("city".into(), json!(v.trim()));
        }
        if let Some(v) = &self.state {
            patch.insert("state".into(), json!(v.trim()));
        }
        if let Some(v) = &self.postal_codes {
            patch.insert("postalCodes".into(), json!(clean_codes(v)));
        }
        if let Some(v) = self.delivery_fee {
            patch.insert("deliveryFee".into(), decimal_json(v));
        }
        if let Some(v) = self.min_order_amount {
            patch.insert("minOrderAmount".into(), decimal_json(v));
        }
        if let Some(v) = self.is_active {
            patch.insert("isActive".into(), json!(v));
        }
        Value::Object(patch)
    }
}

fn validate_codes(codes: &[String]) -> ValidationResult {
    if codes.iter().all(|c| c.trim().is_empty()) {
        return Err(ValidationError::new(
            "postalCodes",
            "at least one postal code is required",
        ));
    }
    codes
        .iter()
        .filter(|c| !c.trim().is_empty())
        .try_for_each(|c| validation::postal_code("postalCodes", c))
}

fn clean_codes(codes: &[String]) -> Vec<String> {
    let mut cleaned: Vec<String> = codes
        .iter()
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .collect();
    cleaned.dedup();
    cleaned
}
