//! Saved delivery addresses.

use serde::{Deserialize, Serialize};

use crate::types::AddressId;
use crate::validation::{self, ValidationResult};

/// A delivery address saved on a user profile or snapshotted on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    #[serde(default)]
    pub label: Option<String>,
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    /// One-line rendering for order summaries.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.line1.as_str()];
        if let Some(line2) = self.line2.as_deref().filter(|l| !l.is_empty()) {
            parts.push(line2);
        }
        parts.push(&self.city);
        format!("{}, {} {}", parts.join(", "), self.state, self.postal_code)
    }
}

/// Body for adding an address, and the inline address at checkout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(default)]
    pub label: Option<String>,
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default)]
    pub is_default: bool,
}

impl AddressInput {
    /// Check field rules.
    ///
    /// # Errors
    ///
    /// Returns the first field that breaks a rule.
    pub fn validate(&self) -> ValidationResult {
        validation::optional_max_len("label", self.label.as_deref(), 40)?;
        validation::required("fullName", &self.full_name, 100)?;
        validation::phone("phone", &self.phone)?;
        validation::required("line1", &self.line1, 200)?;
        validation::optional_max_len("line2", self.line2.as_deref(), 200)?;
        validation::required("city", &self.city, 80)?;
        validation::required("state", &self.state, 80)?;
        validation::postal_code("postalCode", &self.postal_code)
    }

    /// Build the stored address under a fresh ID.
    #[must_use]
    pub fn into_address(self) -> Address {
        Address {
            id: AddressId::generate(),
            label: trimmed(self.label),
            full_name: self.full_name.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            line1: self.line1.trim().to_owned(),
            line2: trimmed(self.line2),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_owned(),
            postal_code: self.postal_code.trim().to_owned(),
            is_default: self.is_default,
        }
    }
}

/// Body of `PATCH /api/users/{uid}/addresses/{addressId}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPatch {
    pub label: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub is_default: Option<bool>,
}

impl AddressPatch {
    /// Apply the present fields and re-validate the resulting address.
    ///
    /// # Errors
    ///
    /// Returns the first field of the merged address that breaks a rule.
    pub fn apply(self, address: &Address) -> Result<Address, validation::ValidationError> {
        let merged = AddressInput {
            label: self.label.or_else(|| address.label.clone()),
            full_name: self.full_name.unwrap_or_else(|| address.full_name.clone()),
            phone: self.phone.unwrap_or_else(|| address.phone.clone()),
            line1: self.line1.unwrap_or_else(|| address.line1.clone()),
            line2: self.line2.or_else(|| address.line2.clone()),
            city: self.city.unwrap_or_else(|| address.city.clone()),
            state: self.state.unwrap_or_else(|| address.state.clone()),
            postal_code: self.postal_code.unwrap_or_else(|| address.postal_code.clone()),
            is_default: self.is_default.unwrap_or(address.is_default),
        };
        merged.validate()?;
        let mut updated = merged.into_address();
        updated.id = address.id.clone();
        Ok(updated)
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Make `default_id` the only default address, or keep exactly one default
/// when `default_id` is `None` (the first address wins).
pub fn settle_default(addresses: &mut [Address], default_id: Option<&AddressId>) {
    let chosen = default_id.cloned().or_else(|| {
        addresses
            .iter()
            .find(|a| a.is_default)
            .or_else(|| addresses.first())
            .map(|a| a.id.clone())
    });
    for address in addresses.iter_mut() {
        address.is_default = chosen.as_ref() == Some(&address.id);
    }
}
