//! User profiles and custom claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::address::Address;
use crate::types::{Email, Role, UserId};
use crate::validation::{self, ValidationError, ValidationResult};

/// Claims attached to a user record by an administrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl CustomClaims {
    /// Claims for the given role. Customers carry no claim at all.
    #[must_use]
    pub fn for_role(role: Role) -> Self {
        Self {
            role: role.is_admin().then_some(role),
        }
    }
}

/// A registered shopper or administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: UserId,
    pub email: Email,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub custom_claims: CustomClaims,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Effective role from the custom claims.
    #[must_use]
    pub fn role(&self) -> Role {
        self.custom_claims.role.unwrap_or_default()
    }

    /// Whether the user holds the admin claim.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role().is_admin()
    }

    /// The default address, falling back to the first one.
    #[must_use]
    pub fn default_address(&self) -> Option<&Address> {
        self.addresses
            .iter()
            .find(|a| a.is_default)
            .or_else(|| self.addresses.first())
    }

    /// Display name, or the local part of the email.
    #[must_use]
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.email.local_part())
    }
}

/// Document body for a freshly registered user.
#[must_use]
pub fn new_user_document(email: &Email, display_name: Option<&str>, role: Role) -> Value {
    json!({
        "email": email.as_str(),
        "displayName": display_name.map(str::trim).filter(|n| !n.is_empty()),
        "phone": null,
        "addresses": [],
        "customClaims": CustomClaims::for_role(role),
    })
}

/// Body of `PATCH /api/users/{uid}` and the profile form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub phone: Option<String>,
}

impl ProfilePatch {
    /// Check field rules for the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns the first field that breaks a rule.
    pub fn validate(&self) -> ValidationResult {
        if self.display_name.is_none() && self.phone.is_none() {
            return Err(ValidationError::new("body", "no fields to update"));
        }
        validation::optional_max_len("displayName", self.display_name.as_deref(), 100)?;
        match self.phone.as_deref().map(str::trim) {
            Some(phone) if !phone.is_empty() => validation::phone("phone", phone),
            _ => Ok(()),
        }
    }

    /// Partial document. Blank values clear the field.
    #[must_use]
    pub fn to_patch(&self) -> Value {
        let mut patch = Map::new();
        for (key, value) in [
            ("displayName", &self.display_name),
            ("phone", &self.phone),
        ] {
            if let Some(v) = value {
                let v = v.trim();
                patch.insert(
                    key.into(),
                    if v.is_empty() { Value::Null } else { json!(v) },
                );
            }
        }
        Value::Object(patch)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(claims: Value) -> User {
        serde_json::from_value(json!({
            "uid": "u1",
            "email": "ada@example.com",
            "addresses": [],
            "customClaims": claims,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_role_from_claims() {
        assert_eq!(user(json!({})).role(), Role::Customer);
        assert!(user(json!({"role": "admin"})).is_admin());
    }

    #[test]
    fn test_customer_claims_are_empty() {
        assert_eq!(
            serde_json::to_value(CustomClaims::for_role(Role::Customer)).unwrap(),
            json!({})
        );
        assert_eq!(
            serde_json::to_value(CustomClaims::for_role(Role::Admin)).unwrap(),
            json!({"role": "admin"})
        );
    }

    #[test]
    fn test_greeting_name_falls_back_to_email() {
        let mut u = user(json!({}));
        assert_eq!(u.greeting_name(), "ada");
        u.display_name = Some("Ada".to_owned());
        assert_eq!(u.greeting_name(), "Ada");
    }

    #[test]
    fn test_profile_patch() {
        let empty = ProfilePatch::default();
        assert!(empty.validate().is_err());

        let patch = ProfilePatch {
            display_name: Some("  Ada  ".to_owned()),
            phone: Some(String::new()),
        };
        assert!(patch.validate().is_ok());
        assert_eq!(
            patch.to_patch(),
            json!({"displayName": "Ada", "phone": null})
        );

        let bad = ProfilePatch {
            phone: Some("nope".to_owned()),
            ..ProfilePatch::default()
        };
        assert_eq!(bad.validate().unwrap_err().field, "phone");
    }
}
