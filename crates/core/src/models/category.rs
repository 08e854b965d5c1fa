//! Product categories.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::types::CategoryId;
use crate::validation::{self, ValidationError, ValidationResult};

/// A browsable product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Body of `POST /api/categories`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CategoryInput {
    /// Check field rules.
    ///
    /// # Errors
    ///
    /// Returns the first field that breaks a rule.
    pub fn validate(&self) -> ValidationResult {
        validation::required("name", &self.name, 80)?;
        if self.slug().is_empty() {
            return Err(ValidationError::new("slug", "must contain letters or digits"));
        }
        validation::optional_max_len("description", self.description.as_deref(), 1000)?;
        validation::image_url("imageUrl", self.image_url.as_deref())
    }

    /// The explicit slug, or one derived from the name.
    #[must_use]
    pub fn slug(&self) -> String {
        slugify(self.slug.as_deref().unwrap_or(&self.name))
    }

    /// Canonical document body.
    #[must_use]
    pub fn to_document(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "slug": self.slug(),
            "description": self.description.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            "imageUrl": self.image_url.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        })
    }
}

/// Lowercase ASCII slug: runs of non-alphanumerics become a single `-`.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Pale Ales & IPAs"), "pale-ales-ipas");
        assert_eq!(slugify("  --Stout--  "), "stout");
        assert_eq!(slugify("Ünïcode"), "n-code");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slug_falls_back_to_name() {
        let input: CategoryInput = serde_json::from_value(json!({"name": "Wheat Beer"})).unwrap();
        assert_eq!(input.slug(), "wheat-beer");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_unsluggable_name_is_rejected() {
        let input: CategoryInput = serde_json::from_value(json!({"name": "???"})).unwrap();
        assert_eq!(input.validate().unwrap_err().field, "slug");
    }
}
