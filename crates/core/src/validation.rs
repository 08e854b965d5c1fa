//! Input validation shared by the request body types.
//!
//! Request bodies deserialize first (shape) and then run `validate()` (rules).
//! Rules report the first failing field.

use rust_decimal::Decimal;
use thiserror::Error;

/// A request field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Wire name of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Result alias for validation rules.
pub type ValidationResult = Result<(), ValidationError>;

/// Require a non-blank string of at most `max` characters.
///
/// # Errors
///
/// Returns an error if the value is blank or too long.
pub fn required(field: &'static str, value: &str, max: usize) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    max_len(field, value, max)
}

/// Reject strings longer than `max` characters.
///
/// # Errors
///
/// Returns an error if the value is too long.
pub fn max_len(field: &'static str, value: &str, max: usize) -> ValidationResult {
    if value.chars().count() > max {
        return Err(ValidationError::new(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

/// Validate an optional string if present.
///
/// # Errors
///
/// Returns an error if the value is present and too long.
pub fn optional_max_len(field: &'static str, value: Option<&str>, max: usize) -> ValidationResult {
    value.map_or(Ok(()), |v| max_len(field, v, max))
}

/// Require a decimal amount that is zero or positive.
///
/// # Errors
///
/// Returns an error if the amount is negative.
pub fn non_negative(field: &'static str, value: Decimal) -> ValidationResult {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new(field, "cannot be negative"));
    }
    Ok(())
}

/// Require an `http(s)` URL or a site-relative path for images.
///
/// # Errors
///
/// Returns an error for any other scheme.
pub fn image_url(field: &'static str, value: Option<&str>) -> ValidationResult {
    let Some(url) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(());
    };
    if url.starts_with("https://") || url.starts_with("http://") || url.starts_with('/') {
        max_len(field, url, 2048)
    } else {
        Err(ValidationError::new(
            field,
            "must be an http(s) URL or a path starting with /",
        ))
    }
}

/// Phone numbers: 7-20 characters of digits, spaces, `+`, `-`, parentheses.
///
/// # Errors
///
/// Returns an error if the number has the wrong shape.
pub fn phone(field: &'static str, value: &str) -> ValidationResult {
    let trimmed = value.trim();
    let digits = trimmed.chars().filter(char::is_ascii_digit).count();
    let allowed = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'));
    if !allowed || !(7..=20).contains(&trimmed.len()) || digits < 7 {
        return Err(ValidationError::new(field, "must be a valid phone number"));
    }
    Ok(())
}

/// Postal codes: 3-10 letters, digits, spaces or dashes.
///
/// # Errors
///
/// Returns an error if the code has the wrong shape.
pub fn postal_code(field: &'static str, value: &str) -> ValidationResult {
    let trimmed = value.trim();
    let allowed = trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-'));
    if !allowed || !(3..=10).contains(&trimmed.len()) {
        return Err(ValidationError::new(field, "must be a valid postal code"));
    }
    Ok(())
}

/// Canonical form used to compare postal codes.
#[must_use]
pub fn normalize_postal_code(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_blank() {
        assert!(required("name", "  ", 10).is_err());
        assert!(required("name", "Stout", 10).is_ok());
        assert!(required("name", "Imperial Stout", 5).is_err());
    }

    #[test]
    fn test_non_negative() {
        assert!(non_negative("price", Decimal::ZERO).is_ok());
        assert!(non_negative("price", Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn test_image_url() {
        assert!(image_url("imageUrl", None).is_ok());
        assert!(image_url("imageUrl", Some("")).is_ok());
        assert!(image_url("imageUrl", Some("/static/ipa.png")).is_ok());
        assert!(image_url("imageUrl", Some("https://cdn.example.com/a.jpg")).is_ok());
        assert!(image_url("imageUrl", Some("javascript:alert(1)")).is_err());
    }

    #[test]
    fn test_phone() {
        assert!(phone("phone", "+1 (555) 010-2030").is_ok());
        assert!(phone("phone", "12345").is_err());
        assert!(phone("phone", "555-CALL-NOW").is_err());
    }

    #[test]
    fn test_postal_code() {
        assert!(postal_code("postalCode", "560001").is_ok());
        assert!(postal_code("postalCode", "SW1A 1AA").is_ok());
        assert!(postal_code("postalCode", "1").is_err());
        assert_eq!(normalize_postal_code("sw1a 1aa"), "SW1A1AA");
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::new("price", "cannot be negative");
        assert_eq!(err.to_string(), "price: cannot be negative");
    }
}
