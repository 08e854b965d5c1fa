//! Shared chrome for server-rendered pages.

use std::borrow::Borrow;
use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;

use beerbro_core::{CurrencyCode, Price, ValidationError};

use crate::error::Result;
use crate::filters;
use crate::models::{CurrentUser, session_keys};
use crate::services::cart;
use crate::state::AppState;

/// Layout data every page template carries as `page`.
///
/// `base.html` renders the `<title>`, description and Open Graph tags from
/// it, plus the nav (signed-in user, cart badge).
#[derive(Debug, Clone)]
pub struct Page {
    pub title: String,
    pub description: String,
    pub user: Option<CurrentUser>,
    pub cart_count: u32,
    pub base_url: String,
    currency: CurrencyCode,
}

impl Page {
    /// Build the layout data for the current session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn load(
        state: &AppState,
        session: &Session,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self> {
        let user = session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await?;
        let cart_count = cart::load(session).await?.item_count();
        Ok(Self {
            title: title.into(),
            description: description.into(),
            user,
            cart_count,
            base_url: state.config().base_url.trim_end_matches('/').to_string(),
            currency: state.config().currency,
        })
    }

    /// Format an amount in the shop currency.
    #[must_use]
    pub fn money(&self, amount: impl Borrow<Decimal>) -> String {
        Price::new(*amount.borrow(), self.currency).display()
    }

    /// Whether the signed-in user holds the admin claim.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::is_admin)
    }
}

/// Flash text passed through the query string after a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Redirect to `path` with `?error=` (or `&error=`) set.
#[must_use]
pub fn redirect_with_error(path: &str, message: &str) -> Response {
    redirect_with(path, "error", message)
}

/// Redirect to `path` with `?success=` (or `&success=`) set.
#[must_use]
pub fn redirect_with_success(path: &str, message: &str) -> Response {
    redirect_with(path, "success", message)
}

fn redirect_with(path: &str, key: &str, message: &str) -> Response {
    let separator = if path.contains('?') { '&' } else { '?' };
    Redirect::to(&format!(
        "{path}{separator}{key}={}",
        urlencoding::encode(message)
    ))
    .into_response()
}

/// 404 page.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub page: Page,
}

/// Render the 404 page.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn not_found(state: &AppState, session: &Session) -> Result<Response> {
    let page = Page::load(
        state,
        session,
        "Page not found",
        "The page you were looking for does not exist.",
    )
    .await?;
    Ok((StatusCode::NOT_FOUND, NotFoundTemplate { page }).into_response())
}

/// 403 page.
#[derive(Template, WebTemplate)]
#[template(path = "forbidden.html")]
pub struct ForbiddenTemplate {
    pub page: Page,
}

/// Render the 403 page shown to signed-in users without the admin claim.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn forbidden(state: &AppState, session: &Session) -> Result<Response> {
    let page = Page::load(
        state,
        session,
        "Access denied",
        "This page is only available to shop administrators.",
    )
    .await?;
    Ok((StatusCode::FORBIDDEN, ForbiddenTemplate { page }).into_response())
}

// =============================================================================
// Form field parsing
// =============================================================================

/// Blank form fields mean "not given".
#[must_use]
pub fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Parse an optional numeric form field.
///
/// # Errors
///
/// Returns a validation error naming `field` when the text is not a number.
pub fn parse_optional<T: FromStr>(
    field: &'static str,
    value: &str,
) -> std::result::Result<Option<T>, ValidationError> {
    non_blank(value)
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| ValidationError::new(field, "must be a number"))
        })
        .transpose()
}

/// Parse a required numeric form field.
///
/// # Errors
///
/// Returns a validation error naming `field` when the text is blank or not
/// a number.
pub fn parse_required<T: FromStr>(
    field: &'static str,
    value: &str,
) -> std::result::Result<T, ValidationError> {
    parse_optional(field, value)?.ok_or_else(|| ValidationError::new(field, "is required"))
}

/// HTML checkboxes send `on` when ticked and nothing otherwise.
#[must_use]
pub fn checkbox(value: Option<&String>) -> bool {
    value.is_some_and(|v| matches!(v.as_str(), "on" | "true" | "1"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_optional() {
        assert_eq!(parse_optional::<u32>("stock", "  ").unwrap(), None);
        assert_eq!(parse_optional::<u32>("stock", "12").unwrap(), Some(12));
        assert_eq!(
            parse_optional::<Decimal>("price", "4.50").unwrap(),
            Some(Decimal::new(450, 2))
        );
        assert_eq!(parse_optional::<u32>("stock", "lots").unwrap_err().field, "stock");
    }

    #[test]
    fn test_parse_required() {
        assert_eq!(parse_required::<u32>("stock", "").unwrap_err().field, "stock");
    }

    #[test]
    fn test_checkbox() {
        assert!(checkbox(Some(&"on".to_string())));
        assert!(!checkbox(None));
    }

    #[test]
    fn test_redirect_with_error_appends() {
        let response = redirect_with_error("/admin/orders?status=pending", "bad things");
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/admin/orders?status=pending&error=bad%20things"
        );
    }
}
