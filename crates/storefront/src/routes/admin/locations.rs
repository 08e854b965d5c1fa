//! Admin service-location management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use beerbro_core::models::{LocationInput, ServiceLocation};
use beerbro_core::{LocationId, ValidationError};

use crate::db::LocationRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::page::{self, MessageQuery, Page, checkbox, parse_optional, parse_required};
use crate::state::AppState;

/// Location form. Postal codes are comma or whitespace separated.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LocationForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub postal_codes: String,
    pub delivery_fee: String,
    pub min_order_amount: String,
    pub is_active: Option<String>,
}

impl LocationForm {
    fn into_input(self) -> std::result::Result<LocationInput, ValidationError> {
        let input = LocationInput {
            postal_codes: self
                .postal_codes
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|code| !code.is_empty())
                .map(String::from)
                .collect(),
            delivery_fee: parse_required("deliveryFee", &self.delivery_fee)?,
            min_order_amount: parse_optional("minOrderAmount", &self.min_order_amount)?
                .unwrap_or_default(),
            is_active: checkbox(self.is_active.as_ref()),
            name: self.name,
            city: self.city,
            state: self.state,
        };
        input.validate()?;
        Ok(input)
    }
}

/// Locations template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/locations.html")]
pub struct LocationsTemplate {
    pub page: Page,
    pub current_path: &'static str,
    pub locations: Vec<ServiceLocation>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// `GET /admin/locations`.
#[instrument(skip_all, fields(admin = %admin.uid))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<MessageQuery>,
) -> Result<LocationsTemplate> {
    let locations = LocationRepository::new(state.store()).list().await?;
    let page = Page::load(
        &state,
        &session,
        "Service locations",
        "Manage BeerBro delivery areas.",
    )
    .await?;
    Ok(LocationsTemplate {
        page,
        current_path: "/admin/locations",
        locations,
        error: query.error,
        success: query.success,
    })
}

/// `POST /admin/locations`.
#[instrument(skip_all, fields(admin = %admin.uid))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Form(form): Form<LocationForm>,
) -> Result<Response> {
    let input = match form.into_input() {
        Ok(input) => input,
        Err(e) => return Ok(page::redirect_with_error("/admin/locations", &e.to_string())),
    };
    let location = LocationRepository::new(state.store()).create(&input).await?;
    tracing::info!(location_id = %location.id, "Service location created");
    Ok(page::redirect_with_success(
        "/admin/locations",
        &format!("Added {}", location.name),
    ))
}

/// `POST /admin/locations/{id}/delete`.
#[instrument(skip(admin, state), fields(admin = %admin.uid))]
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let deleted = LocationRepository::new(state.store())
        .delete(&LocationId::new(id))
        .await?;
    Ok(if deleted {
        page::redirect_with_success("/admin/locations", "Location removed")
    } else {
        page::redirect_with_error("/admin/locations", "Location not found")
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_form_splits_postal_codes() {
        let form = LocationForm {
            name: "Downtown".into(),
            city: "Portland".into(),
            postal_codes: "97201, 97202\n97203".into(),
            delivery_fee: "4.99".into(),
            ..LocationForm::default()
        };
        let input = form.into_input().unwrap();
        assert_eq!(input.postal_codes, vec!["97201", "97202", "97203"]);
        assert_eq!(input.delivery_fee, Decimal::new(499, 2));
        assert_eq!(input.min_order_amount, Decimal::ZERO);
        assert!(!input.is_active);
    }
}
