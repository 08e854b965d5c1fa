//! Profile page: display name, phone and saved addresses.

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

use beerbro_core::AddressId;
use beerbro_core::models::{AddressInput, ProfilePatch, User};

use super::page::{self, MessageQuery, Page, non_blank};
use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireUser;
use crate::models::{CurrentUser, session_keys};
use crate::services::{AddressBook, AddressError};
use crate::state::AppState;

/// Profile form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub display_name: String,
    pub phone: String,
}

/// New address form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddressForm {
    pub label: String,
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub is_default: Option<String>,
}

impl From<AddressForm> for AddressInput {
    fn from(form: AddressForm) -> Self {
        Self {
            label: non_blank(&form.label),
            full_name: form.full_name,
            phone: form.phone,
            line1: form.line1,
            line2: non_blank(&form.line2),
            city: form.city,
            state: form.state,
            postal_code: form.postal_code,
            is_default: page::checkbox(form.is_default.as_ref()),
        }
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub page: Page,
    pub profile: User,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// `GET /profile`.
#[instrument(skip_all, fields(uid = %user.uid))]
pub async fn show(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<MessageQuery>,
) -> Result<ProfileTemplate> {
    let mut profile = UserRepository::new(state.store())
        .get(&user.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    profile.addresses.sort_by_key(|a| !a.is_default);

    let page = Page::load(
        &state,
        &session,
        "Your profile",
        "Manage your BeerBro profile and delivery addresses.",
    )
    .await?;
    Ok(ProfileTemplate {
        page,
        profile,
        error: query.error,
        success: query.success,
    })
}

/// `POST /profile`. Blank fields clear the stored value.
#[instrument(skip_all, fields(uid = %user.uid))]
pub async fn update(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    let patch = ProfilePatch {
        display_name: Some(form.display_name),
        phone: Some(form.phone),
    };
    if let Err(e) = patch.validate() {
        return Ok(page::redirect_with_error("/profile", &e.to_string()));
    }

    let updated = UserRepository::new(state.store())
        .update_profile(&user.uid, &patch)
        .await?;
    session
        .insert(session_keys::CURRENT_USER, CurrentUser::from(&updated))
        .await?;
    Ok(page::redirect_with_success("/profile", "Profile saved"))
}

/// `POST /profile/addresses`.
#[instrument(skip_all, fields(uid = %user.uid))]
pub async fn add_address(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    match AddressBook::new(state.store())
        .add(&user.uid, form.into())
        .await
    {
        Ok(_) => Ok(page::redirect_with_success("/profile", "Address saved")),
        Err(AddressError::Invalid(e)) => Ok(page::redirect_with_error("/profile", &e.to_string())),
        Err(e) => Err(e.into()),
    }
}

/// `POST /profile/addresses/{id}/delete`.
#[instrument(skip(user, state), fields(uid = %user.uid))]
pub async fn delete_address(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    match AddressBook::new(state.store())
        .remove(&user.uid, &AddressId::new(id))
        .await
    {
        Ok(()) => Ok(page::redirect_with_success("/profile", "Address removed")),
        Err(AddressError::AddressNotFound) => {
            Ok(page::redirect_with_error("/profile", "Address not found"))
        }
        Err(e) => Err(e.into()),
    }
}
