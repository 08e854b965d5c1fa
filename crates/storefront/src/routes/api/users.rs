//! User profile and address book API. Each route is open to the user
//! themself and to admins.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
};
use tracing::instrument;

use beerbro_core::models::{Address, AddressInput, AddressPatch, ProfilePatch, User};
use beerbro_core::{AddressId, UserId};

use super::ApiJson;
use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::CurrentUser;
use crate::services::AddressBook;
use crate::state::AppState;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/{uid}", get(get_user).patch(update_user))
        .route(
            "/api/users/{uid}/addresses",
            get(list_addresses).post(add_address),
        )
        .route(
            "/api/users/{uid}/addresses/{address_id}",
            patch(update_address).delete(delete_address),
        )
}

fn authorize(user: &CurrentUser, uid: String) -> Result<UserId> {
    let uid = UserId::new(uid);
    if user.can_access(&uid) {
        Ok(uid)
    } else {
        tracing::warn!(uid = %user.uid, target = %uid, "Profile access denied");
        Err(AppError::Forbidden("You can only access your own profile".to_string()))
    }
}

/// `GET /api/users/{uid}`.
#[instrument(skip(user, state), fields(uid = %user.uid))]
pub async fn get_user(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<User>> {
    let uid = authorize(&user, uid)?;
    UserRepository::new(state.store())
        .get(&uid)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// `PATCH /api/users/{uid}` - `displayName` and `phone`.
#[instrument(skip(user, state, patch), fields(uid = %user.uid))]
pub async fn update_user(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(uid): Path<String>,
    ApiJson(patch): ApiJson<ProfilePatch>,
) -> Result<Json<User>> {
    let uid = authorize(&user, uid)?;
    patch.validate()?;
    let updated = UserRepository::new(state.store())
        .update_profile(&uid, &patch)
        .await?;
    Ok(Json(updated))
}

/// `GET /api/users/{uid}/addresses`.
#[instrument(skip(user, state), fields(uid = %user.uid))]
pub async fn list_addresses(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<Vec<Address>>> {
    let uid = authorize(&user, uid)?;
    Ok(Json(AddressBook::new(state.store()).list(&uid).await?))
}

/// `POST /api/users/{uid}/addresses`.
#[instrument(skip(user, state, input), fields(uid = %user.uid))]
pub async fn add_address(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(uid): Path<String>,
    ApiJson(input): ApiJson<AddressInput>,
) -> Result<(StatusCode, Json<Address>)> {
    let uid = authorize(&user, uid)?;
    let address = AddressBook::new(state.store()).add(&uid, input).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// `PATCH /api/users/{uid}/addresses/{address_id}`.
#[instrument(skip(user, state, patch), fields(uid = %user.uid))]
pub async fn update_address(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path((uid, address_id)): Path<(String, String)>,
    ApiJson(patch): ApiJson<AddressPatch>,
) -> Result<Json<Address>> {
    let uid = authorize(&user, uid)?;
    let address = AddressBook::new(state.store())
        .update(&uid, &AddressId::new(address_id), patch)
        .await?;
    Ok(Json(address))
}

/// `DELETE /api/users/{uid}/addresses/{address_id}`.
#[instrument(skip(user, state), fields(uid = %user.uid))]
pub async fn delete_address(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path((uid, address_id)): Path<(String, String)>,
) -> Result<StatusCode> {
    let uid = authorize(&user, uid)?;
    AddressBook::new(state.store())
        .remove(&uid, &AddressId::new(address_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
