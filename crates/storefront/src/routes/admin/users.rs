//! Admin user list and role toggle.

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

use beerbro_core::models::User;
use beerbro_core::{Role, UserId};

use crate::db::UserRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::api::admin::change_role;
use crate::routes::page::{self, MessageQuery, Page};
use crate::state::AppState;

/// Role form.
#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub role: Role,
}

/// User list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/users.html")]
pub struct UsersTemplate {
    pub page: Page,
    pub current_path: &'static str,
    pub users: Vec<User>,
    pub self_uid: UserId,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// `GET /admin/users`.
#[instrument(skip_all, fields(admin = %admin.uid))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<MessageQuery>,
) -> Result<UsersTemplate> {
    let users = UserRepository::new(state.store()).list().await?;
    let page = Page::load(&state, &session, "Users", "Manage BeerBro accounts.").await?;
    Ok(UsersTemplate {
        page,
        current_path: "/admin/users",
        users,
        self_uid: admin.uid,
        error: query.error,
        success: query.success,
    })
}

/// `POST /admin/users/{uid}/role`.
#[instrument(skip(admin, state), fields(admin = %admin.uid))]
pub async fn set_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Form(form): Form<RoleForm>,
) -> Result<Response> {
    match change_role(&state, &admin, &UserId::new(uid), form.role).await {
        Ok(user) => Ok(page::redirect_with_success(
            "/admin/users",
            &format!(
                "{} is now {}. The change applies when they next sign in.",
                user.email,
                user.role()
            ),
        )),
        Err(e) if e.status().is_client_error() => {
            Ok(page::redirect_with_error("/admin/users", &e.public_message()))
        }
        Err(e) => Err(e),
    }
}
