//! Authentication route handlers.
//!
//! Email/password sign-in backed by the `users` and `credentials`
//! collections. The session keeps a [`crate::models::CurrentUser`] snapshot.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use super::api::auth::start_session;
use super::page::Page;
use crate::error::{AppError, Result, clear_sentry_user};
use crate::filters;
use crate::middleware::auth::safe_next;
use crate::middleware::clear_current_user;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

/// Query of the login and register pages.
#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    pub next: Option<String>,
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: Page,
    pub next: String,
    pub email: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: Page,
    pub next: String,
    pub email: String,
    pub display_name: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

async fn login_template(
    state: &AppState,
    session: &Session,
    next: &str,
    email: String,
    error: Option<String>,
) -> Result<LoginTemplate> {
    let page = Page::load(
        state,
        session,
        "Sign in",
        "Sign in to your BeerBro account to check out and track orders.",
    )
    .await?;
    Ok(LoginTemplate {
        page,
        next: next.to_string(),
        email,
        error,
        success: None,
    })
}

async fn register_template(
    state: &AppState,
    session: &Session,
    next: &str,
    form: Option<&RegisterForm>,
    error: Option<String>,
) -> Result<RegisterTemplate> {
    let page = Page::load(
        state,
        session,
        "Create an account",
        "Create a BeerBro account to order beer for delivery.",
    )
    .await?;
    Ok(RegisterTemplate {
        page,
        next: next.to_string(),
        email: form.map(|f| f.email.clone()).unwrap_or_default(),
        display_name: form
            .and_then(|f| f.display_name.clone())
            .unwrap_or_default(),
        error,
        success: None,
    })
}

/// Message to show on the form, or the error itself for server failures.
fn form_error(err: AuthError) -> Result<String> {
    let err = AppError::from(err);
    if err.status().is_server_error() {
        Err(err)
    } else {
        Ok(err.public_message())
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<AuthQuery>,
) -> Result<LoginTemplate> {
    let next = safe_next(query.next.as_deref());
    login_template(&state, &session, next, String::new(), query.error).await
}

/// Handle login form submission.
///
/// Redirects to `next` (same-site paths only) on success; re-renders the
/// form with an error otherwise.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = safe_next(form.next.as_deref()).to_string();

    match AuthService::new(state.store())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            start_session(&session, &user).await?;
            tracing::info!(uid = %user.uid, "Signed in");
            Ok(Redirect::to(&next).into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            let message = form_error(e)?;
            Ok(login_template(&state, &session, &next, form.email, Some(message))
                .await?
                .into_response())
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<AuthQuery>,
) -> Result<RegisterTemplate> {
    let next = safe_next(query.next.as_deref());
    register_template(&state, &session, next, None, query.error).await
}

/// Handle registration form submission. New accounts are signed in
/// straight away.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let next = safe_next(form.next.as_deref()).to_string();

    if form.password != form.password_confirm {
        return Ok(register_template(
            &state,
            &session,
            &next,
            Some(&form),
            Some("Passwords do not match".to_string()),
        )
        .await?
        .into_response());
    }

    let display_name = form
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    match AuthService::new(state.store())
        .register(&form.email, &form.password, display_name)
        .await
    {
        Ok(user) => {
            start_session(&session, &user).await?;
            Ok(Redirect::to(&next).into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Registration failed");
            let message = form_error(e)?;
            Ok(
                register_template(&state, &session, &next, Some(&form), Some(message))
                    .await?
                    .into_response(),
            )
        }
    }
}

/// Handle logout.
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}
