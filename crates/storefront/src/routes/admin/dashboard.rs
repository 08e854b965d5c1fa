//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use beerbro_core::models::AdminStats;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::page::Page;
use crate::services::stats::admin_stats;
use crate::state::AppState;

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub page: Page,
    pub current_path: &'static str,
    pub stats: AdminStats,
    pub low_stock_threshold: u32,
}

/// Dashboard page handler.
#[instrument(skip_all, fields(admin = %admin.uid))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> Result<DashboardTemplate> {
    let low_stock_threshold = state.config().low_stock_threshold;
    let stats = admin_stats(state.store(), low_stock_threshold).await?;
    let page = Page::load(
        &state,
        &session,
        "Admin dashboard",
        "BeerBro store overview.",
    )
    .await?;

    Ok(DashboardTemplate {
        page,
        current_path: "/admin",
        stats,
        low_stock_threshold,
    })
}
