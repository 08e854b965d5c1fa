//! Search page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use beerbro_core::models::Product;
use beerbro_core::search::search;

use super::page::Page;
use crate::db::ProductRepository;
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// Query of `GET /search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Search results template.
#[derive(Template, WebTemplate)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub page: Page,
    pub query: String,
    pub results: Vec<Product>,
}

/// `GET /search?q=`. A blank query shows the empty form.
#[instrument(skip(state, session))]
pub async fn search_page(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<SearchQuery>,
) -> Result<SearchTemplate> {
    let query = params.q.trim().to_string();
    let results = if query.is_empty() {
        Vec::new()
    } else {
        search(
            ProductRepository::new(state.store()).list_all().await?,
            &query,
        )
    };

    let title = if query.is_empty() {
        "Search".to_string()
    } else {
        format!("Search results for \"{query}\"")
    };
    let page = Page::load(
        &state,
        &session,
        title,
        "Search BeerBro beers by name, brewery, style or description.",
    )
    .await?;

    Ok(SearchTemplate {
        page,
        query,
        results,
    })
}
