//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use beerbro_core::models::{Category, Product};
use beerbro_core::search::ProductQuery;

use super::page::Page;
use crate::db::{CategoryRepository, ProductRepository};
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// Featured products shown on the home page.
const FEATURED_LIMIT: usize = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: Page,
    pub featured: Vec<Product>,
    pub categories: Vec<Category>,
}

/// Display the home page.
#[instrument(skip_all)]
pub async fn home(State(state): State<AppState>, session: Session) -> Result<HomeTemplate> {
    let products = ProductRepository::new(state.store()).list_all().await?;
    let featured = ProductQuery {
        featured: Some(true),
        limit: Some(FEATURED_LIMIT),
        ..ProductQuery::default()
    }
    .apply(products);
    let categories = CategoryRepository::new(state.store()).list().await?;

    let page = Page::load(
        &state,
        &session,
        "Craft beer delivered",
        "Order craft and classic beers online from BeerBro and pay cash on delivery.",
    )
    .await?;

    Ok(HomeTemplate {
        page,
        featured,
        categories,
    })
}
