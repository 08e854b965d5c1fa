//! Product listing and detail pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use beerbro_core::ProductId;
use beerbro_core::models::{Category, MAX_QUANTITY, Product};
use beerbro_core::search::ProductQuery;

use super::page::{self, Page};
use crate::db::{CategoryRepository, ProductRepository};
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// Query of the listing page.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub category: Option<String>,
}

/// Product listing template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub page: Page,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub current_category: Option<String>,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub page: Page,
    pub product: Product,
    pub max_quantity: u32,
}

/// `GET /products?category=`.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListingQuery>,
) -> Result<ProductsIndexTemplate> {
    let current_category = query.category.as_deref().and_then(page::non_blank);
    let products = ProductQuery {
        category: current_category.clone(),
        ..ProductQuery::default()
    }
    .apply(ProductRepository::new(state.store()).list_all().await?);
    let categories = CategoryRepository::new(state.store()).list().await?;

    let (title, description) = current_category.as_ref().map_or_else(
        || {
            (
                "All beers".to_string(),
                "Browse every beer in the BeerBro range.".to_string(),
            )
        },
        |c| (c.clone(), format!("Browse {c} beers at BeerBro.")),
    );
    let page = Page::load(&state, &session, title, description).await?;

    Ok(ProductsIndexTemplate {
        page,
        products,
        categories,
        current_category,
    })
}

/// `GET /products/{id}`. Inactive products render the 404 page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response> {
    let Some(product) = ProductRepository::new(state.store())
        .get(&ProductId::new(id))
        .await?
        .filter(|p| p.is_active)
    else {
        return page::not_found(&state, &session).await;
    };

    let description = if product.description.is_empty() {
        format!("{} from {}, delivered by BeerBro.", product.name, product.brand)
    } else {
        product.description.chars().take(160).collect()
    };
    let page = Page::load(&state, &session, product.name.clone(), description).await?;

    Ok(ProductShowTemplate {
        page,
        max_quantity: product.stock.min(MAX_QUANTITY),
        product,
    }
    .into_response())
}
