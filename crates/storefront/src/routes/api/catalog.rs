//! Catalog API: products, categories and service locations.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use tracing::instrument;

use beerbro_core::ProductId;
use beerbro_core::models::{Category, CategoryInput, Product, ProductInput, ProductPatch, ServiceLocation};
use beerbro_core::search::ProductQuery;

use super::{ApiJson, ApiQuery};
use crate::db::{CategoryRepository, LocationRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Build the catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/api/categories", get(list_categories).post(create_category))
        .route("/api/locations", get(list_locations))
}

/// `GET /api/products` - active products, filtered by the query.
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.store()).list_all().await?;
    Ok(Json(query.apply(products)))
}

/// `GET /api/products/{id}` - one active product.
#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.store())
        .get(&ProductId::new(id))
        .await?
        .filter(|p| p.is_active)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// `POST /api/products` (admin).
#[instrument(skip(admin, state, input), fields(admin = %admin.uid))]
pub async fn create_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    input.validate()?;
    let product = ProductRepository::new(state.store()).create(&input).await?;
    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PATCH /api/products/{id}` (admin).
#[instrument(skip(admin, state, patch), fields(admin = %admin.uid))]
pub async fn update_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> Result<Json<Product>> {
    patch.validate()?;
    let product = ProductRepository::new(state.store())
        .update(&ProductId::new(id), &patch)
        .await?;
    Ok(Json(product))
}

/// `DELETE /api/products/{id}` (admin).
#[instrument(skip(admin, state), fields(admin = %admin.uid))]
pub async fn delete_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    if ProductRepository::new(state.store())
        .delete(&ProductId::new(id))
        .await?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Product not found".to_string()))
    }
}

/// `GET /api/categories` - all categories by name.
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(CategoryRepository::new(state.store()).list().await?))
}

/// `POST /api/categories` (admin). The slug defaults to the slugified name.
#[instrument(skip(admin, state, input), fields(admin = %admin.uid))]
pub async fn create_category(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> Result<(StatusCode, Json<Category>)> {
    input.validate()?;
    let category = CategoryRepository::new(state.store()).create(&input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// `GET /api/locations` - active service locations.
pub async fn list_locations(
    State(state): State<AppState>,
) -> Result<Json<Vec<ServiceLocation>>> {
    Ok(Json(LocationRepository::new(state.store()).list_active().await?))
}
