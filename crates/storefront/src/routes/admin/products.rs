//! Admin product management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use beerbro_core::models::{Category, Product, ProductInput, ProductPatch};
use beerbro_core::{ProductId, ValidationError};

use crate::db::{CategoryRepository, ProductRepository, RepositoryError};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::page::{self, MessageQuery, Page, checkbox, non_blank, parse_optional, parse_required};
use crate::state::AppState;

/// Product form as posted by the browser. Numbers arrive as text.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub brand: String,
    pub image_url: String,
    pub stock: String,
    pub abv: String,
    pub volume_ml: String,
    pub is_active: Option<String>,
    pub featured: Option<String>,
}

impl ProductForm {
    fn into_input(self) -> std::result::Result<ProductInput, ValidationError> {
        let input = ProductInput {
            price: parse_required("price", &self.price)?,
            stock: parse_optional("stock", &self.stock)?.unwrap_or(0),
            abv: parse_optional("abv", &self.abv)?,
            volume_ml: parse_optional("volumeMl", &self.volume_ml)?,
            image_url: non_blank(&self.image_url),
            is_active: checkbox(self.is_active.as_ref()),
            featured: checkbox(self.featured.as_ref()),
            name: self.name,
            description: self.description,
            category: self.category,
            brand: self.brand,
        };
        input.validate()?;
        Ok(input)
    }

    /// Every field is sent on edit; blank optional numbers leave the stored
    /// value alone.
    fn into_patch(self) -> std::result::Result<ProductPatch, ValidationError> {
        let patch = ProductPatch {
            price: Some(parse_required("price", &self.price)?),
            stock: Some(parse_optional("stock", &self.stock)?.unwrap_or(0)),
            abv: parse_optional("abv", &self.abv)?,
            volume_ml: parse_optional("volumeMl", &self.volume_ml)?,
            image_url: Some(self.image_url),
            is_active: Some(checkbox(self.is_active.as_ref())),
            featured: Some(checkbox(self.featured.as_ref())),
            name: Some(self.name),
            description: Some(self.description),
            category: Some(self.category),
            brand: Some(self.brand),
        };
        patch.validate()?;
        Ok(patch)
    }
}

/// Product list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/index.html")]
pub struct ProductsIndexTemplate {
    pub page: Page,
    pub current_path: &'static str,
    pub products: Vec<Product>,
    pub low_stock_threshold: u32,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Product create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/form.html")]
pub struct ProductFormTemplate {
    pub page: Page,
    pub current_path: &'static str,
    /// `None` when creating.
    pub product: Option<Product>,
    pub categories: Vec<Category>,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl ProductFormTemplate {
    fn action(&self) -> String {
        self.product
            .as_ref()
            .map_or_else(|| "/admin/products".to_string(), |p| format!("/admin/products/{}", p.id))
    }
}

/// `GET /admin/products`.
#[instrument(skip_all, fields(admin = %admin.uid))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<MessageQuery>,
) -> Result<ProductsIndexTemplate> {
    let products = ProductRepository::new(state.store()).list_all().await?;
    let page = Page::load(&state, &session, "Products", "Manage the BeerBro catalog.").await?;
    Ok(ProductsIndexTemplate {
        page,
        current_path: "/admin/products",
        products,
        low_stock_threshold: state.config().low_stock_threshold,
        error: query.error,
        success: query.success,
    })
}

async fn form_page(
    state: &AppState,
    session: &Session,
    product: Option<Product>,
    error: Option<String>,
) -> Result<ProductFormTemplate> {
    let title = product
        .as_ref()
        .map_or_else(|| "New product".to_string(), |p| format!("Edit {}", p.name));
    let page = Page::load(state, session, title, "Manage the BeerBro catalog.").await?;
    Ok(ProductFormTemplate {
        page,
        current_path: "/admin/products",
        product,
        categories: CategoryRepository::new(state.store()).list().await?,
        error,
        success: None,
    })
}

/// `GET /admin/products/new`.
pub async fn new(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<MessageQuery>,
) -> Result<ProductFormTemplate> {
    form_page(&state, &session, None, query.error).await
}

/// `POST /admin/products`.
#[instrument(skip_all, fields(admin = %admin.uid))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let input = match form.into_input() {
        Ok(input) => input,
        Err(e) => return Ok(page::redirect_with_error("/admin/products/new", &e.to_string())),
    };
    let product = ProductRepository::new(state.store()).create(&input).await?;
    tracing::info!(product_id = %product.id, "Product created");
    Ok(page::redirect_with_success(
        "/admin/products",
        &format!("Created {}", product.name),
    ))
}

/// `GET /admin/products/{id}/edit`.
pub async fn edit(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<MessageQuery>,
) -> Result<Response> {
    let Some(product) = ProductRepository::new(state.store())
        .get(&ProductId::new(id))
        .await?
    else {
        return page::not_found(&state, &session).await;
    };
    Ok(form_page(&state, &session, Some(product), query.error)
        .await?
        .into_response())
}

/// `POST /admin/products/{id}`.
#[instrument(skip(admin, state, form), fields(admin = %admin.uid))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let edit_path = format!("/admin/products/{id}/edit");
    let patch = match form.into_patch() {
        Ok(patch) => patch,
        Err(e) => return Ok(page::redirect_with_error(&edit_path, &e.to_string())),
    };
    match ProductRepository::new(state.store())
        .update(&ProductId::new(id), &patch)
        .await
    {
        Ok(product) => Ok(page::redirect_with_success(
            "/admin/products",
            &format!("Saved {}", product.name),
        )),
        Err(RepositoryError::NotFound) => Ok(page::redirect_with_error(
            "/admin/products",
            "Product not found",
        )),
        Err(e) => Err(e.into()),
    }
}

/// `POST /admin/products/{id}/delete`.
#[instrument(skip(admin, state), fields(admin = %admin.uid))]
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let deleted = ProductRepository::new(state.store())
        .delete(&ProductId::new(id))
        .await?;
    Ok(if deleted {
        page::redirect_with_success("/admin/products", "Product deleted")
    } else {
        page::redirect_with_error("/admin/products", "Product not found")
    })
}
