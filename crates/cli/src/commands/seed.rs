//! Seed the catalog.
//!
//! A catalog file is one JSON object with three optional arrays, each entry
//! shaped like the matching admin API body:
//!
//! ```json
//! {
//!   "categories": [{ "name": "IPA", "description": "Hop forward" }],
//!   "products": [{ "name": "Hop Lane IPA", "price": 4.5, "category": "IPA", "stock": 40 }],
//!   "locations": [{ "name": "Downtown", "city": "Portland", "postalCodes": ["97201"], "deliveryFee": 4.99 }]
//! }
//! ```
//!
//! The whole file is checked before anything is written.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use beerbro_core::models::{CategoryInput, LocationInput, ProductInput};
use beerbro_storefront::db::{
    CategoryRepository, Collection, DocumentStore, LocationRepository, PgDocumentStore,
    ProductRepository, RepositoryError, StoreError,
};

use super::{ConnectError, connect};

/// Sample catalog used when no file is given.
const BUILTIN_CATALOG: &str = include_str!("../../seed/catalog.json");

/// Collections a reset wipes. Users and orders are never touched.
const CATALOG_COLLECTIONS: [Collection; 3] = [
    Collection::Categories,
    Collection::Products,
    Collection::Locations,
];

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Could not read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0} validation errors found")]
    Invalid(usize),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Catalog file contents.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    #[serde(default)]
    pub categories: Vec<CategoryInput>,
    #[serde(default)]
    pub products: Vec<ProductInput>,
    #[serde(default)]
    pub locations: Vec<LocationInput>,
}

impl Catalog {
    /// Every rule the catalog breaks, one message per entry.
    ///
    /// Products must name a listed category when the file lists any.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (i, category) in self.categories.iter().enumerate() {
            if let Err(e) = category.validate() {
                errors.push(format!("categories[{i}] ({}): {e}", category.name));
            }
        }
        for (i, product) in self.products.iter().enumerate() {
            if let Err(e) = product.validate() {
                errors.push(format!("products[{i}] ({}): {e}", product.name));
            }
            let known = self
                .categories
                .iter()
                .any(|c| c.name.trim().eq_ignore_ascii_case(product.category.trim()));
            if !self.categories.is_empty() && !known {
                errors.push(format!(
                    "products[{i}] ({}): unknown category {}",
                    product.name, product.category
                ));
            }
        }
        for (i, location) in self.locations.iter().enumerate() {
            if let Err(e) = location.validate() {
                errors.push(format!("locations[{i}] ({}): {e}", location.name));
            }
        }
        errors
    }
}

/// Load a catalog into the database.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation, or if a
/// database operation fails.
pub async fn run(file: Option<&str>, reset: bool) -> Result<(), SeedError> {
    let catalog = load(file).await?;

    let errors = catalog.validate();
    if !errors.is_empty() {
        tracing::error!("Catalog validation failed:");
        for err in &errors {
            tracing::error!("  - {err}");
        }
        return Err(SeedError::Invalid(errors.len()));
    }
    tracing::info!(
        categories = catalog.categories.len(),
        products = catalog.products.len(),
        locations = catalog.locations.len(),
        "Catalog validated"
    );

    let store = PgDocumentStore::new(connect().await?);
    if reset {
        for collection in CATALOG_COLLECTIONS {
            let removed = store.clear(collection).await?;
            tracing::info!(%collection, removed, "Cleared collection");
        }
    }
    insert(&store, &catalog).await?;

    tracing::info!("Seeding complete");
    Ok(())
}

async fn load(file: Option<&str>) -> Result<Catalog, SeedError> {
    let Some(file) = file else {
        tracing::info!("Using the built-in sample catalog");
        return Ok(serde_json::from_str(BUILTIN_CATALOG)?);
    };

    let path = Path::new(file);
    if !path.exists() {
        return Err(SeedError::FileNotFound(file.to_owned()));
    }
    tracing::info!(path = %file, "Loading catalog from file");
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

async fn insert(store: &dyn DocumentStore, catalog: &Catalog) -> Result<(), RepositoryError> {
    let categories = CategoryRepository::new(store);
    for input in &catalog.categories {
        let category = categories.create(input).await?;
        tracing::info!(id = %category.id, name = %category.name, "Category created");
    }

    let products = ProductRepository::new(store);
    for input in &catalog.products {
        let product = products.create(input).await?;
        tracing::info!(id = %product.id, name = %product.name, "Product created");
    }

    let locations = LocationRepository::new(store);
    for input in &catalog.locations {
        let location = locations.create(input).await?;
        tracing::info!(id = %location.id, name = %location.name, "Location created");
    }
    Ok(())
}
