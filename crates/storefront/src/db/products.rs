//! Product repository.
//!
//! Products are read through [`Product::normalize`], so catalog documents
//! written with legacy field names still load.

use beerbro_core::models::{Product, ProductInput, ProductPatch};
use beerbro_core::ProductId;
use serde_json::json;

use super::store::{Collection, Document, DocumentStore};
use super::RepositoryError;

fn to_product(document: Document) -> Product {
    Product::normalize(ProductId::new(document.id), &document.data)
        .with_timestamps(document.created_at, document.updated_at)
}

/// Repository for catalog products.
pub struct ProductRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Every product, active or not, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let docs = self.store.list(Collection::Products).await?;
        Ok(docs.into_iter().map(to_product).collect())
    }

    /// Active products only, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store fails.
    pub async fn list_active(&self) -> Result<Vec<Product>, RepositoryError> {
        let mut products = self.list_all().await?;
        products.retain(|p| p.is_active);
        Ok(products)
    }

    /// Get a product by ID, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store fails.
    pub async fn get(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let doc = self.store.get(Collection::Products, id.as_str()).await?;
        Ok(doc.map(to_product))
    }

    /// Insert a validated product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store fails.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let doc = self
            .store
            .insert(Collection::Products, input.to_document())
            .await?;
        Ok(to_product(doc))
    }

    /// Apply a validated patch.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, RepositoryError> {
        self.store
            .merge(Collection::Products, id.as_str(), patch.to_patch())
            .await?
            .map(to_product)
            .ok_or(RepositoryError::NotFound)
    }

    /// Overwrite the stock level.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn set_stock(&self, id: &ProductId, stock: u32) -> Result<(), RepositoryError> {
        self.store
            .merge(Collection::Products, id.as_str(), json!({ "stock": stock }))
            .await?
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store fails.
    pub async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        Ok(self.store.delete(Collection::Products, id.as_str()).await?)
    }
}
