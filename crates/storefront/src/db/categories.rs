//! Category repository.

use beerbro_core::models::{Category, CategoryInput};

use super::store::{Collection, DocumentStore};
use super::{RepositoryError, decode, decode_all};

/// Repository for product categories.
pub struct CategoryRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// All categories, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a document is malformed.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let docs = self.store.list(Collection::Categories).await?;
        let mut categories: Vec<Category> = decode_all(Collection::Categories, "id", docs)?;
        categories.sort_by_key(|c| c.name.to_lowercase());
        Ok(categories)
    }

    /// Insert a validated category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is already taken.
    pub async fn create(&self, input: &CategoryInput) -> Result<Category, RepositoryError> {
        let slug = input.slug();
        let taken = self
            .store
            .list_where(Collection::Categories, "slug", &slug.clone().into())
            .await?;
        if !taken.is_empty() {
            return Err(RepositoryError::Conflict(format!(
                "category slug {slug} already exists"
            )));
        }
        let doc = self
            .store
            .insert(Collection::Categories, input.to_document())
            .await?;
        decode(Collection::Categories, "id", doc)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::db::MemoryDocumentStore;

    fn input(name: &str) -> CategoryInput {
        serde_json::from_value(json!({ "name": name })).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_list_sorted() {
        let store = MemoryDocumentStore::new();
        let repo = CategoryRepository::new(&store);
        repo.create(&input("Stout")).await.unwrap();
        let ipa = repo.create(&input("IPA")).await.unwrap();
        assert_eq!(ipa.slug, "ipa");

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, ["IPA", "Stout"]);
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let store = MemoryDocumentStore::new();
        let repo = CategoryRepository::new(&store);
        repo.create(&input("Pale Ale")).await.unwrap();
        let err = repo.create(&input("pale ale")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }
}
