//! Service location repository.

use beerbro_core::LocationId;
use beerbro_core::models::{LocationInput, LocationPatch, ServiceLocation};

use super::store::{Collection, DocumentStore};
use super::{RepositoryError, decode, decode_all};

/// Repository for delivery areas.
pub struct LocationRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> LocationRepository<'a> {
    /// Create a new location repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// All locations, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a document is malformed.
    pub async fn list(&self) -> Result<Vec<ServiceLocation>, RepositoryError> {
        let docs = self.store.list(Collection::Locations).await?;
        let mut locations: Vec<ServiceLocation> = decode_all(Collection::Locations, "id", docs)?;
        locations.sort_by_key(|l| l.name.to_lowercase());
        Ok(locations)
    }

    /// Active locations only.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a document is malformed.
    pub async fn list_active(&self) -> Result<Vec<ServiceLocation>, RepositoryError> {
        let mut locations = self.list().await?;
        locations.retain(|l| l.is_active);
        Ok(locations)
    }

    /// Insert a validated location.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store fails.
    pub async fn create(&self, input: &LocationInput) -> Result<ServiceLocation, RepositoryError> {
        let doc = self
            .store
            .insert(Collection::Locations, input.to_document())
            .await?;
        decode(Collection::Locations, "id", doc)
    }

    /// Apply a validated patch.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the location does not exist.
    pub async fn update(
        &self,
        id: &LocationId,
        patch: &LocationPatch,
    ) -> Result<ServiceLocation, RepositoryError> {
        let doc = self
            .store
            .merge(Collection::Locations, id.as_str(), patch.to_patch())
            .await?
            .ok_or(RepositoryError::NotFound)?;
        decode(Collection::Locations, "id", doc)
    }

    /// Delete a location. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store fails.
    pub async fn delete(&self, id: &LocationId) -> Result<bool, RepositoryError> {
        Ok(self.store.delete(Collection::Locations, id.as_str()).await?)
    }
}
