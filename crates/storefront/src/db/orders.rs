//! Order repository.

use beerbro_core::models::{NewOrder, Order};
use beerbro_core::{OrderId, OrderStatus, UserId};
use serde_json::json;

use super::store::{Collection, DocumentStore};
use super::{RepositoryError, decode, decode_all};

/// Repository for placed orders.
pub struct OrderRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Every order, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a document is malformed.
    pub async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError> {
        let docs = match status {
            Some(status) => {
                self.store
                    .list_where(Collection::Orders, "status", &json!(status))
                    .await?
            }
            None => self.store.list(Collection::Orders).await?,
        };
        decode_all(Collection::Orders, "id", docs)
    }

    /// Orders placed by one user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a document is malformed.
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, RepositoryError> {
        let docs = self
            .store
            .list_where(Collection::Orders, "userId", &json!(user_id))
            .await?;
        decode_all(Collection::Orders, "id", docs)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the document is malformed.
    pub async fn get(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        self.store
            .get(Collection::Orders, id.as_str())
            .await?
            .map(|doc| decode(Collection::Orders, "id", doc))
            .transpose()
    }

    /// Insert a priced order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store fails.
    pub async fn create(&self, order: &NewOrder<'_>) -> Result<Order, RepositoryError> {
        let doc = self
            .store
            .insert(Collection::Orders, order.to_document())
            .await?;
        decode(Collection::Orders, "id", doc)
    }

    /// Overwrite the status. Transition rules are checked by the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn set_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let doc = self
            .store
            .merge(Collection::Orders, id.as_str(), json!({ "status": status }))
            .await?
            .ok_or(RepositoryError::NotFound)?;
        decode(Collection::Orders, "id", doc)
    }
}
