//! Document store abstraction.
//!
//! Every record lives as a JSON document in a named collection. Handlers
//! never talk to a backend directly; they go through the typed
//! repositories in [`crate::db`], which in turn use this trait.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

/// A named group of documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Products,
    Categories,
    Orders,
    Users,
    /// Password hashes keyed by user id. Never exposed by a route.
    Credentials,
    Locations,
}

impl Collection {
    pub const ALL: [Self; 6] = [
        Self::Products,
        Self::Categories,
        Self::Orders,
        Self::Users,
        Self::Credentials,
        Self::Locations,
    ];

    /// Name stored in the `collection` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Categories => "categories",
            Self::Orders => "orders",
            Self::Users => "users",
            Self::Credentials => "credentials",
            Self::Locations => "locations",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    /// Always a JSON object.
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Errors raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Document bodies and merge patches must be JSON objects.
    #[error("document body for {collection} must be a JSON object")]
    NotAnObject { collection: Collection },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Backend-independent document persistence.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document.
    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>>;

    /// All documents of a collection, newest first.
    async fn list(&self, collection: Collection) -> StoreResult<Vec<Document>>;

    /// Documents whose top-level `field` equals `value`, newest first.
    async fn list_where(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>>;

    /// Insert under a freshly generated id.
    async fn insert(&self, collection: Collection, data: Value) -> StoreResult<Document>;

    /// Create or replace the document at `id`. `created_at` survives a replace.
    async fn set(&self, collection: Collection, id: &str, data: Value) -> StoreResult<Document>;

    /// Shallow-merge `patch` into the document. `None` if it does not exist.
    async fn merge(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> StoreResult<Option<Document>>;

    /// Remove a document. Returns whether it existed.
    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<bool>;

    /// Remove every document of a collection. Returns how many were removed.
    async fn clear(&self, collection: Collection) -> StoreResult<u64>;

    /// Number of documents in a collection.
    async fn count(&self, collection: Collection) -> StoreResult<u64>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> StoreResult<()>;
}

/// Reject non-object bodies before they reach a backend.
pub(crate) fn ensure_object(collection: Collection, data: &Value) -> StoreResult<()> {
    if data.is_object() {
        Ok(())
    } else {
        Err(StoreError::NotAnObject { collection })
    }
}
