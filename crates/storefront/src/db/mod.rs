//! Persistence for the storefront.
//!
//! # Document store
//!
//! Records are JSON documents grouped into collections (see
//! [`store::Collection`]). Two backends implement [`DocumentStore`]:
//!
//! - [`PgDocumentStore`] - `storefront.document` table, `JSONB` bodies
//! - [`MemoryDocumentStore`] - process-local map for tests and local dev
//!
//! Typed repositories in this module turn documents into domain records.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p beerbro-cli -- migrate
//! ```

pub mod categories;
pub mod locations;
pub mod memory;
pub mod orders;
pub mod postgres;
pub mod products;
pub mod store;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::CategoryRepository;
pub use locations::LocationRepository;
pub use memory::MemoryDocumentStore;
pub use orders::OrderRepository;
pub use postgres::PgDocumentStore;
pub use products::ProductRepository;
pub use store::{Collection, Document, DocumentStore, StoreError};
pub use users::UserRepository;

/// Embedded SQL migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Store backend error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A stored document does not match its record type.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Uniqueness violation (e.g., duplicate email or slug).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Decode a document into a record.
///
/// The document id is written into `id_key` and the store timestamps into
/// `createdAt` / `updatedAt` before deserializing.
pub(crate) fn decode<T: DeserializeOwned>(
    collection: Collection,
    id_key: &str,
    document: Document,
) -> Result<T, RepositoryError> {
    let Document {
        id,
        mut data,
        created_at,
        updated_at,
    } = document;
    if let Value::Object(fields) = &mut data {
        fields.insert(id_key.to_owned(), json!(id));
        fields.insert("createdAt".to_owned(), json!(created_at));
        fields.insert("updatedAt".to_owned(), json!(updated_at));
    }
    serde_json::from_value(data)
        .map_err(|e| RepositoryError::DataCorruption(format!("{collection}/{id}: {e}")))
}

/// Decode every document, failing on the first corrupt one.
pub(crate) fn decode_all<T: DeserializeOwned>(
    collection: Collection,
    id_key: &str,
    documents: Vec<Document>,
) -> Result<Vec<T>, RepositoryError> {
    documents
        .into_iter()
        .map(|doc| decode(collection, id_key, doc))
        .collect()
}
