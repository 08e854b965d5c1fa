//! `PostgreSQL` document store.
//!
//! All collections share the `storefront.document` table; `data` is `JSONB`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use sqlx::types::Json;

use beerbro_core::types::id::new_document_key;

use super::store::{Collection, Document, DocumentStore, StoreResult, ensure_object};

const COLUMNS: &str = "id, data, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    data: Json<Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id,
            data: row.data.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Document store backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool (shared with the session store).
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {COLUMNS} FROM storefront.document WHERE collection = $1 AND id = $2"
        ))
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Document::from))
    }

    async fn list(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {COLUMNS} FROM storefront.document WHERE collection = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn list_where(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {COLUMNS} FROM storefront.document \
             WHERE collection = $1 AND data -> $2::text = $3::jsonb \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(collection.as_str())
        .bind(field)
        .bind(Json(value))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn insert(&self, collection: Collection, data: Value) -> StoreResult<Document> {
        ensure_object(collection, &data)?;
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "INSERT INTO storefront.document (collection, id, data) VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        ))
        .bind(collection.as_str())
        .bind(new_document_key())
        .bind(Json(data))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn set(&self, collection: Collection, id: &str, data: Value) -> StoreResult<Document> {
        ensure_object(collection, &data)?;
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "INSERT INTO storefront.document (collection, id, data) VALUES ($1, $2, $3) \
             ON CONFLICT (collection, id) DO UPDATE SET data = EXCLUDED.data, updated_at = now() \
             RETURNING {COLUMNS}"
        ))
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(data))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn merge(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> StoreResult<Option<Document>> {
        ensure_object(collection, &patch)?;
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "UPDATE storefront.document SET data = data || $3, updated_at = now() \
             WHERE collection = $1 AND id = $2 RETURNING {COLUMNS}"
        ))
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(patch))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Document::from))
    }

    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<bool> {
        let result =
            sqlx::query("DELETE FROM storefront.document WHERE collection = $1 AND id = $2")
                .bind(collection.as_str())
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self, collection: Collection) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM storefront.document WHERE collection = $1")
            .bind(collection.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn count(&self, collection: Collection) -> StoreResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM storefront.document WHERE collection = $1")
                .bind(collection.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
