//! In-memory document store.
//!
//! Used by tests and by `BEERBRO_STORE=memory` for local development.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;

use beerbro_core::types::id::new_document_key;

use super::store::{Collection, Document, DocumentStore, StoreResult, ensure_object};

#[derive(Debug, Clone)]
struct Entry {
    document: Document,
    /// Insertion counter, breaks ties between equal timestamps.
    seq: u64,
}

#[derive(Debug, Default)]
struct Inner {
    collections: HashMap<Collection, HashMap<String, Entry>>,
    next_seq: u64,
}

impl Inner {
    fn sorted(&self, collection: Collection, keep: impl Fn(&Document) -> bool) -> Vec<Document> {
        let mut entries: Vec<&Entry> = self
            .collections
            .get(&collection)
            .map(|docs| docs.values().filter(|e| keep(&e.document)).collect())
            .unwrap_or_default();
        entries.sort_by(|a, b| {
            b.document
                .created_at
                .cmp(&a.document.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        entries.into_iter().map(|e| e.document.clone()).collect()
    }

    fn upsert(&mut self, collection: Collection, id: String, data: Value) -> Document {
        let now = Utc::now();
        self.next_seq += 1;
        let seq = self.next_seq;
        let docs = self.collections.entry(collection).or_default();
        let (created_at, seq) = docs
            .get(&id)
            .map_or((now, seq), |e| (e.document.created_at, e.seq));
        let document = Document {
            id: id.clone(),
            data,
            created_at,
            updated_at: now,
        };
        docs.insert(
            id,
            Entry {
                document: document.clone(),
                seq,
            },
        );
        document
    }
}

/// Document store backed by a process-local map.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    inner: RwLock<Inner>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let inner = self.inner.read().await;
        Ok(inner
            .collections
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .map(|e| e.document.clone()))
    }

    async fn list(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        Ok(self.inner.read().await.sorted(collection, |_| true))
    }

    async fn list_where(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>> {
        Ok(self
            .inner
            .read()
            .await
            .sorted(collection, |doc| doc.data.get(field) == Some(value)))
    }

    async fn insert(&self, collection: Collection, data: Value) -> StoreResult<Document> {
        ensure_object(collection, &data)?;
        let mut inner = self.inner.write().await;
        Ok(inner.upsert(collection, new_document_key(), data))
    }

    async fn set(&self, collection: Collection, id: &str, data: Value) -> StoreResult<Document> {
        ensure_object(collection, &data)?;
        let mut inner = self.inner.write().await;
        Ok(inner.upsert(collection, id.to_owned(), data))
    }

    async fn merge(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> StoreResult<Option<Document>> {
        ensure_object(collection, &patch)?;
        let mut inner = self.inner.write().await;
        let Some(mut data) = inner
            .collections
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .map(|e| e.document.data.clone())
        else {
            return Ok(None);
        };
        if let (Value::Object(target), Value::Object(fields)) = (&mut data, patch) {
            target.extend(fields);
        }
        Ok(Some(inner.upsert(collection, id.to_owned(), data)))
    }

    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .collections
            .get_mut(&collection)
            .is_some_and(|docs| docs.remove(id).is_some()))
    }

    async fn clear(&self, collection: Collection) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        let removed = inner
            .collections
            .remove(&collection)
            .map_or(0, |docs| docs.len());
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }

    async fn count(&self, collection: Collection) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        let count = inner.collections.get(&collection).map_or(0, HashMap::len);
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
