//! Document store boundary

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::Result;

/// Document fields, keyed by field name
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Key/value document store
///
/// `upsert` has full-document overwrite semantics: fields not present in
/// the new map are removed from the stored document.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates or replaces document `id` in `collection`
    async fn upsert(&self, collection: &str, id: &str, fields: Fields) -> Result<()>;
}

/// In-memory document store
///
/// Used when no Firestore project is configured, and in tests.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    documents: Arc<Mutex<HashMap<(String, String), Fields>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the stored document, if any
    pub fn get(&self, collection: &str, id: &str) -> Option<Fields> {
        let documents = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        documents
            .get(&(collection.to_string(), id.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn upsert(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        let mut documents = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        documents.insert((collection.to_string(), id.to_string()), fields);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_upsert_overwrites_whole_document() {
        let store = InMemoryDocumentStore::new();
        assert!(store.is_empty());

        store
            .upsert("products", "p1", fields(json!({ "title": "a", "niche": "b" })))
            .await
            .unwrap();
        store
            .upsert("products", "p1", fields(json!({ "title": "c" })))
            .await
            .unwrap();

        let doc = store.get("products", "p1").unwrap();
        assert_eq!(doc["title"], "c");
        assert!(!doc.contains_key("niche"));
        assert_eq!(store.len(), 1);
        assert!(store.get("introductions", "p1").is_none());
    }
}
