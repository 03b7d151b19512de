//! In-memory document backend for testing and embedded use.

use crate::backend::DocumentBackend;
use crate::document::{matches, Document, Filter, Value};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// The reserved identity field.
const ID_FIELD: &str = "_id";

#[derive(Debug, Default)]
struct Collection {
    documents: Vec<Document>,
    unique_fields: BTreeSet<String>,
}

impl Collection {
    /// Fields whose values must be unique across the collection.
    ///
    /// The identity field is always implicitly unique.
    fn unique_checked_fields(&self) -> impl Iterator<Item = &str> {
        std::iter::once(ID_FIELD).chain(self.unique_fields.iter().map(String::as_str))
    }

    /// Checks that `candidate` does not collide with any document other
    /// than the one at `skip` on a unique field.
    fn check_unique(
        &self,
        name: &str,
        candidate: &Document,
        skip: Option<usize>,
    ) -> StoreResult<()> {
        for field in self.unique_checked_fields() {
            let Some(value) = candidate.get(field) else {
                continue;
            };
            let collision = self
                .documents
                .iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != skip)
                .any(|(_, existing)| existing.get(field) == Some(value));
            if collision {
                return Err(StoreError::duplicate_key(name, field));
            }
        }
        Ok(())
    }
}

/// An in-memory document backend.
///
/// Holds all collections in process memory. Suitable for unit tests,
/// integration tests, and ephemeral embedded databases.
///
/// # Thread Safety
///
/// All operations take `&self` and synchronize on an internal lock, so
/// the backend can be shared across tasks. `find_and_increment` runs
/// entirely under the lock, which makes it atomic with respect to every
/// other operation.
///
/// # Fault Injection
///
/// [`InMemoryBackend::set_offline`] makes every subsequent operation fail
/// with [`StoreError::Unreachable`], which lets tests exercise the
/// unreachable-store paths of the adapter.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    collections: Mutex<HashMap<String, Collection>>,
    offline: AtomicBool,
    closed: AtomicBool,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates losing (or regaining) the connection to the store.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Returns the number of documents in a collection.
    ///
    /// Missing collections count as empty. Useful for assertions.
    #[must_use]
    pub fn collection_len(&self, name: &str) -> usize {
        self.collections
            .lock()
            .get(name)
            .map_or(0, |c| c.documents.len())
    }

    /// Returns the names of all collections that have been touched.
    #[must_use]
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.lock().keys().cloned().collect();
        names.sort();
        names
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::unreachable("in-memory backend is offline"));
        }
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentBackend for InMemoryBackend {
    async fn insert(&self, collection: &str, mut document: Document) -> StoreResult<Document> {
        self.check_available()?;
        let mut collections = self.collections.lock();
        let coll = collections.entry(collection.to_string()).or_default();

        if !document.contains_key(ID_FIELD) {
            document.insert(
                ID_FIELD.to_string(),
                Value::String(Uuid::new_v4().to_string()),
            );
        }
        coll.check_unique(collection, &document, None)?;
        coll.documents.push(document.clone());
        Ok(document)
    }

    async fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>> {
        self.check_available()?;
        let collections = self.collections.lock();
        let Some(coll) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(coll
            .documents
            .iter()
            .filter(|doc| matches(doc, filter))
            .cloned()
            .collect())
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        self.check_available()?;
        let collections = self.collections.lock();
        Ok(collections.get(collection).and_then(|coll| {
            coll.documents
                .iter()
                .find(|doc| matches(doc, filter))
                .cloned()
        }))
    }

    async fn update(
        &self,
        collection: &str,
        filter: &Filter,
        patch: &Document,
    ) -> StoreResult<u64> {
        self.check_available()?;
        let mut collections = self.collections.lock();
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let targets: Vec<usize> = coll
            .documents
            .iter()
            .enumerate()
            .filter(|(_, doc)| matches(doc, filter))
            .map(|(i, _)| i)
            .collect();

        for &i in &targets {
            let mut patched = coll.documents[i].clone();
            for (field, value) in patch {
                patched.insert(field.clone(), value.clone());
            }
            coll.check_unique(collection, &patched, Some(i))?;
            coll.documents[i] = patched;
        }
        Ok(targets.len() as u64)
    }

    async fn remove(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        self.check_available()?;
        let mut collections = self.collections.lock();
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = coll.documents.len();
        coll.documents.retain(|doc| !matches(doc, filter));
        Ok((before - coll.documents.len()) as u64)
    }

    async fn find_and_increment(
        &self,
        collection: &str,
        filter: &Filter,
        field: &str,
    ) -> StoreResult<Option<i64>> {
        self.check_available()?;
        let mut collections = self.collections.lock();
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(doc) = coll.documents.iter_mut().find(|doc| matches(doc, filter)) else {
            return Ok(None);
        };
        let current = match doc.get(field) {
            Some(value) => value.as_i64().ok_or_else(|| {
                StoreError::InvalidDocument(format!("field {field} is not an integer"))
            })?,
            None => 0,
        };
        doc.insert(field.to_string(), Value::from(current + 1));
        Ok(Some(current))
    }

    async fn ensure_unique_index(&self, collection: &str, field: &str) -> StoreResult<String> {
        self.check_available()?;
        let mut collections = self.collections.lock();
        let coll = collections.entry(collection.to_string()).or_default();
        let index_name = format!("{field}_1");

        if coll.unique_fields.contains(field) {
            return Ok(index_name);
        }

        // Existing data must already satisfy the index.
        let mut seen: Vec<&Value> = Vec::new();
        for doc in &coll.documents {
            if let Some(value) = doc.get(field) {
                if seen.contains(&value) {
                    return Err(StoreError::index_conflict(
                        collection,
                        field,
                        "existing documents contain duplicate values",
                    ));
                }
                seen.push(value);
            }
        }

        coll.unique_fields.insert(field.to_string());
        tracing::debug!(collection, field, "declared unique index");
        Ok(index_name)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }

    async fn close(&self) -> StoreResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::document;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn insert_assigns_identity() {
        let backend = InMemoryBackend::new();
        let saved = backend
            .insert("users", document(json!({ "name": "ada" })))
            .await
            .unwrap();
        assert!(saved.get("_id").unwrap().is_string());
        assert_eq!(backend.collection_len("users"), 1);
    }

    #[tokio::test]
    async fn insert_keeps_caller_identity() {
        let backend = InMemoryBackend::new();
        let saved = backend
            .insert("seq", document(json!({ "_id": "id", "seq": 1 })))
            .await
            .unwrap();
        assert_eq!(saved.get("_id"), Some(&json!("id")));
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_identity() {
        let backend = InMemoryBackend::new();
        backend
            .insert("seq", document(json!({ "_id": "id" })))
            .await
            .unwrap();
        let result = backend.insert("seq", document(json!({ "_id": "id" }))).await;
        assert!(matches!(result, Err(StoreError::DuplicateKey { .. })));
        assert_eq!(backend.collection_len("seq"), 1);
    }

    #[tokio::test]
    async fn find_with_empty_filter_returns_all() {
        let backend = InMemoryBackend::new();
        for name in ["ada", "grace", "edsger"] {
            backend
                .insert("users", document(json!({ "name": name })))
                .await
                .unwrap();
        }
        let all = backend.find("users", &Filter::new()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn find_on_missing_collection_is_empty() {
        let backend = InMemoryBackend::new();
        let all = backend.find("nope", &Filter::new()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn find_one_returns_first_match() {
        let backend = InMemoryBackend::new();
        backend
            .insert("users", document(json!({ "name": "ada", "rank": 1 })))
            .await
            .unwrap();
        backend
            .insert("users", document(json!({ "name": "ada", "rank": 2 })))
            .await
            .unwrap();

        let found = backend
            .find_one("users", &document(json!({ "name": "ada" })))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.get("rank"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn update_merges_patch_fields() {
        let backend = InMemoryBackend::new();
        backend
            .insert("users", document(json!({ "id": 1, "name": "ada" })))
            .await
            .unwrap();

        let updated = backend
            .update(
                "users",
                &document(json!({ "id": 1 })),
                &document(json!({ "name": "lovelace", "active": true })),
            )
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let doc = backend
            .find_one("users", &document(json!({ "id": 1 })))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.get("name"), Some(&json!("lovelace")));
        assert_eq!(doc.get("active"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn update_respects_unique_index() {
        let backend = InMemoryBackend::new();
        backend.ensure_unique_index("users", "email").await.unwrap();
        backend
            .insert("users", document(json!({ "id": 1, "email": "a@x.com" })))
            .await
            .unwrap();
        backend
            .insert("users", document(json!({ "id": 2, "email": "b@x.com" })))
            .await
            .unwrap();

        let result = backend
            .update(
                "users",
                &document(json!({ "id": 2 })),
                &document(json!({ "email": "a@x.com" })),
            )
            .await;
        assert!(matches!(result, Err(StoreError::DuplicateKey { .. })));
    }

    #[tokio::test]
    async fn remove_returns_removed_count() {
        let backend = InMemoryBackend::new();
        for i in 0..3 {
            backend
                .insert("users", document(json!({ "group": i % 2 })))
                .await
                .unwrap();
        }
        let removed = backend
            .remove("users", &document(json!({ "group": 0 })))
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(backend.collection_len("users"), 1);
    }

    #[tokio::test]
    async fn find_and_increment_returns_pre_increment_value() {
        let backend = InMemoryBackend::new();
        backend
            .insert("seq", document(json!({ "_id": "id", "seq": 5 })))
            .await
            .unwrap();

        let filter = document(json!({ "_id": "id" }));
        let value = backend
            .find_and_increment("seq", &filter, "seq")
            .await
            .unwrap();
        assert_eq!(value, Some(5));

        let doc = backend.find_one("seq", &filter).await.unwrap().unwrap();
        assert_eq!(doc.get("seq"), Some(&json!(6)));
    }

    #[tokio::test]
    async fn find_and_increment_without_match_is_none() {
        let backend = InMemoryBackend::new();
        let value = backend
            .find_and_increment("seq", &document(json!({ "_id": "id" })), "seq")
            .await
            .unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_never_collide() {
        let backend = Arc::new(InMemoryBackend::new());
        backend
            .insert("seq", document(json!({ "_id": "id", "seq": 1 })))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..32 {
            let backend = Arc::clone(&backend);
            handles.push(tokio::spawn(async move {
                backend
                    .find_and_increment("seq", &document(json!({ "_id": "id" })), "seq")
                    .await
                    .unwrap()
                    .unwrap()
            }));
        }

        let mut values = Vec::new();
        for handle in handles {
            values.push(handle.await.unwrap());
        }
        values.sort_unstable();
        let expected: Vec<i64> = (1..=32).collect();
        assert_eq!(values, expected);
    }

    #[tokio::test]
    async fn unique_index_is_idempotent() {
        let backend = InMemoryBackend::new();
        let first = backend.ensure_unique_index("users", "email").await.unwrap();
        let second = backend.ensure_unique_index("users", "email").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "email_1");
    }

    #[tokio::test]
    async fn unique_index_rejects_existing_duplicates() {
        let backend = InMemoryBackend::new();
        backend
            .insert("users", document(json!({ "email": "a@x.com" })))
            .await
            .unwrap();
        backend
            .insert("users", document(json!({ "email": "a@x.com" })))
            .await
            .unwrap();

        let result = backend.ensure_unique_index("users", "email").await;
        assert!(matches!(result, Err(StoreError::IndexConflict { .. })));
    }

    #[tokio::test]
    async fn unique_index_rejects_duplicate_insert() {
        let backend = InMemoryBackend::new();
        backend.ensure_unique_index("users", "email").await.unwrap();
        backend
            .insert("users", document(json!({ "email": "a@x.com" })))
            .await
            .unwrap();

        let result = backend
            .insert("users", document(json!({ "email": "a@x.com" })))
            .await;
        assert!(matches!(result, Err(StoreError::DuplicateKey { .. })));
        assert_eq!(backend.collection_len("users"), 1);
    }

    #[tokio::test]
    async fn offline_backend_is_unreachable() {
        let backend = InMemoryBackend::new();
        backend.set_offline(true);
        let result = backend.ping().await;
        assert!(matches!(result, Err(StoreError::Unreachable(_))));

        backend.set_offline(false);
        assert!(backend.ping().await.is_ok());
    }

    #[tokio::test]
    async fn closed_backend_rejects_operations() {
        let backend = InMemoryBackend::new();
        backend.close().await.unwrap();
        // close is idempotent
        backend.close().await.unwrap();

        let result = backend.find("users", &Filter::new()).await;
        assert!(matches!(result, Err(StoreError::Closed)));
    }
}
