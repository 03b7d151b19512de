//! Document backend trait definition.

use crate::document::{Document, Filter};
use crate::error::StoreResult;
use async_trait::async_trait;

/// A document store backend for tabledb.
///
/// Backends hold named collections of documents and expose a minimal
/// operation set over them. They know nothing about tables, columns,
/// schemas, or sequences - the adapter owns that interpretation.
///
/// # Invariants
///
/// - `insert` echoes the stored document, identity field included
/// - `find_and_increment` is atomic: no two concurrent calls against the
///   same document ever observe the same pre-increment value
/// - `ensure_unique_index` is idempotent for an index of the same shape
/// - Backends must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing and embedded use
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Inserts a document into a collection.
    ///
    /// Assigns an `_id` identity if the document does not carry one, and
    /// returns the document as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if a unique index rejects the document or the
    /// store is unavailable.
    async fn insert(&self, collection: &str, document: Document) -> StoreResult<Document>;

    /// Returns all documents in a collection matching the filter.
    ///
    /// The empty filter matches every document.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    async fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>>;

    /// Returns the first document matching the filter, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>>;

    /// Merges `patch` fields into every document matching the filter.
    ///
    /// Returns the number of documents updated.
    ///
    /// # Errors
    ///
    /// Returns an error if a unique index rejects the patched document or
    /// the store is unavailable.
    async fn update(&self, collection: &str, filter: &Filter, patch: &Document)
        -> StoreResult<u64>;

    /// Removes every document matching the filter.
    ///
    /// Returns the number of documents removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    async fn remove(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;

    /// Atomically adds one to an integer field of the first document
    /// matching the filter.
    ///
    /// Returns the field's value from **before** the increment, or `None`
    /// when no document matches. This is the store's native atomic
    /// read-modify-write: callers rely on it instead of process-local
    /// locking so that independent processes sharing the store never
    /// collide.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    async fn find_and_increment(
        &self,
        collection: &str,
        filter: &Filter,
        field: &str,
    ) -> StoreResult<Option<i64>>;

    /// Declares a unique index on a field of a collection.
    ///
    /// Idempotent: re-declaring an index of the same shape succeeds
    /// without side effect. Returns an index identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if existing data conflicts with the index or the
    /// store is unavailable.
    async fn ensure_unique_index(&self, collection: &str, field: &str) -> StoreResult<String>;

    /// Probes reachability of the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    async fn ping(&self) -> StoreResult<()>;

    /// Releases the connection to the store.
    ///
    /// Idempotent. Operations after `close` fail with
    /// [`crate::StoreError::Closed`].
    ///
    /// # Errors
    ///
    /// Returns an error if releasing the connection fails.
    async fn close(&self) -> StoreResult<()>;
}
