//! Record-level CRUD surface.

use crate::counters::CounterTable;
use crate::error::{AdapterError, AdapterResult};
use crate::join::FanOut;
use std::sync::Arc;
use tabledb_store::{Document, DocumentBackend, Filter, StoreError, Value};
use tracing::debug;

/// A query envelope: an equality filter under `where`.
///
/// The default query has an empty filter and matches every record.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Query {
    /// The equality filter. Empty matches all.
    #[serde(rename = "where", default)]
    pub filter: Filter,
}

impl Query {
    /// A query matching every record.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// A query with the given equality filter.
    #[must_use]
    pub fn filtered(filter: Filter) -> Self {
        Self { filter }
    }
}

/// CRUD operations over tables, with sequence-backed saves.
///
/// Holds the immutable counter snapshot produced by initialization; on
/// every save the counters bound for the target table are resolved
/// concurrently before the insert runs.
pub struct RecordStore {
    backend: Arc<dyn DocumentBackend>,
    counters: Arc<CounterTable>,
}

impl RecordStore {
    /// Creates a record store over a backend and a counter snapshot.
    pub fn new(backend: Arc<dyn DocumentBackend>, counters: Arc<CounterTable>) -> Self {
        Self { backend, counters }
    }

    /// Saves a record into a table.
    ///
    /// Every auto-increment column bound for the table is populated from
    /// its sequence before the insert; the allocations run concurrently
    /// and the insert only happens once all of them succeed. A table with
    /// no counters inserts directly. On any allocation failure the insert
    /// never runs and the first error is returned.
    ///
    /// Returns the record as stored, identity included.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Allocation`] if a counter cannot be
    /// resolved, [`AdapterError::Constraint`] if a unique index rejects
    /// the record, or a connection error if the store is unavailable.
    pub async fn save(&self, table: &str, mut record: Document) -> AdapterResult<Document> {
        let mut allocations = FanOut::new();
        for counter in self.counters.counters_for(table) {
            let counter = counter.clone();
            allocations.spawn(async move {
                let value = counter.next().await?;
                Ok((counter.column().to_string(), value))
            });
        }

        // Zero counters degenerates to an immediate empty join.
        let allocated = allocations.join().await?;
        for (column, value) in allocated {
            debug!(table, column = %column, value, "allocated sequence value");
            record.insert(column, Value::from(value));
        }

        match self.backend.insert(table, record).await {
            Ok(saved) => Ok(saved),
            Err(StoreError::DuplicateKey { collection, field }) => Err(AdapterError::constraint(
                collection,
                field,
                "duplicate value for unique column",
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// Returns all records in a table matching a query.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    pub async fn find(&self, table: &str, query: &Query) -> AdapterResult<Vec<Document>> {
        Ok(self.backend.find(table, &query.filter).await?)
    }

    /// Returns the first record matching a query.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::NotFound`] if nothing matches.
    pub async fn find_one(&self, table: &str, query: &Query) -> AdapterResult<Document> {
        self.backend
            .find_one(table, &query.filter)
            .await?
            .ok_or_else(|| AdapterError::not_found(table))
    }

    /// Merges patch fields into the record identified by `id`, then
    /// returns the refreshed record.
    ///
    /// The re-read goes to the same backend handle the write used, so it
    /// observes the write.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::NotFound`] if no record carries the
    /// identity.
    pub async fn update(
        &self,
        table: &str,
        id: &Value,
        patch: &Document,
    ) -> AdapterResult<Document> {
        let mut filter = Filter::new();
        filter.insert("id".to_string(), id.clone());
        self.backend.update(table, &filter, patch).await?;
        self.find_one(table, &Query::filtered(filter)).await
    }

    /// Removes all records matching a query and returns their
    /// pre-removal snapshots.
    ///
    /// A query matching nothing succeeds with an empty result and no
    /// removal.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    pub async fn destroy(&self, table: &str, query: &Query) -> AdapterResult<Vec<Document>> {
        let snapshot = self.backend.find(table, &query.filter).await?;
        if snapshot.is_empty() {
            return Ok(snapshot);
        }
        self.backend.remove(table, &query.filter).await?;
        Ok(snapshot)
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("counters", &self.counters.len())
            .finish_non_exhaustive()
    }
}
