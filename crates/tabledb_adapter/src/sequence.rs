//! Persistent sequence allocation for auto-increment columns.
//!
//! Each (table, column) pair owns one counter document, stored in a
//! reserved collection so it can never collide with a real table. The
//! counter is bootstrapped once and afterwards only mutated through the
//! store's atomic increment, which keeps allocations race-free even when
//! several adapter processes share the same store.

use crate::error::{AdapterError, AdapterResult};
use std::sync::Arc;
use tabledb_store::{Document, DocumentBackend, Filter, Value};
use tracing::debug;

/// Field holding the counter value inside a sequence document.
const SEQ_FIELD: &str = "seq";

/// First value a freshly bootstrapped sequence hands out.
const SEQ_START: i64 = 1;

/// Returns the reserved collection name for a sequence.
///
/// The delimiter-wrapped shape cannot collide with a caller-supplied
/// table name.
#[must_use]
pub fn sequence_collection(table: &str, column: &str) -> String {
    format!("__{table}_{column}__")
}

fn sequence_filter(column: &str) -> Filter {
    let mut filter = Filter::new();
    filter.insert("_id".to_string(), Value::String(column.to_string()));
    filter
}

/// Allocates values from persisted per-column sequences.
#[derive(Clone)]
pub struct SequenceAllocator {
    backend: Arc<dyn DocumentBackend>,
}

impl SequenceAllocator {
    /// Creates an allocator over the given backend.
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    /// Bootstraps the sequence for a (table, column) pair.
    ///
    /// Existence-checked: if the sequence document is already present,
    /// nothing is written. Safe to repeat.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    pub async fn ensure(&self, table: &str, column: &str) -> AdapterResult<()> {
        let collection = sequence_collection(table, column);
        let filter = sequence_filter(column);

        if self.backend.find_one(&collection, &filter).await?.is_some() {
            return Ok(());
        }

        let mut seed = Document::new();
        seed.insert("_id".to_string(), Value::String(column.to_string()));
        seed.insert(SEQ_FIELD.to_string(), Value::from(SEQ_START));
        self.backend.insert(&collection, seed).await?;
        debug!(table, column, "bootstrapped sequence");
        Ok(())
    }

    /// Allocates the next value from a sequence.
    ///
    /// Delegates atomicity to the store's find-and-increment, so no two
    /// callers - in this process or any other - ever receive the same
    /// value. Values are strictly increasing; the first allocation after
    /// bootstrap yields 1.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Allocation`] if the sequence document is
    /// missing (bootstrap never ran) or the increment fails.
    pub async fn next_value(&self, table: &str, column: &str) -> AdapterResult<i64> {
        let collection = sequence_collection(table, column);
        let filter = sequence_filter(column);

        match self
            .backend
            .find_and_increment(&collection, &filter, SEQ_FIELD)
            .await
        {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(AdapterError::allocation(
                table,
                column,
                "sequence document missing",
            )),
            Err(err) => Err(AdapterError::allocation(table, column, err.to_string())),
        }
    }
}

impl std::fmt::Debug for SequenceAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceAllocator").finish_non_exhaustive()
    }
}
