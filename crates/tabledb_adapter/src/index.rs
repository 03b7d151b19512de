//! Unique-index enforcement.

use crate::error::{AdapterError, AdapterResult};
use std::sync::Arc;
use tabledb_store::DocumentBackend;
use tracing::debug;

/// Declares uniqueness constraints on table columns.
#[derive(Clone)]
pub struct IndexEnforcer {
    backend: Arc<dyn DocumentBackend>,
}

impl IndexEnforcer {
    /// Creates an enforcer over the given backend.
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    /// Ensures a uniqueness constraint exists on a column.
    ///
    /// Idempotent: re-declaring a constraint of the same shape succeeds
    /// without side effect. Returns the store's index identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Constraint`] if the store refuses the
    /// declaration or is unreachable.
    pub async fn ensure_unique(&self, table: &str, column: &str) -> AdapterResult<String> {
        match self.backend.ensure_unique_index(table, column).await {
            Ok(index_name) => {
                debug!(table, column, index = %index_name, "unique index ensured");
                Ok(index_name)
            }
            Err(err) => Err(AdapterError::constraint(table, column, err.to_string())),
        }
    }
}

impl std::fmt::Debug for IndexEnforcer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexEnforcer").finish_non_exhaustive()
    }
}
