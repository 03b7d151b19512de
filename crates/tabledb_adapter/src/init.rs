//! Schema initialization.
//!
//! Walks the declarative schema once at startup and materializes the
//! per-table invariants it declares: a bootstrapped sequence for every
//! auto-increment column and a unique index for every unique column. All
//! setup tasks run concurrently under a single [`FanOut`] join; the first
//! failure aborts initialization as a whole.

use crate::counters::{Counter, CounterTable};
use crate::error::AdapterResult;
use crate::index::IndexEnforcer;
use crate::join::FanOut;
use crate::schema::Schema;
use crate::sequence::SequenceAllocator;
use std::sync::Arc;
use tabledb_store::DocumentBackend;
use tracing::{debug, info};

/// Outcome of one setup task.
enum Setup {
    /// A sequence was bootstrapped; the counter binding is ready.
    Counter(Counter),
    /// A unique index was ensured.
    Index,
}

/// Materializes the invariants declared by a schema.
#[derive(Debug)]
pub struct SchemaInitializer {
    sequences: SequenceAllocator,
    indexes: IndexEnforcer,
}

impl SchemaInitializer {
    /// Creates an initializer over the given backend.
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            sequences: SequenceAllocator::new(Arc::clone(&backend)),
            indexes: IndexEnforcer::new(backend),
        }
    }

    /// Runs every setup task the schema calls for and returns the
    /// resulting counter bindings.
    ///
    /// One task is registered per recognized column flag: auto-increment
    /// columns bootstrap their sequence and yield a [`Counter`]; unique
    /// columns declare their index. Unrecognized flags are ignored for
    /// forward compatibility. An empty schema completes immediately.
    ///
    /// # Errors
    ///
    /// Returns the first error any setup task reports. On failure no
    /// counter table is produced - there is no partial-success
    /// continuation.
    pub async fn initialize(&self, schema: &Schema) -> AdapterResult<CounterTable> {
        let mut setup = FanOut::new();

        for (table, table_schema) in &schema.tables {
            for (column, spec) in &table_schema.columns {
                if spec.is_auto_increment() {
                    let sequences = self.sequences.clone();
                    let table = table.clone();
                    let column = column.clone();
                    setup.spawn(async move {
                        sequences.ensure(&table, &column).await?;
                        Ok(Setup::Counter(Counter::new(sequences, table, column)))
                    });
                }
                if spec.is_unique() {
                    let indexes = self.indexes.clone();
                    let table = table.clone();
                    let column = column.clone();
                    setup.spawn(async move {
                        indexes.ensure_unique(&table, &column).await?;
                        Ok(Setup::Index)
                    });
                }
            }
        }

        debug!(tasks = setup.len(), "running schema setup");
        let outcomes = setup.join().await?;

        let mut counters = CounterTable::default();
        for outcome in outcomes {
            if let Setup::Counter(counter) = outcome {
                counters.install(counter);
            }
        }
        info!(
            tables = schema.tables.len(),
            counters = counters.len(),
            "schema initialization complete"
        );
        Ok(counters)
    }
}
