//! Counter bindings produced by schema initialization.

use crate::error::AdapterResult;
use crate::sequence::SequenceAllocator;
use std::collections::HashMap;

/// A bound accessor for one auto-increment column.
///
/// Produced by schema initialization after the column's sequence has been
/// bootstrapped; calling [`Counter::next`] allocates the next value from
/// that sequence.
#[derive(Debug, Clone)]
pub struct Counter {
    allocator: SequenceAllocator,
    table: String,
    column: String,
}

impl Counter {
    pub(crate) fn new(
        allocator: SequenceAllocator,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self {
            allocator,
            table: table.into(),
            column: column.into(),
        }
    }

    /// The column this counter populates.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Allocates the next value for the column.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation fails.
    pub async fn next(&self) -> AdapterResult<i64> {
        self.allocator.next_value(&self.table, &self.column).await
    }
}

/// All counter bindings for one adapter instance.
///
/// Built once during initialization and handed to the record store as an
/// immutable snapshot; read on every save, never mutated afterwards.
#[derive(Debug, Default)]
pub struct CounterTable {
    tables: HashMap<String, Vec<Counter>>,
}

impl CounterTable {
    pub(crate) fn install(&mut self, counter: Counter) {
        self.tables
            .entry(counter.table.clone())
            .or_default()
            .push(counter);
    }

    /// Returns the counters bound for a table, possibly none.
    pub fn counters_for(&self, table: &str) -> impl Iterator<Item = &Counter> {
        self.tables.get(table).into_iter().flatten()
    }

    /// Returns the total number of bound counters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    /// Returns true if no counter is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
