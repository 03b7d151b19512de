//! Error types for the adapter.

use tabledb_store::StoreError;
use thiserror::Error;

/// Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Errors that can occur in adapter operations.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The document store cannot be reached.
    ///
    /// Fatal at connect time; surfaced as-is for later operations.
    #[error("connection error: {message}")]
    Connection {
        /// Description of the failure.
        message: String,
    },

    /// Sequence allocation failed.
    #[error("sequence allocation failed for {table}.{column}: {message}")]
    Allocation {
        /// Table owning the sequence.
        table: String,
        /// Auto-increment column.
        column: String,
        /// Description of the failure.
        message: String,
    },

    /// A uniqueness constraint could not be declared or was violated.
    #[error("uniqueness constraint failed for {table}.{column}: {message}")]
    Constraint {
        /// Table owning the constraint.
        table: String,
        /// Unique column.
        column: String,
        /// Description of the failure.
        message: String,
    },

    /// A single-record lookup found nothing.
    #[error("no matching record in table {table}")]
    NotFound {
        /// Table that was searched.
        table: String,
    },

    /// A schema-migration stub was invoked.
    #[error("{operation} is not implemented")]
    NotImplemented {
        /// Name of the unimplemented operation.
        operation: &'static str,
    },

    /// Any other store-level failure.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl AdapterError {
    /// Creates a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates an allocation error.
    pub fn allocation(
        table: impl Into<String>,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Allocation {
            table: table.into(),
            column: column.into(),
            message: message.into(),
        }
    }

    /// Creates a constraint error.
    pub fn constraint(
        table: impl Into<String>,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Constraint {
            table: table.into(),
            column: column.into(),
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(table: impl Into<String>) -> Self {
        Self::NotFound {
            table: table.into(),
        }
    }

    /// Creates a not-implemented error.
    pub fn not_implemented(operation: &'static str) -> Self {
        Self::NotImplemented { operation }
    }

    /// Returns true if the error is a missing-record lookup failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AdapterError::NotFound { .. })
    }
}

impl From<StoreError> for AdapterError {
    fn from(err: StoreError) -> Self {
        if err.is_unavailable() {
            return Self::Connection {
                message: err.to_string(),
            };
        }
        Self::Store(err)
    }
}
