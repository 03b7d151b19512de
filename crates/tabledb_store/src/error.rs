//! Error types for store operations.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store cannot be reached.
    #[error("store unreachable: {0}")]
    Unreachable(String),

    /// A unique index rejected a document.
    #[error("duplicate value for unique field {field} in collection {collection}")]
    DuplicateKey {
        /// Collection holding the unique index.
        collection: String,
        /// Field the index covers.
        field: String,
    },

    /// An index declaration conflicts with existing data or indexes.
    #[error("index conflict on {collection}.{field}: {message}")]
    IndexConflict {
        /// Collection the index was declared on.
        collection: String,
        /// Field the index covers.
        field: String,
        /// Description of the conflict.
        message: String,
    },

    /// The connection has been closed.
    #[error("store connection is closed")]
    Closed,

    /// The store rejected a document.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

impl StoreError {
    /// Creates an unreachable-store error.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable(message.into())
    }

    /// Creates a duplicate-key error.
    pub fn duplicate_key(collection: impl Into<String>, field: impl Into<String>) -> Self {
        Self::DuplicateKey {
            collection: collection.into(),
            field: field.into(),
        }
    }

    /// Creates an index-conflict error.
    pub fn index_conflict(
        collection: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::IndexConflict {
            collection: collection.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true if the error indicates the store is not available
    /// rather than a problem with the request itself.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unreachable(_) | StoreError::Closed)
    }
}
