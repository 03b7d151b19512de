//! # tabledb Store
//!
//! Document store abstraction for tabledb.
//!
//! This crate provides the lowest-level storage abstraction for the
//! adapter. Backends are **document stores**: they hold named collections
//! of JSON documents and expose a small set of operations over them. The
//! adapter owns all schema interpretation - backends do not understand
//! tables, columns, or sequences.
//!
//! ## Design Principles
//!
//! - Backends are plain document stores (insert, find, update, remove)
//! - One native atomic primitive: [`DocumentBackend::find_and_increment`]
//! - Uniqueness is enforced by the backend via declared unique indexes
//! - Must be `Send + Sync` for concurrent access
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and embedded use
//!
//! ## Example
//!
//! ```rust
//! use tabledb_store::{document, DocumentBackend, InMemoryBackend};
//! use serde_json::json;
//!
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # rt.block_on(async {
//! let backend = InMemoryBackend::new();
//! let saved = backend
//!     .insert("users", document(json!({ "name": "ada" })))
//!     .await
//!     .unwrap();
//! assert!(saved.contains_key("_id"));
//! # });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod document;
mod error;
mod memory;

pub use backend::DocumentBackend;
pub use document::{document, matches, Document, Filter, Value};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryBackend;
