//! # tabledb Adapter
//!
//! Schema-driven adapter over a document store.
//!
//! The adapter reads a declarative schema (tables, columns, column
//! flags), materializes the invariants it declares - one persisted
//! sequence per auto-increment column, one unique index per unique
//! column - and exposes a CRUD surface that respects them: every save
//! resolves the target table's sequences atomically before inserting.
//!
//! This crate provides:
//! - Declarative [`Schema`] model with forward-compatible column flags
//! - [`FanOut`] join for concurrent setup and allocation tasks
//! - Race-free sequence allocation delegated to the store's atomic
//!   increment, safe across adapter processes sharing one store
//! - [`Adapter`] façade with connection bootstrap and migration stubs

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod adapter;
mod config;
mod counters;
mod error;
mod index;
mod init;
mod join;
mod records;
mod schema;
mod sequence;

pub use adapter::Adapter;
pub use config::AdapterConfig;
pub use counters::{Counter, CounterTable};
pub use error::{AdapterError, AdapterResult};
pub use index::IndexEnforcer;
pub use init::SchemaInitializer;
pub use join::FanOut;
pub use records::{Query, RecordStore};
pub use schema::{ColumnSpec, Schema, TableSchema, AUTO_INCREMENT, UNIQUE};
pub use sequence::{sequence_collection, SequenceAllocator};
