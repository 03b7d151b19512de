//! The adapter façade.
//!
//! Ties connection bootstrap, schema initialization, and the CRUD
//! surface together behind one handle, and carries the unimplemented
//! schema-migration stubs.

use crate::config::AdapterConfig;
use crate::counters::CounterTable;
use crate::error::{AdapterError, AdapterResult};
use crate::init::SchemaInitializer;
use crate::records::{Query, RecordStore};
use crate::schema::{ColumnSpec, Schema, TableSchema};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tabledb_store::{Document, DocumentBackend, Value};
use tracing::{debug, info, warn};

/// A schema-driven adapter over a document store.
///
/// Connecting pings the store once (unreachable stores are fatal at
/// startup), runs schema initialization if a schema was supplied, and
/// then exposes the CRUD surface. The counter bindings produced by
/// initialization are an immutable snapshot owned by the adapter; every
/// [`Adapter::save`] consults them.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use serde_json::json;
/// use tabledb_adapter::{
///     Adapter, AdapterConfig, ColumnSpec, Schema, TableSchema, AUTO_INCREMENT,
/// };
/// use tabledb_store::{document, DocumentBackend, InMemoryBackend};
///
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # rt.block_on(async {
/// let schema = Schema::new().table(
///     "users",
///     TableSchema::new().column("id", ColumnSpec::new().with_flag(AUTO_INCREMENT, true)),
/// );
/// let backend = Arc::new(InMemoryBackend::new()) as Arc<dyn DocumentBackend>;
/// let adapter = Adapter::connect(AdapterConfig::new("app"), backend, Some(&schema))
///     .await
///     .unwrap();
///
/// let saved = adapter
///     .save("users", document(json!({ "name": "ada" })))
///     .await
///     .unwrap();
/// assert_eq!(saved.get("id"), Some(&json!(1)));
/// # });
/// ```
pub struct Adapter {
    config: AdapterConfig,
    backend: Arc<dyn DocumentBackend>,
    records: RecordStore,
    closed: AtomicBool,
}

impl Adapter {
    /// Connects to the store and initializes the schema.
    ///
    /// The schema is read once here and is immutable for the adapter's
    /// lifetime. `None` skips initialization and leaves the adapter with
    /// no counter bindings.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Connection`] if the store cannot be
    /// reached, or the first error schema initialization reports.
    pub async fn connect(
        config: AdapterConfig,
        backend: Arc<dyn DocumentBackend>,
        schema: Option<&Schema>,
    ) -> AdapterResult<Self> {
        backend.ping().await.map_err(|err| {
            AdapterError::connection(format!("cannot reach {}: {err}", config.address()))
        })?;
        info!(address = %config.address(), "connected to document store");

        let counters = match schema {
            Some(schema) => {
                SchemaInitializer::new(Arc::clone(&backend))
                    .initialize(schema)
                    .await?
            }
            None => CounterTable::default(),
        };

        let records = RecordStore::new(Arc::clone(&backend), Arc::new(counters));
        Ok(Self {
            config,
            backend,
            records,
            closed: AtomicBool::new(false),
        })
    }

    /// Returns the configuration the adapter was connected with.
    #[must_use]
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Releases the connection to the store.
    ///
    /// Idempotent; the first call wins.
    ///
    /// # Errors
    ///
    /// Returns an error if releasing the connection fails.
    pub async fn close(&self) -> AdapterResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.backend.close().await?;
        info!(address = %self.config.address(), "connection released");
        Ok(())
    }

    /// Saves a record, populating auto-increment columns first.
    ///
    /// # Errors
    ///
    /// See [`RecordStore::save`].
    pub async fn save(&self, table: &str, record: Document) -> AdapterResult<Document> {
        self.records.save(table, record).await
    }

    /// Returns all records matching a query.
    ///
    /// # Errors
    ///
    /// See [`RecordStore::find`].
    pub async fn find(&self, table: &str, query: &Query) -> AdapterResult<Vec<Document>> {
        self.records.find(table, query).await
    }

    /// Returns the first record matching a query.
    ///
    /// # Errors
    ///
    /// See [`RecordStore::find_one`].
    pub async fn find_one(&self, table: &str, query: &Query) -> AdapterResult<Document> {
        self.records.find_one(table, query).await
    }

    /// Merges patch fields into the record identified by `id` and
    /// returns the refreshed record.
    ///
    /// # Errors
    ///
    /// See [`RecordStore::update`].
    pub async fn update(
        &self,
        table: &str,
        id: &Value,
        patch: &Document,
    ) -> AdapterResult<Document> {
        self.records.update(table, id, patch).await
    }

    /// Removes all records matching a query and returns their
    /// pre-removal snapshots.
    ///
    /// # Errors
    ///
    /// See [`RecordStore::destroy`].
    pub async fn destroy(&self, table: &str, query: &Query) -> AdapterResult<Vec<Document>> {
        self.records.destroy(table, query).await
    }

    // Schema-migration surface. Declared for interface completeness;
    // every operation reports NotImplemented and does nothing else.

    /// Creates a table. Unimplemented.
    ///
    /// # Errors
    ///
    /// Always returns [`AdapterError::NotImplemented`].
    pub async fn create_table(
        &self,
        _table: &str,
        _columns: &TableSchema,
        _options: &Document,
    ) -> AdapterResult<()> {
        Err(AdapterError::not_implemented("create_table"))
    }

    /// Renames a table. Unimplemented.
    ///
    /// # Errors
    ///
    /// Always returns [`AdapterError::NotImplemented`].
    pub async fn rename_table(&self, _table: &str, _new_table: &str) -> AdapterResult<()> {
        Err(AdapterError::not_implemented("rename_table"))
    }

    /// Removes a table. Unimplemented.
    ///
    /// # Errors
    ///
    /// Always returns [`AdapterError::NotImplemented`].
    pub async fn remove_table(&self, _table: &str) -> AdapterResult<()> {
        Err(AdapterError::not_implemented("remove_table"))
    }

    /// Adds a column. Unimplemented.
    ///
    /// # Errors
    ///
    /// Always returns [`AdapterError::NotImplemented`].
    pub async fn add_column(
        &self,
        _table: &str,
        _column: &str,
        _spec: &ColumnSpec,
        _options: &Document,
    ) -> AdapterResult<()> {
        Err(AdapterError::not_implemented("add_column"))
    }

    /// Renames a column. Unimplemented.
    ///
    /// # Errors
    ///
    /// Always returns [`AdapterError::NotImplemented`].
    pub async fn rename_column(
        &self,
        _table: &str,
        _column: &str,
        _new_column: &str,
    ) -> AdapterResult<()> {
        Err(AdapterError::not_implemented("rename_column"))
    }

    /// Removes a column. Unimplemented.
    ///
    /// # Errors
    ///
    /// Always returns [`AdapterError::NotImplemented`].
    pub async fn remove_column(&self, _table: &str, _column: &str) -> AdapterResult<()> {
        Err(AdapterError::not_implemented("remove_column"))
    }

    /// Adds an index. Unimplemented beyond initial unique indexes.
    ///
    /// # Errors
    ///
    /// Always returns [`AdapterError::NotImplemented`].
    pub async fn add_index(
        &self,
        _table: &str,
        _column: &str,
        _options: &Document,
    ) -> AdapterResult<()> {
        Err(AdapterError::not_implemented("add_index"))
    }

    /// Removes an index. Unimplemented.
    ///
    /// # Errors
    ///
    /// Always returns [`AdapterError::NotImplemented`].
    pub async fn remove_index(
        &self,
        _table: &str,
        _column: &str,
        _options: &Document,
    ) -> AdapterResult<()> {
        Err(AdapterError::not_implemented("remove_index"))
    }

    /// Removes the database. Unimplemented.
    ///
    /// # Errors
    ///
    /// Always returns [`AdapterError::NotImplemented`].
    pub async fn remove_database(&self) -> AdapterResult<()> {
        Err(AdapterError::not_implemented("remove_database"))
    }
}

impl Drop for Adapter {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::SeqCst) {
            // close() could not be awaited here; the backend handle is
            // released with the adapter either way.
            warn!(address = %self.config.address(), "adapter dropped without close");
        } else {
            debug!("adapter dropped");
        }
    }
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("address", &self.config.address())
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
