//! Declarative schema model.
//!
//! A schema maps table names to column definitions, and columns to a set
//! of named boolean flags. The adapter recognizes two flags:
//! [`AUTO_INCREMENT`] and [`UNIQUE`]. Every other flag is opaque and
//! ignored, so schemas written for richer collaborators pass through
//! unchanged.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Flag marking a column whose value is allocated from a sequence.
pub const AUTO_INCREMENT: &str = "autoIncrement";

/// Flag marking a column whose values must be unique within the table.
pub const UNIQUE: &str = "unique";

/// A declarative schema: table name to table definition.
///
/// Supplied once at adapter construction and immutable for the adapter's
/// lifetime.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Schema {
    /// Tables by name.
    #[serde(flatten)]
    pub tables: BTreeMap<String, TableSchema>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table definition.
    #[must_use]
    pub fn table(mut self, name: impl Into<String>, table: TableSchema) -> Self {
        self.tables.insert(name.into(), table);
        self
    }
}

/// A table definition: column name to column flags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableSchema {
    /// Columns by name.
    #[serde(flatten)]
    pub columns: BTreeMap<String, ColumnSpec>,
}

impl TableSchema {
    /// Creates an empty table definition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column definition.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>, spec: ColumnSpec) -> Self {
        self.columns.insert(name.into(), spec);
        self
    }
}

/// A set of named boolean flags describing one column.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnSpec {
    /// Flags by name. Unrecognized flags are preserved but ignored.
    #[serde(flatten)]
    pub flags: BTreeMap<String, bool>,
}

impl ColumnSpec {
    /// Creates a column with no flags.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a named flag.
    #[must_use]
    pub fn with_flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.flags.insert(name.into(), value);
        self
    }

    /// Returns true if the column is marked auto-increment.
    #[must_use]
    pub fn is_auto_increment(&self) -> bool {
        self.flag(AUTO_INCREMENT)
    }

    /// Returns true if the column is marked unique.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.flag(UNIQUE)
    }

    fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }
}
