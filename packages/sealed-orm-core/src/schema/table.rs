//! Validated table schemas.

use std::any::TypeId;
use std::sync::Arc;

use serde_json::json;

use super::column::ColumnSchema;
use super::foreign_key::ForeignKeyRef;
use crate::crypto::EncryptionKey;
use crate::record::DynRecord;

/// Name of the hidden per-row salt column.
pub const SALT_COLUMN: &str = "__salt";

/// Table schema derived from a record type's declaration.
#[derive(Debug)]
pub struct TableSchema {
    pub name: String,
    pub type_id: TypeId,
    pub type_name: &'static str,
    /// True if any column is encrypted; such tables carry the salt column.
    pub has_encrypted_columns: bool,
    /// Columns in ordinal order
    pub columns: Vec<ColumnSchema>,
    /// Key declared on the mapping
    pub key_override: Option<Arc<EncryptionKey>>,
    pub(crate) primary_key: usize,
    pub(crate) factory: fn() -> Box<dyn DynRecord>,
}

impl TableSchema {
    pub fn column_by_field(&self, field: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|column| column.field == field)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn primary_key(&self) -> &ColumnSchema {
        &self.columns[self.primary_key]
    }

    /// Columns carrying a foreign key, with their reference.
    pub fn foreign_keys(&self) -> impl Iterator<Item = (&ColumnSchema, &ForeignKeyRef)> {
        self.columns
            .iter()
            .filter_map(|column| column.foreign_key.as_ref().map(|fk| (column, fk)))
    }

    /// Storage column names in row order, including the salt column.
    pub fn storage_columns(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        if self.has_encrypted_columns {
            names.push(SALT_COLUMN);
        }
        names
    }

    /// Number of values a row of this table occupies in a result set.
    pub fn row_width(&self) -> usize {
        self.columns.len() + usize::from(self.has_encrypted_columns)
    }

    /// Creates an empty record of the mapped type.
    pub fn new_record(&self) -> Box<dyn DynRecord> {
        (self.factory)()
    }

    /// JSON description of the mapping, for diagnostics.
    pub fn describe(&self) -> serde_json::Value {
        json!({
            "table": self.name,
            "type": self.type_name,
            "primary_key": self.primary_key().name,
            "encrypted": self.has_encrypted_columns,
            "has_key_override": self.key_override.is_some(),
            "salt_column": self.has_encrypted_columns.then_some(SALT_COLUMN),
            "columns": self.columns,
        })
    }
}
