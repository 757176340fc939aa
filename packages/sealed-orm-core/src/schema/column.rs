//! Column definition within a table.

use serde::Serialize;

use super::foreign_key::ForeignKeyRef;
use crate::types::{ColumnType, Value};

/// Column definition within a table.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSchema {
    /// Storage column name
    pub name: String,
    /// Record field the column maps to
    pub field: String,
    /// Declared value kind and nullability
    pub column_type: ColumnType,
    /// Position within the table; mixed into the keystream
    pub ordinal: usize,
    pub is_primary_key: bool,
    pub is_auto_increment: bool,
    pub is_encrypted: bool,
    pub is_not_null: bool,
    #[serde(skip)]
    pub default_value: Option<Value>,
    pub foreign_key: Option<ForeignKeyRef>,
}

impl ColumnSchema {
    /// Creates a plain column whose storage name equals its field name.
    pub fn new(name: impl Into<String>, column_type: ColumnType, ordinal: usize) -> Self {
        let name = name.into();
        Self {
            field: name.clone(),
            name,
            column_type,
            ordinal,
            is_primary_key: false,
            is_auto_increment: false,
            is_encrypted: false,
            is_not_null: false,
            default_value: None,
            foreign_key: None,
        }
    }

    /// Storage type used in CREATE TABLE.
    pub fn sql_type(&self) -> &'static str {
        if self.is_encrypted {
            "BLOB"
        } else {
            self.column_type.kind.sql_type()
        }
    }

    /// Returns true if the column may take part in value comparisons.
    pub fn is_comparable(&self) -> bool {
        !self.is_encrypted && !self.column_type.kind.is_null_check_only()
    }
}
