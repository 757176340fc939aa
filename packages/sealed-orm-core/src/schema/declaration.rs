//! Declarative table mappings supplied by record types.

use std::any::{type_name, TypeId};
use std::fmt;

use super::registry::{RegisterFn, SchemaRegistry};
use crate::crypto::EncryptionKey;
use crate::record::Record;
use crate::types::{ColumnType, ColumnValue, Value};

/// Table mapping for a record type.
#[derive(Debug)]
pub struct TableDecl {
    pub(crate) name: String,
    pub(crate) columns: Vec<ColumnDecl>,
    pub(crate) key: Option<EncryptionKey>,
}

impl TableDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            key: None,
        }
    }

    /// Appends a column; ordinals follow declaration order.
    pub fn column(mut self, column: ColumnDecl) -> Self {
        self.columns.push(column);
        self
    }

    /// Key for this table's encrypted columns, overriding the default key.
    pub fn key(mut self, key: EncryptionKey) -> Self {
        self.key = Some(key);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Storage name of the column mapping `field`.
    pub(crate) fn column_name_of(&self, field: &str) -> Option<String> {
        self.columns
            .iter()
            .find(|column| column.field == field)
            .map(|column| column.column_name.clone().unwrap_or_else(|| column.field.clone()))
    }
}

/// Column mapping of a single record field.
#[derive(Debug)]
pub struct ColumnDecl {
    pub(crate) field: String,
    pub(crate) column_name: Option<String>,
    pub(crate) column_type: ColumnType,
    pub(crate) primary_key: bool,
    pub(crate) auto_increment: bool,
    pub(crate) encrypted: bool,
    pub(crate) not_null: bool,
    pub(crate) default_value: Option<Value>,
    pub(crate) foreign_key: Option<ForeignKeyDecl>,
}

impl ColumnDecl {
    /// Maps `field`, taking the column type from the field's Rust type.
    pub fn new<T: ColumnValue>(field: impl Into<String>) -> Self {
        Self::with_type(field, T::COLUMN_TYPE)
    }

    pub fn with_type(field: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            field: field.into(),
            column_name: None,
            column_type,
            primary_key: false,
            auto_increment: false,
            encrypted: false,
            not_null: false,
            default_value: None,
            foreign_key: None,
        }
    }

    /// Storage name, when it differs from the field name.
    pub fn column_name(mut self, name: impl Into<String>) -> Self {
        self.column_name = Some(name.into());
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn foreign_key(mut self, foreign_key: ForeignKeyDecl) -> Self {
        self.foreign_key = Some(foreign_key);
        self
    }
}

/// Foreign key from a column to a field of another record type.
pub struct ForeignKeyDecl {
    pub(crate) target_type: TypeId,
    pub(crate) target_type_name: &'static str,
    pub(crate) target_decl: fn() -> Option<TableDecl>,
    pub(crate) referenced_field: String,
    pub(crate) navigation: Option<String>,
    pub(crate) auto_resolve: bool,
    pub(crate) register: RegisterFn,
}

impl ForeignKeyDecl {
    /// References `field` of record type `T`.
    pub fn to<T: Record>(field: impl Into<String>) -> Self {
        Self {
            target_type: TypeId::of::<T>(),
            target_type_name: type_name::<T>(),
            target_decl: T::declaration,
            referenced_field: field.into(),
            navigation: None,
            auto_resolve: false,
            register: SchemaRegistry::register::<T>,
        }
    }

    /// Record field that receives the referenced record.
    pub fn navigation(mut self, field: impl Into<String>) -> Self {
        self.navigation = Some(field.into());
        self
    }

    /// Loads the referenced record whenever the owning record is read.
    pub fn auto_resolve(mut self) -> Self {
        self.auto_resolve = true;
        self
    }
}

impl fmt::Debug for ForeignKeyDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignKeyDecl")
            .field("target", &self.target_type_name)
            .field("referenced_field", &self.referenced_field)
            .field("navigation", &self.navigation)
            .field("auto_resolve", &self.auto_resolve)
            .finish_non_exhaustive()
    }
}
