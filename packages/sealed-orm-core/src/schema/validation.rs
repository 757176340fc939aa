//! Declaration checks run before a schema enters the registry.

use std::any::{type_name, TypeId};
use std::collections::HashSet;
use std::sync::Arc;

use super::column::ColumnSchema;
use super::declaration::{ColumnDecl, TableDecl};
use super::error::SchemaError;
use super::foreign_key::ForeignKeyRef;
use super::table::{TableSchema, SALT_COLUMN};
use crate::codec;
use crate::record::{DynRecord, Record};
use crate::types::ValueKind;

/// Builds the schema for `T` from its declaration.
///
/// Foreign key targets are checked separately, once they are registered.
pub(crate) fn build_table_schema<T: Record>(decl: TableDecl) -> Result<TableSchema, SchemaError> {
    let TableDecl { name, columns, key } = decl;
    if name.trim().is_empty() {
        return Err(SchemaError::InvalidTableName {
            type_name: type_name::<T>(),
        });
    }

    let mut seen_names = HashSet::new();
    let mut seen_fields = HashSet::new();
    let mut built = Vec::with_capacity(columns.len());

    for (ordinal, column) in columns.into_iter().enumerate() {
        let column = build_column(&name, ordinal, column)?;
        if !seen_names.insert(column.name.to_ascii_lowercase()) {
            return Err(SchemaError::DuplicateColumn {
                table: name,
                column: column.name,
            });
        }
        if !seen_fields.insert(column.field.clone()) {
            return Err(SchemaError::DuplicateField {
                table: name,
                field: column.field,
            });
        }
        built.push(column);
    }

    let primary_keys: Vec<usize> = built
        .iter()
        .enumerate()
        .filter(|(_, column)| column.is_primary_key)
        .map(|(index, _)| index)
        .collect();
    let primary_key = match primary_keys.as_slice() {
        [] => return Err(SchemaError::NoPrimaryKey { table: name }),
        [index] => *index,
        _ => {
            let columns = primary_keys
                .iter()
                .map(|&index| built[index].name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(SchemaError::MultiplePrimaryKeys {
                table: name,
                columns,
            });
        }
    };

    Ok(TableSchema {
        has_encrypted_columns: built.iter().any(|column| column.is_encrypted),
        name,
        type_id: TypeId::of::<T>(),
        type_name: type_name::<T>(),
        columns: built,
        key_override: key.map(Arc::new),
        primary_key,
        factory: new_boxed::<T>,
    })
}

fn build_column(table: &str, ordinal: usize, decl: ColumnDecl) -> Result<ColumnSchema, SchemaError> {
    let name = decl.column_name.unwrap_or_else(|| decl.field.clone());
    let kind = decl.column_type.kind;
    let err_ctx = || (table.to_string(), name.clone());

    if name.eq_ignore_ascii_case(SALT_COLUMN) {
        let (table, column) = err_ctx();
        return Err(SchemaError::ReservedColumnName { table, column });
    }

    if decl.encrypted {
        let (table, column) = err_ctx();
        if decl.primary_key {
            return Err(SchemaError::EncryptedPrimaryKey { table, column });
        }
        if decl.auto_increment {
            return Err(SchemaError::EncryptedAutoIncrement { table, column });
        }
        if decl.default_value.is_some() {
            return Err(SchemaError::EncryptedDefault { table, column });
        }
    }

    if decl.auto_increment && !(decl.primary_key && kind.is_native_integer()) {
        let (table, column) = err_ctx();
        return Err(SchemaError::AutoIncrementKind { table, column });
    }

    let default_value = match decl.default_value {
        Some(value) => match value.coerce_to(kind) {
            Some(coerced) if !coerced.is_null() && codec::to_native(&coerced).is_ok() => {
                Some(coerced)
            }
            _ => {
                let (table, column) = err_ctx();
                return Err(SchemaError::InvalidDefault { table, column });
            }
        },
        None => None,
    };

    let foreign_key = match decl.foreign_key {
        Some(fk) => {
            let (table, column) = err_ctx();
            if !matches!(kind, ValueKind::I32 | ValueKind::U32) {
                return Err(SchemaError::InvalidForeignKeyKind {
                    table,
                    column,
                    kind,
                });
            }
            if decl.encrypted {
                return Err(SchemaError::EncryptedForeignKey { table, column });
            }
            if fk.auto_resolve && fk.navigation.is_none() {
                return Err(SchemaError::MissingNavigation { table, column });
            }
            let target = (fk.target_decl)().ok_or(SchemaError::MissingDeclaration {
                type_name: fk.target_type_name,
            })?;
            // An unmapped field is reported once the target is registered.
            let referenced_column = target
                .column_name_of(&fk.referenced_field)
                .unwrap_or_else(|| fk.referenced_field.clone());
            Some(ForeignKeyRef {
                referenced_table: target.name.clone(),
                referenced_column,
                referenced_type: fk.target_type,
                referenced_field: fk.referenced_field,
                owning_field: decl.field.clone(),
                navigation_field: fk.navigation,
                auto_resolve: fk.auto_resolve,
                register: fk.register,
            })
        }
        None => None,
    };

    Ok(ColumnSchema {
        name,
        field: decl.field,
        column_type: decl.column_type,
        ordinal,
        is_primary_key: decl.primary_key,
        is_auto_increment: decl.auto_increment,
        is_encrypted: decl.encrypted,
        is_not_null: decl.not_null || decl.primary_key || !decl.column_type.nullable,
        default_value,
        foreign_key,
    })
}

/// Checks that a foreign key points at an existing, comparable field.
pub(crate) fn validate_foreign_key_target(
    owner: &TableSchema,
    column: &ColumnSchema,
    fk: &ForeignKeyRef,
    target: &TableSchema,
) -> Result<(), SchemaError> {
    let referenced = target.column_by_field(&fk.referenced_field).ok_or_else(|| {
        SchemaError::UnknownForeignKeyColumn {
            table: owner.name.clone(),
            column: column.name.clone(),
            target: target.name.clone(),
            field: fk.referenced_field.clone(),
        }
    })?;
    if !referenced.is_comparable() {
        return Err(SchemaError::InvalidForeignKeyTarget {
            table: owner.name.clone(),
            column: column.name.clone(),
            target: target.name.clone(),
            field: fk.referenced_field.clone(),
        });
    }
    Ok(())
}

fn new_boxed<T: Record>() -> Box<dyn DynRecord> {
    Box::new(T::default())
}
