//! Join condition translation.

use super::error::JoinError;
use crate::schema::{ColumnSchema, TableSchema};
use crate::sql::qualified;

/// Join keyword supplied by the caller; the ON clause is the same for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

impl JoinKind {
    pub fn keyword(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
        }
    }
}

/// Emits `"left"."col" = "right"."col"` for an equality between two fields.
pub fn translate_join(
    left_field: &str,
    right_field: &str,
    left: &TableSchema,
    right: &TableSchema,
) -> Result<String, JoinError> {
    if left.type_id == right.type_id || left.name == right.name {
        return Err(JoinError::SelfJoin {
            table: left.name.clone(),
        });
    }
    let left_column = join_column(left, left_field)?;
    let right_column = join_column(right, right_field)?;
    Ok(format!(
        "{} = {}",
        qualified(&left.name, &left_column.name),
        qualified(&right.name, &right_column.name)
    ))
}

fn join_column<'s>(schema: &'s TableSchema, field: &str) -> Result<&'s ColumnSchema, JoinError> {
    let column = schema
        .column_by_field(field)
        .ok_or_else(|| JoinError::UnmappedField {
            table: schema.name.clone(),
            field: field.to_string(),
        })?;
    if column.is_encrypted {
        return Err(JoinError::EncryptedColumn {
            table: schema.name.clone(),
            column: column.name.clone(),
        });
    }
    Ok(column)
}
