//! ORDER BY and LIMIT validation.

use super::error::TranslateError;
use crate::schema::TableSchema;

/// Sort direction, appended verbatim after the ordering column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Resolves an ordering field to its storage column name.
///
/// Encrypted and blob-stored columns cannot be ordered.
pub fn translate_order_by<'s>(
    field: &str,
    schema: &'s TableSchema,
) -> Result<&'s str, TranslateError> {
    let column = schema
        .column_by_field(field)
        .ok_or_else(|| TranslateError::UnknownField {
            table: schema.name.clone(),
            field: field.to_string(),
        })?;
    if column.is_encrypted {
        return Err(TranslateError::EncryptedOrderBy {
            table: schema.name.clone(),
            column: column.name.clone(),
        });
    }
    // Blob layouts do not sort in value order.
    let kind = column.column_type.kind;
    if kind.is_null_check_only() {
        return Err(TranslateError::BlobOrderBy {
            table: schema.name.clone(),
            column: column.name.clone(),
            kind,
        });
    }
    Ok(&column.name)
}

/// Checks a row limit; only positive counts are accepted.
pub fn validate_limit(limit: i64) -> Result<i64, TranslateError> {
    if limit <= 0 {
        return Err(TranslateError::InvalidLimit { limit });
    }
    Ok(limit)
}
