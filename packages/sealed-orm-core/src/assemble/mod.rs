//! Row assembly: splits positional result rows into per-table partitions,
//! decodes them and materializes records.
//!
//! Joined rows are partitioned by cumulative column counts rather than by
//! column label, because engines alias or drop table qualifiers on joined
//! result columns.

mod resolve;

pub use resolve::Resolver;

use std::any::type_name;
use std::sync::Arc;

use crate::codec::{ColumnCodec, CodecError};
use crate::crypto::{CipherContext, CryptoError, EncryptionKey, KeyRing, Keystream, Salt};
use crate::engine::{SqlRow, SqlValue};
use crate::error::OrmError;
use crate::record::{DynRecord, Record};
use crate::schema::{TableSchema, SALT_COLUMN};
use crate::types::{Value, ValueKind};

/// Decoded values of one table's columns, in ordinal order.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPartition {
    values: Vec<Value>,
}

impl DecodedPartition {
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value of `field`, or `None` if `schema` does not map it.
    pub fn get(&self, schema: &TableSchema, field: &str) -> Option<&Value> {
        schema
            .column_by_field(field)
            .and_then(|column| self.values.get(column.ordinal))
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// Width of each table's partition, salt column included.
pub fn partition_widths(schemas: &[&TableSchema]) -> Vec<usize> {
    schemas.iter().map(|schema| schema.row_width()).collect()
}

/// Splits `row` into one `(labels, values)` slice pair per table.
pub fn split_row<'r>(
    row: &'r SqlRow,
    schemas: &[&TableSchema],
) -> Result<Vec<(&'r [String], &'r [SqlValue])>, OrmError> {
    let widths = partition_widths(schemas);
    let expected: usize = widths.iter().sum();
    if row.values.len() != expected {
        return Err(OrmError::RowLayout {
            expected,
            got: row.values.len(),
        });
    }

    let mut start = 0;
    let mut partitions = Vec::with_capacity(widths.len());
    for width in widths {
        let end = start + width;
        // Labels are advisory; engines may report fewer than values.
        let labels = row.columns.get(start..end).unwrap_or(&[]);
        partitions.push((labels, &row.values[start..end]));
        start = end;
    }
    Ok(partitions)
}

/// Decodes result rows against table schemas.
pub struct RowAssembler<'a> {
    codec: ColumnCodec<'a>,
    keys: &'a KeyRing,
}

impl<'a> RowAssembler<'a> {
    pub fn new(keystream: &'a dyn Keystream, keys: &'a KeyRing) -> Self {
        Self {
            codec: ColumnCodec::new(keystream),
            keys,
        }
    }

    /// Decodes every row into one partition per table, in `schemas` order.
    ///
    /// A partition whose values are all absent (the unmatched side of an
    /// outer join) comes back as `None`.
    pub fn assemble(
        &self,
        rows: &[SqlRow],
        schemas: &[&TableSchema],
    ) -> Result<Vec<Vec<Option<DecodedPartition>>>, OrmError> {
        rows.iter().map(|row| self.decode_row(row, schemas)).collect()
    }

    pub fn decode_row(
        &self,
        row: &SqlRow,
        schemas: &[&TableSchema],
    ) -> Result<Vec<Option<DecodedPartition>>, OrmError> {
        split_row(row, schemas)?
            .into_iter()
            .zip(schemas)
            .map(|((labels, values), schema)| self.decode_partition(schema, labels, values))
            .collect()
    }

    /// Decodes one table's slice of a row.
    pub fn decode_partition(
        &self,
        schema: &TableSchema,
        labels: &[String],
        values: &[SqlValue],
    ) -> Result<Option<DecodedPartition>, OrmError> {
        if values.iter().all(SqlValue::is_null) {
            return Ok(None);
        }

        let salt = if schema.has_encrypted_columns {
            read_salt(schema, labels, values)?
        } else {
            None
        };
        let mut key: Option<Arc<EncryptionKey>> = None;

        let mut decoded = Vec::with_capacity(schema.columns.len());
        for column in &schema.columns {
            let stored = values.get(column.ordinal).ok_or(OrmError::RowLayout {
                expected: schema.row_width(),
                got: values.len(),
            })?;
            let value = if column.is_encrypted && !stored.is_null() {
                let salt = salt.as_ref().ok_or_else(|| {
                    tracing::warn!(table = %schema.name, column = %column.name, "Row has no salt");
                    CryptoError::MissingSalt {
                        table: schema.name.clone(),
                    }
                })?;
                if key.is_none() {
                    key = Some(self.keys.resolve(schema)?);
                }
                let key = key.as_deref().ok_or(CryptoError::NoKey {
                    table: schema.name.clone(),
                })?;
                self.codec
                    .decode(stored, column, Some(&CipherContext::new(key, salt)))?
            } else {
                self.codec.decode(stored, column, None)?
            };
            decoded.push(value);
        }
        Ok(Some(DecodedPartition { values: decoded }))
    }

    /// Creates a record of `schema`'s type from a decoded partition.
    pub fn materialize(
        &self,
        schema: &TableSchema,
        partition: DecodedPartition,
    ) -> Result<Box<dyn DynRecord>, OrmError> {
        let mut record = schema.new_record();
        for (column, value) in schema.columns.iter().zip(partition.values) {
            record.set_value(&column.field, value)?;
        }
        Ok(record)
    }

    /// Decodes and materializes a single-table row.
    pub fn read_record(
        &self,
        row: &SqlRow,
        schema: &TableSchema,
    ) -> Result<Option<Box<dyn DynRecord>>, OrmError> {
        let mut partitions = self.decode_row(row, &[schema])?;
        match partitions.pop().flatten() {
            Some(partition) => self.materialize(schema, partition).map(Some),
            None => Ok(None),
        }
    }
}

/// Recovers the concrete record from a materialized one.
pub fn downcast_record<T: Record>(
    record: Box<dyn DynRecord>,
    schema: &TableSchema,
) -> Result<T, OrmError> {
    record
        .into_any()
        .downcast::<T>()
        .map(|record| *record)
        .map_err(|_| OrmError::RecordType {
            table: schema.name.clone(),
            expected: type_name::<T>(),
        })
}

/// Locates the salt column by label, falling back to its position after
/// the mapped columns.
fn read_salt(
    schema: &TableSchema,
    labels: &[String],
    values: &[SqlValue],
) -> Result<Option<Salt>, OrmError> {
    let index = labels
        .iter()
        .position(|label| label == SALT_COLUMN)
        .unwrap_or(schema.columns.len());
    match values.get(index) {
        Some(SqlValue::Blob(bytes)) => Ok(Some(Salt::from_bytes(bytes.clone())?)),
        Some(SqlValue::Null) | None => Ok(None),
        Some(other) => Err(CodecError::UnexpectedStorage {
            column: SALT_COLUMN.to_string(),
            kind: ValueKind::Bytes,
            storage: other.storage_type(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
