//! Column codec: converts field values to storage values and back.
//!
//! Unencrypted columns use the engine's native integer, real and text
//! storage, except for 64-bit integers, timestamps and decimals, which are
//! always written as fixed-width blobs. Encrypted columns serialize every
//! kind to its binary layout and apply the keystream keyed by the column's
//! ordinal. `Null` is never encoded or encrypted.

mod error;
pub mod layout;

pub use error::CodecError;

use crate::crypto::{CipherContext, Keystream};
use crate::engine::SqlValue;
use crate::schema::ColumnSchema;
use crate::types::{Value, ValueKind};

/// Encodes and decodes column values.
#[derive(Clone, Copy)]
pub struct ColumnCodec<'k> {
    keystream: &'k dyn Keystream,
}

impl<'k> ColumnCodec<'k> {
    pub fn new(keystream: &'k dyn Keystream) -> Self {
        Self { keystream }
    }

    /// Encodes `value` for storage in `column`.
    ///
    /// # Arguments
    /// * `value` - Field value; integer literals are narrowed to the column kind
    /// * `column` - Target column (kind, ordinal and encryption flag)
    /// * `cipher` - Key and row salt; required when the column is encrypted
    pub fn encode(
        &self,
        value: &Value,
        column: &ColumnSchema,
        cipher: Option<&CipherContext<'_>>,
    ) -> Result<SqlValue, CodecError> {
        if value.is_null() {
            return Ok(SqlValue::Null);
        }
        let kind = column.column_type.kind;
        let value = value
            .coerce_to(kind)
            .ok_or_else(|| CodecError::KindMismatch {
                field: column.field.clone(),
                expected: kind,
                got: value.kind(),
            })?;

        if !column.is_encrypted {
            return to_native(&value);
        }

        let ctx = cipher.ok_or_else(|| CodecError::MissingCipher {
            column: column.name.clone(),
        })?;
        let mut bytes = layout::to_bytes(&value)?;
        self.keystream
            .apply_keystream(ctx, &mut bytes, column.ordinal)?;
        Ok(SqlValue::Blob(bytes))
    }

    /// Decodes the stored value of `column`.
    pub fn decode(
        &self,
        stored: &SqlValue,
        column: &ColumnSchema,
        cipher: Option<&CipherContext<'_>>,
    ) -> Result<Value, CodecError> {
        if stored.is_null() {
            return Ok(Value::Null);
        }
        if !column.is_encrypted {
            return from_native(stored, column);
        }

        let SqlValue::Blob(bytes) = stored else {
            return Err(unexpected_storage(stored, column));
        };
        let ctx = cipher.ok_or_else(|| CodecError::MissingCipher {
            column: column.name.clone(),
        })?;
        let mut bytes = bytes.clone();
        self.keystream
            .apply_keystream(ctx, &mut bytes, column.ordinal)?;
        layout::from_bytes(column.column_type.kind, &bytes)
    }
}

/// Native storage form of an unencrypted, non-null value.
pub fn to_native(value: &Value) -> Result<SqlValue, CodecError> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Bool(v) => SqlValue::Integer(i64::from(*v)),
        Value::F32(v) => SqlValue::Real(f64::from(*v)),
        Value::F64(v) => SqlValue::Real(*v),
        Value::String(v) => SqlValue::Text(v.clone()),
        Value::Bytes(v) => SqlValue::Blob(v.clone()),
        Value::I64(_) | Value::U64(_) | Value::Timestamp(_) | Value::Decimal(_) => {
            SqlValue::Blob(layout::to_bytes(value)?)
        }
        other => match other.as_i128() {
            Some(raw) => SqlValue::Integer(raw as i64),
            None => SqlValue::Null,
        },
    })
}

/// Reads an unencrypted value back from native storage.
pub fn from_native(stored: &SqlValue, column: &ColumnSchema) -> Result<Value, CodecError> {
    let kind = column.column_type.kind;
    match (stored, kind) {
        (SqlValue::Null, _) => Ok(Value::Null),
        (SqlValue::Integer(raw), ValueKind::Bool) => Ok(Value::Bool(*raw != 0)),
        (SqlValue::Integer(raw), _) if kind.is_native_integer() => {
            Value::from_i128(kind, i128::from(*raw)).ok_or_else(|| CodecError::OutOfRange {
                column: column.name.clone(),
                kind,
                value: raw.to_string(),
            })
        }
        (SqlValue::Real(raw), ValueKind::F32) => Ok(Value::F32(*raw as f32)),
        (SqlValue::Real(raw), ValueKind::F64) => Ok(Value::F64(*raw)),
        (SqlValue::Integer(raw), ValueKind::F32) => Ok(Value::F32(*raw as f32)),
        (SqlValue::Integer(raw), ValueKind::F64) => Ok(Value::F64(*raw as f64)),
        (SqlValue::Text(text), ValueKind::String) => Ok(Value::String(text.clone())),
        (SqlValue::Blob(bytes), ValueKind::Bytes) => Ok(Value::Bytes(bytes.clone())),
        (SqlValue::Blob(bytes), _) if kind.is_blob_stored() => layout::from_bytes(kind, bytes),
        _ => Err(unexpected_storage(stored, column)),
    }
}

fn unexpected_storage(stored: &SqlValue, column: &ColumnSchema) -> CodecError {
    CodecError::UnexpectedStorage {
        column: column.name.clone(),
        kind: column.column_type.kind,
        storage: stored.storage_type(),
    }
}
