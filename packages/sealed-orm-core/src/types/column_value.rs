//! Conversion between Rust field types and [`Value`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::value::Value;
use super::value_kind::{ColumnType, ValueKind};
use crate::codec::CodecError;

/// A Rust type that can back a mapped field.
///
/// `Option<T>` maps to the nullable variant of `T`'s column type.
pub trait ColumnValue: Sized {
    /// Declared column type for fields of this Rust type
    const COLUMN_TYPE: ColumnType;

    fn to_value(&self) -> Value;

    fn from_value(value: Value, field: &str) -> Result<Self, CodecError>;
}

macro_rules! impl_column_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ColumnValue for $ty {
                const COLUMN_TYPE: ColumnType = ColumnType::required(ValueKind::$variant);

                fn to_value(&self) -> Value {
                    Value::$variant(self.clone())
                }

                fn from_value(value: Value, field: &str) -> Result<Self, CodecError> {
                    match value.coerce_to(ValueKind::$variant) {
                        Some(Value::$variant(inner)) => Ok(inner),
                        Some(Value::Null) => Err(CodecError::UnexpectedNull {
                            field: field.to_string(),
                        }),
                        _ => Err(CodecError::KindMismatch {
                            field: field.to_string(),
                            expected: ValueKind::$variant,
                            got: value.kind(),
                        }),
                    }
                }
            }
        )*
    };
}

impl_column_value! {
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    bool => Bool,
    String => String,
    DateTime<Utc> => Timestamp,
    Vec<u8> => Bytes,
}

impl<T: ColumnValue> ColumnValue for Option<T> {
    const COLUMN_TYPE: ColumnType = ColumnType::nullable(T::COLUMN_TYPE.kind);

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value, field: &str) -> Result<Self, CodecError> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_value(value, field).map(Some)
    }
}
