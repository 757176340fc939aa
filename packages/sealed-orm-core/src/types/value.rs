//! Runtime values carried between records, the codec and the engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::value_kind::ValueKind;

/// A field value, or `Null` when the field is absent.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Bool(bool),
    String(String),
    Timestamp(DateTime<Utc>),
    Bytes(Vec<u8>),
}

impl Value {
    /// Returns the kind of this value, or `None` for `Null`.
    pub fn kind(&self) -> Option<ValueKind> {
        Some(match self {
            Value::Null => return None,
            Value::I8(_) => ValueKind::I8,
            Value::U8(_) => ValueKind::U8,
            Value::I16(_) => ValueKind::I16,
            Value::U16(_) => ValueKind::U16,
            Value::I32(_) => ValueKind::I32,
            Value::U32(_) => ValueKind::U32,
            Value::I64(_) => ValueKind::I64,
            Value::U64(_) => ValueKind::U64,
            Value::F32(_) => ValueKind::F32,
            Value::F64(_) => ValueKind::F64,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::Bool(_) => ValueKind::Bool,
            Value::String(_) => ValueKind::String,
            Value::Timestamp(_) => ValueKind::Timestamp,
            Value::Bytes(_) => ValueKind::Bytes,
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer payload widened to `i128`, if this is an integer value.
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Value::I8(v) => Some(v.into()),
            Value::U8(v) => Some(v.into()),
            Value::I16(v) => Some(v.into()),
            Value::U16(v) => Some(v.into()),
            Value::I32(v) => Some(v.into()),
            Value::U32(v) => Some(v.into()),
            Value::I64(v) => Some(v.into()),
            Value::U64(v) => Some(v.into()),
            _ => None,
        }
    }

    /// Builds an integer value of the given kind, if `raw` fits in it.
    pub fn from_i128(kind: ValueKind, raw: i128) -> Option<Value> {
        Some(match kind {
            ValueKind::I8 => Value::I8(i8::try_from(raw).ok()?),
            ValueKind::U8 => Value::U8(u8::try_from(raw).ok()?),
            ValueKind::I16 => Value::I16(i16::try_from(raw).ok()?),
            ValueKind::U16 => Value::U16(u16::try_from(raw).ok()?),
            ValueKind::I32 => Value::I32(i32::try_from(raw).ok()?),
            ValueKind::U32 => Value::U32(u32::try_from(raw).ok()?),
            ValueKind::I64 => Value::I64(i64::try_from(raw).ok()?),
            ValueKind::U64 => Value::U64(u64::try_from(raw).ok()?),
            ValueKind::F32 => {
                let float = raw as f32;
                Value::F32((float as i128 == raw).then_some(float)?)
            }
            ValueKind::F64 => {
                let float = raw as f64;
                Value::F64((float as i128 == raw).then_some(float)?)
            }
            ValueKind::Decimal => Value::Decimal(Decimal::from(i64::try_from(raw).ok()?)),
            _ => return None,
        })
    }

    /// Converts this value to `kind` when the target can represent it.
    ///
    /// Integer literals of any width are accepted for any integer, float or
    /// decimal kind that holds them exactly. A double narrows to single
    /// precision when it lies within the `f32` range, rounding to the nearest
    /// `f32` the way a stored single-precision column does. Everything else
    /// must match exactly.
    pub fn coerce_to(&self, kind: ValueKind) -> Option<Value> {
        if self.kind() == Some(kind) || self.is_null() {
            return Some(self.clone());
        }
        if let Some(raw) = self.as_i128() {
            return Value::from_i128(kind, raw);
        }
        match (self, kind) {
            (Value::F32(v), ValueKind::F64) => Some(Value::F64(f64::from(*v))),
            (Value::F64(v), ValueKind::F32) => {
                let in_range = !v.is_finite() || v.abs() <= f64::from(f32::MAX);
                in_range.then_some(Value::F32(*v as f32))
            }
            _ => None,
        }
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from_for_value! {
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

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
