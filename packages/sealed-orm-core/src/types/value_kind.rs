//! Declared value kinds of mapped fields.

use serde::Serialize;

/// Value kind of a mapped field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Decimal,
    Bool,
    String,
    Timestamp,
    Bytes,
}

impl ValueKind {
    /// Returns true for kinds that are always stored as a fixed-width blob,
    /// encrypted or not. The engine's native 64-bit integer cannot hold the
    /// full `u64` range, so these kinds never use a native column.
    pub fn is_blob_stored(self) -> bool {
        matches!(
            self,
            ValueKind::I64 | ValueKind::U64 | ValueKind::Timestamp | ValueKind::Decimal
        )
    }

    /// Returns true for kinds that may only appear in null checks.
    pub fn is_null_check_only(self) -> bool {
        self.is_blob_stored() || self == ValueKind::Bytes
    }

    /// Returns true for integer kinds stored natively.
    pub fn is_native_integer(self) -> bool {
        matches!(
            self,
            ValueKind::I8
                | ValueKind::U8
                | ValueKind::I16
                | ValueKind::U16
                | ValueKind::I32
                | ValueKind::U32
        )
    }

    /// Returns the fixed binary width, or `None` for variable-length kinds.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            ValueKind::I8 | ValueKind::U8 | ValueKind::Bool => Some(1),
            ValueKind::I16 | ValueKind::U16 => Some(2),
            ValueKind::I32 | ValueKind::U32 | ValueKind::F32 => Some(4),
            ValueKind::I64 | ValueKind::U64 | ValueKind::F64 | ValueKind::Timestamp => Some(8),
            ValueKind::Decimal => Some(16),
            ValueKind::String | ValueKind::Bytes => None,
        }
    }

    /// Column type used in CREATE TABLE for an unencrypted column.
    pub fn sql_type(self) -> &'static str {
        match self {
            _ if self.is_native_integer() || self == ValueKind::Bool => "INTEGER",
            ValueKind::F32 | ValueKind::F64 => "REAL",
            ValueKind::String => "TEXT",
            _ => "BLOB",
        }
    }
}

/// Declared type of a column: its value kind and whether it may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnType {
    pub kind: ValueKind,
    pub nullable: bool,
}

impl ColumnType {
    pub const fn required(kind: ValueKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    pub const fn nullable(kind: ValueKind) -> Self {
        Self {
            kind,
            nullable: true,
        }
    }
}
