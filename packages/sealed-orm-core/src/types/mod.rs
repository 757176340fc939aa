//! Value kinds, runtime values, and conversions from Rust field types.

mod column_value;
mod value;
mod value_kind;

pub use column_value::ColumnValue;
pub use value::Value;
pub use value_kind::{ColumnType, ValueKind};
