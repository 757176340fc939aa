//! Record capability traits.
//!
//! A mapped type implements [`Record`] (its table declaration) and
//! [`DynRecord`] (field access by name). [`impl_record!`] generates the
//! latter for plain structs.

use std::any::Any;

use crate::codec::CodecError;
use crate::schema::TableDecl;
use crate::types::Value;

/// Object-safe field access used by the row assembler.
pub trait DynRecord: Any {
    /// Current value of `field`, or `None` if the record has no such field.
    fn get_value(&self, field: &str) -> Option<Value>;

    /// Assigns a decoded value to `field`.
    fn set_value(&mut self, field: &str, value: Value) -> Result<(), CodecError>;

    /// Assigns a resolved foreign-key target; returns `false` if the record
    /// has no navigation field by that name or the target has another type.
    fn set_navigation(&mut self, field: &str, target: Option<Box<dyn DynRecord>>) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// A type mapped to a table.
pub trait Record: DynRecord + Default + Sized {
    /// Table mapping for this type. Types without one cannot be registered.
    fn declaration() -> Option<TableDecl> {
        None
    }
}

/// Downcasts a resolved navigation target to the field's record type.
pub fn downcast_navigation<T: Record>(target: Option<Box<dyn DynRecord>>) -> Option<Box<T>> {
    target.and_then(|record| record.into_any().downcast::<T>().ok())
}

/// Implements [`DynRecord`] for a struct.
///
/// Plain fields must implement [`ColumnValue`](crate::types::ColumnValue);
/// navigation fields are `Option<Box<Target>>`.
///
/// ```ignore
/// impl_record!(Book { id, title, author_id } navigation { author: Author });
/// ```
#[macro_export]
macro_rules! impl_record {
    ($ty:ty { $($field:ident),* $(,)? } $(navigation { $($nav:ident : $nav_ty:ty),* $(,)? })?) => {
        impl $crate::record::DynRecord for $ty {
            fn get_value(&self, field: &str) -> Option<$crate::types::Value> {
                match field {
                    $(stringify!($field) => Some($crate::types::ColumnValue::to_value(&self.$field)),)*
                    _ => None,
                }
            }

            fn set_value(
                &mut self,
                field: &str,
                value: $crate::types::Value,
            ) -> Result<(), $crate::codec::CodecError> {
                match field {
                    $(stringify!($field) => {
                        self.$field = $crate::types::ColumnValue::from_value(value, field)?;
                        Ok(())
                    })*
                    _ => {
                        let _ = value;
                        Err($crate::codec::CodecError::UnknownField {
                            field: field.to_string(),
                        })
                    }
                }
            }

            fn set_navigation(
                &mut self,
                field: &str,
                target: Option<Box<dyn $crate::record::DynRecord>>,
            ) -> bool {
                match field {
                    $($(stringify!($nav) => {
                        let is_empty = target.is_none();
                        self.$nav = $crate::record::downcast_navigation::<$nav_ty>(target);
                        is_empty || self.$nav.is_some()
                    })*)?
                    _ => {
                        let _ = target;
                        false
                    }
                }
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }

            fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
                self
            }
        }
    };
}
