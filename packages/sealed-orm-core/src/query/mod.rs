//! Predicate, ordering and join translation, and the query builder.

mod error;
mod join;
mod order;
mod predicate;
mod translate;

use std::marker::PhantomData;

pub use error::{JoinError, TranslateError};
pub use join::{translate_join, JoinKind};
pub use order::{translate_order_by, validate_limit, SortDirection};
pub use predicate::{CompareOp, FieldRef, Predicate};
pub use translate::{translate, translate_qualified, TranslatedPredicate};

use crate::record::Record;

/// Filtered, ordered and limited selection of `T` records.
///
/// A query without a filter is rejected when run; use
/// [`Session::all`](crate::Session::all) to read every row.
#[derive(Debug, Clone)]
pub struct Query<T> {
    pub(crate) filter: Option<Predicate>,
    pub(crate) order: Option<(String, SortDirection)>,
    pub(crate) limit: Option<i64>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Query<T> {
    pub fn new() -> Self {
        Self {
            filter: None,
            order: None,
            limit: None,
            _record: PhantomData,
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = Some(predicate);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl<T: Record> Default for Query<T> {
    fn default() -> Self {
        Self::new()
    }
}
