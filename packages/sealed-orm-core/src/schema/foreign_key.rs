//! Relation between tables for foreign key references.

use std::any::TypeId;
use std::fmt;

use serde::Serialize;

use super::registry::RegisterFn;

/// Resolved foreign key on a column.
#[derive(Clone, Serialize)]
pub struct ForeignKeyRef {
    /// Name of the referenced table
    pub referenced_table: String,
    /// Storage name of the referenced column
    pub referenced_column: String,
    /// Record type mapped to the referenced table
    #[serde(skip)]
    pub referenced_type: TypeId,
    /// Field of the referenced record the key points at
    pub referenced_field: String,
    /// Field on the owning record holding the key value
    pub owning_field: String,
    /// Field on the owning record receiving the resolved target
    pub navigation_field: Option<String>,
    /// Populate the navigation field eagerly on read
    pub auto_resolve: bool,
    #[serde(skip)]
    pub(crate) register: RegisterFn,
}

impl fmt::Debug for ForeignKeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignKeyRef")
            .field("referenced_table", &self.referenced_table)
            .field("referenced_column", &self.referenced_column)
            .field("referenced_field", &self.referenced_field)
            .field("owning_field", &self.owning_field)
            .field("navigation_field", &self.navigation_field)
            .field("auto_resolve", &self.auto_resolve)
            .finish_non_exhaustive()
    }
}
