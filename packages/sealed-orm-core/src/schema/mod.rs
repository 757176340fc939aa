//! Table metadata: declarations, validated schemas and the schema registry.

mod column;
mod declaration;
mod error;
mod foreign_key;
mod registry;
#[allow(clippy::module_inception)]
mod table;
pub(crate) mod validation;

pub use column::ColumnSchema;
pub use declaration::{ColumnDecl, ForeignKeyDecl, TableDecl};
pub use error::SchemaError;
pub use foreign_key::ForeignKeyRef;
pub use registry::SchemaRegistry;
pub use table::{TableSchema, SALT_COLUMN};
