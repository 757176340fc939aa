use crate::types::ValueKind;

/// Error type for table mapping registration.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Type '{type_name}' has no table declaration")]
    MissingDeclaration { type_name: &'static str },

    #[error("Type '{type_name}' declares an empty table name")]
    InvalidTableName { type_name: &'static str },

    #[error("Table '{table}' has no primary key")]
    NoPrimaryKey { table: String },

    #[error("Table '{table}' has more than one primary key: {columns}")]
    MultiplePrimaryKeys { table: String, columns: String },

    #[error("Column '{column}' appears more than once in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    #[error("Field '{field}' is mapped more than once in table '{table}'")]
    DuplicateField { table: String, field: String },

    #[error("Column '{column}' in table '{table}' uses the reserved salt column name")]
    ReservedColumnName { table: String, column: String },

    #[error("Encrypted column '{column}' in table '{table}' cannot be the primary key")]
    EncryptedPrimaryKey { table: String, column: String },

    #[error("Encrypted column '{column}' in table '{table}' cannot auto-increment")]
    EncryptedAutoIncrement { table: String, column: String },

    #[error("Encrypted column '{column}' in table '{table}' cannot have a default value")]
    EncryptedDefault { table: String, column: String },

    #[error("Auto-increment column '{column}' in table '{table}' must be a natively stored integer primary key")]
    AutoIncrementKind { table: String, column: String },

    #[error("Default value of column '{column}' in table '{table}' does not match its kind")]
    InvalidDefault { table: String, column: String },

    #[error("Foreign key column '{column}' in table '{table}' has kind {kind:?}; expected a 32-bit integer")]
    InvalidForeignKeyKind {
        table: String,
        column: String,
        kind: ValueKind,
    },

    #[error("Foreign key column '{column}' in table '{table}' cannot be encrypted")]
    EncryptedForeignKey { table: String, column: String },

    #[error("Foreign key column '{column}' in table '{table}' auto-resolves but names no navigation field")]
    MissingNavigation { table: String, column: String },

    #[error("Foreign key '{table}.{column}' references unknown field '{field}' of table '{target}'")]
    UnknownForeignKeyColumn {
        table: String,
        column: String,
        target: String,
        field: String,
    },

    #[error("Foreign key '{table}.{column}' references '{target}.{field}', which cannot be compared")]
    InvalidForeignKeyTarget {
        table: String,
        column: String,
        target: String,
        field: String,
    },

    #[error("Table '{table}' is already mapped by type '{type_name}'")]
    DuplicateTable {
        table: String,
        type_name: &'static str,
    },

    #[error("Type '{what}' is not registered")]
    NotRegistered { what: String },

    #[error("Schema registry lock poisoned")]
    LockPoisoned,
}
