use crate::types::ValueKind;

/// Error type for predicate, ordering and limit translation.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("A query must carry an explicit predicate")]
    NullPredicate,

    #[error("Table '{table}' has no mapped field '{field}'")]
    UnknownField { table: String, field: String },

    #[error("Encrypted column '{column}' of table '{table}' cannot be used in a predicate")]
    EncryptedColumnInPredicate { table: String, column: String },

    #[error("Column '{column}' of table '{table}' is stored as {kind:?} blob and only supports null checks")]
    BlobTypeInComparison {
        table: String,
        column: String,
        kind: ValueKind,
    },

    #[error("Encrypted column '{column}' of table '{table}' cannot be used for ordering")]
    EncryptedOrderBy { table: String, column: String },

    #[error("Column '{column}' of table '{table}' is stored as {kind:?} blob and cannot be used for ordering")]
    BlobOrderBy {
        table: String,
        column: String,
        kind: ValueKind,
    },

    #[error("Limit must be positive, got {limit}")]
    InvalidLimit { limit: i64 },

    #[error("Column '{column}' can only be compared to null with '=' or '!='")]
    NullComparison { column: String },

    #[error("Column '{column}' has kind {kind:?} and cannot be used as a condition")]
    NotABoolean { column: String, kind: ValueKind },

    #[error("Literal {literal} does not fit column '{column}' of kind {kind:?}")]
    LiteralKind {
        column: String,
        kind: ValueKind,
        literal: String,
    },
}

/// Error type for join condition translation.
#[derive(Debug, thiserror::Error)]
pub enum JoinError {
    #[error("Table '{table}' cannot be joined to itself")]
    SelfJoin { table: String },

    #[error("Table '{table}' has no mapped field '{field}'")]
    UnmappedField { table: String, field: String },

    #[error("Encrypted column '{column}' of table '{table}' cannot be used in a join condition")]
    EncryptedColumn { table: String, column: String },
}
