//! Crate-wide error type.

use thiserror::Error;

use crate::codec::CodecError;
use crate::crypto::CryptoError;
use crate::engine::EngineError;
use crate::query::{JoinError, TranslateError};
use crate::schema::SchemaError;

/// Errors surfaced by session-level operations.
#[derive(Error, Debug)]
pub enum OrmError {
    /// Malformed type mapping
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Missing or invalid key material
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Value could not be converted to or from its storage form
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Predicate, ordering or limit misuse
    #[error(transparent)]
    Translate(#[from] TranslateError),

    /// Invalid join condition
    #[error(transparent)]
    Join(#[from] JoinError),

    /// Engine failure with the statement context attached
    #[error("Storage error ({context}): {source}")]
    Storage {
        context: String,
        #[source]
        source: EngineError,
    },

    /// Result row does not match the column layout of the queried tables
    #[error("Row layout mismatch: expected {expected} columns, got {got}")]
    RowLayout { expected: usize, got: usize },

    /// Record addressed by primary key does not exist
    #[error("Record with primary key {key} not found in table '{table}'")]
    RecordNotFound { table: String, key: String },

    /// Field not found on a record
    #[error("Field '{field}' not found in table '{table}'")]
    FieldNotFound { table: String, field: String },

    /// Materialized record is not of the requested type
    #[error("Record of table '{table}' is not a {expected}")]
    RecordType {
        table: String,
        expected: &'static str,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl OrmError {
    /// Wraps an engine failure, naming the table involved.
    ///
    /// Engines report a missing relation with a bare message; the table name
    /// is attached so the caller can tell which mapping is out of date.
    pub fn storage(table: &str, source: EngineError) -> Self {
        let context = if source.is_missing_relation() {
            format!("table '{}' probably does not exist", table)
        } else {
            format!("statement on table '{}'", table)
        };
        OrmError::Storage { context, source }
    }
}
