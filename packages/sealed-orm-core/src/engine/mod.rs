//! Boundary to the underlying SQL engine.
//!
//! The engine is consumed as an opaque row store: it executes parameterized
//! statements and streams back positional rows of storage values.

#[cfg(feature = "sqlite")]
mod sqlite;

use thiserror::Error;

use crate::error::OrmError;

/// Storage value as exchanged with the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// Storage class of a [`SqlValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    Null,
    Integer,
    Real,
    Text,
    Blob,
}

impl SqlValue {
    pub fn storage_type(&self) -> StorageType {
        match self {
            SqlValue::Null => StorageType::Null,
            SqlValue::Integer(_) => StorageType::Integer,
            SqlValue::Real(_) => StorageType::Real,
            SqlValue::Text(_) => StorageType::Text,
            SqlValue::Blob(_) => StorageType::Blob,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

/// One result row: column labels as reported by the engine, and values.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlRow {
    pub columns: Vec<String>,
    pub values: Vec<SqlValue>,
}

impl SqlRow {
    pub fn new(columns: Vec<String>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    pub fn storage_type(&self, index: usize) -> Option<StorageType> {
        self.values.get(index).map(SqlValue::storage_type)
    }
}

/// Engine-level failure.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The statement referenced a relation the engine does not know
    #[error("Missing relation: {0}")]
    MissingRelation(String),

    /// Constraint violation reported by the engine
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Any other engine failure
    #[error("Engine failure: {0}")]
    Failure(String),
}

impl EngineError {
    pub fn is_missing_relation(&self) -> bool {
        matches!(self, EngineError::MissingRelation(_))
    }
}

/// Transactional row store the session drives.
///
/// Placeholders in statement text are positional `?` markers bound in order.
pub trait SqlEngine {
    /// Executes a statement; returns the number of affected rows.
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64, EngineError>;

    /// Runs a query and collects its rows.
    fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>, EngineError>;

    /// Row id assigned by the most recent insert.
    fn last_insert_id(&self) -> Result<i64, EngineError>;
}

impl<E: SqlEngine + ?Sized> SqlEngine for &E {
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64, EngineError> {
        (**self).execute(sql, params)
    }

    fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>, EngineError> {
        (**self).query(sql, params)
    }

    fn last_insert_id(&self) -> Result<i64, EngineError> {
        (**self).last_insert_id()
    }
}

/// Executes a statement on behalf of `table`, logging it and attaching the
/// table to any failure.
pub(crate) fn run_execute<E: SqlEngine + ?Sized>(
    engine: &E,
    table: &str,
    sql: &str,
    params: &[SqlValue],
) -> Result<u64, OrmError> {
    tracing::debug!(table, sql, params = params.len(), "Executing statement");
    engine
        .execute(sql, params)
        .map_err(|err| OrmError::storage(table, err))
}

/// Query counterpart of [`run_execute`].
pub(crate) fn run_query<E: SqlEngine + ?Sized>(
    engine: &E,
    table: &str,
    sql: &str,
    params: &[SqlValue],
) -> Result<Vec<SqlRow>, OrmError> {
    tracing::debug!(table, sql, params = params.len(), "Running query");
    engine
        .query(sql, params)
        .map_err(|err| OrmError::storage(table, err))
}
