//! [`SqlEngine`] for `rusqlite::Connection`.

use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection};

use super::{EngineError, SqlEngine, SqlRow, SqlValue};

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            SqlValue::Integer(v) => ToSqlOutput::Borrowed(ValueRef::Integer(*v)),
            SqlValue::Real(v) => ToSqlOutput::Borrowed(ValueRef::Real(*v)),
            SqlValue::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            SqlValue::Blob(v) => ToSqlOutput::Borrowed(ValueRef::Blob(v)),
        })
    }
}

impl From<ValueRef<'_>> for SqlValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => SqlValue::Null,
            ValueRef::Integer(v) => SqlValue::Integer(v),
            ValueRef::Real(v) => SqlValue::Real(v),
            ValueRef::Text(v) => SqlValue::Text(String::from_utf8_lossy(v).into_owned()),
            ValueRef::Blob(v) => SqlValue::Blob(v.to_vec()),
        }
    }
}

fn engine_error(err: rusqlite::Error) -> EngineError {
    let message = err.to_string();
    if message.contains("no such table") {
        return EngineError::MissingRelation(message);
    }
    match err {
        rusqlite::Error::SqliteFailure(code, _)
            if code.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            EngineError::Constraint(message)
        }
        _ => EngineError::Failure(message),
    }
}

impl SqlEngine for Connection {
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64, EngineError> {
        let mut stmt = self.prepare_cached(sql).map_err(engine_error)?;
        let changed = stmt
            .execute(params_from_iter(params.iter()))
            .map_err(engine_error)?;
        Ok(changed as u64)
    }

    fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>, EngineError> {
        let mut stmt = self.prepare_cached(sql).map_err(engine_error)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = stmt
            .query(params_from_iter(params.iter()))
            .map_err(engine_error)?;
        let mut collected = Vec::new();
        while let Some(row) = rows.next().map_err(engine_error)? {
            let mut values = Vec::with_capacity(columns.len());
            for index in 0..columns.len() {
                values.push(SqlValue::from(row.get_ref(index).map_err(engine_error)?));
            }
            collected.push(SqlRow::new(columns.clone(), values));
        }
        Ok(collected)
    }

    fn last_insert_id(&self) -> Result<i64, EngineError> {
        Ok(self.last_insert_rowid())
    }
}
