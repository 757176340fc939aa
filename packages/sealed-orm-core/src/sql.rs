//! Statement text for the operations the session issues.
//!
//! Identifiers are always double-quoted and values are always bound as
//! positional `?` parameters.

use crate::codec::{self, CodecError};
use crate::query::JoinKind;
use crate::schema::{ColumnSchema, TableSchema, SALT_COLUMN};

/// Quotes an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `"table"."column"`
pub fn qualified(table: &str, column: &str) -> String {
    format!("{}.{}", quote_ident(table), quote_ident(column))
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// CREATE TABLE; fails only if a default value has no storage form.
pub fn create_table(schema: &TableSchema) -> Result<String, CodecError> {
    let mut definitions = schema
        .columns
        .iter()
        .map(column_definition)
        .collect::<Result<Vec<_>, _>>()?;
    if schema.has_encrypted_columns {
        definitions.push(format!("{} BLOB", quote_ident(SALT_COLUMN)));
    }
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_ident(&schema.name),
        definitions.join(", ")
    ))
}

fn column_definition(column: &ColumnSchema) -> Result<String, CodecError> {
    let mut definition = format!("{} {}", quote_ident(&column.name), column.sql_type());
    if column.is_primary_key {
        definition.push_str(" PRIMARY KEY");
        if column.is_auto_increment {
            definition.push_str(" AUTOINCREMENT");
        }
    }
    if column.is_not_null {
        definition.push_str(" NOT NULL");
    }
    if let Some(default) = &column.default_value {
        definition.push_str(" DEFAULT ");
        definition.push_str(&default_literal(default)?);
    }
    if let Some(fk) = &column.foreign_key {
        definition.push_str(&format!(
            " REFERENCES {}({})",
            quote_ident(&fk.referenced_table),
            quote_ident(&fk.referenced_column)
        ));
    }
    Ok(definition)
}

/// Renders a default value as a SQL literal in its storage form.
fn default_literal(value: &crate::types::Value) -> Result<String, CodecError> {
    use crate::engine::SqlValue;

    Ok(match codec::to_native(value)? {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Integer(v) => v.to_string(),
        SqlValue::Real(v) => format!("{v:?}"),
        SqlValue::Text(v) => format!("'{}'", v.replace('\'', "''")),
        SqlValue::Blob(bytes) => {
            let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
            format!("X'{hex}'")
        }
    })
}

pub fn drop_table(schema: &TableSchema) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(&schema.name))
}

/// INSERT for the given storage columns, in order.
pub fn insert(schema: &TableSchema, columns: &[&str]) -> String {
    if columns.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES", quote_ident(&schema.name));
    }
    let names: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(&schema.name),
        names.join(", "),
        placeholders(columns.len())
    )
}

/// UPDATE of every non-key column (and the salt) by primary key.
///
/// Parameters: column values in declaration order, salt, then the key.
pub fn update_by_key(schema: &TableSchema) -> String {
    let assignments: Vec<String> = schema
        .storage_columns()
        .into_iter()
        .filter(|name| *name != schema.primary_key().name)
        .map(|name| format!("{} = ?", quote_ident(name)))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {} = ?",
        quote_ident(&schema.name),
        assignments.join(", "),
        quote_ident(&schema.primary_key().name)
    )
}

pub fn delete_by_key(schema: &TableSchema) -> String {
    format!(
        "DELETE FROM {} WHERE {} = ?",
        quote_ident(&schema.name),
        quote_ident(&schema.primary_key().name)
    )
}

pub fn delete_where(schema: &TableSchema, predicate: &str) -> String {
    format!("DELETE FROM {} WHERE {}", quote_ident(&schema.name), predicate)
}

fn select_list(schema: &TableSchema) -> String {
    schema
        .storage_columns()
        .into_iter()
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT with optional WHERE, ORDER BY and a bound LIMIT.
pub fn select(
    schema: &TableSchema,
    predicate: Option<&str>,
    order_by: Option<(&str, &str)>,
    limited: bool,
) -> String {
    let mut sql = format!(
        "SELECT {} FROM {}",
        select_list(schema),
        quote_ident(&schema.name)
    );
    if let Some(predicate) = predicate {
        sql.push_str(" WHERE ");
        sql.push_str(predicate);
    }
    if let Some((column, direction)) = order_by {
        sql.push_str(&format!(" ORDER BY {} {}", quote_ident(column), direction));
    }
    if limited {
        sql.push_str(" LIMIT ?");
    }
    sql
}

/// Single-row lookup on one column.
pub fn select_by_column(schema: &TableSchema, column: &ColumnSchema) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = ? LIMIT 1",
        select_list(schema),
        quote_ident(&schema.name),
        quote_ident(&column.name)
    )
}

pub fn count(schema: &TableSchema, predicate: &str) -> String {
    format!(
        "SELECT COUNT(*) FROM {} WHERE {}",
        quote_ident(&schema.name),
        predicate
    )
}

/// Two-table join; columns of `left` come first, then those of `right`.
pub fn join(
    left: &TableSchema,
    right: &TableSchema,
    kind: JoinKind,
    on: &str,
    predicate: Option<&str>,
) -> String {
    let columns: Vec<String> = [left, right]
        .iter()
        .flat_map(|schema| {
            schema
                .storage_columns()
                .into_iter()
                .map(move |column| qualified(&schema.name, column))
        })
        .collect();
    let mut sql = format!(
        "SELECT {} FROM {} {} {} ON {}",
        columns.join(", "),
        quote_ident(&left.name),
        kind.keyword(),
        quote_ident(&right.name),
        on
    );
    if let Some(predicate) = predicate {
        sql.push_str(" WHERE ");
        sql.push_str(predicate);
    }
    sql
}
