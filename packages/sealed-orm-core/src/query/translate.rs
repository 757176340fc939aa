//! Predicate tree to parameterized SQL.

use super::error::TranslateError;
use super::predicate::{CompareOp, Predicate};
use crate::codec;
use crate::engine::SqlValue;
use crate::schema::{ColumnSchema, TableSchema};
use crate::sql::{qualified, quote_ident};

/// SQL boolean text with its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedPredicate {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Translates `predicate` over the fields of `schema`.
///
/// # Arguments
/// * `predicate` - Condition tree; `None` is rejected with `NullPredicate`
/// * `schema` - Table the condition's fields belong to
///
/// # Returns
/// Parenthesized SQL with one `?` per literal, parameters in order of
/// appearance.
pub fn translate(
    predicate: Option<&Predicate>,
    schema: &TableSchema,
) -> Result<TranslatedPredicate, TranslateError> {
    Translator::new(schema, false).run(predicate)
}

/// Like [`translate`], with table-qualified column names for use in joins.
pub fn translate_qualified(
    predicate: Option<&Predicate>,
    schema: &TableSchema,
) -> Result<TranslatedPredicate, TranslateError> {
    Translator::new(schema, true).run(predicate)
}

struct Translator<'s> {
    schema: &'s TableSchema,
    qualify: bool,
    sql: String,
    params: Vec<SqlValue>,
}

impl<'s> Translator<'s> {
    fn new(schema: &'s TableSchema, qualify: bool) -> Self {
        Self {
            schema,
            qualify,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn run(mut self, predicate: Option<&Predicate>) -> Result<TranslatedPredicate, TranslateError> {
        let predicate = predicate.ok_or(TranslateError::NullPredicate)?;
        self.emit(predicate)?;
        Ok(TranslatedPredicate {
            sql: self.sql,
            params: self.params,
        })
    }

    fn emit(&mut self, predicate: &Predicate) -> Result<(), TranslateError> {
        match predicate {
            Predicate::And(left, right) => self.emit_binary(left, "AND", right),
            Predicate::Or(left, right) => self.emit_binary(left, "OR", right),
            Predicate::Not(inner) => {
                self.sql.push_str("(NOT ");
                self.emit(inner)?;
                self.sql.push(')');
                Ok(())
            }
            Predicate::IsNull(field) => self.emit_null_check(field, true),
            Predicate::IsNotNull(field) => self.emit_null_check(field, false),
            Predicate::Field(field) => {
                let column = self.comparable_column(field)?;
                if column.column_type.kind != crate::types::ValueKind::Bool {
                    return Err(TranslateError::NotABoolean {
                        column: column.name.clone(),
                        kind: column.column_type.kind,
                    });
                }
                let name = self.column_sql(column);
                self.sql.push_str(&format!("({name} = ?)"));
                self.params.push(SqlValue::Integer(1));
                Ok(())
            }
            Predicate::Compare { field, op, value } if value.is_null() => match op {
                CompareOp::Eq => self.emit_null_check(field, true),
                CompareOp::Ne => self.emit_null_check(field, false),
                _ => {
                    let column = self.column(field)?;
                    Err(TranslateError::NullComparison {
                        column: column.name.clone(),
                    })
                }
            },
            Predicate::Compare { field, op, value } => {
                let column = self.comparable_column(field)?;
                let kind = column.column_type.kind;
                let literal = value
                    .coerce_to(kind)
                    .ok_or_else(|| TranslateError::LiteralKind {
                        column: column.name.clone(),
                        kind,
                        literal: format!("{value:?}"),
                    })?;
                let param = codec::to_native(&literal).map_err(|_| TranslateError::LiteralKind {
                    column: column.name.clone(),
                    kind,
                    literal: format!("{value:?}"),
                })?;
                let name = self.column_sql(column);
                self.sql.push_str(&format!("({name} {} ?)", op.sql()));
                self.params.push(param);
                Ok(())
            }
        }
    }

    fn emit_binary(
        &mut self,
        left: &Predicate,
        keyword: &str,
        right: &Predicate,
    ) -> Result<(), TranslateError> {
        self.sql.push('(');
        self.emit(left)?;
        self.sql.push(' ');
        self.sql.push_str(keyword);
        self.sql.push(' ');
        self.emit(right)?;
        self.sql.push(')');
        Ok(())
    }

    fn emit_null_check(&mut self, field: &str, is_null: bool) -> Result<(), TranslateError> {
        let column = self.unencrypted_column(field)?;
        let name = self.column_sql(column);
        let check = if is_null { "IS NULL" } else { "IS NOT NULL" };
        self.sql.push_str(&format!("({name} {check})"));
        Ok(())
    }

    fn column(&self, field: &str) -> Result<&'s ColumnSchema, TranslateError> {
        self.schema
            .column_by_field(field)
            .ok_or_else(|| TranslateError::UnknownField {
                table: self.schema.name.clone(),
                field: field.to_string(),
            })
    }

    fn unencrypted_column(&self, field: &str) -> Result<&'s ColumnSchema, TranslateError> {
        let column = self.column(field)?;
        if column.is_encrypted {
            return Err(TranslateError::EncryptedColumnInPredicate {
                table: self.schema.name.clone(),
                column: column.name.clone(),
            });
        }
        Ok(column)
    }

    /// Column usable in a value comparison.
    fn comparable_column(&self, field: &str) -> Result<&'s ColumnSchema, TranslateError> {
        let column = self.unencrypted_column(field)?;
        let kind = column.column_type.kind;
        if kind.is_null_check_only() {
            return Err(TranslateError::BlobTypeInComparison {
                table: self.schema.name.clone(),
                column: column.name.clone(),
                kind,
            });
        }
        Ok(column)
    }

    fn column_sql(&self, column: &ColumnSchema) -> String {
        if self.qualify {
            qualified(&self.schema.name, &column.name)
        } else {
            quote_ident(&column.name)
        }
    }
}
