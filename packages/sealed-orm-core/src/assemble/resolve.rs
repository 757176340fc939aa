//! Recursive foreign-key auto-resolution.

use std::collections::HashSet;

use super::RowAssembler;
use crate::codec::{self, layout};
use crate::engine::{run_query, SqlEngine};
use crate::error::OrmError;
use crate::record::DynRecord;
use crate::schema::{ForeignKeyRef, SchemaRegistry, TableSchema};
use crate::sql;
use crate::types::Value;

/// Table name and encoded primary key of a record on the resolution path.
type Identity = (String, Vec<u8>);

/// Loads auto-resolved foreign key targets into navigation fields.
///
/// Recursion is bounded twice: a record already on the current resolution
/// path is not loaded again, and no chain goes deeper than `max_depth`.
/// In both cases the navigation field is left empty.
pub struct Resolver<'r, E: SqlEngine + ?Sized> {
    engine: &'r E,
    registry: &'r SchemaRegistry,
    assembler: &'r RowAssembler<'r>,
    max_depth: usize,
}

impl<'r, E: SqlEngine + ?Sized> Resolver<'r, E> {
    pub fn new(
        engine: &'r E,
        registry: &'r SchemaRegistry,
        assembler: &'r RowAssembler<'r>,
        max_depth: usize,
    ) -> Self {
        Self {
            engine,
            registry,
            assembler,
            max_depth,
        }
    }

    /// Resolves every auto-resolved foreign key of `record`, recursively.
    pub fn resolve(&self, record: &mut dyn DynRecord, schema: &TableSchema) -> Result<(), OrmError> {
        if !schema.foreign_keys().any(|(_, fk)| fk.auto_resolve) {
            return Ok(());
        }
        let mut path = HashSet::new();
        if let Some(identity) = identity(schema, record) {
            path.insert(identity);
        }
        self.resolve_at(record, schema, &mut path, 1)
    }

    fn resolve_at(
        &self,
        record: &mut dyn DynRecord,
        schema: &TableSchema,
        path: &mut HashSet<Identity>,
        depth: usize,
    ) -> Result<(), OrmError> {
        for (_, fk) in schema.foreign_keys().filter(|(_, fk)| fk.auto_resolve) {
            let Some(navigation) = fk.navigation_field.as_deref() else {
                continue;
            };
            let key = record
                .get_value(&fk.owning_field)
                .ok_or_else(|| OrmError::FieldNotFound {
                    table: schema.name.clone(),
                    field: fk.owning_field.clone(),
                })?;

            let target = if key.is_null() {
                None
            } else if depth > self.max_depth {
                tracing::warn!(
                    table = %schema.name,
                    field = navigation,
                    max_depth = self.max_depth,
                    "Foreign key resolution depth limit reached"
                );
                None
            } else {
                self.load(fk, &key, path, depth)?
            };

            if !record.set_navigation(navigation, target) {
                return Err(OrmError::FieldNotFound {
                    table: schema.name.clone(),
                    field: navigation.to_string(),
                });
            }
        }
        Ok(())
    }

    fn load(
        &self,
        fk: &ForeignKeyRef,
        key: &Value,
        path: &mut HashSet<Identity>,
        depth: usize,
    ) -> Result<Option<Box<dyn DynRecord>>, OrmError> {
        let target_schema = self.registry.require(fk.referenced_type)?;
        let column = target_schema
            .column_by_field(&fk.referenced_field)
            .ok_or_else(|| OrmError::FieldNotFound {
                table: target_schema.name.clone(),
                field: fk.referenced_field.clone(),
            })?;
        let Some(literal) = key.coerce_to(column.column_type.kind) else {
            return Ok(None);
        };

        tracing::debug!(table = %target_schema.name, depth, "Resolving foreign key");
        let statement = sql::select_by_column(&target_schema, column);
        let rows = run_query(
            self.engine,
            &target_schema.name,
            &statement,
            &[codec::to_native(&literal)?],
        )?;
        let Some(row) = rows.first() else {
            return Ok(None);
        };
        let Some(mut target) = self.assembler.read_record(row, &target_schema)? else {
            return Ok(None);
        };

        let identity = identity(&target_schema, target.as_ref());
        if let Some(identity) = &identity {
            if !path.insert(identity.clone()) {
                tracing::warn!(
                    table = %target_schema.name,
                    owning_field = %fk.owning_field,
                    "Foreign key cycle detected; navigation left empty"
                );
                return Ok(None);
            }
        }
        let resolved = self.resolve_at(target.as_mut(), &target_schema, path, depth + 1);
        if let Some(identity) = &identity {
            path.remove(identity);
        }
        resolved?;
        Ok(Some(target))
    }
}

fn identity(schema: &TableSchema, record: &dyn DynRecord) -> Option<Identity> {
    let key = schema.primary_key();
    let value = record.get_value(&key.field).filter(|value| !value.is_null())?;
    let bytes = layout::to_bytes(&value).ok()?;
    Some((schema.name.clone(), bytes))
}
