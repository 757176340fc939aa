//! Process-wide cache of validated table schemas keyed by record type.

use std::any::{type_name, TypeId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::error::SchemaError;
use super::table::TableSchema;
use super::validation;
use crate::record::Record;

/// Schemas built during one registration call, not yet visible to readers.
pub(crate) type Staged = HashMap<TypeId, Arc<TableSchema>>;

pub(crate) type RegisterFn =
    fn(&SchemaRegistry, &mut Staged) -> Result<Arc<TableSchema>, SchemaError>;

/// Registry of table schemas.
///
/// A registration builds the requested schema and every schema it reaches
/// through foreign keys into a staging map, checks all of them, and only
/// then publishes them together under one write lock. Readers never see a
/// schema whose references failed validation. Publication is
/// insert-if-absent: concurrent callers for the same type end up sharing
/// one schema.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<TypeId, Arc<TableSchema>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the schema for `T`, registering it and every type it
    /// references on first use.
    pub fn schema_for<T: Record>(&self) -> Result<Arc<TableSchema>, SchemaError> {
        let type_id = TypeId::of::<T>();
        if let Some(existing) = self.lookup(type_id)? {
            return Ok(existing);
        }
        let mut staged = Staged::new();
        let schema = Self::register::<T>(self, &mut staged)?;
        self.publish(staged)?;
        Ok(self.lookup(type_id)?.unwrap_or(schema))
    }

    pub(crate) fn register<T: Record>(&self, staged: &mut Staged) -> Result<Arc<TableSchema>, SchemaError> {
        let type_id = TypeId::of::<T>();
        if let Some(pending) = staged.get(&type_id) {
            return Ok(Arc::clone(pending));
        }
        if let Some(existing) = self.lookup(type_id)? {
            return Ok(existing);
        }

        let decl = T::declaration().ok_or(SchemaError::MissingDeclaration {
            type_name: type_name::<T>(),
        })?;
        let schema = Arc::new(validation::build_table_schema::<T>(decl)?);
        if let Some(other) = staged.values().find(|other| other.name == schema.name) {
            return Err(SchemaError::DuplicateTable {
                table: schema.name.clone(),
                type_name: other.type_name,
            });
        }
        if let Some(other) = self.lookup_table(&schema.name)? {
            return Err(SchemaError::DuplicateTable {
                table: schema.name.clone(),
                type_name: other.type_name,
            });
        }

        // Staged before its targets so that cyclic references terminate.
        staged.insert(type_id, Arc::clone(&schema));
        for (column, fk) in schema.foreign_keys() {
            let target = (fk.register)(self, staged)?;
            validation::validate_foreign_key_target(&schema, column, fk, &target)?;
        }
        Ok(schema)
    }

    /// Makes a fully validated registration visible.
    fn publish(&self, staged: Staged) -> Result<(), SchemaError> {
        let mut schemas = self.schemas.write().map_err(|_| SchemaError::LockPoisoned)?;
        for schema in staged.values() {
            if let Some(other) = schemas
                .values()
                .find(|other| other.type_id != schema.type_id && other.name == schema.name)
            {
                return Err(SchemaError::DuplicateTable {
                    table: schema.name.clone(),
                    type_name: other.type_name,
                });
            }
        }
        for (type_id, schema) in staged {
            if let Entry::Vacant(entry) = schemas.entry(type_id) {
                tracing::debug!(
                    table = %schema.name,
                    record = schema.type_name,
                    columns = schema.columns.len(),
                    encrypted = schema.has_encrypted_columns,
                    "Registered table schema"
                );
                entry.insert(schema);
            }
        }
        Ok(())
    }

    pub fn lookup(&self, type_id: TypeId) -> Result<Option<Arc<TableSchema>>, SchemaError> {
        let schemas = self.schemas.read().map_err(|_| SchemaError::LockPoisoned)?;
        Ok(schemas.get(&type_id).cloned())
    }

    pub fn lookup_table(&self, table: &str) -> Result<Option<Arc<TableSchema>>, SchemaError> {
        let schemas = self.schemas.read().map_err(|_| SchemaError::LockPoisoned)?;
        Ok(schemas.values().find(|schema| schema.name == table).cloned())
    }

    /// Like [`lookup`](Self::lookup) but fails for unregistered types.
    pub fn require(&self, type_id: TypeId) -> Result<Arc<TableSchema>, SchemaError> {
        self.lookup(type_id)?.ok_or_else(|| SchemaError::NotRegistered {
            what: format!("{type_id:?}"),
        })
    }

    /// Names of all registered tables, sorted.
    pub fn tables(&self) -> Result<Vec<String>, SchemaError> {
        let schemas = self.schemas.read().map_err(|_| SchemaError::LockPoisoned)?;
        let mut names: Vec<String> = schemas.values().map(|schema| schema.name.clone()).collect();
        names.sort();
        Ok(names)
    }

    pub fn len(&self) -> usize {
        self.schemas.read().map(|schemas| schemas.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
