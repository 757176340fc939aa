//! Session facade: drives an engine with the registry, key ring and codec.

use std::sync::Arc;

use crate::assemble::{downcast_record, Resolver, RowAssembler};
use crate::codec::{self, CodecError, ColumnCodec};
use crate::config::OrmConfig;
use crate::crypto::{BlockKeystream, CipherContext, EncryptionKey, KeyRing, Salt};
use crate::engine::{run_execute, run_query, SqlEngine, SqlRow, SqlValue};
use crate::error::OrmError;
use crate::query::{
    translate, translate_join, translate_order_by, translate_qualified, validate_limit, JoinKind,
    Predicate, Query,
};
use crate::record::{DynRecord, Record};
use crate::schema::{ColumnSchema, SchemaRegistry, TableSchema, SALT_COLUMN};
use crate::sql;
use crate::types::Value;

/// Typed persistence over one engine handle.
///
/// The session holds no per-row cipher state: every write generates its own
/// salt and every read takes the salt stored with the row, so a session can
/// be shared by reference across threads whenever its engine can.
pub struct Session<E: SqlEngine> {
    engine: E,
    registry: Arc<SchemaRegistry>,
    keys: KeyRing,
    keystream: BlockKeystream,
    config: OrmConfig,
}

impl<E: SqlEngine> Session<E> {
    /// Creates a session with the default configuration and its own registry.
    pub fn new(engine: E) -> Self {
        let config = OrmConfig::default();
        Self {
            engine,
            registry: Arc::new(SchemaRegistry::new()),
            keys: KeyRing::new(),
            keystream: BlockKeystream::new(config.cipher),
            config,
        }
    }

    pub fn with_config(engine: E, config: OrmConfig) -> Result<Self, OrmError> {
        Self::with_registry(engine, Arc::new(SchemaRegistry::new()), config)
    }

    /// Creates a session sharing an existing schema registry.
    pub fn with_registry(
        engine: E,
        registry: Arc<SchemaRegistry>,
        config: OrmConfig,
    ) -> Result<Self, OrmError> {
        config.validate()?;
        Ok(Self {
            engine,
            registry,
            keys: KeyRing::new(),
            keystream: BlockKeystream::new(config.cipher),
            config,
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &OrmConfig {
        &self.config
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Sets the key used for tables without a more specific one.
    pub fn set_default_key(&self, key: EncryptionKey) -> Result<(), OrmError> {
        self.config.cipher.validate_key(key.as_bytes())?;
        self.keys.set_default(key);
        Ok(())
    }

    pub fn clear_default_key(&self) {
        self.keys.clear_default();
    }

    /// Sets the key for `T`'s table, overriding the default and declared keys.
    pub fn set_table_key<T: Record>(&self, key: EncryptionKey) -> Result<(), OrmError> {
        self.config.cipher.validate_key(key.as_bytes())?;
        let schema = self.schema::<T>()?;
        self.keys.set_table_key(&schema.name, key)?;
        Ok(())
    }

    /// Schema for `T`, registering it on first use.
    pub fn schema<T: Record>(&self) -> Result<Arc<TableSchema>, OrmError> {
        Ok(self.registry.schema_for::<T>()?)
    }

    pub fn create_table<T: Record>(&self) -> Result<(), OrmError> {
        let schema = self.schema::<T>()?;
        let statement = sql::create_table(&schema)?;
        run_execute(&self.engine, &schema.name, &statement, &[])?;
        Ok(())
    }

    pub fn drop_table<T: Record>(&self) -> Result<(), OrmError> {
        let schema = self.schema::<T>()?;
        run_execute(&self.engine, &schema.name, &sql::drop_table(&schema), &[])?;
        Ok(())
    }

    /// Inserts `record` under a fresh row salt.
    ///
    /// An auto-increment key left at zero (or absent) is assigned by the
    /// engine and written back into the record. Absent values of columns
    /// with a default are omitted so the default applies.
    pub fn insert<T: Record>(&self, record: &mut T) -> Result<(), OrmError> {
        let schema = self.schema::<T>()?;
        let cipher = self.row_cipher(&schema)?;
        let ctx = cipher
            .as_ref()
            .map(|(key, salt)| CipherContext::new(key, salt));
        let codec = ColumnCodec::new(&self.keystream);

        let mut names = Vec::with_capacity(schema.row_width());
        let mut params = Vec::with_capacity(schema.row_width());
        let mut generated = None;
        for column in &schema.columns {
            let value = field_value(&*record, &schema, column)?;
            if column.is_auto_increment && is_unset_key(&value) {
                generated = Some(column);
                continue;
            }
            if value.is_null() && column.default_value.is_some() {
                continue;
            }
            names.push(column.name.as_str());
            params.push(codec.encode(&value, column, ctx.as_ref())?);
        }
        if let Some((_, salt)) = &cipher {
            names.push(SALT_COLUMN);
            params.push(SqlValue::Blob(salt.as_bytes().to_vec()));
        }

        let statement = sql::insert(&schema, &names);
        run_execute(&self.engine, &schema.name, &statement, &params)?;

        if let Some(column) = generated {
            let id = self
                .engine
                .last_insert_id()
                .map_err(|err| OrmError::storage(&schema.name, err))?;
            record.set_value(&column.field, Value::I64(id))?;
        }
        Ok(())
    }

    /// Rewrites every column of the row addressed by `record`'s primary key.
    ///
    /// Encrypted columns are re-encrypted under a fresh salt.
    pub fn update<T: Record>(&self, record: &T) -> Result<u64, OrmError> {
        let schema = self.schema::<T>()?;
        let cipher = self.row_cipher(&schema)?;
        let ctx = cipher
            .as_ref()
            .map(|(key, salt)| CipherContext::new(key, salt));
        let codec = ColumnCodec::new(&self.keystream);

        let mut params = Vec::with_capacity(schema.row_width());
        for column in schema.columns.iter().filter(|c| !c.is_primary_key) {
            let value = field_value(record, &schema, column)?;
            params.push(codec.encode(&value, column, ctx.as_ref())?);
        }
        if let Some((_, salt)) = &cipher {
            params.push(SqlValue::Blob(salt.as_bytes().to_vec()));
        }
        params.push(self.key_param(&schema, field_value(record, &schema, schema.primary_key())?)?);

        run_execute(&self.engine, &schema.name, &sql::update_by_key(&schema), &params)
    }

    /// Deletes the row addressed by `record`'s primary key.
    pub fn delete<T: Record>(&self, record: &T) -> Result<u64, OrmError> {
        let schema = self.schema::<T>()?;
        let key = field_value(record, &schema, schema.primary_key())?;
        let params = [self.key_param(&schema, key)?];
        run_execute(&self.engine, &schema.name, &sql::delete_by_key(&schema), &params)
    }

    pub fn delete_where<T: Record>(&self, predicate: &Predicate) -> Result<u64, OrmError> {
        let schema = self.schema::<T>()?;
        let translated = translate(Some(predicate), &schema)?;
        let statement = sql::delete_where(&schema, &translated.sql);
        run_execute(&self.engine, &schema.name, &statement, &translated.params)
    }

    /// Reads the record with primary key `key`.
    pub fn find<T: Record>(&self, key: impl Into<Value>) -> Result<Option<T>, OrmError> {
        let schema = self.schema::<T>()?;
        let params = [self.key_param(&schema, key.into())?];
        let statement = sql::select_by_column(&schema, schema.primary_key());
        let rows = run_query(&self.engine, &schema.name, &statement, &params)?;
        Ok(self.read_rows::<T>(&schema, &rows)?.into_iter().next())
    }

    /// Like [`find`](Self::find), failing when the record does not exist.
    pub fn get<T: Record>(&self, key: impl Into<Value>) -> Result<T, OrmError> {
        let key = key.into();
        let rendered = format!("{key:?}");
        self.find::<T>(key)?.ok_or_else(|| OrmError::RecordNotFound {
            table: self
                .schema::<T>()
                .map(|schema| schema.name.clone())
                .unwrap_or_default(),
            key: rendered,
        })
    }

    /// Runs a filtered query; a query without a filter is rejected.
    pub fn select<T: Record>(&self, query: Query<T>) -> Result<Vec<T>, OrmError> {
        let schema = self.schema::<T>()?;
        let predicate = translate(query.filter.as_ref(), &schema)?;
        let mut params = predicate.params;

        let order = match &query.order {
            Some((field, direction)) => Some((translate_order_by(field, &schema)?, direction.sql())),
            None => None,
        };
        let limit = query.limit.map(validate_limit).transpose()?;
        if let Some(limit) = limit {
            params.push(SqlValue::Integer(limit));
        }

        let statement = sql::select(&schema, Some(&predicate.sql), order, limit.is_some());
        let rows = run_query(&self.engine, &schema.name, &statement, &params)?;
        self.read_rows(&schema, &rows)
    }

    /// Reads every row of `T`'s table.
    pub fn all<T: Record>(&self) -> Result<Vec<T>, OrmError> {
        let schema = self.schema::<T>()?;
        let statement = sql::select(&schema, None, None, false);
        let rows = run_query(&self.engine, &schema.name, &statement, &[])?;
        self.read_rows(&schema, &rows)
    }

    pub fn count<T: Record>(&self, predicate: &Predicate) -> Result<u64, OrmError> {
        let schema = self.schema::<T>()?;
        let translated = translate(Some(predicate), &schema)?;
        let statement = sql::count(&schema, &translated.sql);
        let rows = run_query(&self.engine, &schema.name, &statement, &translated.params)?;
        match rows.first().and_then(|row| row.get(0)) {
            Some(SqlValue::Integer(count)) => Ok(u64::try_from(*count).unwrap_or(0)),
            _ => Err(OrmError::RowLayout {
                expected: 1,
                got: rows.first().map_or(0, SqlRow::len),
            }),
        }
    }

    /// Joins `L` to `R` on `left_field = right_field`.
    ///
    /// # Arguments
    /// * `left_field` - Field of `L` on the left of the equality
    /// * `right_field` - Field of `R` on the right of the equality
    /// * `kind` - Inner or left join
    /// * `filter` - Optional condition over `L`'s fields
    ///
    /// # Returns
    /// One pair per result row; the right side is `None` where a left join
    /// found no match.
    pub fn join<L: Record, R: Record>(
        &self,
        left_field: &str,
        right_field: &str,
        kind: JoinKind,
        filter: Option<&Predicate>,
    ) -> Result<Vec<(L, Option<R>)>, OrmError> {
        let left = self.schema::<L>()?;
        let right = self.schema::<R>()?;
        let on = translate_join(left_field, right_field, &left, &right)?;
        let (condition, params) = match filter {
            Some(predicate) => {
                let translated = translate_qualified(Some(predicate), &left)?;
                (Some(translated.sql), translated.params)
            }
            None => (None, Vec::new()),
        };

        let statement = sql::join(&left, &right, kind, &on, condition.as_deref());
        let rows = run_query(&self.engine, &left.name, &statement, &params)?;

        let assembler = self.assembler();
        let resolver = self.resolver(&assembler);
        let mut pairs = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut partitions = assembler.decode_row(row, &[&*left, &*right])?.into_iter();
            let (Some(left_part), right_part) = (
                partitions.next().flatten(),
                partitions.next().flatten(),
            ) else {
                continue;
            };

            let mut left_record = assembler.materialize(&left, left_part)?;
            resolver.resolve(left_record.as_mut(), &left)?;
            let right_record = match right_part {
                Some(partition) => {
                    let mut record = assembler.materialize(&right, partition)?;
                    resolver.resolve(record.as_mut(), &right)?;
                    Some(downcast_record::<R>(record, &right)?)
                }
                None => None,
            };
            pairs.push((downcast_record::<L>(left_record, &left)?, right_record));
        }
        Ok(pairs)
    }

    fn assembler(&self) -> RowAssembler<'_> {
        RowAssembler::new(&self.keystream, &self.keys)
    }

    fn resolver<'r>(&'r self, assembler: &'r RowAssembler<'r>) -> Resolver<'r, E> {
        Resolver::new(
            &self.engine,
            &self.registry,
            assembler,
            self.config.max_resolve_depth,
        )
    }

    fn read_rows<T: Record>(&self, schema: &TableSchema, rows: &[SqlRow]) -> Result<Vec<T>, OrmError> {
        let assembler = self.assembler();
        let resolver = self.resolver(&assembler);
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(mut record) = assembler.read_record(row, schema)? else {
                continue;
            };
            resolver.resolve(record.as_mut(), schema)?;
            records.push(downcast_record::<T>(record, schema)?);
        }
        Ok(records)
    }

    /// Key and fresh salt for a row write, when the table needs them.
    fn row_cipher(&self, schema: &TableSchema) -> Result<Option<(Arc<EncryptionKey>, Salt)>, OrmError> {
        if !schema.has_encrypted_columns {
            return Ok(None);
        }
        let key = self.keys.resolve(schema)?;
        Ok(Some((key, Salt::generate(self.config.salt_len))))
    }

    /// Storage form of a primary key value.
    fn key_param(&self, schema: &TableSchema, key: Value) -> Result<SqlValue, OrmError> {
        let column = schema.primary_key();
        let key = key
            .coerce_to(column.column_type.kind)
            .ok_or_else(|| CodecError::KindMismatch {
                field: column.field.clone(),
                expected: column.column_type.kind,
                got: key.kind(),
            })?;
        Ok(codec::to_native(&key)?)
    }
}

fn field_value(
    record: &dyn DynRecord,
    schema: &TableSchema,
    column: &ColumnSchema,
) -> Result<Value, OrmError> {
    record
        .get_value(&column.field)
        .ok_or_else(|| OrmError::FieldNotFound {
            table: schema.name.clone(),
            field: column.field.clone(),
        })
}

fn is_unset_key(value: &Value) -> bool {
    value.is_null() || value.as_i128() == Some(0)
}
