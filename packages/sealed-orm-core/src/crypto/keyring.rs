use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use arc_swap::ArcSwapOption;

use super::material::EncryptionKey;
use super::error::CryptoError;
use crate::schema::TableSchema;

/// Default and per-table encryption keys.
///
/// Resolution order: key set on the ring for the table, then the key
/// declared on the table mapping, then the ring's default key.
#[derive(Debug, Default)]
pub struct KeyRing {
    default: ArcSwapOption<EncryptionKey>,
    tables: RwLock<HashMap<String, Arc<EncryptionKey>>>,
}

impl KeyRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_default(&self, key: EncryptionKey) {
        self.default.store(Some(Arc::new(key)));
    }

    pub fn clear_default(&self) {
        self.default.store(None);
    }

    /// Sets a key that takes precedence over the default for `table`.
    pub fn set_table_key(&self, table: &str, key: EncryptionKey) -> Result<(), CryptoError> {
        let mut tables = self.tables.write().map_err(|_| CryptoError::LockPoisoned)?;
        tables.insert(table.to_string(), Arc::new(key));
        Ok(())
    }

    /// Removes a table key; returns `true` if one was set.
    pub fn remove_table_key(&self, table: &str) -> Result<bool, CryptoError> {
        let mut tables = self.tables.write().map_err(|_| CryptoError::LockPoisoned)?;
        Ok(tables.remove(table).is_some())
    }

    /// Resolves the key used for `schema`'s encrypted columns.
    pub fn resolve(&self, schema: &TableSchema) -> Result<Arc<EncryptionKey>, CryptoError> {
        {
            let tables = self.tables.read().map_err(|_| CryptoError::LockPoisoned)?;
            if let Some(key) = tables.get(&schema.name) {
                return Ok(Arc::clone(key));
            }
        }
        if let Some(key) = &schema.key_override {
            return Ok(Arc::clone(key));
        }
        self.default.load_full().ok_or_else(|| CryptoError::NoKey {
            table: schema.name.clone(),
        })
    }
}
