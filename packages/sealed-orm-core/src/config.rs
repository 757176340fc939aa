//! Session configuration.

use serde::Deserialize;

use crate::crypto::CipherKind;
use crate::error::OrmError;

/// Session configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrmConfig {
    /// Block cipher driving the column keystream
    pub cipher: CipherKind,
    /// Maximum depth of recursive foreign-key auto-resolution
    pub max_resolve_depth: usize,
    /// Length in bytes of the random per-row salt
    pub salt_len: usize,
}

impl Default for OrmConfig {
    fn default() -> Self {
        Self {
            cipher: CipherKind::Aes256,
            max_resolve_depth: 8,
            salt_len: 16,
        }
    }
}

impl OrmConfig {
    /// Checks the configuration for values the session cannot work with.
    pub fn validate(&self) -> Result<(), OrmError> {
        if self.salt_len == 0 {
            return Err(OrmError::Config("salt_len must be at least 1".to_string()));
        }
        if self.max_resolve_depth == 0 {
            return Err(OrmError::Config(
                "max_resolve_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
