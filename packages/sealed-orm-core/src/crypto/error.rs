use super::material::CipherKind;

/// Error type for key resolution and keystream application.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("No encryption key set for table '{table}' and no default key configured")]
    NoKey { table: String },

    #[error("{cipher:?} requires a key of {requirement} bytes, got {actual}")]
    InvalidKeyLength {
        cipher: CipherKind,
        requirement: String,
        actual: usize,
    },

    #[error("Row of table '{table}' has encrypted values but no salt")]
    MissingSalt { table: String },

    #[error("Salt must not be empty")]
    InvalidSalt,

    #[error("Key ring lock poisoned")]
    LockPoisoned,
}
