use rand::RngCore;
use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::error::CryptoError;

/// Block cipher selection for the column keystream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CipherKind {
    Aes128,
    Aes192,
    Aes256,
    /// Single DES, 56-bit effective key
    Des,
    /// Three-key triple DES, 168-bit effective key
    TripleDes,
    /// GOST 28147-89 (Magma), 256-bit key
    Gost,
}

impl CipherKind {
    /// Number of key bytes the cipher consumes.
    pub fn key_len(self) -> usize {
        match self {
            CipherKind::Aes128 => 16,
            CipherKind::Aes192 => 24,
            CipherKind::Aes256 | CipherKind::Gost => 32,
            CipherKind::Des => 8,
            CipherKind::TripleDes => 24,
        }
    }

    /// DES variants take a prefix of a longer key; the others need an exact length.
    fn accepts_longer_keys(self) -> bool {
        matches!(self, CipherKind::Des | CipherKind::TripleDes)
    }

    /// Checks `key` against this cipher's length rule.
    pub fn validate_key(self, key: &[u8]) -> Result<(), CryptoError> {
        let required = self.key_len();
        let ok = if self.accepts_longer_keys() {
            key.len() >= required
        } else {
            key.len() == required
        };
        if ok {
            return Ok(());
        }
        let requirement = if self.accepts_longer_keys() {
            format!("at least {}", required)
        } else {
            format!("exactly {}", required)
        };
        Err(CryptoError::InvalidKeyLength {
            cipher: self,
            requirement,
            actual: key.len(),
        })
    }

    /// Returns the key bytes the cipher actually uses.
    pub(crate) fn cipher_key(self, key: &[u8]) -> Result<&[u8], CryptoError> {
        self.validate_key(key)?;
        Ok(&key[..self.key_len()])
    }
}

/// Secret key material; wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    bytes: Vec<u8>,
}

impl EncryptionKey {
    /// Creates a key, validating its length for `cipher`.
    pub fn new(cipher: CipherKind, bytes: impl Into<Vec<u8>>) -> Result<Self, CryptoError> {
        let bytes = bytes.into();
        cipher.validate_key(&bytes)?;
        Ok(Self { bytes })
    }

    /// Generates a random key of the length `cipher` consumes.
    pub fn generate(cipher: CipherKind) -> Self {
        let mut bytes = vec![0u8; cipher.key_len()];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EncryptionKey([REDACTED; {}])", self.bytes.len())
    }
}

/// Random per-row value stored in the reserved salt column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Salt(Vec<u8>);

impl Salt {
    /// Generates `len` random bytes.
    pub fn generate(len: usize) -> Self {
        let mut bytes = vec![0u8; len.max(1)];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Restores a salt read back from storage.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CryptoError> {
        if bytes.is_empty() {
            return Err(CryptoError::InvalidSalt);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Key and salt for one row's encode or decode pass.
#[derive(Debug, Clone, Copy)]
pub struct CipherContext<'a> {
    pub key: &'a EncryptionKey,
    pub salt: &'a Salt,
}

impl<'a> CipherContext<'a> {
    pub fn new(key: &'a EncryptionKey, salt: &'a Salt) -> Self {
        Self { key, salt }
    }
}
