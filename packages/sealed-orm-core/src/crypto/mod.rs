//! Key material, per-row salts and the position-keyed column keystream.
//!
//! Cipher state is never shared: every encode/decode call receives an
//! explicit [`CipherContext`] holding the key and the row's salt.

mod material;
mod error;
mod keyring;
mod keystream;

pub use material::{CipherContext, CipherKind, EncryptionKey, Salt};
pub use error::CryptoError;
pub use keyring::KeyRing;
pub use keystream::{BlockKeystream, Keystream};
