use cipher::{Block, BlockEncrypt, KeyInit};

use super::material::{CipherContext, CipherKind};
use super::error::CryptoError;

/// Stream transform applied to a column's serialized bytes.
///
/// Applying the keystream twice with the same context and ordinal restores
/// the input. Distinct ordinals must yield distinct keystreams.
pub trait Keystream: Send + Sync {
    fn apply_keystream(
        &self,
        ctx: &CipherContext<'_>,
        buffer: &mut [u8],
        column_ordinal: usize,
    ) -> Result<(), CryptoError>;
}

/// Counter-mode keystream over a block cipher.
///
/// Counter block `i` of column `n` is the salt repeated to the block size,
/// with `(n << 32) | i` folded into its last eight bytes.
#[derive(Debug, Clone, Copy)]
pub struct BlockKeystream {
    kind: CipherKind,
}

impl BlockKeystream {
    pub fn new(kind: CipherKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> CipherKind {
        self.kind
    }
}

impl Keystream for BlockKeystream {
    fn apply_keystream(
        &self,
        ctx: &CipherContext<'_>,
        buffer: &mut [u8],
        column_ordinal: usize,
    ) -> Result<(), CryptoError> {
        let key = self.kind.cipher_key(ctx.key.as_bytes())?;
        let salt = ctx.salt.as_bytes();
        let ordinal = column_ordinal as u64;
        match self.kind {
            CipherKind::Aes128 => xor_counter_stream::<aes::Aes128>(self.kind, key, salt, ordinal, buffer),
            CipherKind::Aes192 => xor_counter_stream::<aes::Aes192>(self.kind, key, salt, ordinal, buffer),
            CipherKind::Aes256 => xor_counter_stream::<aes::Aes256>(self.kind, key, salt, ordinal, buffer),
            CipherKind::Des => xor_counter_stream::<des::Des>(self.kind, key, salt, ordinal, buffer),
            CipherKind::TripleDes => {
                xor_counter_stream::<des::TdesEde3>(self.kind, key, salt, ordinal, buffer)
            }
            CipherKind::Gost => xor_counter_stream::<magma::Magma>(self.kind, key, salt, ordinal, buffer),
        }
    }
}

fn xor_counter_stream<C>(
    kind: CipherKind,
    key: &[u8],
    salt: &[u8],
    ordinal: u64,
    buffer: &mut [u8],
) -> Result<(), CryptoError>
where
    C: BlockEncrypt + KeyInit,
{
    if salt.is_empty() {
        return Err(CryptoError::InvalidSalt);
    }
    let cipher = C::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
        cipher: kind,
        requirement: format!("exactly {}", kind.key_len()),
        actual: key.len(),
    })?;

    let mut block = Block::<C>::default();
    for (index, chunk) in buffer.chunks_mut(C::block_size()).enumerate() {
        fill_counter_block(&mut block, salt, ordinal, index as u64);
        cipher.encrypt_block(&mut block);
        for (byte, pad) in chunk.iter_mut().zip(block.iter()) {
            *byte ^= pad;
        }
    }
    Ok(())
}

// All supported ciphers have blocks of at least eight bytes.
fn fill_counter_block(block: &mut [u8], salt: &[u8], ordinal: u64, index: u64) {
    for (i, byte) in block.iter_mut().enumerate() {
        *byte = salt[i % salt.len()];
    }
    let tweak = (ordinal << 32) | (index & 0xFFFF_FFFF);
    let tail = block.len() - 8;
    for (byte, t) in block[tail..].iter_mut().zip(tweak.to_le_bytes()) {
        *byte ^= t;
    }
}
