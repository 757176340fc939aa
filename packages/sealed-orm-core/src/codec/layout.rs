//! Fixed binary layouts used for encrypted and blob-stored values.
//!
//! All multi-byte layouts are little-endian. Strings are UTF-16LE, two
//! bytes per code unit. Timestamps are 100ns ticks since 0001-01-01 UTC.
//! Decimals use four 32-bit words: mantissa low, mid, high, then flags
//! with the scale in bits 16..24 and the sign in bit 31.
//!
//! Serialization never loses data: a timestamp that is not a whole number
//! of ticks, or lies outside the tick range, is rejected.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::error::CodecError;
use crate::types::{Value, ValueKind};

const TICKS_PER_SECOND: i64 = 10_000_000;
const NANOS_PER_TICK: i64 = 100;
/// Ticks between 0001-01-01 and 1970-01-01
const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

const DECIMAL_MAX_SCALE: u32 = 28;
const DECIMAL_SIGN_BIT: u32 = 0x8000_0000;
const DECIMAL_SCALE_MASK: u32 = 0x00FF_0000;

/// Serializes a non-null value to its binary layout.
///
/// `Null` serializes to an empty buffer; callers never store it.
pub fn to_bytes(value: &Value) -> Result<Vec<u8>, CodecError> {
    Ok(match value {
        Value::Null => Vec::new(),
        Value::I8(v) => v.to_le_bytes().to_vec(),
        Value::U8(v) => v.to_le_bytes().to_vec(),
        Value::I16(v) => v.to_le_bytes().to_vec(),
        Value::U16(v) => v.to_le_bytes().to_vec(),
        Value::I32(v) => v.to_le_bytes().to_vec(),
        Value::U32(v) => v.to_le_bytes().to_vec(),
        Value::I64(v) => v.to_le_bytes().to_vec(),
        Value::U64(v) => v.to_le_bytes().to_vec(),
        Value::F32(v) => v.to_le_bytes().to_vec(),
        Value::F64(v) => v.to_le_bytes().to_vec(),
        Value::Decimal(v) => decimal_to_bytes(v).to_vec(),
        Value::Bool(v) => vec![u8::from(*v)],
        Value::String(v) => v.encode_utf16().flat_map(u16::to_le_bytes).collect(),
        Value::Timestamp(v) => timestamp_to_ticks(v)?.to_le_bytes().to_vec(),
        Value::Bytes(v) => v.clone(),
    })
}

/// Reads a value of `kind` back from its binary layout.
pub fn from_bytes(kind: ValueKind, bytes: &[u8]) -> Result<Value, CodecError> {
    if let Some(width) = kind.fixed_width() {
        if bytes.len() != width {
            return Err(CodecError::InvalidLength {
                kind,
                expected: width,
                actual: bytes.len(),
            });
        }
    }

    Ok(match kind {
        ValueKind::I8 => Value::I8(i8::from_le_bytes(fixed(bytes))),
        ValueKind::U8 => Value::U8(bytes[0]),
        ValueKind::I16 => Value::I16(i16::from_le_bytes(fixed(bytes))),
        ValueKind::U16 => Value::U16(u16::from_le_bytes(fixed(bytes))),
        ValueKind::I32 => Value::I32(i32::from_le_bytes(fixed(bytes))),
        ValueKind::U32 => Value::U32(u32::from_le_bytes(fixed(bytes))),
        ValueKind::I64 => Value::I64(i64::from_le_bytes(fixed(bytes))),
        ValueKind::U64 => Value::U64(u64::from_le_bytes(fixed(bytes))),
        ValueKind::F32 => Value::F32(f32::from_le_bytes(fixed(bytes))),
        ValueKind::F64 => Value::F64(f64::from_le_bytes(fixed(bytes))),
        ValueKind::Decimal => Value::Decimal(decimal_from_bytes(fixed(bytes))?),
        ValueKind::Bool => Value::Bool(bytes[0] != 0),
        ValueKind::Timestamp => Value::Timestamp(ticks_to_timestamp(i64::from_le_bytes(fixed(
            bytes,
        )))?),
        ValueKind::String => {
            if bytes.len() % 2 != 0 {
                return Err(CodecError::InvalidLength {
                    kind,
                    expected: bytes.len() + 1,
                    actual: bytes.len(),
                });
            }
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            Value::String(String::from_utf16_lossy(&units))
        }
        ValueKind::Bytes => Value::Bytes(bytes.to_vec()),
    })
}

// Length is checked against `fixed_width` before this is called.
fn fixed<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

/// Ticks since 0001-01-01 UTC.
///
/// Fails for instants with sub-tick precision and for instants whose tick
/// count does not fit in an `i64`.
pub fn timestamp_to_ticks(stamp: &DateTime<Utc>) -> Result<i64, CodecError> {
    let nanos = i64::from(stamp.timestamp_subsec_nanos());
    if nanos % NANOS_PER_TICK != 0 {
        return Err(CodecError::UnrepresentableTimestamp {
            value: stamp.to_rfc3339(),
            reason: "precision finer than 100ns",
        });
    }
    stamp
        .timestamp()
        .checked_mul(TICKS_PER_SECOND)
        .and_then(|ticks| ticks.checked_add(UNIX_EPOCH_TICKS))
        .and_then(|ticks| ticks.checked_add(nanos / NANOS_PER_TICK))
        .ok_or_else(|| CodecError::UnrepresentableTimestamp {
            value: stamp.to_rfc3339(),
            reason: "outside the tick range",
        })
}

pub fn ticks_to_timestamp(ticks: i64) -> Result<DateTime<Utc>, CodecError> {
    let since_epoch = ticks
        .checked_sub(UNIX_EPOCH_TICKS)
        .ok_or(CodecError::InvalidTimestamp { ticks })?;
    let seconds = since_epoch.div_euclid(TICKS_PER_SECOND);
    let nanos = since_epoch.rem_euclid(TICKS_PER_SECOND) * NANOS_PER_TICK;
    DateTime::from_timestamp(seconds, nanos as u32).ok_or(CodecError::InvalidTimestamp { ticks })
}

pub fn decimal_to_bytes(value: &Decimal) -> [u8; 16] {
    let magnitude = value.mantissa().unsigned_abs();
    let mut flags = value.scale() << 16;
    if value.is_sign_negative() {
        flags |= DECIMAL_SIGN_BIT;
    }

    let mut out = [0u8; 16];
    out[0..4].copy_from_slice(&(magnitude as u32).to_le_bytes());
    out[4..8].copy_from_slice(&((magnitude >> 32) as u32).to_le_bytes());
    out[8..12].copy_from_slice(&((magnitude >> 64) as u32).to_le_bytes());
    out[12..16].copy_from_slice(&flags.to_le_bytes());
    out
}

pub fn decimal_from_bytes(bytes: [u8; 16]) -> Result<Decimal, CodecError> {
    let word = |i: usize| u32::from_le_bytes(fixed(&bytes[i * 4..i * 4 + 4]));
    let (lo, mid, hi, flags) = (word(0), word(1), word(2), word(3));

    if flags & !(DECIMAL_SIGN_BIT | DECIMAL_SCALE_MASK) != 0 {
        return Err(CodecError::InvalidDecimal(format!(
            "reserved flag bits set: {:#010x}",
            flags
        )));
    }
    let scale = (flags & DECIMAL_SCALE_MASK) >> 16;
    if scale > DECIMAL_MAX_SCALE {
        return Err(CodecError::InvalidDecimal(format!("scale {} exceeds 28", scale)));
    }

    let magnitude = i128::from(lo) | (i128::from(mid) << 32) | (i128::from(hi) << 64);
    let mantissa = if flags & DECIMAL_SIGN_BIT != 0 {
        -magnitude
    } else {
        magnitude
    };
    let mut decimal = Decimal::try_from_i128_with_scale(mantissa, scale)
        .map_err(|e| CodecError::InvalidDecimal(e.to_string()))?;
    if flags & DECIMAL_SIGN_BIT != 0 && magnitude == 0 {
        decimal.set_sign_negative(true);
    }
    Ok(decimal)
}
