use crate::crypto::CryptoError;
use crate::engine::StorageType;
use crate::types::ValueKind;

/// Error type for converting values to and from their storage form.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Field '{field}' expects {expected:?}, got {got:?}")]
    KindMismatch {
        field: String,
        expected: ValueKind,
        got: Option<ValueKind>,
    },

    #[error("Field '{field}' is not nullable but the stored value is absent")]
    UnexpectedNull { field: String },

    #[error("Record has no field '{field}'")]
    UnknownField { field: String },

    #[error("{kind:?} layout needs {expected} bytes, got {actual}")]
    InvalidLength {
        kind: ValueKind,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid decimal layout: {0}")]
    InvalidDecimal(String),

    #[error("Tick count {ticks} is outside the supported timestamp range")]
    InvalidTimestamp { ticks: i64 },

    #[error("Timestamp {value} cannot be stored: {reason}")]
    UnrepresentableTimestamp {
        value: String,
        reason: &'static str,
    },

    #[error("Stored value {value} for column '{column}' does not fit {kind:?}")]
    OutOfRange {
        column: String,
        kind: ValueKind,
        value: String,
    },

    #[error("Column '{column}' ({kind:?}) cannot be read from {storage:?} storage")]
    UnexpectedStorage {
        column: String,
        kind: ValueKind,
        storage: StorageType,
    },

    #[error("Column '{column}' is encrypted but no cipher context was supplied")]
    MissingCipher { column: String },

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
