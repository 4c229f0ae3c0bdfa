//! Error types for wire encoding and decoding.

use thiserror::Error;

use super::head::TypeCode;

/// Errors that can occur while decoding a wire payload.
///
/// Decode errors abort the current call only; they never indicate corrupted
/// shared state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("Required field missing: tag {tag}")]
    RequiredFieldMissing { tag: u8 },

    #[error("Type mismatch at tag {tag}: expected {expected}, got {got}")]
    TypeMismatch {
        tag: u8,
        expected: &'static str,
        got: TypeCode,
    },

    #[error("Unknown type code: {0}")]
    UnknownTypeCode(u8),

    #[error("Invalid length: {0}")]
    InvalidLength(i64),

    #[error("Invalid UTF-8 in string")]
    InvalidUtf8,

    #[error("Fixed array length mismatch: declared {expected}, decoded {actual}")]
    ArrayLength { expected: usize, actual: usize },

    #[error("Nesting deeper than {0} levels")]
    NestingTooDeep(usize),

    #[error("Unsupported protocol version: {0}")]
    UnsupportedVersion(u16),

    #[error("Missing attribute: {0}")]
    MissingAttribute(String),

    #[error("JSON decode error: {0}")]
    Json(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Errors that can occur while encoding a wire payload.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("Length {0} exceeds the wire limit")]
    LengthOverflow(usize),

    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("JSON encode error: {0}")]
    Json(String),
}

impl DecodeError {
    /// Returns `true` if this error reports an absent required field.
    pub fn is_missing_field(&self) -> bool {
        matches!(
            self,
            Self::RequiredFieldMissing { .. } | Self::MissingAttribute(_)
        )
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

impl From<serde_json::Error> for EncodeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}
