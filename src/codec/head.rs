//! Field head: the one- or two-byte `(type, tag)` prefix of every wire field.

use std::fmt;

use super::DecodeError;

/// Tags at or above this value use the extended two-byte head.
pub const EXTENDED_TAG: u8 = 15;

/// Wire type code stored in the low nibble of a head byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TypeCode {
    Int8 = 0,
    Int16 = 1,
    Int32 = 2,
    Int64 = 3,
    Float = 4,
    Double = 5,
    String1 = 6,
    String4 = 7,
    Map = 8,
    List = 9,
    StructBegin = 10,
    StructEnd = 11,
    ZeroTag = 12,
    SimpleList = 13,
}

impl TypeCode {
    /// Decode a type code from its nibble value.
    pub fn from_u8(code: u8) -> Result<Self, DecodeError> {
        Ok(match code {
            0 => Self::Int8,
            1 => Self::Int16,
            2 => Self::Int32,
            3 => Self::Int64,
            4 => Self::Float,
            5 => Self::Double,
            6 => Self::String1,
            7 => Self::String4,
            8 => Self::Map,
            9 => Self::List,
            10 => Self::StructBegin,
            11 => Self::StructEnd,
            12 => Self::ZeroTag,
            13 => Self::SimpleList,
            other => return Err(DecodeError::UnknownTypeCode(other)),
        })
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float => "float",
            Self::Double => "double",
            Self::String1 => "string1",
            Self::String4 => "string4",
            Self::Map => "map",
            Self::List => "list",
            Self::StructBegin => "struct-begin",
            Self::StructEnd => "struct-end",
            Self::ZeroTag => "zero-tag",
            Self::SimpleList => "simple-list",
        }
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded field head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Head {
    pub type_code: TypeCode,
    pub tag: u8,
}

impl Head {
    pub fn new(type_code: TypeCode, tag: u8) -> Self {
        Self { type_code, tag }
    }

    /// Number of bytes this head occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        if self.tag < EXTENDED_TAG { 1 } else { 2 }
    }

    /// Append the head bytes to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        let code = self.type_code.as_u8();
        if self.tag < EXTENDED_TAG {
            out.push((self.tag << 4) | code);
        } else {
            out.push((EXTENDED_TAG << 4) | code);
            out.push(self.tag);
        }
    }

    /// Decode a head from the start of `bytes`, returning it with its length.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize), DecodeError> {
        let first = *bytes.first().ok_or(DecodeError::BufferTooSmall {
            needed: 1,
            available: 0,
        })?;
        let type_code = TypeCode::from_u8(first & 0x0f)?;
        let short_tag = first >> 4;
        if short_tag < EXTENDED_TAG {
            return Ok((Self::new(type_code, short_tag), 1));
        }
        let tag = *bytes.get(1).ok_or(DecodeError::BufferTooSmall {
            needed: 2,
            available: bytes.len(),
        })?;
        Ok((Self::new(type_code, tag), 2))
    }
}
