//! TARS binary writer.

use super::head::{Head, TypeCode};
use super::EncodeError;

/// Convert a host length to the signed 32-bit count used on the wire.
#[inline]
pub fn wire_len(len: usize) -> Result<i32, EncodeError> {
    i32::try_from(len).map_err(|_| EncodeError::LengthOverflow(len))
}

/// Append-only output buffer for the TARS binary encoding.
///
/// Integers are written in their narrowest representation: zero becomes a
/// bare `ZeroTag` head, and values that fit a smaller width are demoted.
/// Every call owns its own writer; nothing here is shared.
#[derive(Debug, Default, Clone)]
pub struct TarsWriter {
    data: Vec<u8>,
}

impl TarsWriter {
    /// Create a new empty writer.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Create a writer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Get the bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the writer and return the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Discard everything written so far, keeping the allocation.
    pub fn reset(&mut self) {
        self.data.clear();
    }

    /// Append raw bytes with no head. Used for the JSON payload.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn write_head(&mut self, type_code: TypeCode, tag: u8) {
        Head::new(type_code, tag).encode_into(&mut self.data);
    }

    pub fn write_bool(&mut self, value: bool, tag: u8) {
        self.write_i8(i8::from(value), tag);
    }

    pub fn write_i8(&mut self, value: i8, tag: u8) {
        if value == 0 {
            self.write_head(TypeCode::ZeroTag, tag);
        } else {
            self.write_head(TypeCode::Int8, tag);
            self.data.push(value as u8);
        }
    }

    pub fn write_i16(&mut self, value: i16, tag: u8) {
        if let Ok(small) = i8::try_from(value) {
            self.write_i8(small, tag);
        } else {
            self.write_head(TypeCode::Int16, tag);
            self.data.extend_from_slice(&value.to_be_bytes());
        }
    }

    pub fn write_i32(&mut self, value: i32, tag: u8) {
        if let Ok(small) = i16::try_from(value) {
            self.write_i16(small, tag);
        } else {
            self.write_head(TypeCode::Int32, tag);
            self.data.extend_from_slice(&value.to_be_bytes());
        }
    }

    pub fn write_i64(&mut self, value: i64, tag: u8) {
        if let Ok(small) = i32::try_from(value) {
            self.write_i32(small, tag);
        } else {
            self.write_head(TypeCode::Int64, tag);
            self.data.extend_from_slice(&value.to_be_bytes());
        }
    }

    /// Unsigned bytes travel as the next wider signed type.
    pub fn write_u8(&mut self, value: u8, tag: u8) {
        self.write_i16(i16::from(value), tag);
    }

    pub fn write_u16(&mut self, value: u16, tag: u8) {
        self.write_i32(i32::from(value), tag);
    }

    pub fn write_u32(&mut self, value: u32, tag: u8) {
        self.write_i64(i64::from(value), tag);
    }

    /// There is no wider type for `u64`; the bit pattern goes out as an int64.
    pub fn write_u64(&mut self, value: u64, tag: u8) {
        self.write_i64(value as i64, tag);
    }

    pub fn write_f32(&mut self, value: f32, tag: u8) {
        self.write_head(TypeCode::Float, tag);
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_f64(&mut self, value: f64, tag: u8) {
        self.write_head(TypeCode::Double, tag);
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    /// Strings up to 255 bytes use a one-byte length, longer ones four bytes.
    pub fn write_string(&mut self, value: &str, tag: u8) -> Result<(), EncodeError> {
        let bytes = value.as_bytes();
        match u8::try_from(bytes.len()) {
            Ok(len) => {
                self.write_head(TypeCode::String1, tag);
                self.data.push(len);
            }
            Err(_) => {
                let len = wire_len(bytes.len())?;
                self.write_head(TypeCode::String4, tag);
                self.data.extend_from_slice(&(len as u32).to_be_bytes());
            }
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Write a byte blob through the `SimpleList` fast path.
    pub fn write_bytes(&mut self, value: &[u8], tag: u8) -> Result<(), EncodeError> {
        let len = wire_len(value.len())?;
        self.write_head(TypeCode::SimpleList, tag);
        self.write_head(TypeCode::Int8, 0);
        self.write_i32(len, 0);
        self.data.extend_from_slice(value);
        Ok(())
    }

    /// Signed variant of [`write_bytes`](Self::write_bytes).
    pub fn write_signed_bytes(&mut self, value: &[i8], tag: u8) -> Result<(), EncodeError> {
        let len = wire_len(value.len())?;
        self.write_head(TypeCode::SimpleList, tag);
        self.write_head(TypeCode::Int8, 0);
        self.write_i32(len, 0);
        self.data.extend(value.iter().map(|b| *b as u8));
        Ok(())
    }

    /// Begin a generic list; the caller writes `len` elements at tag 0.
    pub fn write_list_header(&mut self, len: usize, tag: u8) -> Result<(), EncodeError> {
        let len = wire_len(len)?;
        self.write_head(TypeCode::List, tag);
        self.write_i32(len, 0);
        Ok(())
    }

    /// Begin a map; the caller writes `len` key (tag 0) / value (tag 1) pairs.
    pub fn write_map_header(&mut self, len: usize, tag: u8) -> Result<(), EncodeError> {
        let len = wire_len(len)?;
        self.write_head(TypeCode::Map, tag);
        self.write_i32(len, 0);
        Ok(())
    }

    pub fn write_struct_begin(&mut self, tag: u8) {
        self.write_head(TypeCode::StructBegin, tag);
    }

    pub fn write_struct_end(&mut self) {
        self.write_head(TypeCode::StructEnd, 0);
    }
}
