//! TARS binary reader with skip-to decoding.

use super::buffer::{read_array, read_byte, read_slice};
use super::head::{Head, TypeCode};
use super::DecodeError;

/// Maximum container/struct nesting the reader will skip through.
pub const MAX_SKIP_DEPTH: usize = 128;

/// How a list-shaped field was framed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListHeader {
    /// Generic list: `len` elements follow, each with its own head at tag 0.
    List(usize),
    /// Byte fast path: `len` raw bytes follow.
    Simple(usize),
}

impl ListHeader {
    pub fn len(&self) -> usize {
        match self {
            Self::List(len) | Self::Simple(len) => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Turn an absent required value into the matching error.
#[inline]
pub fn required<T>(value: Option<T>, tag: u8) -> Result<T, DecodeError> {
    value.ok_or(DecodeError::RequiredFieldMissing { tag })
}

/// Cursor over an encoded buffer.
///
/// Field reads take `(tag, required)` and return `Ok(None)` when an optional
/// field is absent. Lookup is forward-only: fields with smaller tags are
/// skipped, and a larger tag, a struct end or the end of the buffer means the
/// requested field is not present.
#[derive(Debug, Clone)]
pub struct TarsReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> TarsReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Point the reader at a new buffer.
    pub fn reset(&mut self, data: &'a [u8]) {
        self.data = data;
        self.pos = 0;
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// The whole underlying buffer.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let bytes = read_slice(self.data, self.pos, len)?;
        self.pos += len;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let bytes = read_array::<N>(self.data, self.pos)?;
        self.pos += N;
        Ok(bytes)
    }

    fn take_u8(&mut self) -> Result<u8, DecodeError> {
        let byte = read_byte(self.data, self.pos)?;
        self.pos += 1;
        Ok(byte)
    }

    /// Consume `len` raw bytes (the body of a `SimpleList`).
    pub fn read_raw(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        self.take(len)
    }

    /// Look at the next head without consuming it. `None` at end of buffer.
    pub fn peek_head(&self) -> Result<Option<(Head, usize)>, DecodeError> {
        match self.data.get(self.pos..) {
            Some(rest) if !rest.is_empty() => Head::decode(rest).map(Some),
            _ => Ok(None),
        }
    }

    pub fn read_head(&mut self) -> Result<Head, DecodeError> {
        let rest = self.data.get(self.pos..).unwrap_or_default();
        let (head, len) = Head::decode(rest).map_err(|e| match e {
            DecodeError::BufferTooSmall { needed, .. } => DecodeError::BufferTooSmall {
                needed: self.pos + needed,
                available: self.data.len(),
            },
            other => other,
        })?;
        self.pos += len;
        Ok(head)
    }

    /// Advance to the field with `tag`, consuming its head.
    ///
    /// Returns the field's type code, `None` if the field is absent and not
    /// required, or `RequiredFieldMissing` if it is absent and required.
    pub fn skip_to(&mut self, tag: u8, required: bool) -> Result<Option<TypeCode>, DecodeError> {
        while let Some((head, head_len)) = self.peek_head()? {
            if head.type_code == TypeCode::StructEnd || head.tag > tag {
                break;
            }
            self.pos += head_len;
            if head.tag == tag {
                return Ok(Some(head.type_code));
            }
            self.skip_field(head.type_code)?;
        }
        if required {
            Err(DecodeError::RequiredFieldMissing { tag })
        } else {
            Ok(None)
        }
    }

    /// Skip the payload of a field whose head was already consumed.
    pub fn skip_field(&mut self, type_code: TypeCode) -> Result<(), DecodeError> {
        self.skip_field_at_depth(type_code, 0)
    }

    fn skip_field_at_depth(&mut self, type_code: TypeCode, depth: usize) -> Result<(), DecodeError> {
        if depth > MAX_SKIP_DEPTH {
            return Err(DecodeError::NestingTooDeep(MAX_SKIP_DEPTH));
        }
        match type_code {
            TypeCode::Int8 => self.take(1).map(drop),
            TypeCode::Int16 => self.take(2).map(drop),
            TypeCode::Int32 | TypeCode::Float => self.take(4).map(drop),
            TypeCode::Int64 | TypeCode::Double => self.take(8).map(drop),
            TypeCode::String1 => {
                let len = self.take_u8()?;
                self.take(usize::from(len)).map(drop)
            }
            TypeCode::String4 => {
                let len = u32::from_be_bytes(self.take_array::<4>()?);
                self.take(len as usize).map(drop)
            }
            TypeCode::Map => {
                let len = self.read_length()?;
                for _ in 0..len.saturating_mul(2) {
                    let head = self.read_head()?;
                    self.skip_field_at_depth(head.type_code, depth + 1)?;
                }
                Ok(())
            }
            TypeCode::List => {
                let len = self.read_length()?;
                for _ in 0..len {
                    let head = self.read_head()?;
                    self.skip_field_at_depth(head.type_code, depth + 1)?;
                }
                Ok(())
            }
            TypeCode::SimpleList => {
                let len = self.read_simple_list_length(0)?;
                self.take(len).map(drop)
            }
            TypeCode::StructBegin => self.skip_to_struct_end_at_depth(depth + 1),
            TypeCode::StructEnd | TypeCode::ZeroTag => Ok(()),
        }
    }

    /// Skip every remaining field of the current struct, including its end
    /// marker.
    pub fn skip_to_struct_end(&mut self) -> Result<(), DecodeError> {
        self.skip_to_struct_end_at_depth(0)
    }

    fn skip_to_struct_end_at_depth(&mut self, depth: usize) -> Result<(), DecodeError> {
        loop {
            let head = self.read_head()?;
            if head.type_code == TypeCode::StructEnd {
                return Ok(());
            }
            self.skip_field_at_depth(head.type_code, depth)?;
        }
    }

    /// Read the integer payload of a field whose head was consumed, accepting
    /// any integer code up to `widest`.
    fn read_int_payload(
        &mut self,
        type_code: TypeCode,
        tag: u8,
        widest: TypeCode,
        expected: &'static str,
    ) -> Result<i64, DecodeError> {
        let value = match type_code {
            TypeCode::ZeroTag => 0,
            TypeCode::Int8 => i64::from(self.take_u8()? as i8),
            TypeCode::Int16 if widest >= TypeCode::Int16 => {
                i64::from(i16::from_be_bytes(self.take_array::<2>()?))
            }
            TypeCode::Int32 if widest >= TypeCode::Int32 => {
                i64::from(i32::from_be_bytes(self.take_array::<4>()?))
            }
            TypeCode::Int64 if widest >= TypeCode::Int64 => {
                i64::from_be_bytes(self.take_array::<8>()?)
            }
            got => {
                return Err(DecodeError::TypeMismatch { tag, expected, got });
            }
        };
        Ok(value)
    }

    fn read_int(
        &mut self,
        tag: u8,
        required: bool,
        widest: TypeCode,
        expected: &'static str,
    ) -> Result<Option<i64>, DecodeError> {
        match self.skip_to(tag, required)? {
            Some(type_code) => self
                .read_int_payload(type_code, tag, widest, expected)
                .map(Some),
            None => Ok(None),
        }
    }

    pub fn read_bool(&mut self, tag: u8, required: bool) -> Result<Option<bool>, DecodeError> {
        Ok(self.read_i8(tag, required)?.map(|v| v != 0))
    }

    pub fn read_i8(&mut self, tag: u8, required: bool) -> Result<Option<i8>, DecodeError> {
        Ok(self
            .read_int(tag, required, TypeCode::Int8, "int8")?
            .map(|v| v as i8))
    }

    pub fn read_i16(&mut self, tag: u8, required: bool) -> Result<Option<i16>, DecodeError> {
        Ok(self
            .read_int(tag, required, TypeCode::Int16, "int16")?
            .map(|v| v as i16))
    }

    pub fn read_i32(&mut self, tag: u8, required: bool) -> Result<Option<i32>, DecodeError> {
        Ok(self
            .read_int(tag, required, TypeCode::Int32, "int32")?
            .map(|v| v as i32))
    }

    pub fn read_i64(&mut self, tag: u8, required: bool) -> Result<Option<i64>, DecodeError> {
        self.read_int(tag, required, TypeCode::Int64, "int64")
    }

    pub fn read_u8(&mut self, tag: u8, required: bool) -> Result<Option<u8>, DecodeError> {
        let value = self.read_int(tag, required, TypeCode::Int16, "uint8")?;
        value.map(|v| narrow(v, tag, "uint8")).transpose()
    }

    pub fn read_u16(&mut self, tag: u8, required: bool) -> Result<Option<u16>, DecodeError> {
        let value = self.read_int(tag, required, TypeCode::Int32, "uint16")?;
        value.map(|v| narrow(v, tag, "uint16")).transpose()
    }

    pub fn read_u32(&mut self, tag: u8, required: bool) -> Result<Option<u32>, DecodeError> {
        let value = self.read_int(tag, required, TypeCode::Int64, "uint32")?;
        value.map(|v| narrow(v, tag, "uint32")).transpose()
    }

    pub fn read_u64(&mut self, tag: u8, required: bool) -> Result<Option<u64>, DecodeError> {
        Ok(self
            .read_int(tag, required, TypeCode::Int64, "uint64")?
            .map(|v| v as u64))
    }

    pub fn read_f32(&mut self, tag: u8, required: bool) -> Result<Option<f32>, DecodeError> {
        let Some(type_code) = self.skip_to(tag, required)? else {
            return Ok(None);
        };
        match type_code {
            TypeCode::ZeroTag => Ok(Some(0.0)),
            TypeCode::Float => Ok(Some(f32::from_be_bytes(self.take_array::<4>()?))),
            got => Err(DecodeError::TypeMismatch {
                tag,
                expected: "float",
                got,
            }),
        }
    }

    pub fn read_f64(&mut self, tag: u8, required: bool) -> Result<Option<f64>, DecodeError> {
        let Some(type_code) = self.skip_to(tag, required)? else {
            return Ok(None);
        };
        match type_code {
            TypeCode::ZeroTag => Ok(Some(0.0)),
            TypeCode::Float => Ok(Some(f64::from(f32::from_be_bytes(
                self.take_array::<4>()?,
            )))),
            TypeCode::Double => Ok(Some(f64::from_be_bytes(self.take_array::<8>()?))),
            got => Err(DecodeError::TypeMismatch {
                tag,
                expected: "double",
                got,
            }),
        }
    }

    pub fn read_string(&mut self, tag: u8, required: bool) -> Result<Option<String>, DecodeError> {
        let Some(type_code) = self.skip_to(tag, required)? else {
            return Ok(None);
        };
        let len = match type_code {
            TypeCode::String1 => usize::from(self.take_u8()?),
            TypeCode::String4 => u32::from_be_bytes(self.take_array::<4>()?) as usize,
            got => {
                return Err(DecodeError::TypeMismatch {
                    tag,
                    expected: "string",
                    got,
                });
            }
        };
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map(Some)
            .map_err(|_| DecodeError::InvalidUtf8)
    }

    /// Read a container element count (an int32 field at tag 0).
    ///
    /// Every element occupies at least one byte, so a count larger than the
    /// remaining input is rejected before anything is allocated.
    pub fn read_length(&mut self) -> Result<usize, DecodeError> {
        let len = required(self.read_i32(0, true)?, 0)?;
        if len < 0 || len as usize > self.remaining() {
            return Err(DecodeError::InvalidLength(i64::from(len)));
        }
        Ok(len as usize)
    }

    fn read_simple_list_length(&mut self, tag: u8) -> Result<usize, DecodeError> {
        let inner = self.read_head()?;
        if inner.type_code != TypeCode::Int8 {
            return Err(DecodeError::TypeMismatch {
                tag,
                expected: "simple-list of int8",
                got: inner.type_code,
            });
        }
        self.read_length()
    }

    /// Locate a list-shaped field and read its element count.
    pub fn read_list_header(
        &mut self,
        tag: u8,
        required: bool,
    ) -> Result<Option<ListHeader>, DecodeError> {
        match self.skip_to(tag, required)? {
            None => Ok(None),
            Some(TypeCode::List) => Ok(Some(ListHeader::List(self.read_length()?))),
            Some(TypeCode::SimpleList) => {
                Ok(Some(ListHeader::Simple(self.read_simple_list_length(tag)?)))
            }
            Some(got) => Err(DecodeError::TypeMismatch {
                tag,
                expected: "list",
                got,
            }),
        }
    }

    /// Locate a map field and read its pair count.
    pub fn read_map_header(&mut self, tag: u8, required: bool) -> Result<Option<usize>, DecodeError> {
        match self.skip_to(tag, required)? {
            None => Ok(None),
            Some(TypeCode::Map) => Ok(Some(self.read_length()?)),
            Some(got) => Err(DecodeError::TypeMismatch {
                tag,
                expected: "map",
                got,
            }),
        }
    }

    /// Locate a struct field and consume its begin marker.
    pub fn read_struct_begin(&mut self, tag: u8, required: bool) -> Result<bool, DecodeError> {
        match self.skip_to(tag, required)? {
            None => Ok(false),
            Some(TypeCode::StructBegin) => Ok(true),
            Some(got) => Err(DecodeError::TypeMismatch {
                tag,
                expected: "struct",
                got,
            }),
        }
    }

    /// Read a byte vector from either framing.
    pub fn read_bytes(&mut self, tag: u8, required: bool) -> Result<Option<Vec<u8>>, DecodeError> {
        match self.read_list_header(tag, required)? {
            None => Ok(None),
            Some(ListHeader::Simple(len)) => Ok(Some(self.take(len)?.to_vec())),
            Some(ListHeader::List(len)) => {
                let mut out = Vec::with_capacity(len);
                for _ in 0..len {
                    out.push(required_u8(self.read_u8(0, true)?)?);
                }
                Ok(Some(out))
            }
        }
    }
}

#[inline]
fn required_u8(value: Option<u8>) -> Result<u8, DecodeError> {
    required(value, 0)
}

/// An unsigned value read from its wider signed carrier.
fn narrow<T: TryFrom<i64>>(value: i64, tag: u8, expected: &str) -> Result<T, DecodeError> {
    T::try_from(value).map_err(|_| {
        DecodeError::InvalidValue(format!("{value} out of range for {expected} at tag {tag}"))
    })
}
