//! Traits implemented by generated code.
//!
//! [`TarsField`] is the single recursive `(value, tag)` routine for every
//! field type; containers call it for their elements with tag 0 (map values
//! with tag 1). [`TarsStruct`] adds the struct framing on top.

use std::collections::BTreeMap;

use crate::codec::{DecodeError, EncodeError, ListHeader, TarsReader, TarsWriter, TypeCode};

/// A value that can be written and read as one tagged field.
pub trait TarsField {
    fn write_field(&self, writer: &mut TarsWriter, tag: u8) -> Result<(), EncodeError>;

    /// Read the field at `tag` into `self`. An absent optional field leaves
    /// `self` untouched.
    fn read_field(
        &mut self,
        reader: &mut TarsReader<'_>,
        tag: u8,
        required: bool,
    ) -> Result<(), DecodeError>;

    /// Write a sequence of `Self` as one list field. 8-bit integers override
    /// this to use `SimpleList`.
    fn write_list(items: &[Self], writer: &mut TarsWriter, tag: u8) -> Result<(), EncodeError>
    where
        Self: Sized,
    {
        writer.write_list_header(items.len(), tag)?;
        for item in items {
            item.write_field(writer, 0)?;
        }
        Ok(())
    }

    /// Read a list field of `Self`. `None` when absent and optional.
    fn read_list(
        reader: &mut TarsReader<'_>,
        tag: u8,
        required: bool,
    ) -> Result<Option<Vec<Self>>, DecodeError>
    where
        Self: Sized + Default,
    {
        match reader.read_list_header(tag, required)? {
            None => Ok(None),
            Some(ListHeader::List(len)) => {
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    let mut item = Self::default();
                    item.read_field(reader, 0, true)?;
                    items.push(item);
                }
                Ok(Some(items))
            }
            Some(ListHeader::Simple(_)) => Err(DecodeError::TypeMismatch {
                tag,
                expected: "list",
                got: TypeCode::SimpleList,
            }),
        }
    }
}

/// Generated struct routines.
pub trait TarsStruct: Default {
    /// Every member back to its declared default.
    fn reset_to_defaults(&mut self) {
        *self = Self::default();
    }

    /// Reset, then read every member in tag order.
    fn decode_body(&mut self, reader: &mut TarsReader<'_>) -> Result<(), DecodeError>;

    /// Write every member in tag order.
    fn encode_body(&self, writer: &mut TarsWriter) -> Result<(), EncodeError>;

    /// Reset, then read the struct framed at `tag`. Absent and optional
    /// leaves the defaults in place.
    fn decode_tagged(
        &mut self,
        reader: &mut TarsReader<'_>,
        tag: u8,
        required: bool,
    ) -> Result<(), DecodeError> {
        self.reset_to_defaults();
        if !reader.read_struct_begin(tag, required)? {
            return Ok(());
        }
        self.decode_body(reader)?;
        reader.skip_to_struct_end()
    }

    fn encode_tagged(&self, writer: &mut TarsWriter, tag: u8) -> Result<(), EncodeError> {
        writer.write_struct_begin(tag);
        self.encode_body(writer)?;
        writer.write_struct_end();
        Ok(())
    }

    /// Encode the body into a fresh buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut writer = TarsWriter::new();
        self.encode_body(&mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Decode a body from `bytes`.
    fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut value = Self::default();
        value.decode_body(&mut TarsReader::new(bytes))?;
        Ok(value)
    }
}

/// Used by generated serde attributes to skip members at their zero value.
pub fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

macro_rules! impl_scalar_field {
    ($($ty:ty => $write:ident, $read:ident;)*) => {
        $(
            impl TarsField for $ty {
                fn write_field(&self, writer: &mut TarsWriter, tag: u8) -> Result<(), EncodeError> {
                    writer.$write(*self, tag);
                    Ok(())
                }

                fn read_field(
                    &mut self,
                    reader: &mut TarsReader<'_>,
                    tag: u8,
                    required: bool,
                ) -> Result<(), DecodeError> {
                    if let Some(v) = reader.$read(tag, required)? {
                        *self = v;
                    }
                    Ok(())
                }
            }
        )*
    };
}

impl_scalar_field! {
    bool => write_bool, read_bool;
    i16 => write_i16, read_i16;
    u16 => write_u16, read_u16;
    i32 => write_i32, read_i32;
    u32 => write_u32, read_u32;
    i64 => write_i64, read_i64;
    u64 => write_u64, read_u64;
    f32 => write_f32, read_f32;
    f64 => write_f64, read_f64;
}

impl TarsField for u8 {
    fn write_field(&self, writer: &mut TarsWriter, tag: u8) -> Result<(), EncodeError> {
        writer.write_u8(*self, tag);
        Ok(())
    }

    fn read_field(
        &mut self,
        reader: &mut TarsReader<'_>,
        tag: u8,
        required: bool,
    ) -> Result<(), DecodeError> {
        if let Some(v) = reader.read_u8(tag, required)? {
            *self = v;
        }
        Ok(())
    }

    fn write_list(items: &[Self], writer: &mut TarsWriter, tag: u8) -> Result<(), EncodeError> {
        writer.write_bytes(items, tag)
    }

    fn read_list(
        reader: &mut TarsReader<'_>,
        tag: u8,
        required: bool,
    ) -> Result<Option<Vec<Self>>, DecodeError> {
        reader.read_bytes(tag, required)
    }
}

impl TarsField for i8 {
    fn write_field(&self, writer: &mut TarsWriter, tag: u8) -> Result<(), EncodeError> {
        writer.write_i8(*self, tag);
        Ok(())
    }

    fn read_field(
        &mut self,
        reader: &mut TarsReader<'_>,
        tag: u8,
        required: bool,
    ) -> Result<(), DecodeError> {
        if let Some(v) = reader.read_i8(tag, required)? {
            *self = v;
        }
        Ok(())
    }

    fn write_list(items: &[Self], writer: &mut TarsWriter, tag: u8) -> Result<(), EncodeError> {
        writer.write_signed_bytes(items, tag)
    }

    fn read_list(
        reader: &mut TarsReader<'_>,
        tag: u8,
        required: bool,
    ) -> Result<Option<Vec<Self>>, DecodeError> {
        match reader.read_list_header(tag, required)? {
            None => Ok(None),
            Some(ListHeader::Simple(len)) => Ok(Some(
                reader.read_raw(len)?.iter().map(|b| *b as i8).collect(),
            )),
            Some(ListHeader::List(len)) => {
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    let mut item = 0i8;
                    item.read_field(reader, 0, true)?;
                    items.push(item);
                }
                Ok(Some(items))
            }
        }
    }
}

impl TarsField for String {
    fn write_field(&self, writer: &mut TarsWriter, tag: u8) -> Result<(), EncodeError> {
        writer.write_string(self, tag)
    }

    fn read_field(
        &mut self,
        reader: &mut TarsReader<'_>,
        tag: u8,
        required: bool,
    ) -> Result<(), DecodeError> {
        if let Some(v) = reader.read_string(tag, required)? {
            *self = v;
        }
        Ok(())
    }
}

impl<T: TarsField + Default> TarsField for Vec<T> {
    fn write_field(&self, writer: &mut TarsWriter, tag: u8) -> Result<(), EncodeError> {
        T::write_list(self, writer, tag)
    }

    fn read_field(
        &mut self,
        reader: &mut TarsReader<'_>,
        tag: u8,
        required: bool,
    ) -> Result<(), DecodeError> {
        if let Some(items) = T::read_list(reader, tag, required)? {
            *self = items;
        }
        Ok(())
    }
}

/// Fixed arrays share the list framing; the decoded length must match.
impl<T: TarsField + Default, const N: usize> TarsField for [T; N] {
    fn write_field(&self, writer: &mut TarsWriter, tag: u8) -> Result<(), EncodeError> {
        T::write_list(self.as_slice(), writer, tag)
    }

    fn read_field(
        &mut self,
        reader: &mut TarsReader<'_>,
        tag: u8,
        required: bool,
    ) -> Result<(), DecodeError> {
        let Some(items) = T::read_list(reader, tag, required)? else {
            return Ok(());
        };
        if items.len() != N {
            return Err(DecodeError::ArrayLength {
                expected: N,
                actual: items.len(),
            });
        }
        for (slot, item) in self.iter_mut().zip(items) {
            *slot = item;
        }
        Ok(())
    }
}

impl<K, V> TarsField for BTreeMap<K, V>
where
    K: TarsField + Default + Ord,
    V: TarsField + Default,
{
    fn write_field(&self, writer: &mut TarsWriter, tag: u8) -> Result<(), EncodeError> {
        writer.write_map_header(self.len(), tag)?;
        for (k, v) in self {
            k.write_field(writer, 0)?;
            v.write_field(writer, 1)?;
        }
        Ok(())
    }

    fn read_field(
        &mut self,
        reader: &mut TarsReader<'_>,
        tag: u8,
        required: bool,
    ) -> Result<(), DecodeError> {
        let Some(len) = reader.read_map_header(tag, required)? else {
            return Ok(());
        };
        self.clear();
        for _ in 0..len {
            let mut k = K::default();
            k.read_field(reader, 0, true)?;
            let mut v = V::default();
            v.read_field(reader, 1, true)?;
            self.insert(k, v);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Legacy {
        name: String,
        age: i32,
    }

    impl Default for Legacy {
        fn default() -> Self {
            Self {
                name: String::new(),
                age: 18,
            }
        }
    }

    impl TarsStruct for Legacy {
        fn decode_body(&mut self, reader: &mut TarsReader<'_>) -> Result<(), DecodeError> {
            self.reset_to_defaults();
            self.name.read_field(reader, 0, true)?;
            self.age.read_field(reader, 1, false)?;
            Ok(())
        }

        fn encode_body(&self, writer: &mut TarsWriter) -> Result<(), EncodeError> {
            self.name.write_field(writer, 0)?;
            self.age.write_field(writer, 1)?;
            Ok(())
        }
    }

    #[test]
    fn test_reused_struct_has_no_stale_values() {
        let mut w = TarsWriter::new();
        w.write_string("only-name", 0).unwrap();
        let bytes = w.into_bytes();

        let mut value = Legacy {
            name: "old".into(),
            age: 99,
        };
        value.decode_body(&mut TarsReader::new(&bytes)).unwrap();
        assert_eq!(value.age, 18);
        assert_eq!(value.name, "only-name");
    }

    #[test]
    fn test_byte_vectors_use_simple_list() {
        let mut w = TarsWriter::new();
        vec![1u8, 2, 3].write_field(&mut w, 0).unwrap();
        vec![-1i8].write_field(&mut w, 1).unwrap();
        assert_eq!(
            w.as_bytes(),
            &[0x0d, 0x00, 0x00, 0x03, 1, 2, 3, 0x1d, 0x00, 0x00, 0x01, 0xff]
        );

        let mut r = TarsReader::new(w.as_bytes());
        let mut a: Vec<u8> = Vec::new();
        let mut b: Vec<i8> = Vec::new();
        a.read_field(&mut r, 0, true).unwrap();
        b.read_field(&mut r, 1, true).unwrap();
        assert_eq!(a, vec![1, 2, 3]);
        assert_eq!(b, vec![-1]);
    }

    #[test]
    fn test_nested_map_and_array() {
        let mut value: BTreeMap<String, [i64; 2]> = BTreeMap::new();
        value.insert("a".into(), [1, i64::MAX]);
        let mut w = TarsWriter::new();
        value.write_field(&mut w, 3).unwrap();

        let mut back: BTreeMap<String, [i64; 2]> = BTreeMap::new();
        back.read_field(&mut TarsReader::new(w.as_bytes()), 3, true)
            .unwrap();
        assert_eq!(back, value);

        let mut wrong = [0i64; 3];
        let mut w = TarsWriter::new();
        [1i64, 2].write_field(&mut w, 0).unwrap();
        assert_eq!(
            wrong.read_field(&mut TarsReader::new(w.as_bytes()), 0, true),
            Err(DecodeError::ArrayLength {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_optional_absent_is_untouched() {
        let mut value = 7i32;
        value
            .read_field(&mut TarsReader::new(&[]), 4, false)
            .unwrap();
        assert_eq!(value, 7);
    }
}
