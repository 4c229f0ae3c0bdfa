//! Schema-driven TARS encoding of dynamic values.
//!
//! The same routines the emitter writes out per struct, interpreted at run
//! time over the [`Schema`]. Element, key and value encoding all go through
//! one recursive function over `(type, tag)`: list elements and map keys use
//! tag 0, map values tag 1.

use crate::codec::reader::{required, MAX_SKIP_DEPTH};
use crate::codec::{DecodeError, EncodeError, ListHeader, TarsReader, TarsWriter, TypeCode};
use crate::model::{LiteralValue, Schema, StructInfo};
use crate::types::{NamedCategory, Primitive, VarType};
use crate::value::{StructValue, Value};

/// Build the value of primitive type `p` holding integer `v`, if it fits.
pub fn integer_value(p: Primitive, v: i128) -> Option<Value> {
    Some(match p {
        Primitive::Int8 => Value::I8(i8::try_from(v).ok()?),
        Primitive::UInt8 => Value::U8(u8::try_from(v).ok()?),
        Primitive::Int16 => Value::I16(i16::try_from(v).ok()?),
        Primitive::UInt16 => Value::U16(u16::try_from(v).ok()?),
        Primitive::Int32 => Value::I32(i32::try_from(v).ok()?),
        Primitive::UInt32 => Value::U32(u32::try_from(v).ok()?),
        Primitive::Int64 => Value::I64(i64::try_from(v).ok()?),
        Primitive::UInt64 => Value::U64(u64::try_from(v).ok()?),
        _ => return None,
    })
}

pub(crate) fn mismatch(ty: &VarType, value: &Value) -> EncodeError {
    EncodeError::TypeMismatch {
        expected: ty.to_string(),
        got: value.kind().to_string(),
    }
}

/// Type-directed encoder/decoder over a resolved schema.
///
/// # Example
///
/// ```ignore
/// let codec = TarsCodec::new(&compilation.schema);
/// let user = codec.struct_codec("Demo::User").unwrap();
/// let bytes = user.to_bytes(&value)?;
/// let decoded = user.from_bytes(&bytes)?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TarsCodec<'a> {
    pub(crate) schema: &'a Schema,
}

impl<'a> TarsCodec<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Codec for the struct with qualified name `name`.
    pub fn struct_codec(&self, name: &str) -> Option<StructCodec<'a>> {
        let info = self.schema.struct_info(name)?;
        Some(StructCodec { info, codec: *self })
    }

    fn struct_codec_or_err(&self, name: &str) -> Result<StructCodec<'a>, String> {
        self.struct_codec(name)
            .ok_or_else(|| format!("unknown struct '{name}'"))
    }

    /// Zero value of `ty`; structs get their declared defaults.
    pub fn default_value(&self, ty: &VarType) -> Value {
        match ty {
            VarType::Primitive { primitive } => match primitive {
                Primitive::Bool => Value::Bool(false),
                Primitive::Int8 => Value::I8(0),
                Primitive::UInt8 => Value::U8(0),
                Primitive::Int16 => Value::I16(0),
                Primitive::UInt16 => Value::U16(0),
                Primitive::Int32 => Value::I32(0),
                Primitive::UInt32 => Value::U32(0),
                Primitive::Int64 => Value::I64(0),
                Primitive::UInt64 => Value::U64(0),
                Primitive::Float => Value::F32(0.0),
                Primitive::Double => Value::F64(0.0),
                Primitive::String => Value::String(String::new()),
            },
            VarType::Vector { .. } => Value::List(Vec::new()),
            VarType::Array { elem, len } => Value::List(vec![self.default_value(elem); *len]),
            VarType::Map { .. } => Value::Map(Vec::new()),
            VarType::Named {
                category: NamedCategory::Enum,
                ..
            } => Value::Enum(0),
            VarType::Named { name, .. } => Value::Struct(
                self.struct_codec(name)
                    .map(|c| c.reset_to_defaults())
                    .unwrap_or_else(|| StructValue::new(name.clone())),
            ),
        }
    }

    /// Value of a checked literal at type `ty`.
    pub fn literal_value(&self, ty: &VarType, literal: &LiteralValue) -> Value {
        let converted = match (ty, literal) {
            (_, LiteralValue::Bool(b)) => Some(Value::Bool(*b)),
            (_, LiteralValue::Str(s)) => Some(Value::String(s.clone())),
            (_, LiteralValue::Enum { value, .. }) => Some(Value::Enum(*value)),
            (VarType::Primitive { primitive }, LiteralValue::Int(v)) if primitive.is_float() => {
                Some(float_value(*primitive, *v as f64))
            }
            (VarType::Primitive { primitive }, LiteralValue::Int(v)) => {
                integer_value(*primitive, *v)
            }
            (VarType::Primitive { primitive }, LiteralValue::Float(v)) => {
                Some(float_value(*primitive, *v))
            }
            _ => None,
        };
        converted.unwrap_or_else(|| self.default_value(ty))
    }

    /// Encode `value` of type `ty` as one field at `tag`.
    pub fn write_var(
        &self,
        writer: &mut TarsWriter,
        ty: &VarType,
        value: &Value,
        tag: u8,
    ) -> Result<(), EncodeError> {
        match ty {
            VarType::Primitive { primitive } => write_primitive(writer, *primitive, ty, value, tag),
            VarType::Vector { elem } => self.write_sequence(writer, elem, ty, value, tag),
            VarType::Array { elem, len } => {
                let items = value.as_list().ok_or_else(|| mismatch(ty, value))?;
                if items.len() != *len {
                    return Err(EncodeError::TypeMismatch {
                        expected: ty.to_string(),
                        got: format!("{} elements", items.len()),
                    });
                }
                self.write_sequence(writer, elem, ty, value, tag)
            }
            VarType::Map { key, value: val_ty } => {
                let Value::Map(pairs) = value else {
                    return Err(mismatch(ty, value));
                };
                writer.write_map_header(pairs.len(), tag)?;
                for (k, v) in pairs {
                    self.write_var(writer, key, k, 0)?;
                    self.write_var(writer, val_ty, v, 1)?;
                }
                Ok(())
            }
            VarType::Named {
                category: NamedCategory::Enum,
                ..
            } => {
                let v = value
                    .as_integer()
                    .and_then(|v| i32::try_from(v).ok())
                    .ok_or_else(|| mismatch(ty, value))?;
                writer.write_i32(v, tag);
                Ok(())
            }
            VarType::Named { name, .. } => {
                let Value::Struct(sv) = value else {
                    return Err(mismatch(ty, value));
                };
                let codec = self
                    .struct_codec_or_err(name)
                    .map_err(EncodeError::UnknownType)?;
                codec.encode_tagged(writer, sv, tag)
            }
        }
    }

    fn write_sequence(
        &self,
        writer: &mut TarsWriter,
        elem: &VarType,
        ty: &VarType,
        value: &Value,
        tag: u8,
    ) -> Result<(), EncodeError> {
        let items = value.as_list().ok_or_else(|| mismatch(ty, value))?;
        if let Some(p) = elem.as_primitive().filter(|p| p.is_byte()) {
            let bytes = items
                .iter()
                .map(|item| match (p, item.as_integer()) {
                    (Primitive::Int8, Some(v)) => i8::try_from(v).ok().map(|b| b as u8),
                    (_, Some(v)) => u8::try_from(v).ok(),
                    (_, None) => None,
                })
                .collect::<Option<Vec<u8>>>()
                .ok_or_else(|| mismatch(ty, value))?;
            return writer.write_bytes(&bytes, tag);
        }
        writer.write_list_header(items.len(), tag)?;
        for item in items {
            self.write_var(writer, elem, item, 0)?;
        }
        Ok(())
    }

    /// Decode one field of type `ty` at `tag`. `None` means absent and
    /// optional.
    pub fn read_var(
        &self,
        reader: &mut TarsReader<'_>,
        ty: &VarType,
        tag: u8,
        required: bool,
    ) -> Result<Option<Value>, DecodeError> {
        self.read_var_at(reader, ty, tag, required, 0)
    }

    fn read_var_at(
        &self,
        reader: &mut TarsReader<'_>,
        ty: &VarType,
        tag: u8,
        is_required: bool,
        depth: usize,
    ) -> Result<Option<Value>, DecodeError> {
        if depth > MAX_SKIP_DEPTH {
            return Err(DecodeError::NestingTooDeep(MAX_SKIP_DEPTH));
        }
        match ty {
            VarType::Primitive { primitive } => {
                read_primitive(reader, *primitive, tag, is_required)
            }
            VarType::Vector { elem } => {
                self.read_sequence(reader, elem, tag, is_required, depth)
                    .map(|items| items.map(Value::List))
            }
            VarType::Array { elem, len } => {
                let Some(items) = self.read_sequence(reader, elem, tag, is_required, depth)?
                else {
                    return Ok(None);
                };
                if items.len() != *len {
                    return Err(DecodeError::ArrayLength {
                        expected: *len,
                        actual: items.len(),
                    });
                }
                Ok(Some(Value::List(items)))
            }
            VarType::Map { key, value } => {
                let Some(len) = reader.read_map_header(tag, is_required)? else {
                    return Ok(None);
                };
                let mut pairs = Vec::with_capacity(len);
                for _ in 0..len {
                    let k = required(self.read_var_at(reader, key, 0, true, depth + 1)?, 0)?;
                    let v = required(self.read_var_at(reader, value, 1, true, depth + 1)?, 1)?;
                    pairs.push((k, v));
                }
                Ok(Some(Value::Map(pairs)))
            }
            VarType::Named {
                category: NamedCategory::Enum,
                ..
            } => Ok(reader.read_i32(tag, is_required)?.map(Value::Enum)),
            VarType::Named { name, .. } => {
                let codec = self
                    .struct_codec_or_err(name)
                    .map_err(DecodeError::InvalidValue)?;
                Ok(codec
                    .decode_tagged_at(reader, tag, is_required, depth + 1)?
                    .map(Value::Struct))
            }
        }
    }

    fn read_sequence(
        &self,
        reader: &mut TarsReader<'_>,
        elem: &VarType,
        tag: u8,
        is_required: bool,
        depth: usize,
    ) -> Result<Option<Vec<Value>>, DecodeError> {
        match reader.read_list_header(tag, is_required)? {
            None => Ok(None),
            Some(ListHeader::Simple(len)) => {
                let bytes = reader.read_raw(len)?;
                match elem.as_primitive() {
                    Some(Primitive::Int8) => {
                        Ok(Some(bytes.iter().map(|b| Value::I8(*b as i8)).collect()))
                    }
                    Some(Primitive::UInt8) => Ok(Some(bytes.iter().map(|b| Value::U8(*b)).collect())),
                    _ => Err(DecodeError::TypeMismatch {
                        tag,
                        expected: "list",
                        got: TypeCode::SimpleList,
                    }),
                }
            }
            Some(ListHeader::List(len)) => {
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(required(
                        self.read_var_at(reader, elem, 0, true, depth + 1)?,
                        0,
                    )?);
                }
                Ok(Some(items))
            }
        }
    }

    /// Encode a single value at tag 0, as TUP attributes carry it.
    pub fn encode_value(&self, ty: &VarType, value: &Value) -> Result<Vec<u8>, EncodeError> {
        let mut writer = TarsWriter::new();
        self.write_var(&mut writer, ty, value, 0)?;
        Ok(writer.into_bytes())
    }
}

fn float_value(p: Primitive, v: f64) -> Value {
    if p == Primitive::Float {
        Value::F32(v as f32)
    } else {
        Value::F64(v)
    }
}

fn write_primitive(
    writer: &mut TarsWriter,
    primitive: Primitive,
    ty: &VarType,
    value: &Value,
    tag: u8,
) -> Result<(), EncodeError> {
    match (primitive, value) {
        (Primitive::Bool, Value::Bool(b)) => writer.write_bool(*b, tag),
        (Primitive::String, Value::String(s)) => writer.write_string(s, tag)?,
        (Primitive::Float, Value::F32(v)) => writer.write_f32(*v, tag),
        (Primitive::Float, Value::F64(v)) => writer.write_f32(*v as f32, tag),
        (Primitive::Double, Value::F64(v)) => writer.write_f64(*v, tag),
        (Primitive::Double, Value::F32(v)) => writer.write_f64(f64::from(*v), tag),
        (p, v) if p.is_integer() => {
            let converted = v
                .as_integer()
                .and_then(|n| integer_value(p, n))
                .ok_or_else(|| mismatch(ty, value))?;
            match converted {
                Value::I8(n) => writer.write_i8(n, tag),
                Value::U8(n) => writer.write_u8(n, tag),
                Value::I16(n) => writer.write_i16(n, tag),
                Value::U16(n) => writer.write_u16(n, tag),
                Value::I32(n) => writer.write_i32(n, tag),
                Value::U32(n) => writer.write_u32(n, tag),
                Value::I64(n) => writer.write_i64(n, tag),
                Value::U64(n) => writer.write_u64(n, tag),
                _ => return Err(mismatch(ty, value)),
            }
        }
        (p, v) if p.is_float() && v.as_integer().is_some() => {
            let n = v.as_integer().unwrap_or_default() as f64;
            match p {
                Primitive::Float => writer.write_f32(n as f32, tag),
                _ => writer.write_f64(n, tag),
            }
        }
        _ => return Err(mismatch(ty, value)),
    }
    Ok(())
}

fn read_primitive(
    reader: &mut TarsReader<'_>,
    primitive: Primitive,
    tag: u8,
    is_required: bool,
) -> Result<Option<Value>, DecodeError> {
    Ok(match primitive {
        Primitive::Bool => reader.read_bool(tag, is_required)?.map(Value::Bool),
        Primitive::Int8 => reader.read_i8(tag, is_required)?.map(Value::I8),
        Primitive::UInt8 => reader.read_u8(tag, is_required)?.map(Value::U8),
        Primitive::Int16 => reader.read_i16(tag, is_required)?.map(Value::I16),
        Primitive::UInt16 => reader.read_u16(tag, is_required)?.map(Value::U16),
        Primitive::Int32 => reader.read_i32(tag, is_required)?.map(Value::I32),
        Primitive::UInt32 => reader.read_u32(tag, is_required)?.map(Value::U32),
        Primitive::Int64 => reader.read_i64(tag, is_required)?.map(Value::I64),
        Primitive::UInt64 => reader.read_u64(tag, is_required)?.map(Value::U64),
        Primitive::Float => reader.read_f32(tag, is_required)?.map(Value::F32),
        Primitive::Double => reader.read_f64(tag, is_required)?.map(Value::F64),
        Primitive::String => reader.read_string(tag, is_required)?.map(Value::String),
    })
}

/// Per-struct routines: reset, decode and encode, body or tagged.
#[derive(Debug, Clone, Copy)]
pub struct StructCodec<'a> {
    info: &'a StructInfo,
    codec: TarsCodec<'a>,
}

impl<'a> StructCodec<'a> {
    pub fn info(&self) -> &'a StructInfo {
        self.info
    }

    /// Every member at its declared default, or the zero value of its type.
    pub fn reset_to_defaults(&self) -> StructValue {
        let mut value = StructValue::new(self.info.qualified_name());
        for member in &self.info.members {
            let v = match &member.default {
                Some(literal) => self.codec.literal_value(&member.ty, literal),
                None => self.codec.default_value(&member.ty),
            };
            value.fields.push((member.wire_name.clone(), v));
        }
        value
    }

    /// Reset, then read every member in tag order.
    pub fn decode_body(&self, reader: &mut TarsReader<'_>) -> Result<StructValue, DecodeError> {
        self.decode_body_at(reader, 0)
    }

    fn decode_body_at(
        &self,
        reader: &mut TarsReader<'_>,
        depth: usize,
    ) -> Result<StructValue, DecodeError> {
        let mut value = self.reset_to_defaults();
        for member in &self.info.members {
            let read =
                self.codec
                    .read_var_at(reader, &member.ty, member.tag, member.required, depth)?;
            if let Some(v) = read {
                value.set(&member.wire_name, v);
            }
        }
        Ok(value)
    }

    /// Read the struct framed at `tag`. `None` when it is absent and not
    /// required; the caller keeps its defaults.
    pub fn decode_tagged(
        &self,
        reader: &mut TarsReader<'_>,
        tag: u8,
        required: bool,
    ) -> Result<Option<StructValue>, DecodeError> {
        self.decode_tagged_at(reader, tag, required, 0)
    }

    fn decode_tagged_at(
        &self,
        reader: &mut TarsReader<'_>,
        tag: u8,
        required: bool,
        depth: usize,
    ) -> Result<Option<StructValue>, DecodeError> {
        if !reader.read_struct_begin(tag, required)? {
            return Ok(None);
        }
        let value = self.decode_body_at(reader, depth)?;
        reader.skip_to_struct_end()?;
        Ok(Some(value))
    }

    /// Write every member in tag order. Members missing from `value` are
    /// written with their defaults.
    pub fn encode_body(&self, writer: &mut TarsWriter, value: &StructValue) -> Result<(), EncodeError> {
        for member in &self.info.members {
            match value.get(&member.wire_name) {
                Some(v) => self.codec.write_var(writer, &member.ty, v, member.tag)?,
                None => {
                    let v = match &member.default {
                        Some(literal) => self.codec.literal_value(&member.ty, literal),
                        None => self.codec.default_value(&member.ty),
                    };
                    self.codec.write_var(writer, &member.ty, &v, member.tag)?;
                }
            }
        }
        Ok(())
    }

    pub fn encode_tagged(
        &self,
        writer: &mut TarsWriter,
        value: &StructValue,
        tag: u8,
    ) -> Result<(), EncodeError> {
        writer.write_struct_begin(tag);
        self.encode_body(writer, value)?;
        writer.write_struct_end();
        Ok(())
    }

    /// Encode the body into a fresh buffer.
    pub fn to_bytes(&self, value: &StructValue) -> Result<Vec<u8>, EncodeError> {
        let mut writer = TarsWriter::new();
        self.encode_body(&mut writer, value)?;
        Ok(writer.into_bytes())
    }

    /// Decode a body from a buffer.
    pub fn from_bytes(&self, bytes: &[u8]) -> Result<StructValue, DecodeError> {
        self.decode_body(&mut TarsReader::new(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::compile_str;

    const IDL: &str = r#"
module Demo {
    enum Kind { A = 0, B, C = B };
    struct User {
        0 require string name;
        1 optional int age = 18;
        2 optional Kind kind = B;
    };
    struct Group {
        0 require vector<User> users;
        1 optional map<string, vector<byte>> blobs;
        2 optional int grid[3];
    };
};
"#;

    #[test]
    fn test_defaults_and_round_trip() {
        let compilation = compile_str("demo.tars", IDL).unwrap();
        let codec = TarsCodec::new(&compilation.schema);
        let user = codec.struct_codec("Demo::User").unwrap();

        let defaults = user.reset_to_defaults();
        assert_eq!(defaults.get("age"), Some(&Value::I32(18)));
        assert_eq!(defaults.get("kind"), Some(&Value::Enum(1)));

        let value = StructValue::new("Demo::User").with("name", "a");
        let bytes = user.to_bytes(&value).unwrap();
        let decoded = user.from_bytes(&bytes).unwrap();
        assert_eq!(decoded.get("name"), Some(&Value::from("a")));
        assert_eq!(decoded.get("age"), Some(&Value::I32(18)));
    }

    #[test]
    fn test_nested_containers() {
        let compilation = compile_str("demo.tars", IDL).unwrap();
        let codec = TarsCodec::new(&compilation.schema);
        let group = codec.struct_codec("Demo::Group").unwrap();

        let user = codec
            .struct_codec("Demo::User")
            .unwrap()
            .reset_to_defaults()
            .with("name", "z");
        let mut value = group.reset_to_defaults();
        value.set("users", Value::List(vec![Value::Struct(user)]));
        value.set(
            "blobs",
            Value::Map(vec![(
                Value::from("k"),
                Value::List(vec![Value::I8(-1), Value::I8(2)]),
            )]),
        );
        value.set("grid", Value::List(vec![Value::I32(1), Value::I32(2), Value::I32(3)]));

        let bytes = group.to_bytes(&value).unwrap();
        assert_eq!(group.from_bytes(&bytes).unwrap(), value);
    }

    #[test]
    fn test_array_length_enforced() {
        let compilation = compile_str("demo.tars", IDL).unwrap();
        let codec = TarsCodec::new(&compilation.schema);
        let grid = VarType::array(VarType::primitive(Primitive::Int32), 3);

        let mut w = TarsWriter::new();
        let short = Value::List(vec![Value::I32(1)]);
        assert!(codec.write_var(&mut w, &grid, &short, 0).is_err());

        let vector = VarType::vector(VarType::primitive(Primitive::Int32));
        codec.write_var(&mut w, &vector, &short, 0).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(
            codec.read_var(&mut TarsReader::new(&bytes), &grid, 0, true),
            Err(DecodeError::ArrayLength {
                expected: 3,
                actual: 1
            })
        );
    }
}
