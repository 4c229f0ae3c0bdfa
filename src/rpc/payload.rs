//! Per-version payload encodings for call arguments.
//!
//! A call payload is a set of arguments plus an optional return value. The
//! three encodings differ only in how each argument is addressed:
//!
//! - TARS: every argument is a field of one buffer at its tag;
//! - TUP: every argument is its own TARS blob (tag 0) in a [`UniAttribute`]
//!   keyed by wire name;
//! - JSON: one object keyed by wire name.
//!
//! The return value is tag 0, stored under `""`/`"tars_ret"` in TUP and
//! `"tars_ret"` in JSON.

use serde_json::{Map as JsonMap, Value as Json};

use super::json_field::JsonField;
use super::typed::TarsField;
use crate::codec::{
    DecodeError, EncodeError, ProtocolVersion, TarsReader, TarsWriter, UniAttribute,
};
use crate::codegen::TarsCodec;
use crate::types::VarType;
use crate::value::Value;

/// JSON key of the return value.
pub const JSON_RETURN_KEY: &str = "tars_ret";

/// An argument value that can be written in every payload encoding.
pub trait EncodeArg {
    fn encode_tars(&self, writer: &mut TarsWriter, tag: u8) -> Result<(), EncodeError>;
    fn to_json(&self) -> Result<Json, EncodeError>;
}

/// An argument slot that can be filled from every payload encoding.
pub trait DecodeArg {
    fn decode_tars(
        &mut self,
        reader: &mut TarsReader<'_>,
        tag: u8,
        required: bool,
    ) -> Result<(), DecodeError>;

    /// `None` means the key was missing; the slot takes its default.
    fn from_json(&mut self, json: Option<&Json>) -> Result<(), DecodeError>;
}

impl<T: TarsField + JsonField> EncodeArg for T {
    fn encode_tars(&self, writer: &mut TarsWriter, tag: u8) -> Result<(), EncodeError> {
        self.write_field(writer, tag)
    }

    fn to_json(&self) -> Result<Json, EncodeError> {
        Ok(JsonField::to_json(self)?)
    }
}

impl<T: TarsField + JsonField> DecodeArg for T {
    fn decode_tars(
        &mut self,
        reader: &mut TarsReader<'_>,
        tag: u8,
        required: bool,
    ) -> Result<(), DecodeError> {
        self.read_field(reader, tag, required)
    }

    fn from_json(&mut self, json: Option<&Json>) -> Result<(), DecodeError> {
        *self = match json {
            None => T::default(),
            Some(json) => T::from_json_or_default(json.clone())?,
        };
        Ok(())
    }
}

/// A schema-described value, for calls made without generated types.
pub struct DynArg<'a> {
    pub codec: TarsCodec<'a>,
    pub ty: &'a VarType,
    pub value: &'a Value,
}

impl EncodeArg for DynArg<'_> {
    fn encode_tars(&self, writer: &mut TarsWriter, tag: u8) -> Result<(), EncodeError> {
        self.codec.write_var(writer, self.ty, self.value, tag)
    }

    fn to_json(&self) -> Result<Json, EncodeError> {
        self.codec.to_json(self.ty, self.value)
    }
}

/// A schema-described slot. Absent optional fields leave the value as is.
pub struct DynSlot<'a> {
    pub codec: TarsCodec<'a>,
    pub ty: &'a VarType,
    pub value: &'a mut Value,
}

impl DecodeArg for DynSlot<'_> {
    fn decode_tars(
        &mut self,
        reader: &mut TarsReader<'_>,
        tag: u8,
        required: bool,
    ) -> Result<(), DecodeError> {
        if let Some(value) = self.codec.read_var(reader, self.ty, tag, required)? {
            *self.value = value;
        }
        Ok(())
    }

    fn from_json(&mut self, json: Option<&Json>) -> Result<(), DecodeError> {
        *self.value = self.codec.from_json(self.ty, json)?;
        Ok(())
    }
}

/// One argument to encode.
pub struct ArgRef<'a> {
    pub name: &'a str,
    pub tag: u8,
    pub is_return: bool,
    pub value: &'a dyn EncodeArg,
}

impl<'a> ArgRef<'a> {
    pub fn new(name: &'a str, tag: u8, value: &'a dyn EncodeArg) -> Self {
        Self {
            name,
            tag,
            is_return: false,
            value,
        }
    }

    /// The return value, at tag 0.
    pub fn ret(value: &'a dyn EncodeArg) -> Self {
        Self {
            name: "",
            tag: 0,
            is_return: true,
            value,
        }
    }
}

/// One argument to decode into.
pub struct ArgSlot<'a> {
    pub name: &'a str,
    pub tag: u8,
    pub required: bool,
    pub is_return: bool,
    pub value: &'a mut dyn DecodeArg,
}

impl<'a> ArgSlot<'a> {
    pub fn new(name: &'a str, tag: u8, required: bool, value: &'a mut dyn DecodeArg) -> Self {
        Self {
            name,
            tag,
            required,
            is_return: false,
            value,
        }
    }

    /// The return value slot, at tag 0.
    pub fn ret(value: &'a mut dyn DecodeArg) -> Self {
        Self {
            name: "",
            tag: 0,
            required: true,
            is_return: true,
            value,
        }
    }
}

/// Encodes and decodes a call's argument set for one protocol version.
///
/// Arguments and slots are given in ascending tag order.
pub trait PayloadCodec: Send + Sync {
    fn version(&self) -> ProtocolVersion;
    fn encode(&self, args: &[ArgRef<'_>]) -> Result<Vec<u8>, EncodeError>;
    fn decode(&self, payload: &[u8], slots: &mut [ArgSlot<'_>]) -> Result<(), DecodeError>;
}

/// Tag-addressed fields in one buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarsPayload;

/// Name-addressed blobs in a [`UniAttribute`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TupPayload;

/// One JSON object.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPayload;

static TARS_PAYLOAD: TarsPayload = TarsPayload;
static TUP_PAYLOAD: TupPayload = TupPayload;
static JSON_PAYLOAD: JsonPayload = JsonPayload;

/// The codec strategy for `version`.
pub fn codec_for(version: ProtocolVersion) -> &'static dyn PayloadCodec {
    match version {
        ProtocolVersion::Tars => &TARS_PAYLOAD,
        ProtocolVersion::Tup => &TUP_PAYLOAD,
        ProtocolVersion::Json => &JSON_PAYLOAD,
    }
}

impl PayloadCodec for TarsPayload {
    fn version(&self) -> ProtocolVersion {
        ProtocolVersion::Tars
    }

    fn encode(&self, args: &[ArgRef<'_>]) -> Result<Vec<u8>, EncodeError> {
        let mut writer = TarsWriter::new();
        for arg in args {
            arg.value.encode_tars(&mut writer, arg.tag)?;
        }
        Ok(writer.into_bytes())
    }

    fn decode(&self, payload: &[u8], slots: &mut [ArgSlot<'_>]) -> Result<(), DecodeError> {
        let mut reader = TarsReader::new(payload);
        for slot in slots.iter_mut() {
            slot.value.decode_tars(&mut reader, slot.tag, slot.required)?;
        }
        Ok(())
    }
}

impl PayloadCodec for TupPayload {
    fn version(&self) -> ProtocolVersion {
        ProtocolVersion::Tup
    }

    fn encode(&self, args: &[ArgRef<'_>]) -> Result<Vec<u8>, EncodeError> {
        let mut attributes = UniAttribute::new();
        for arg in args {
            let mut writer = TarsWriter::new();
            arg.value.encode_tars(&mut writer, 0)?;
            if arg.is_return {
                attributes.put_return(writer.into_bytes());
            } else {
                attributes.put_buffer(arg.name, writer.into_bytes());
            }
        }
        attributes.to_bytes()
    }

    fn decode(&self, payload: &[u8], slots: &mut [ArgSlot<'_>]) -> Result<(), DecodeError> {
        let attributes = UniAttribute::from_bytes(payload)?;
        for slot in slots.iter_mut() {
            let buffer = if slot.is_return {
                attributes.get_return()
            } else {
                attributes.get_buffer(slot.name)
            };
            match buffer {
                Some(buffer) => {
                    let mut reader = TarsReader::new(buffer);
                    slot.value.decode_tars(&mut reader, 0, slot.required)?;
                }
                None if slot.required => {
                    let key = if slot.is_return { JSON_RETURN_KEY } else { slot.name };
                    return Err(DecodeError::MissingAttribute(key.to_string()));
                }
                None => {}
            }
        }
        Ok(())
    }
}

impl PayloadCodec for JsonPayload {
    fn version(&self) -> ProtocolVersion {
        ProtocolVersion::Json
    }

    fn encode(&self, args: &[ArgRef<'_>]) -> Result<Vec<u8>, EncodeError> {
        let mut object = JsonMap::new();
        for arg in args {
            let key = if arg.is_return { JSON_RETURN_KEY } else { arg.name };
            object.insert(key.to_string(), arg.value.to_json()?);
        }
        Ok(serde_json::to_vec(&Json::Object(object))?)
    }

    /// Missing keys take their defaults, required or not.
    fn decode(&self, payload: &[u8], slots: &mut [ArgSlot<'_>]) -> Result<(), DecodeError> {
        let object = if payload.is_empty() {
            JsonMap::new()
        } else {
            match serde_json::from_slice::<Json>(payload)? {
                Json::Object(object) => object,
                other => {
                    return Err(DecodeError::Json(format!(
                        "expected an argument object, found {other}"
                    )));
                }
            }
        };
        for slot in slots.iter_mut() {
            let key = if slot.is_return { JSON_RETURN_KEY } else { slot.name };
            slot.value.from_json(object.get(key))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(version: ProtocolVersion) -> (i32, String, Vec<u8>) {
        let codec = codec_for(version);
        let ret = 7i32;
        let name = String::from("bob");
        let blob = vec![1u8, 2];
        let payload = codec
            .encode(&[
                ArgRef::ret(&ret),
                ArgRef::new("name", 1, &name),
                ArgRef::new("blob", 2, &blob),
            ])
            .unwrap();

        let mut ret_out = 0i32;
        let mut name_out = String::new();
        let mut blob_out: Vec<u8> = Vec::new();
        codec
            .decode(
                &payload,
                &mut [
                    ArgSlot::ret(&mut ret_out),
                    ArgSlot::new("name", 1, true, &mut name_out),
                    ArgSlot::new("blob", 2, true, &mut blob_out),
                ],
            )
            .unwrap();
        (ret_out, name_out, blob_out)
    }

    #[test]
    fn test_all_versions_round_trip() {
        for version in [ProtocolVersion::Tars, ProtocolVersion::Tup, ProtocolVersion::Json] {
            assert_eq!(
                round_trip(version),
                (7, "bob".to_string(), vec![1, 2]),
                "{version}"
            );
        }
    }

    #[test]
    fn test_tup_return_under_both_keys() {
        let ret = 5i64;
        let payload = TupPayload.encode(&[ArgRef::ret(&ret)]).unwrap();
        let attributes = UniAttribute::from_bytes(&payload).unwrap();
        assert!(attributes.contains(""));
        assert!(attributes.contains("tars_ret"));
    }

    #[test]
    fn test_required_missing_by_version() {
        let empty_tars = TarsPayload.encode(&[]).unwrap();
        let empty_tup = TupPayload.encode(&[]).unwrap();
        let empty_json = JsonPayload.encode(&[]).unwrap();

        let mut value = 3i32;
        let err = TarsPayload
            .decode(&empty_tars, &mut [ArgSlot::new("a", 1, true, &mut value)])
            .unwrap_err();
        assert!(err.is_missing_field());

        let err = TupPayload
            .decode(&empty_tup, &mut [ArgSlot::new("a", 1, true, &mut value)])
            .unwrap_err();
        assert_eq!(err, DecodeError::MissingAttribute("a".into()));

        JsonPayload
            .decode(&empty_json, &mut [ArgSlot::new("a", 1, true, &mut value)])
            .unwrap();
        assert_eq!(value, 0);
    }

    #[test]
    fn test_json_layout() {
        let ret = true;
        let count = 2u16;
        let payload = JsonPayload
            .encode(&[ArgRef::ret(&ret), ArgRef::new("count", 1, &count)])
            .unwrap();
        let json: Json = serde_json::from_slice(&payload).unwrap();
        assert_eq!(json, serde_json::json!({ "tars_ret": true, "count": 2 }));
    }
}
