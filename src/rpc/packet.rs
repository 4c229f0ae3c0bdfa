//! Request and response envelopes.
//!
//! Both are ordinary TARS structs; the call payload rides in `buffer`,
//! encoded according to `version`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::typed::{TarsField, TarsStruct};
use crate::codec::{DecodeError, EncodeError, ProtocolVersion, TarsReader, TarsWriter};

/// Result codes carried in [`ResponsePacket::ret`].
pub mod result_code {
    pub const SUCCESS: i32 = 0;
    pub const SERVER_DECODE_ERR: i32 = -1;
    pub const SERVER_ENCODE_ERR: i32 = -2;
    pub const NO_FUNC: i32 = -3;
    pub const NO_SERVANT: i32 = -4;
    pub const UNKNOWN: i32 = -99;
}

/// Packet type: a normal two-way call.
pub const NORMAL: i8 = 0;
/// Packet type: one-way, no response expected.
pub const ONE_WAY: i8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestPacket {
    pub version: i16,
    pub packet_type: i8,
    pub message_type: i32,
    pub request_id: i32,
    pub servant_name: String,
    pub func_name: String,
    pub buffer: Vec<u8>,
    pub timeout: i32,
    pub context: BTreeMap<String, String>,
    pub status: BTreeMap<String, String>,
}

impl Default for RequestPacket {
    fn default() -> Self {
        Self {
            version: ProtocolVersion::TARS as i16,
            packet_type: NORMAL,
            message_type: 0,
            request_id: 0,
            servant_name: String::new(),
            func_name: String::new(),
            buffer: Vec::new(),
            timeout: 0,
            context: BTreeMap::new(),
            status: BTreeMap::new(),
        }
    }
}

impl RequestPacket {
    pub fn is_one_way(&self) -> bool {
        self.packet_type == ONE_WAY
    }

    /// The payload encoding this request asks for.
    pub fn protocol(&self) -> Result<ProtocolVersion, DecodeError> {
        ProtocolVersion::from_u16(self.version as u16)
    }
}

impl TarsStruct for RequestPacket {
    fn decode_body(&mut self, reader: &mut TarsReader<'_>) -> Result<(), DecodeError> {
        self.reset_to_defaults();
        self.version.read_field(reader, 1, true)?;
        self.packet_type.read_field(reader, 2, true)?;
        self.message_type.read_field(reader, 3, true)?;
        self.request_id.read_field(reader, 4, true)?;
        self.servant_name.read_field(reader, 5, true)?;
        self.func_name.read_field(reader, 6, true)?;
        self.buffer.read_field(reader, 7, true)?;
        self.timeout.read_field(reader, 8, true)?;
        self.context.read_field(reader, 9, true)?;
        self.status.read_field(reader, 10, true)?;
        Ok(())
    }

    fn encode_body(&self, writer: &mut TarsWriter) -> Result<(), EncodeError> {
        self.version.write_field(writer, 1)?;
        self.packet_type.write_field(writer, 2)?;
        self.message_type.write_field(writer, 3)?;
        self.request_id.write_field(writer, 4)?;
        self.servant_name.write_field(writer, 5)?;
        self.func_name.write_field(writer, 6)?;
        self.buffer.write_field(writer, 7)?;
        self.timeout.write_field(writer, 8)?;
        self.context.write_field(writer, 9)?;
        self.status.write_field(writer, 10)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponsePacket {
    pub version: i16,
    pub packet_type: i8,
    pub request_id: i32,
    pub message_type: i32,
    pub ret: i32,
    pub buffer: Vec<u8>,
    pub status: BTreeMap<String, String>,
    pub result_desc: String,
    pub context: BTreeMap<String, String>,
}

impl Default for ResponsePacket {
    fn default() -> Self {
        Self {
            version: ProtocolVersion::TARS as i16,
            packet_type: NORMAL,
            request_id: 0,
            message_type: 0,
            ret: result_code::SUCCESS,
            buffer: Vec::new(),
            status: BTreeMap::new(),
            result_desc: String::new(),
            context: BTreeMap::new(),
        }
    }
}

impl ResponsePacket {
    /// A successful reply to `request` carrying `buffer`.
    pub fn success(request: &RequestPacket, buffer: Vec<u8>) -> Self {
        Self {
            version: request.version,
            packet_type: request.packet_type,
            request_id: request.request_id,
            message_type: request.message_type,
            context: request.context.clone(),
            buffer,
            ..Self::default()
        }
    }

    /// A failed reply with an empty payload.
    pub fn failure(request: &RequestPacket, ret: i32, desc: impl Into<String>) -> Self {
        Self {
            ret,
            result_desc: desc.into(),
            ..Self::success(request, Vec::new())
        }
    }

    pub fn is_success(&self) -> bool {
        self.ret == result_code::SUCCESS
    }
}

impl TarsStruct for ResponsePacket {
    fn decode_body(&mut self, reader: &mut TarsReader<'_>) -> Result<(), DecodeError> {
        self.reset_to_defaults();
        self.version.read_field(reader, 1, true)?;
        self.packet_type.read_field(reader, 2, true)?;
        self.request_id.read_field(reader, 3, true)?;
        self.message_type.read_field(reader, 4, true)?;
        self.ret.read_field(reader, 5, true)?;
        self.buffer.read_field(reader, 6, true)?;
        self.status.read_field(reader, 7, true)?;
        self.result_desc.read_field(reader, 8, false)?;
        self.context.read_field(reader, 9, false)?;
        Ok(())
    }

    fn encode_body(&self, writer: &mut TarsWriter) -> Result<(), EncodeError> {
        self.version.write_field(writer, 1)?;
        self.packet_type.write_field(writer, 2)?;
        self.request_id.write_field(writer, 3)?;
        self.message_type.write_field(writer, 4)?;
        self.ret.write_field(writer, 5)?;
        self.buffer.write_field(writer, 6)?;
        self.status.write_field(writer, 7)?;
        self.result_desc.write_field(writer, 8)?;
        self.context.write_field(writer, 9)?;
        Ok(())
    }
}
