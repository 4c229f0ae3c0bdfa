//! Module `Geo`, generated by tars2rs from geo.tars. Do not edit.

#![allow(unused_imports, dead_code, clippy::all)]

use std::collections::BTreeMap;

use tars_idl::codec::{DecodeError, EncodeError, TarsReader, TarsWriter};
use tars_idl::rpc::json_field::{self, Json, JsonError, JsonField};
use tars_idl::rpc::{TarsField, TarsStruct};
use tars_idl::serde::{Deserialize, Serialize};
use tars_idl::rpc::{ArgRef, ArgSlot, CallContext, ClientCore, DispatchError, DispatchObserver, Invoker, MethodCall, PayloadCodec, RequestPacket, ResponsePacket, RpcError, ServantContext, ServantDispatch, ServantError, execute};

pub const MAX_FACTOR: i32 = 100;

/// Enum `Mode`; unknown values are kept as is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(crate = "tars_idl::serde", transparent)]
pub struct Mode(pub i32);

impl Mode {
    pub const FAST: Self = Self(1);
    pub const SAFE: Self = Self(2);

    /// IDL name of the first member with this value.
    pub fn name(self) -> Option<&'static str> {
        match self.0 {
            1 => Some("FAST"),
            2 => Some("SAFE"),
            _ => None,
        }
    }
}

impl TarsField for Mode {
    fn write_field(&self, writer: &mut TarsWriter, tag: u8) -> Result<(), EncodeError> {
        self.0.write_field(writer, tag)
    }

    fn read_field(&mut self, reader: &mut TarsReader<'_>, tag: u8, required: bool) -> Result<(), DecodeError> {
        self.0.read_field(reader, tag, required)
    }
}

impl JsonField for Mode {
    const OBJECT_KEY: bool = true;

    fn to_json(&self) -> Result<Json, JsonError> {
        json_field::to_json_serde(self)
    }

    fn from_json(json: Json) -> Result<Self, JsonError> {
        json_field::from_json_serde(json)
    }
}

/// Struct `Geo::Point`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(crate = "tars_idl::serde", default)]
pub struct Point {
    #[serde(with = "tars_idl::rpc::json_field")]
    pub x: i32,
    #[serde(with = "tars_idl::rpc::json_field")]
    pub y: i32,
}

impl Default for Point {
    fn default() -> Self {
        Self {
            x: Default::default(),
            y: 5,
        }
    }
}

impl TarsStruct for Point {
    fn decode_body(&mut self, reader: &mut TarsReader<'_>) -> Result<(), DecodeError> {
        self.reset_to_defaults();
        self.x.read_field(reader, 0, true)?;
        self.y.read_field(reader, 1, false)?;
        Ok(())
    }

    fn encode_body(&self, writer: &mut TarsWriter) -> Result<(), EncodeError> {
        self.x.write_field(writer, 0)?;
        self.y.write_field(writer, 1)?;
        Ok(())
    }
}

impl TarsField for Point {
    fn write_field(&self, writer: &mut TarsWriter, tag: u8) -> Result<(), EncodeError> {
        self.encode_tagged(writer, tag)
    }

    fn read_field(&mut self, reader: &mut TarsReader<'_>, tag: u8, required: bool) -> Result<(), DecodeError> {
        self.decode_tagged(reader, tag, required)
    }
}

impl JsonField for Point {
    fn to_json(&self) -> Result<Json, JsonError> {
        json_field::to_json_serde(self)
    }

    fn from_json(json: Json) -> Result<Self, JsonError> {
        json_field::from_json_serde(json)
    }
}

/// Struct `Geo::Shape`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(crate = "tars_idl::serde", default)]
pub struct Shape {
    #[serde(with = "tars_idl::rpc::json_field")]
    pub name: String,
    #[serde(with = "tars_idl::rpc::json_field")]
    pub points: Vec<Point>,
    #[serde(with = "tars_idl::rpc::json_field")]
    pub labels: BTreeMap<Point, String>,
    #[serde(with = "tars_idl::rpc::json_field")]
    pub notes: BTreeMap<Mode, String>,
    #[serde(with = "tars_idl::rpc::json_field")]
    pub mode: Mode,
    #[serde(with = "tars_idl::rpc::json_field")]
    pub weights: Vec<BTreeMap<Point, i32>>,
}

impl Default for Shape {
    fn default() -> Self {
        Self {
            name: String::from("unit"),
            points: Default::default(),
            labels: Default::default(),
            notes: Default::default(),
            mode: Mode::SAFE,
            weights: Default::default(),
        }
    }
}

impl TarsStruct for Shape {
    fn decode_body(&mut self, reader: &mut TarsReader<'_>) -> Result<(), DecodeError> {
        self.reset_to_defaults();
        self.name.read_field(reader, 0, false)?;
        self.points.read_field(reader, 1, false)?;
        self.labels.read_field(reader, 2, false)?;
        self.notes.read_field(reader, 3, false)?;
        self.mode.read_field(reader, 4, false)?;
        self.weights.read_field(reader, 5, false)?;
        Ok(())
    }

    fn encode_body(&self, writer: &mut TarsWriter) -> Result<(), EncodeError> {
        self.name.write_field(writer, 0)?;
        self.points.write_field(writer, 1)?;
        self.labels.write_field(writer, 2)?;
        self.notes.write_field(writer, 3)?;
        self.mode.write_field(writer, 4)?;
        self.weights.write_field(writer, 5)?;
        Ok(())
    }
}

impl TarsField for Shape {
    fn write_field(&self, writer: &mut TarsWriter, tag: u8) -> Result<(), EncodeError> {
        self.encode_tagged(writer, tag)
    }

    fn read_field(&mut self, reader: &mut TarsReader<'_>, tag: u8, required: bool) -> Result<(), DecodeError> {
        self.decode_tagged(reader, tag, required)
    }
}

impl JsonField for Shape {
    fn to_json(&self) -> Result<Json, JsonError> {
        json_field::to_json_serde(self)
    }

    fn from_json(json: Json) -> Result<Self, JsonError> {
        json_field::from_json_serde(json)
    }
}

/// Server side of `Geo::Calc`. Inputs are passed by value, outputs by reference.
pub trait Calc: Send + Sync {
    fn scale(&self, p: Point, factor: i32, scaled: &mut Point) -> Result<i32, ServantError>;
    fn describe(&self, shape: Shape, summary: &mut String) -> Result<Shape, ServantError>;
    fn reset(&self) -> Result<(), ServantError>;
}

/// [`Calc`] with the request context. Every [`Calc`] implements it.
pub trait CalcWithContext: Send + Sync {
    fn scale(&self, tars_ctx: &mut ServantContext, p: Point, factor: i32, scaled: &mut Point) -> Result<i32, ServantError>;
    fn describe(&self, tars_ctx: &mut ServantContext, shape: Shape, summary: &mut String) -> Result<Shape, ServantError>;
    fn reset(&self, tars_ctx: &mut ServantContext) -> Result<(), ServantError>;
}

impl<T: Calc> CalcWithContext for T {
    fn scale(&self, _tars_ctx: &mut ServantContext, p: Point, factor: i32, scaled: &mut Point) -> Result<i32, ServantError> {
        Calc::scale(self, p, factor, scaled)
    }

    fn describe(&self, _tars_ctx: &mut ServantContext, shape: Shape, summary: &mut String) -> Result<Shape, ServantError> {
        Calc::describe(self, shape, summary)
    }

    fn reset(&self, _tars_ctx: &mut ServantContext) -> Result<(), ServantError> {
        Calc::reset(self)
    }
}

/// Client proxy for `Geo::Calc`.
#[derive(Debug)]
pub struct CalcProxy<I> {
    core: ClientCore<I>,
}

impl<I: Invoker> CalcProxy<I> {
    pub fn new(core: ClientCore<I>) -> Self {
        Self { core }
    }

    pub fn core(&self) -> &ClientCore<I> {
        &self.core
    }

    pub fn scale(&self, p: &Point, factor: &i32, scaled: &mut Point) -> Result<i32, RpcError> {
        self.scale_with_context(p, factor, scaled, &mut CallContext::default())
    }

    pub fn scale_with_context(&self, p: &Point, factor: &i32, scaled: &mut Point, tars_ctx: &mut CallContext) -> Result<i32, RpcError> {
        let mut tars_ret: i32 = Default::default();
        self.core.call_with_context(
            "scale",
            &[ArgRef::new("p", 1, p), ArgRef::new("factor", 2, factor)],
            &mut [ArgSlot::ret(&mut tars_ret), ArgSlot::new("scaled", 3, true, scaled)],
            tars_ctx,
        )?;
        Ok(tars_ret)
    }

    pub fn scale_one_way(&self, p: &Point, factor: &i32) -> Result<(), RpcError> {
        self.scale_one_way_with_context(p, factor, &CallContext::default())
    }

    pub fn scale_one_way_with_context(&self, p: &Point, factor: &i32, tars_ctx: &CallContext) -> Result<(), RpcError> {
        self.core.call_one_way_with_context("scale", &[ArgRef::new("p", 1, p), ArgRef::new("factor", 2, factor)], tars_ctx)
    }

    pub fn describe(&self, shape: &Shape, summary: &mut String) -> Result<Shape, RpcError> {
        self.describe_with_context(shape, summary, &mut CallContext::default())
    }

    pub fn describe_with_context(&self, shape: &Shape, summary: &mut String, tars_ctx: &mut CallContext) -> Result<Shape, RpcError> {
        let mut tars_ret: Shape = Default::default();
        self.core.call_with_context(
            "describe",
            &[ArgRef::new("shape", 1, shape)],
            &mut [ArgSlot::ret(&mut tars_ret), ArgSlot::new("summary", 2, true, summary)],
            tars_ctx,
        )?;
        Ok(tars_ret)
    }

    pub fn describe_one_way(&self, shape: &Shape) -> Result<(), RpcError> {
        self.describe_one_way_with_context(shape, &CallContext::default())
    }

    pub fn describe_one_way_with_context(&self, shape: &Shape, tars_ctx: &CallContext) -> Result<(), RpcError> {
        self.core.call_one_way_with_context("describe", &[ArgRef::new("shape", 1, shape)], tars_ctx)
    }

    pub fn reset(&self) -> Result<(), RpcError> {
        self.reset_with_context(&mut CallContext::default())
    }

    pub fn reset_with_context(&self, tars_ctx: &mut CallContext) -> Result<(), RpcError> {
        self.core.call_with_context(
            "reset",
            &[],
            &mut [],
            tars_ctx,
        )?;
        Ok(())
    }

    pub fn reset_one_way(&self) -> Result<(), RpcError> {
        self.reset_one_way_with_context(&CallContext::default())
    }

    pub fn reset_one_way_with_context(&self, tars_ctx: &CallContext) -> Result<(), RpcError> {
        self.core.call_one_way_with_context("reset", &[], tars_ctx)
    }
}

struct CalcScaleCall<'a, S> {
    servant: &'a S,
    arg_p: Point,
    arg_factor: i32,
    arg_scaled: Point,
    tars_ret: i32,
}

impl<'a, S: CalcWithContext> CalcScaleCall<'a, S> {
    fn new(servant: &'a S) -> Self {
        Self {
            servant,
            arg_p: Default::default(),
            arg_factor: Default::default(),
            arg_scaled: Default::default(),
            tars_ret: Default::default(),
        }
    }
}

impl<S: CalcWithContext> MethodCall for CalcScaleCall<'_, S> {
    fn decode_inputs(&mut self, codec: &dyn PayloadCodec, payload: &[u8]) -> Result<(), DecodeError> {
        codec.decode(payload, &mut [ArgSlot::new("p", 1, true, &mut self.arg_p), ArgSlot::new("factor", 2, true, &mut self.arg_factor)])
    }

    fn invoke(&mut self, tars_ctx: &mut ServantContext) -> Result<(), ServantError> {
        self.tars_ret = CalcWithContext::scale(self.servant, tars_ctx, std::mem::take(&mut self.arg_p), std::mem::take(&mut self.arg_factor), &mut self.arg_scaled)?;
        Ok(())
    }

    fn encode_outputs(&self, codec: &dyn PayloadCodec) -> Result<Vec<u8>, EncodeError> {
        codec.encode(&[ArgRef::ret(&self.tars_ret), ArgRef::new("scaled", 3, &self.arg_scaled)])
    }
}

struct CalcDescribeCall<'a, S> {
    servant: &'a S,
    arg_shape: Shape,
    arg_summary: String,
    tars_ret: Shape,
}

impl<'a, S: CalcWithContext> CalcDescribeCall<'a, S> {
    fn new(servant: &'a S) -> Self {
        Self {
            servant,
            arg_shape: Default::default(),
            arg_summary: Default::default(),
            tars_ret: Default::default(),
        }
    }
}

impl<S: CalcWithContext> MethodCall for CalcDescribeCall<'_, S> {
    fn decode_inputs(&mut self, codec: &dyn PayloadCodec, payload: &[u8]) -> Result<(), DecodeError> {
        codec.decode(payload, &mut [ArgSlot::new("shape", 1, true, &mut self.arg_shape)])
    }

    fn invoke(&mut self, tars_ctx: &mut ServantContext) -> Result<(), ServantError> {
        self.tars_ret = CalcWithContext::describe(self.servant, tars_ctx, std::mem::take(&mut self.arg_shape), &mut self.arg_summary)?;
        Ok(())
    }

    fn encode_outputs(&self, codec: &dyn PayloadCodec) -> Result<Vec<u8>, EncodeError> {
        codec.encode(&[ArgRef::ret(&self.tars_ret), ArgRef::new("summary", 2, &self.arg_summary)])
    }
}

struct CalcResetCall<'a, S> {
    servant: &'a S,
}

impl<'a, S: CalcWithContext> CalcResetCall<'a, S> {
    fn new(servant: &'a S) -> Self {
        Self {
            servant,
        }
    }
}

impl<S: CalcWithContext> MethodCall for CalcResetCall<'_, S> {
    fn decode_inputs(&mut self, codec: &dyn PayloadCodec, payload: &[u8]) -> Result<(), DecodeError> {
        codec.decode(payload, &mut [])
    }

    fn invoke(&mut self, tars_ctx: &mut ServantContext) -> Result<(), ServantError> {
        CalcWithContext::reset(self.servant, tars_ctx)?;
        Ok(())
    }

    fn encode_outputs(&self, codec: &dyn PayloadCodec) -> Result<Vec<u8>, EncodeError> {
        codec.encode(&[])
    }
}

/// Routes requests for `Geo::Calc` to a [`Calc`] implementation.
#[derive(Debug)]
pub struct CalcDispatcher<S> {
    servant: S,
}

impl<S: CalcWithContext> CalcDispatcher<S> {
    pub fn new(servant: S) -> Self {
        Self { servant }
    }

    pub fn servant(&self) -> &S {
        &self.servant
    }
}

impl<S: CalcWithContext> ServantDispatch for CalcDispatcher<S> {
    fn functions(&self) -> Vec<String> {
        vec!["describe".to_string(), "reset".to_string(), "scale".to_string()]
    }

    fn dispatch_with(&self, request: &RequestPacket, observer: &dyn DispatchObserver) -> Result<Option<ResponsePacket>, DispatchError> {
        match request.func_name.as_str() {
            "scale" => {
                let mut call = CalcScaleCall::new(&self.servant);
                execute(request, &mut call, observer)
            }
            "describe" => {
                let mut call = CalcDescribeCall::new(&self.servant);
                execute(request, &mut call, observer)
            }
            "reset" => {
                let mut call = CalcResetCall::new(&self.servant);
                execute(request, &mut call, observer)
            }
            _ => Err(DispatchError::NoSuchFunction {
                servant: request.servant_name.clone(),
                function: request.func_name.clone(),
            }),
        }
    }
}
