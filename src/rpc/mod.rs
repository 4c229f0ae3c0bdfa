//! RPC runtime shared by generated code and schema-driven services.
//!
//! # Modules
//!
//! - [`typed`] - `TarsField`/`TarsStruct`, implemented by generated types
//! - [`json_field`] - JSON form of field values, used by generated serde
//!   attributes and the JSON payload
//! - [`payload`] - per-version argument encodings behind [`PayloadCodec`]
//! - [`packet`] - request/response envelopes and result codes
//! - [`dispatch`] - the server dispatch state machine and servant registry
//! - [`client`] - the transport seam and the proxy call path
//! - [`service`] - dispatch and calls driven by a compiled schema

pub mod client;
pub mod dispatch;
mod error;
pub mod json_field;
pub mod packet;
pub mod payload;
pub mod service;
pub mod typed;

pub use client::{CallContext, ClientCore, Invoker, LocalInvoker};
pub use dispatch::{
    DispatchObserver, DispatchState, MethodCall, NoopObserver, ServantContext, ServantDispatch,
    ServantRegistry, execute,
};
pub use error::{DispatchError, RpcError, ServantError};
pub use json_field::JsonField;
pub use packet::{RequestPacket, ResponsePacket, result_code};
pub use payload::{
    ArgRef, ArgSlot, DecodeArg, DynArg, DynSlot, EncodeArg, JsonPayload, PayloadCodec, TarsPayload,
    TupPayload, codec_for,
};
pub use service::{CallArgs, CallReply, DynamicProxy, Handler, ServiceDispatcher};
pub use typed::{TarsField, TarsStruct, is_default};
