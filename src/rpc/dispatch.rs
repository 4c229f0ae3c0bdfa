//! Server-side dispatch state machine.
//!
//! Every method call, generated or schema-driven, runs through [`execute`]:
//!
//! ```text
//! AwaitRequest -> DecodeInputs -> Invoke -> EncodeOutputs -> Respond
//! ```
//!
//! One-way calls stop after `Invoke`. A handler failure goes straight to
//! `Respond` with the error code and an empty payload.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::error::{DispatchError, ServantError};
use super::packet::{RequestPacket, ResponsePacket};
use super::payload::{PayloadCodec, codec_for};
use crate::codec::{DecodeError, EncodeError, ProtocolVersion};
use crate::logging::{debug, error, trace, warn};

/// States a single call moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchState {
    AwaitRequest,
    DecodeInputs,
    Invoke,
    EncodeOutputs,
    Respond,
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AwaitRequest => "await-request",
            Self::DecodeInputs => "decode-inputs",
            Self::Invoke => "invoke",
            Self::EncodeOutputs => "encode-outputs",
            Self::Respond => "respond",
        };
        f.write_str(name)
    }
}

/// Receives every state transition of a call.
pub trait DispatchObserver {
    fn on_state(&self, function: &str, state: DispatchState);
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DispatchObserver for NoopObserver {
    fn on_state(&self, _function: &str, _state: DispatchState) {}
}

/// What a servant sees of the request it is serving.
///
/// The response context starts as a copy of the request context and is
/// sent back with the reply, one-way calls excepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServantContext {
    pub request_id: i32,
    pub servant: String,
    pub function: String,
    pub version: ProtocolVersion,
    pub context: BTreeMap<String, String>,
    pub status: BTreeMap<String, String>,
    pub response_context: BTreeMap<String, String>,
}

impl ServantContext {
    pub fn from_request(request: &RequestPacket, version: ProtocolVersion) -> Self {
        Self {
            request_id: request.request_id,
            servant: request.servant_name.clone(),
            function: request.func_name.clone(),
            version,
            context: request.context.clone(),
            status: request.status.clone(),
            response_context: request.context.clone(),
        }
    }

    pub fn set_response_context(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.response_context.insert(key.into(), value.into());
    }
}

/// One in-flight method call: its decoded inputs, the handler and the
/// outputs it produced.
pub trait MethodCall {
    fn decode_inputs(
        &mut self,
        codec: &dyn PayloadCodec,
        payload: &[u8],
    ) -> Result<(), DecodeError>;

    fn invoke(&mut self, ctx: &mut ServantContext) -> Result<(), ServantError>;

    /// Return value (tag 0) followed by the outputs.
    fn encode_outputs(&self, codec: &dyn PayloadCodec) -> Result<Vec<u8>, EncodeError>;
}

/// Run `call` for `request`.
///
/// Returns `Ok(None)` for one-way requests. Errors before the handler runs
/// (unsupported version, bad inputs) and output encoding failures are
/// returned as [`DispatchError`]; handler failures become error responses.
pub fn execute(
    request: &RequestPacket,
    call: &mut dyn MethodCall,
    observer: &dyn DispatchObserver,
) -> Result<Option<ResponsePacket>, DispatchError> {
    let function = request.func_name.as_str();
    observer.on_state(function, DispatchState::AwaitRequest);
    let version = request.protocol()?;
    let codec = codec_for(version);

    observer.on_state(function, DispatchState::DecodeInputs);
    call.decode_inputs(codec, &request.buffer)?;

    observer.on_state(function, DispatchState::Invoke);
    let mut ctx = ServantContext::from_request(request, version);
    let outcome = call.invoke(&mut ctx);
    if request.is_one_way() {
        if let Err(e) = outcome {
            warn!(function, error = %e, "one-way handler failed");
        }
        return Ok(None);
    }

    if let Err(e) = outcome {
        debug!(function, code = e.code, "handler failed");
        observer.on_state(function, DispatchState::Respond);
        return Ok(Some(ResponsePacket {
            context: ctx.response_context,
            ..ResponsePacket::failure(request, e.code, e.message)
        }));
    }

    observer.on_state(function, DispatchState::EncodeOutputs);
    let buffer = match call.encode_outputs(codec) {
        Ok(buffer) => buffer,
        Err(e) => {
            error!(function, error = %e, "encoding outputs failed");
            return Err(e.into());
        }
    };

    observer.on_state(function, DispatchState::Respond);
    trace!(function, bytes = buffer.len(), "call complete");
    Ok(Some(ResponsePacket {
        context: ctx.response_context,
        ..ResponsePacket::success(request, buffer)
    }))
}

/// A servant reachable by function wire name.
pub trait ServantDispatch: Send + Sync {
    /// Function wire names this servant answers.
    fn functions(&self) -> Vec<String>;

    fn dispatch_with(
        &self,
        request: &RequestPacket,
        observer: &dyn DispatchObserver,
    ) -> Result<Option<ResponsePacket>, DispatchError>;

    fn dispatch(&self, request: &RequestPacket) -> Result<Option<ResponsePacket>, DispatchError> {
        self.dispatch_with(request, &NoopObserver)
    }
}

/// Servants by name. The transport hands every request to [`handle`].
///
/// [`handle`]: ServantRegistry::handle
#[derive(Default, Clone)]
pub struct ServantRegistry {
    servants: Arc<RwLock<BTreeMap<String, Arc<dyn ServantDispatch>>>>,
}

impl ServantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `servant` under `name`, replacing any previous one.
    pub fn register(&self, name: impl Into<String>, servant: Arc<dyn ServantDispatch>) {
        let name = name.into();
        debug!(servant = %name, "registering servant");
        self.servants.write().insert(name, servant);
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.servants.write().remove(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.servants.read().keys().cloned().collect()
    }

    /// Route `request` by servant name and turn dispatch errors into error
    /// responses. `None` only for one-way requests.
    pub fn handle(&self, request: &RequestPacket) -> Option<ResponsePacket> {
        let servant = self.servants.read().get(&request.servant_name).cloned();
        let result = match servant {
            Some(servant) => servant.dispatch(request),
            None => Err(DispatchError::NoSuchServant(request.servant_name.clone())),
        };
        match result {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    servant = %request.servant_name,
                    function = %request.func_name,
                    error = %e,
                    "dispatch failed"
                );
                if request.is_one_way() {
                    None
                } else {
                    Some(ResponsePacket::failure(request, e.result_code(), e.to_string()))
                }
            }
        }
    }
}

impl fmt::Debug for ServantRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServantRegistry")
            .field("servants", &self.names())
            .finish()
    }
}
