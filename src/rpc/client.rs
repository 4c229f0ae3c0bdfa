//! Client side: the transport seam and the shared call path used by every
//! generated proxy.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use super::dispatch::ServantRegistry;
use super::error::RpcError;
use super::packet::{NORMAL, ONE_WAY, RequestPacket, ResponsePacket, result_code};
use super::payload::{ArgRef, ArgSlot, codec_for};
use crate::codec::ProtocolVersion;
use crate::logging::{debug, trace};

/// Sends a request and returns the response. One-way requests return
/// `Ok(None)`.
pub trait Invoker: Send + Sync {
    fn invoke(&self, request: RequestPacket) -> Result<Option<ResponsePacket>, RpcError>;
}

impl<I: Invoker + ?Sized> Invoker for Arc<I> {
    fn invoke(&self, request: RequestPacket) -> Result<Option<ResponsePacket>, RpcError> {
        (**self).invoke(request)
    }
}

/// In-process transport: hands requests straight to a [`ServantRegistry`],
/// round-tripping both packets through their wire form.
#[derive(Debug, Clone, Default)]
pub struct LocalInvoker {
    registry: ServantRegistry,
}

impl LocalInvoker {
    pub fn new(registry: ServantRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ServantRegistry {
        &self.registry
    }
}

impl Invoker for LocalInvoker {
    fn invoke(&self, request: RequestPacket) -> Result<Option<ResponsePacket>, RpcError> {
        use super::typed::TarsStruct;

        let request = RequestPacket::from_bytes(&request.to_bytes()?)?;
        match self.registry.handle(&request) {
            Some(response) => Ok(Some(ResponsePacket::from_bytes(&response.to_bytes()?)?)),
            None => Ok(None),
        }
    }
}

/// Per-call request context and status.
///
/// Both maps go out with the request; the proxy's fixed context is sent
/// too, with per-call keys taking precedence. After a two-way call that got
/// a response, both hold what the server sent back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallContext {
    pub context: BTreeMap<String, String>,
    pub status: BTreeMap<String, String>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_status(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.status.insert(key.into(), value.into());
        self
    }
}

/// Per-proxy call state: target servant, payload version and request ids.
#[derive(Debug)]
pub struct ClientCore<I> {
    invoker: I,
    servant: String,
    version: ProtocolVersion,
    timeout_ms: i32,
    context: BTreeMap<String, String>,
    next_id: AtomicI32,
}

impl<I: Invoker> ClientCore<I> {
    pub fn new(invoker: I, servant: impl Into<String>) -> Self {
        Self {
            invoker,
            servant: servant.into(),
            version: ProtocolVersion::Tars,
            timeout_ms: 3000,
            context: BTreeMap::new(),
            next_id: AtomicI32::new(1),
        }
    }

    pub fn with_version(mut self, version: ProtocolVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_timeout(mut self, timeout_ms: i32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn servant(&self) -> &str {
        &self.servant
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    fn request(
        &self,
        function: &str,
        packet_type: i8,
        buffer: Vec<u8>,
        ctx: &CallContext,
    ) -> RequestPacket {
        let mut context = self.context.clone();
        context.extend(ctx.context.iter().map(|(k, v)| (k.clone(), v.clone())));
        RequestPacket {
            version: self.version.as_u16() as i16,
            packet_type,
            request_id: self.next_id.fetch_add(1, Ordering::Relaxed),
            servant_name: self.servant.clone(),
            func_name: function.to_string(),
            buffer,
            timeout: self.timeout_ms,
            context,
            status: ctx.status.clone(),
            ..RequestPacket::default()
        }
    }

    /// Two-way call: encode `inputs`, send, then decode the return value and
    /// outputs into `outputs`.
    pub fn call(
        &self,
        function: &str,
        inputs: &[ArgRef<'_>],
        outputs: &mut [ArgSlot<'_>],
    ) -> Result<(), RpcError> {
        self.call_with_context(function, inputs, outputs, &mut CallContext::default())
    }

    /// [`call`](Self::call) carrying `ctx`, which is replaced by the
    /// response's context and status.
    pub fn call_with_context(
        &self,
        function: &str,
        inputs: &[ArgRef<'_>],
        outputs: &mut [ArgSlot<'_>],
        ctx: &mut CallContext,
    ) -> Result<(), RpcError> {
        let codec = codec_for(self.version);
        let request = self.request(function, NORMAL, codec.encode(inputs)?, ctx);
        debug!(servant = %self.servant, function, id = request.request_id, "two-way call");

        let response = self
            .invoker
            .invoke(request)?
            .ok_or_else(|| RpcError::NoResponse(function.to_string()))?;
        ctx.context = response.context;
        ctx.status = response.status;
        if response.ret != result_code::SUCCESS {
            return Err(RpcError::Server {
                code: response.ret,
                message: response.result_desc,
            });
        }
        codec.decode(&response.buffer, outputs)?;
        Ok(())
    }

    /// One-way call: encode and send; nothing comes back.
    pub fn call_one_way(&self, function: &str, inputs: &[ArgRef<'_>]) -> Result<(), RpcError> {
        self.call_one_way_with_context(function, inputs, &CallContext::default())
    }

    pub fn call_one_way_with_context(
        &self,
        function: &str,
        inputs: &[ArgRef<'_>],
        ctx: &CallContext,
    ) -> Result<(), RpcError> {
        let codec = codec_for(self.version);
        let request = self.request(function, ONE_WAY, codec.encode(inputs)?, ctx);
        trace!(servant = %self.servant, function, "one-way call");
        self.invoker.invoke(request)?;
        Ok(())
    }
}
