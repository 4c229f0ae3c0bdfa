//! Schema-driven services: dispatch and call interfaces straight from a
//! compiled [`Schema`] without generated code.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::client::{CallContext, ClientCore, Invoker};
use super::dispatch::{DispatchObserver, MethodCall, ServantContext, ServantDispatch, execute};
use super::error::{DispatchError, RpcError, ServantError};
use super::packet::{RequestPacket, ResponsePacket};
use super::payload::{ArgRef, ArgSlot, DecodeArg, DynArg, DynSlot, PayloadCodec};
use crate::codec::{DecodeError, EncodeError};
use crate::codegen::TarsCodec;
use crate::model::{ArgInfo, FunInfo, InterfaceInfo, Schema};
use crate::value::Value;

/// Arguments of one call, keyed by wire name in declaration order.
///
/// Handlers read inputs and overwrite outputs in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub args: Vec<(String, Value)>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.args.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Set an argument, appending it if it does not exist yet.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.args.iter_mut().find(|(k, _)| k == name) {
            Some((_, slot)) => *slot = value,
            None => self.args.push((name.to_string(), value)),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }
}

/// Result of a schema-driven two-way call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallReply {
    pub ret: Option<Value>,
    pub outputs: CallArgs,
}

/// Handler for one function. Returns the return value, if the function has
/// one.
pub type Handler = Box<
    dyn Fn(&mut ServantContext, &mut CallArgs) -> Result<Option<Value>, ServantError> + Send + Sync,
>;

fn interface_of<'s>(schema: &'s Schema, name: &str) -> Result<&'s InterfaceInfo, DispatchError> {
    schema
        .interface(name)
        .ok_or_else(|| DispatchError::UnknownInterface(name.to_string()))
}

/// Every argument of `fun` at its default, inputs and outputs alike.
fn default_args(codec: TarsCodec<'_>, fun: &FunInfo) -> CallArgs {
    CallArgs {
        args: fun
            .args
            .iter()
            .map(|a| (a.wire_name.clone(), codec.default_value(&a.ty)))
            .collect(),
    }
}

/// Dispatches one interface to registered closures.
pub struct ServiceDispatcher {
    schema: Arc<Schema>,
    interface: String,
    handlers: BTreeMap<String, Handler>,
}

impl ServiceDispatcher {
    /// `interface` is a qualified name (`Module::Name`).
    pub fn new(schema: Arc<Schema>, interface: &str) -> Result<Self, DispatchError> {
        interface_of(&schema, interface)?;
        Ok(Self {
            schema,
            interface: interface.to_string(),
            handlers: BTreeMap::new(),
        })
    }

    /// Register the handler for the function with wire name `function`.
    pub fn register<F>(&mut self, function: &str, handler: F) -> Result<(), DispatchError>
    where
        F: Fn(&mut CallArgs) -> Result<Option<Value>, ServantError> + Send + Sync + 'static,
    {
        self.register_with_context(function, move |_ctx, args| handler(args))
    }

    /// Like [`register`](Self::register), for handlers that read the request
    /// context or set the response context.
    pub fn register_with_context<F>(&mut self, function: &str, handler: F) -> Result<(), DispatchError>
    where
        F: Fn(&mut ServantContext, &mut CallArgs) -> Result<Option<Value>, ServantError>
            + Send
            + Sync
            + 'static,
    {
        let info = interface_of(&self.schema, &self.interface)?;
        if info.function(function).is_none() {
            return Err(DispatchError::NoSuchFunction {
                servant: self.interface.clone(),
                function: function.to_string(),
            });
        }
        self.handlers.insert(function.to_string(), Box::new(handler));
        Ok(())
    }

    pub fn with<F>(mut self, function: &str, handler: F) -> Result<Self, DispatchError>
    where
        F: Fn(&mut CallArgs) -> Result<Option<Value>, ServantError> + Send + Sync + 'static,
    {
        self.register(function, handler)?;
        Ok(self)
    }
}

impl fmt::Debug for ServiceDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDispatcher")
            .field("interface", &self.interface)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

struct DynCall<'a> {
    codec: TarsCodec<'a>,
    fun: &'a FunInfo,
    handler: &'a Handler,
    args: CallArgs,
    ret: Option<Value>,
}

impl MethodCall for DynCall<'_> {
    fn decode_inputs(
        &mut self,
        codec: &dyn PayloadCodec,
        payload: &[u8],
    ) -> Result<(), DecodeError> {
        let mut slots: Vec<DynSlot<'_>> = Vec::new();
        let mut meta = Vec::new();
        for (arg, (_, value)) in self.fun.args.iter().zip(self.args.args.iter_mut()) {
            if arg.is_output {
                continue;
            }
            meta.push(arg);
            slots.push(DynSlot {
                codec: self.codec,
                ty: &arg.ty,
                value,
            });
        }
        let mut arg_slots: Vec<ArgSlot<'_>> = meta
            .iter()
            .zip(slots.iter_mut())
            .map(|(arg, slot)| {
                ArgSlot::new(&arg.wire_name, arg.tag, arg.required, slot as &mut dyn DecodeArg)
            })
            .collect();
        codec.decode(payload, &mut arg_slots)
    }

    fn invoke(&mut self, ctx: &mut ServantContext) -> Result<(), ServantError> {
        let ret = (self.handler)(ctx, &mut self.args)?;
        self.ret = self
            .fun
            .return_type
            .as_ref()
            .map(|ty| ret.unwrap_or_else(|| self.codec.default_value(ty)));
        Ok(())
    }

    fn encode_outputs(&self, codec: &dyn PayloadCodec) -> Result<Vec<u8>, EncodeError> {
        let mut values = Vec::new();
        if let (Some(ty), Some(ret)) = (&self.fun.return_type, &self.ret) {
            values.push((None, DynArg { codec: self.codec, ty, value: ret }));
        }
        for (arg, (_, value)) in self.fun.args.iter().zip(&self.args.args) {
            if arg.is_output {
                values.push((Some(arg), DynArg { codec: self.codec, ty: &arg.ty, value }));
            }
        }
        let refs: Vec<ArgRef<'_>> = values
            .iter()
            .map(|(arg, value)| match arg {
                Some(arg) => ArgRef::new(&arg.wire_name, arg.tag, value),
                None => ArgRef::ret(value),
            })
            .collect();
        codec.encode(&refs)
    }
}

impl ServantDispatch for ServiceDispatcher {
    fn functions(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    fn dispatch_with(
        &self,
        request: &RequestPacket,
        observer: &dyn DispatchObserver,
    ) -> Result<Option<ResponsePacket>, DispatchError> {
        let info = interface_of(&self.schema, &self.interface)?;
        let no_such_function = || DispatchError::NoSuchFunction {
            servant: request.servant_name.clone(),
            function: request.func_name.clone(),
        };
        let fun = info.function(&request.func_name).ok_or_else(no_such_function)?;
        let handler = self.handlers.get(&request.func_name).ok_or_else(no_such_function)?;

        let codec = TarsCodec::new(&self.schema);
        let mut call = DynCall {
            codec,
            fun,
            handler,
            args: default_args(codec, fun),
            ret: None,
        };
        execute(request, &mut call, observer)
    }
}

/// Calls an interface described by a schema.
#[derive(Debug)]
pub struct DynamicProxy<I> {
    core: ClientCore<I>,
    schema: Arc<Schema>,
    interface: String,
}

impl<I: Invoker> DynamicProxy<I> {
    pub fn new(core: ClientCore<I>, schema: Arc<Schema>, interface: &str) -> Result<Self, RpcError> {
        if schema.interface(interface).is_none() {
            return Err(RpcError::UnknownFunction(interface.to_string()));
        }
        Ok(Self {
            core,
            schema,
            interface: interface.to_string(),
        })
    }

    pub fn core(&self) -> &ClientCore<I> {
        &self.core
    }

    fn function(&self, name: &str) -> Result<&FunInfo, RpcError> {
        self.schema
            .interface(&self.interface)
            .and_then(|i| i.function(name))
            .ok_or_else(|| RpcError::UnknownFunction(format!("{}.{name}", self.interface)))
    }

    /// Inputs missing from `inputs` are sent as their defaults.
    fn input_values(&self, fun: &FunInfo, inputs: &CallArgs) -> Vec<Value> {
        let codec = TarsCodec::new(&self.schema);
        fun.inputs()
            .map(|a| {
                inputs
                    .get(&a.wire_name)
                    .cloned()
                    .unwrap_or_else(|| codec.default_value(&a.ty))
            })
            .collect()
    }

    fn encode_with<R>(
        &self,
        fun: &FunInfo,
        inputs: &CallArgs,
        send: impl FnOnce(&[ArgRef<'_>]) -> Result<R, RpcError>,
    ) -> Result<R, RpcError> {
        let codec = TarsCodec::new(&self.schema);
        let values = self.input_values(fun, inputs);
        let args: Vec<DynArg<'_>> = fun
            .inputs()
            .zip(&values)
            .map(|(a, value)| DynArg { codec, ty: &a.ty, value })
            .collect();
        let refs: Vec<ArgRef<'_>> = fun
            .inputs()
            .zip(&args)
            .map(|(a, arg)| ArgRef::new(&a.wire_name, a.tag, arg))
            .collect();
        send(&refs)
    }

    pub fn call(&self, function: &str, inputs: &CallArgs) -> Result<CallReply, RpcError> {
        self.call_with_context(function, inputs, &mut CallContext::default())
    }

    /// [`call`](Self::call) carrying `ctx`, which is replaced by the
    /// response's context and status.
    pub fn call_with_context(
        &self,
        function: &str,
        inputs: &CallArgs,
        ctx: &mut CallContext,
    ) -> Result<CallReply, RpcError> {
        let fun = self.function(function)?;
        let codec = TarsCodec::new(&self.schema);
        let mut ret = fun.return_type.as_ref().map(|ty| codec.default_value(ty));
        let mut outputs: Vec<(&ArgInfo, Value)> = fun
            .outputs()
            .map(|a| (a, codec.default_value(&a.ty)))
            .collect();

        self.encode_with(fun, inputs, |refs| {
            let mut slots: Vec<DynSlot<'_>> = Vec::new();
            let mut meta = Vec::new();
            if let (Some(ty), Some(value)) = (&fun.return_type, ret.as_mut()) {
                meta.push(None);
                slots.push(DynSlot { codec, ty, value });
            }
            for (arg, value) in outputs.iter_mut() {
                let arg: &ArgInfo = arg;
                meta.push(Some(arg));
                slots.push(DynSlot { codec, ty: &arg.ty, value });
            }
            let mut arg_slots: Vec<ArgSlot<'_>> = meta
                .iter()
                .zip(slots.iter_mut())
                .map(|(arg, slot)| {
                    let slot = slot as &mut dyn DecodeArg;
                    match arg {
                        Some(arg) => ArgSlot::new(&arg.wire_name, arg.tag, arg.required, slot),
                        None => ArgSlot::ret(slot),
                    }
                })
                .collect();
            self.core.call_with_context(function, refs, &mut arg_slots, ctx)
        })?;

        Ok(CallReply {
            ret,
            outputs: CallArgs {
                args: outputs
                    .into_iter()
                    .map(|(a, v)| (a.wire_name.clone(), v))
                    .collect(),
            },
        })
    }

    pub fn call_one_way(&self, function: &str, inputs: &CallArgs) -> Result<(), RpcError> {
        self.call_one_way_with_context(function, inputs, &CallContext::default())
    }

    pub fn call_one_way_with_context(
        &self,
        function: &str,
        inputs: &CallArgs,
        ctx: &CallContext,
    ) -> Result<(), RpcError> {
        let fun = self.function(function)?;
        self.encode_with(fun, inputs, |refs| {
            self.core.call_one_way_with_context(function, refs, ctx)
        })
    }
}
