//! Convenient re-exports for common usage patterns.
//!
//! # Example
//!
//! ```ignore
//! use tars_idl::prelude::*;
//!
//! let compilation = compile_str("demo.tars", source)?;
//! let files = emit_compilation(&compilation, &EmitOptions::default())?;
//! ```

// Unified error handling
pub use crate::error::{Error, Result};

// Wire protocol
pub use crate::codec::{
    DecodeError, EncodeError, ProtocolVersion, TarsReader, TarsWriter, UniAttribute,
};

// Compiler and code generation
pub use crate::codegen::{EmitOptions, GeneratedFile, StructCodec, TarsCodec, emit_compilation};
pub use crate::idl::{FsSource, MemorySource, SourceLoader};
pub use crate::model::{Compilation, CompileError, Compiler, Schema, compile_str};
pub use crate::value::{StructValue, Value};

// RPC runtime
pub use crate::rpc::{
    CallArgs, CallReply, ClientCore, DispatchError, DynamicProxy, Invoker, LocalInvoker,
    MethodCall, RequestPacket, ResponsePacket, RpcError, ServantDispatch, ServantError,
    ServantRegistry, ServiceDispatcher, TarsField, TarsStruct,
};

// Routing
pub use crate::selector::{
    ConsistentHash, Endpoint, ModHash, Random, RoundRobin, RouteKey, Selector, SelectorError,
};
