//! TARS IDL compiler and runtime.
//!
//! This library compiles TARS interface definitions into a semantic model,
//! encodes and decodes the tag-based TARS binary protocol, generates Rust
//! sources for structs, enums, constants and interfaces, and runs RPC
//! dispatch over the TARS, TUP and JSON payload versions.
//!
//! # Quick Start
//!
//! ```ignore
//! use tars_idl::prelude::*;
//!
//! let compilation = compile_str("demo.tars", r#"
//!     module Demo {
//!         struct User { 0 require string name; 1 optional int age = 18; };
//!     };
//! "#)?;
//!
//! let codec = TarsCodec::new(&compilation.schema);
//! let user_codec = codec.struct_codec("Demo::User").ok_or("no such struct")?;
//! let mut user = user_codec.reset_to_defaults();
//! user.set("name", "ann");
//! let bytes = user_codec.to_bytes(&user)?;
//! assert_eq!(user_codec.from_bytes(&bytes)?, user);
//! ```
//!
//! # Modules
//!
//! - [`codec`] - Wire protocol engine: heads, writer, reader, TUP attributes
//! - [`idl`] - Tokenizer, parser and include loading
//! - [`model`] - Resolved declarations and the compiler driver
//! - [`codegen`] - Schema-driven codec and the Rust source emitter
//! - [`rpc`] - Typed runtime, payload codecs, dispatch and client calls
//! - [`selector`] - Endpoint selection for clients
//! - [`config`] - TOML configuration for the `tars2rs` compiler
//!
//! # Feature Flags
//!
//! - `logging` - Enable library-level tracing (consumers provide their own subscriber)
//! - `cli` - Enable the `tars2rs` command-line compiler
//! - `full` - Enable all features

pub mod codec;
pub mod codegen;
pub mod config;
pub mod idl;
mod logging;
pub mod model;
pub mod naming;
pub mod prelude;
pub mod rpc;
pub mod selector;
pub mod types;
pub mod value;

mod error;

// Re-export the unified error type
pub use error::{Error, Result};

// Generated code reaches serde through the runtime crate.
pub use serde;

pub use codec::{DecodeError, EncodeError, ProtocolVersion, TarsReader, TarsWriter, UniAttribute};
pub use codegen::{EmitOptions, GeneratedFile, TarsCodec, emit_compilation};
pub use config::{CompilerConfig, ConfigError};
pub use model::{Compilation, CompileError, Compiler, Schema, compile_str};
pub use rpc::{
    ClientCore, DispatchError, RequestPacket, ResponsePacket, RpcError, ServantDispatch,
    ServantError, ServantRegistry, TarsField, TarsStruct,
};
pub use selector::{Endpoint, RouteKey, Selector, SelectorError};
pub use value::{StructValue, Value};
