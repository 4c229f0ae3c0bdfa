//! Code generation from the semantic model.
//!
//! Two back ends share the same struct and container rules:
//!
//! - [`TarsCodec`] interprets a [`Schema`](crate::model::Schema) at run time,
//!   encoding and decoding [`Value`](crate::value::Value)s in TARS binary or
//!   JSON form;
//! - [`emit`] writes Rust sources whose generated impls do the same work
//!   statically through [`crate::rpc::TarsField`].

mod dynamic;
pub mod emit;
mod json;

pub use dynamic::{StructCodec, TarsCodec, integer_value};
pub use emit::{EmitOptions, GeneratedFile, emit_compilation};
pub use json::is_object_key;
