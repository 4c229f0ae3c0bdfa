//! Semantic model: resolved structs, enums, constants and interfaces.
//!
//! The model is built once per compilation run by [`Compiler`] and is
//! immutable afterwards. Generated code never refers back to it; the
//! schema-driven codec in [`crate::codegen`] borrows it for the duration of a
//! call.

mod compiler;
pub mod decl;
mod error;
pub mod literal;
mod resolve;
pub mod schema;

pub use compiler::{Compilation, Compiler, FileUnit};
pub use decl::{
    ArgInfo, ConstInfo, EnumInfo, EnumMember, EnumValue, FunInfo, InterfaceInfo, LiteralValue,
    StructInfo, StructMember,
};
pub use error::CompileError;
pub use schema::{ModuleInfo, Schema};

use crate::idl::MemorySource;

/// Compile a single in-memory IDL source named `name`.
pub fn compile_str(name: &str, source: &str) -> Result<Compilation, CompileError> {
    Compiler::new(MemorySource::new().with_file(name, source)).compile(name)
}
