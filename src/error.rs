//! Unified error type for the tars-idl library.
//!
//! Each module keeps its own error enum; [`Error`] wraps them all so
//! application code can use a single `?`-friendly type.

use thiserror::Error;

use crate::codec::{DecodeError, EncodeError};
use crate::config::ConfigError;
use crate::model::CompileError;
use crate::rpc::{DispatchError, RpcError};
use crate::selector::SelectorError;

/// Unified error type for all tars-idl operations.
///
/// # Example
///
/// ```ignore
/// use tars_idl::{Result, model::compile_str};
///
/// fn check(source: &str) -> Result<usize> {
///     let compilation = compile_str("demo.tars", source)?;
///     Ok(compilation.schema.structs().count())
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// IDL parsing, resolution or emission failed.
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Server-side dispatch failure.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Client-side call failure.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A [`Result`] type alias using the unified [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns `true` if this is a compile error.
    pub fn is_compile(&self) -> bool {
        matches!(self, Self::Compile(_))
    }

    /// Returns `true` for wire encoding or decoding failures.
    pub fn is_codec(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Encode(_))
    }

    /// Returns `true` for dispatch or call failures.
    pub fn is_rpc(&self) -> bool {
        matches!(self, Self::Dispatch(_) | Self::Rpc(_))
    }

    pub fn is_selector(&self) -> bool {
        matches!(self, Self::Selector(_))
    }

    /// Returns `true` if this is an I/O error.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
