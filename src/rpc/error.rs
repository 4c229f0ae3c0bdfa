//! Error types for RPC dispatch and client calls.

use thiserror::Error;

use super::packet::result_code;
use crate::codec::{DecodeError, EncodeError};

/// An error returned by a servant handler.
///
/// The code travels back to the caller in the response packet; the payload
/// of a failed call is always empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("servant error {code}: {message}")]
pub struct ServantError {
    pub code: i32,
    pub message: String,
}

impl ServantError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// A failure without a service-specific code.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(result_code::UNKNOWN, message)
    }
}

/// Errors that stop a request before a response can be produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("No such function: {servant}.{function}")]
    NoSuchFunction { servant: String, function: String },

    #[error("No such servant: {0}")]
    NoSuchServant(String),

    #[error("Unknown interface: {0}")]
    UnknownInterface(String),
}

impl DispatchError {
    /// The result code reported to the caller for this error.
    pub fn result_code(&self) -> i32 {
        match self {
            Self::Decode(_) => result_code::SERVER_DECODE_ERR,
            Self::Encode(_) => result_code::SERVER_ENCODE_ERR,
            Self::NoSuchFunction { .. } => result_code::NO_FUNC,
            Self::NoSuchServant(_) => result_code::NO_SERVANT,
            Self::UnknownInterface(_) => result_code::UNKNOWN,
        }
    }
}

/// Errors seen by a client proxy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RpcError {
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Server returned {code}: {message}")]
    Server { code: i32, message: String },

    #[error("No response for two-way call to {0}")]
    NoResponse(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),
}

impl RpcError {
    /// Returns `true` if the server reported a failure code.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Server { .. })
    }

    /// The server result code, if any.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Server { code, .. } => Some(*code),
            _ => None,
        }
    }
}
