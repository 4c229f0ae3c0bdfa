//! IDL front-end: tokenizer, parser and source loading.
//!
//! The output is an unresolved [`ast::IdlFile`]; name resolution, tag
//! assignment and literal checking happen in [`crate::model`].

pub mod ast;
mod lexer;
mod parser;
pub mod source;

use std::fmt;

pub use ast::{IdlFile, Pos};
pub use parser::parse_idl;
pub use source::{FsSource, MemorySource, SourceLoader};

/// A syntax error with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub pos: Pos,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.pos.line, self.pos.col, self.message)
    }
}

impl std::error::Error for ParseError {}
