//! Compile-time errors.

use thiserror::Error;

/// A failure that aborts compilation. Nothing is generated for the unit that
/// produced it.
///
/// `decl` fields name the offending declaration as `Module::Name` (or
/// `Module::Interface::function`).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("{file}:{line}:{col}: {message}")]
    Parse {
        file: String,
        line: u32,
        col: u32,
        message: String,
    },

    #[error("Failed to read '{file}': {message}")]
    Io { file: String, message: String },

    #[error("Include '{path}' not found (included from '{from}')")]
    IncludeNotFound { path: String, from: String },

    #[error("Include cycle: {}", chain.join(" -> "))]
    IncludeCycle { chain: Vec<String> },

    #[error("Duplicate declaration '{name}' in {scope}")]
    DuplicateDeclaration { scope: String, name: String },

    #[error("{decl}: unresolved type '{name}'")]
    UnresolvedType { decl: String, name: String },

    #[error("{decl}: tag {tag} is used more than once")]
    DuplicateTag { decl: String, tag: u8 },

    #[error("{decl}: member '{member}' has no tag while others do")]
    OmittedTag { decl: String, member: String },

    #[error("{decl}: tag {tag} of '{member}' is outside 0..=255")]
    InvalidTag {
        decl: String,
        member: String,
        tag: i128,
    },

    #[error("{decl}: member '{member}' refers to '{reference}', which is not declared before it")]
    EnumForwardReference {
        decl: String,
        member: String,
        reference: String,
    },

    #[error("{decl}: value {value} of '{member}' does not fit in a 32-bit integer")]
    InvalidEnumValue {
        decl: String,
        member: String,
        value: i128,
    },

    #[error("{decl}: invalid default for '{member}': {reason}")]
    InvalidDefault {
        decl: String,
        member: String,
        reason: String,
    },

    #[error("{decl}: invalid constant: {reason}")]
    InvalidConst { decl: String, reason: String },

    #[error("{decl}: map key type '{ty}' contains a float and cannot be ordered")]
    UnsupportedMapKey { decl: String, ty: String },

    #[error("{decl}: struct contains itself without indirection")]
    RecursiveStruct { decl: String },

    #[error("{decl}: fixed array length {len} is above the Rust target limit of {max}")]
    UnsupportedArrayLength { decl: String, len: usize, max: usize },
}

impl CompileError {
    /// Returns `true` for errors about reading or locating source files.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::IncludeNotFound { .. } | Self::IncludeCycle { .. }
        )
    }
}
