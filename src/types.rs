//! Canonical representation of an IDL type, independent of any encoding.

use std::fmt;

use serde::Serialize;

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
    String,
}

impl Primitive {
    /// IDL spelling of the type.
    pub fn idl_name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "byte",
            Self::UInt8 => "unsigned byte",
            Self::Int16 => "short",
            Self::UInt16 => "unsigned short",
            Self::Int32 => "int",
            Self::UInt32 => "unsigned int",
            Self::Int64 => "long",
            Self::UInt64 => "unsigned long",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
        }
    }

    /// Rust spelling of the type.
    pub fn rust_name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "i8",
            Self::UInt8 => "u8",
            Self::Int16 => "i16",
            Self::UInt16 => "u16",
            Self::Int32 => "i32",
            Self::UInt32 => "u32",
            Self::Int64 => "i64",
            Self::UInt64 => "u64",
            Self::Float => "f32",
            Self::Double => "f64",
            Self::String => "String",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::UInt8
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// 8-bit integers, which travel as `SimpleList` inside vectors and arrays.
    pub fn is_byte(self) -> bool {
        matches!(self, Self::Int8 | Self::UInt8)
    }

    /// Inclusive value range of an integer primitive.
    pub fn integer_range(self) -> Option<(i128, i128)> {
        let range = match self {
            Self::Int8 => (i128::from(i8::MIN), i128::from(i8::MAX)),
            Self::UInt8 => (0, i128::from(u8::MAX)),
            Self::Int16 => (i128::from(i16::MIN), i128::from(i16::MAX)),
            Self::UInt16 => (0, i128::from(u16::MAX)),
            Self::Int32 => (i128::from(i32::MIN), i128::from(i32::MAX)),
            Self::UInt32 => (0, i128::from(u32::MAX)),
            Self::Int64 => (i128::from(i64::MIN), i128::from(i64::MAX)),
            Self::UInt64 => (0, i128::from(u64::MAX)),
            _ => return None,
        };
        Some(range)
    }
}

/// What a named reference resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedCategory {
    Enum,
    Struct,
}

/// A fully resolved IDL type.
///
/// `Named` always carries a qualified name (`Module::Name`) that exists in the
/// schema it was resolved against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VarType {
    Primitive {
        primitive: Primitive,
    },
    Vector {
        elem: Box<VarType>,
    },
    Array {
        elem: Box<VarType>,
        len: usize,
    },
    Map {
        key: Box<VarType>,
        value: Box<VarType>,
    },
    Named {
        name: String,
        category: NamedCategory,
    },
}

impl VarType {
    pub fn primitive(primitive: Primitive) -> Self {
        Self::Primitive { primitive }
    }

    pub fn vector(elem: VarType) -> Self {
        Self::Vector {
            elem: Box::new(elem),
        }
    }

    pub fn array(elem: VarType, len: usize) -> Self {
        Self::Array {
            elem: Box::new(elem),
            len,
        }
    }

    pub fn map(key: VarType, value: VarType) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn named(name: impl Into<String>, category: NamedCategory) -> Self {
        Self::Named {
            name: name.into(),
            category,
        }
    }

    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            Self::Primitive { primitive } => Some(*primitive),
            _ => None,
        }
    }

    /// `true` for 8-bit integers.
    pub fn is_byte(&self) -> bool {
        self.as_primitive().is_some_and(Primitive::is_byte)
    }

    pub fn is_struct(&self) -> bool {
        matches!(
            self,
            Self::Named {
                category: NamedCategory::Struct,
                ..
            }
        )
    }

    pub fn is_enum(&self) -> bool {
        matches!(
            self,
            Self::Named {
                category: NamedCategory::Enum,
                ..
            }
        )
    }

    /// Whether a float appears anywhere in the type, not counting named
    /// structs (callers that care look those up in the schema).
    pub fn contains_float(&self) -> bool {
        match self {
            Self::Primitive { primitive } => primitive.is_float(),
            Self::Vector { elem } | Self::Array { elem, .. } => elem.contains_float(),
            Self::Map { key, value } => key.contains_float() || value.contains_float(),
            Self::Named { .. } => false,
        }
    }

    /// Visit every named reference in the type.
    pub fn for_each_named(&self, f: &mut impl FnMut(&str, NamedCategory)) {
        match self {
            Self::Primitive { .. } => {}
            Self::Vector { elem } | Self::Array { elem, .. } => elem.for_each_named(f),
            Self::Map { key, value } => {
                key.for_each_named(f);
                value.for_each_named(f);
            }
            Self::Named { name, category } => f(name, *category),
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive { primitive } => f.write_str(primitive.idl_name()),
            Self::Vector { elem } => write!(f, "vector<{elem}>"),
            Self::Array { elem, len } => write!(f, "{elem}[{len}]"),
            Self::Map { key, value } => write!(f, "map<{key}, {value}>"),
            Self::Named { name, .. } => f.write_str(name),
        }
    }
}

/// Split `Module::Name` into its parts.
pub fn split_qualified(name: &str) -> Option<(&str, &str)> {
    name.rsplit_once("::")
}

pub fn qualify(module: &str, name: &str) -> String {
    format!("{module}::{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_nested() {
        let ty = VarType::map(
            VarType::primitive(Primitive::String),
            VarType::vector(VarType::named("Demo::Point", NamedCategory::Struct)),
        );
        assert_eq!(ty.to_string(), "map<string, vector<Demo::Point>>");
        assert_eq!(
            VarType::array(VarType::primitive(Primitive::UInt8), 4).to_string(),
            "unsigned byte[4]"
        );
    }

    #[test]
    fn test_float_detection() {
        let ty = VarType::vector(VarType::primitive(Primitive::Double));
        assert!(ty.contains_float());
        assert!(!VarType::primitive(Primitive::Int64).contains_float());
    }

    #[test]
    fn test_qualified_names() {
        assert_eq!(split_qualified("A::B"), Some(("A", "B")));
        assert_eq!(split_qualified("B"), None);
        assert_eq!(qualify("A", "B"), "A::B");
    }
}
