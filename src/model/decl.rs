//! Resolved declarations.
//!
//! Every declaration carries two names: `binding_name` is the identifier used
//! in generated Rust code, `wire_name` is the IDL spelling that appears in
//! JSON keys, TUP attribute names and RPC function names.

use serde::Serialize;

use crate::types::{qualify, VarType};

/// A checked literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum LiteralValue {
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    /// A member of a named enum, with its resolved value.
    Enum {
        enum_name: String,
        member: String,
        value: i32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructMember {
    pub binding_name: String,
    pub wire_name: String,
    pub tag: u8,
    #[serde(rename = "type")]
    pub ty: VarType,
    pub required: bool,
    pub default: Option<LiteralValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructInfo {
    pub binding_name: String,
    pub wire_name: String,
    pub module: String,
    /// Sorted by ascending tag.
    pub members: Vec<StructMember>,
}

impl StructInfo {
    pub fn qualified_name(&self) -> String {
        qualify(&self.module, &self.wire_name)
    }

    pub fn member_by_tag(&self, tag: u8) -> Option<&StructMember> {
        self.members.iter().find(|m| m.tag == tag)
    }

    pub fn member_by_wire_name(&self, name: &str) -> Option<&StructMember> {
        self.members.iter().find(|m| m.wire_name == name)
    }
}

/// How an enum member's value was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum EnumValue {
    Explicit(i32),
    Reference(String),
    Auto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumMember {
    pub key: String,
    pub binding_name: String,
    pub value: EnumValue,
    pub resolved: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumInfo {
    pub binding_name: String,
    pub wire_name: String,
    pub module: String,
    pub members: Vec<EnumMember>,
}

impl EnumInfo {
    pub fn qualified_name(&self) -> String {
        qualify(&self.module, &self.wire_name)
    }

    pub fn member(&self, key: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.key == key)
    }

    /// First member with the given value, used when printing.
    pub fn member_for_value(&self, value: i32) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.resolved == value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstInfo {
    pub binding_name: String,
    pub wire_name: String,
    #[serde(rename = "type")]
    pub ty: VarType,
    pub literal: LiteralValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgInfo {
    pub binding_name: String,
    pub wire_name: String,
    /// `1..N` in declaration order, outputs included.
    pub tag: u8,
    #[serde(rename = "type")]
    pub ty: VarType,
    pub is_output: bool,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunInfo {
    pub binding_name: String,
    pub wire_name: String,
    pub args: Vec<ArgInfo>,
    pub return_type: Option<VarType>,
}

impl FunInfo {
    /// The return value always travels at tag 0.
    pub const RETURN_TAG: u8 = 0;

    pub fn inputs(&self) -> impl Iterator<Item = &ArgInfo> {
        self.args.iter().filter(|a| !a.is_output)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &ArgInfo> {
        self.args.iter().filter(|a| a.is_output)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceInfo {
    pub binding_name: String,
    pub wire_name: String,
    pub module: String,
    pub functions: Vec<FunInfo>,
}

impl InterfaceInfo {
    pub fn qualified_name(&self) -> String {
        qualify(&self.module, &self.wire_name)
    }

    pub fn function(&self, wire_name: &str) -> Option<&FunInfo> {
        self.functions.iter().find(|f| f.wire_name == wire_name)
    }
}
