//! Syntax tree produced by the IDL parser.
//!
//! Nothing here is resolved: type names are kept as written, tags may be
//! missing and literals are untyped. The semantic model is built from this.

use crate::types::Primitive;

/// Line/column of a token, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IdlFile {
    pub includes: Vec<Include>,
    pub modules: Vec<ModuleDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Include {
    pub path: String,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDecl {
    pub name: String,
    pub pos: Pos,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Struct(StructDecl),
    Enum(EnumDecl),
    Const(ConstDecl),
    Interface(InterfaceDecl),
}

impl Item {
    pub fn name(&self) -> &str {
        match self {
            Self::Struct(s) => &s.name,
            Self::Enum(e) => &e.name,
            Self::Const(c) => &c.name,
            Self::Interface(i) => &i.name,
        }
    }

    pub fn pos(&self) -> Pos {
        match self {
            Self::Struct(s) => s.pos,
            Self::Enum(e) => e.pos,
            Self::Const(c) => c.pos,
            Self::Interface(i) => i.pos,
        }
    }
}

/// A type as written in source.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Primitive(Primitive),
    Vector(Box<TypeRef>),
    Array(Box<TypeRef>, usize),
    Map(Box<TypeRef>, Box<TypeRef>),
    /// `Name` or `Module::Name`.
    Named(String),
}

/// A literal as written in source.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i128),
    Float(f64),
    Bool(bool),
    Str(String),
    /// An enum member, possibly qualified.
    Ident(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: String,
    pub pos: Pos,
    pub members: Vec<MemberDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberDecl {
    pub tag: Option<i128>,
    pub required: bool,
    pub ty: TypeRef,
    pub name: String,
    pub default: Option<Literal>,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: String,
    pub pos: Pos,
    pub members: Vec<EnumMemberDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMemberDecl {
    pub key: String,
    pub value: Option<EnumValueExpr>,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnumValueExpr {
    Int(i128),
    Ref(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub ty: TypeRef,
    pub name: String,
    pub value: Literal,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub name: String,
    pub pos: Pos,
    pub functions: Vec<FunctionDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    /// `None` for `void`.
    pub ret: Option<TypeRef>,
    pub args: Vec<ArgDecl>,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgDecl {
    pub name: String,
    pub ty: TypeRef,
    pub is_output: bool,
    pub optional: bool,
    pub routekey: bool,
    pub pos: Pos,
}
