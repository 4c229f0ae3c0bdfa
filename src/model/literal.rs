//! Checking literals against their declared type.

use super::decl::{EnumInfo, LiteralValue};
use crate::idl::ast::Literal;
use crate::types::{split_qualified, Primitive, VarType};

/// Check `literal` against `ty`, producing a typed value.
///
/// `enum_lookup` finds a resolved enum by qualified name; enum members may be
/// written bare (`RED`), enum-qualified (`Color::RED`) or fully qualified
/// (`Demo::Color::RED`).
pub fn check_literal<'s>(
    ty: &VarType,
    literal: &Literal,
    enum_lookup: impl Fn(&str) -> Option<&'s EnumInfo>,
) -> Result<LiteralValue, String> {
    match ty {
        VarType::Primitive { primitive } => check_primitive(*primitive, literal),
        VarType::Named { name, category } if ty.is_enum() => {
            let info = enum_lookup(name).ok_or_else(|| format!("unknown enum '{name}'"))?;
            match literal {
                Literal::Ident(path) => {
                    let key = enum_member_key(path, info)
                        .ok_or_else(|| format!("'{path}' is not a member of {name}"))?;
                    let member = info
                        .member(key)
                        .ok_or_else(|| format!("'{path}' is not a member of {name}"))?;
                    Ok(LiteralValue::Enum {
                        enum_name: name.clone(),
                        member: member.key.clone(),
                        value: member.resolved,
                    })
                }
                Literal::Int(v) => {
                    let value =
                        i32::try_from(*v).map_err(|_| format!("{v} does not fit enum {name}"))?;
                    let member = info
                        .member_for_value(value)
                        .ok_or_else(|| format!("{v} is not a value of {name}"))?;
                    Ok(LiteralValue::Enum {
                        enum_name: name.clone(),
                        member: member.key.clone(),
                        value,
                    })
                }
                other => Err(format!("expected a member of {name} ({category:?}), found {other:?}")),
            }
        }
        other => Err(format!("type {other} cannot have a literal value")),
    }
}

/// The member key named by `path`, if the path's qualifier matches the enum.
fn enum_member_key<'a>(path: &'a str, info: &EnumInfo) -> Option<&'a str> {
    match split_qualified(path) {
        None => Some(path),
        Some((qualifier, key)) => {
            let matches = qualifier == info.wire_name || qualifier == info.qualified_name();
            matches.then_some(key)
        }
    }
}

fn check_primitive(primitive: Primitive, literal: &Literal) -> Result<LiteralValue, String> {
    match (primitive, literal) {
        (Primitive::Bool, Literal::Bool(b)) => Ok(LiteralValue::Bool(*b)),
        (Primitive::Bool, Literal::Int(v @ (0 | 1))) => Ok(LiteralValue::Bool(*v == 1)),
        (Primitive::String, Literal::Str(s)) => Ok(LiteralValue::Str(s.clone())),
        (p, Literal::Int(v)) if p.is_integer() => {
            let (min, max) = p
                .integer_range()
                .ok_or_else(|| format!("{} has no integer range", p.idl_name()))?;
            if (min..=max).contains(v) {
                Ok(LiteralValue::Int(*v))
            } else {
                Err(format!("{v} is out of range for {}", p.idl_name()))
            }
        }
        (p, Literal::Int(v)) if p.is_float() => Ok(LiteralValue::Float(*v as f64)),
        (p, Literal::Float(v)) if p.is_float() => Ok(LiteralValue::Float(*v)),
        (p, other) => Err(format!("{other:?} is not a valid {}", p.idl_name())),
    }
}
