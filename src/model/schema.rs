//! All modules reachable from one compilation.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::decl::{ConstInfo, EnumInfo, InterfaceInfo, StructInfo};
use crate::types::{split_qualified, NamedCategory, VarType};

/// Declarations of one IDL module, possibly collected from several files.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModuleInfo {
    pub name: String,
    /// Files that contributed declarations, in load order.
    pub files: Vec<String>,
    /// Modules this module's declarations refer to.
    pub depends_on: BTreeSet<String>,
    pub enums: Vec<EnumInfo>,
    pub consts: Vec<ConstInfo>,
    pub structs: Vec<StructInfo>,
    pub interfaces: Vec<InterfaceInfo>,
}

impl ModuleInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn struct_info(&self, name: &str) -> Option<&StructInfo> {
        self.structs.iter().find(|s| s.wire_name == name)
    }

    pub fn enum_info(&self, name: &str) -> Option<&EnumInfo> {
        self.enums.iter().find(|e| e.wire_name == name)
    }

    pub fn interface(&self, name: &str) -> Option<&InterfaceInfo> {
        self.interfaces.iter().find(|i| i.wire_name == name)
    }

    /// Which kind of type, if any, is declared under `name`.
    pub fn category_of(&self, name: &str) -> Option<NamedCategory> {
        if self.struct_info(name).is_some() {
            Some(NamedCategory::Struct)
        } else if self.enum_info(name).is_some() {
            Some(NamedCategory::Enum)
        } else {
            None
        }
    }

    pub fn declares(&self, name: &str) -> bool {
        self.category_of(name).is_some()
            || self.interface(name).is_some()
            || self.consts.iter().any(|c| c.wire_name == name)
    }
}

/// The resolved semantic model of a compilation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    pub modules: BTreeMap<String, ModuleInfo>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module(&self, name: &str) -> Option<&ModuleInfo> {
        self.modules.get(name)
    }

    /// Look up a struct by qualified name (`Module::Name`).
    pub fn struct_info(&self, qualified: &str) -> Option<&StructInfo> {
        let (module, name) = split_qualified(qualified)?;
        self.modules.get(module)?.struct_info(name)
    }

    pub fn enum_info(&self, qualified: &str) -> Option<&EnumInfo> {
        let (module, name) = split_qualified(qualified)?;
        self.modules.get(module)?.enum_info(name)
    }

    pub fn interface(&self, qualified: &str) -> Option<&InterfaceInfo> {
        let (module, name) = split_qualified(qualified)?;
        self.modules.get(module)?.interface(name)
    }

    pub fn structs(&self) -> impl Iterator<Item = &StructInfo> {
        self.modules.values().flat_map(|m| m.structs.iter())
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &InterfaceInfo> {
        self.modules.values().flat_map(|m| m.interfaces.iter())
    }

    /// Whether a value of `ty` contains a float anywhere, looking through
    /// named structs.
    pub fn type_contains_float(&self, ty: &VarType) -> bool {
        let mut seen = BTreeSet::new();
        self.contains_float_inner(ty, &mut seen)
    }

    fn contains_float_inner(&self, ty: &VarType, seen: &mut BTreeSet<String>) -> bool {
        match ty {
            VarType::Primitive { primitive } => primitive.is_float(),
            VarType::Vector { elem } | VarType::Array { elem, .. } => {
                self.contains_float_inner(elem, seen)
            }
            VarType::Map { key, value } => {
                self.contains_float_inner(key, seen) || self.contains_float_inner(value, seen)
            }
            VarType::Named {
                name,
                category: NamedCategory::Struct,
            } => {
                if !seen.insert(name.clone()) {
                    return false;
                }
                self.struct_info(name).is_some_and(|s| {
                    s.members
                        .iter()
                        .any(|m| self.contains_float_inner(&m.ty, seen))
                })
            }
            VarType::Named { .. } => false,
        }
    }

    /// Whether any member of the struct (transitively) holds a float.
    pub fn struct_contains_float(&self, qualified: &str) -> bool {
        self.type_contains_float(&VarType::named(qualified, NamedCategory::Struct))
    }
}
