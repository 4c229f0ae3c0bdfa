//! Turning one parsed file into resolved declarations.

use std::collections::{BTreeSet, HashMap, HashSet};

use super::decl::{
    ArgInfo, ConstInfo, EnumInfo, EnumMember, EnumValue, FunInfo, InterfaceInfo, StructInfo,
    StructMember,
};
use super::literal::check_literal;
use super::schema::{ModuleInfo, Schema};
use super::CompileError;
use crate::idl::ast::{
    ConstDecl, EnumDecl, EnumValueExpr, IdlFile, InterfaceDecl, Item, StructDecl, TypeRef,
};
use crate::logging::trace;
use crate::naming::{const_ident, field_ident, type_ident};
use crate::types::{qualify, split_qualified, NamedCategory, VarType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclKind {
    Struct,
    Enum,
    Const,
    Interface,
}

/// Resolve `file` against everything already in `schema`.
///
/// `visible` lists the modules reachable through the file's includes. The
/// result is a new schema with the file's declarations merged in; `schema`
/// itself is left untouched so a failing file contributes nothing.
pub(crate) fn resolve_file(
    schema: &Schema,
    visible: &BTreeSet<String>,
    file_key: &str,
    file: &IdlFile,
) -> Result<Schema, CompileError> {
    let mut resolver = FileResolver {
        staged: schema.clone(),
        visible: visible.clone(),
        pending: HashMap::new(),
    };
    for module in &file.modules {
        resolver.visible.insert(module.name.clone());
    }

    resolver.declare(file)?;
    for module in &file.modules {
        let entry = resolver
            .staged
            .modules
            .entry(module.name.clone())
            .or_insert_with(|| ModuleInfo::new(&module.name));
        if !entry.files.iter().any(|f| f == file_key) {
            entry.files.push(file_key.to_string());
        }
    }

    // Enums first: constants and defaults refer to their members.
    for module in &file.modules {
        for item in &module.items {
            if let Item::Enum(decl) = item {
                let info = resolve_enum(&module.name, decl)?;
                resolver.module_mut(&module.name).enums.push(info);
            }
        }
    }
    for module in &file.modules {
        for item in &module.items {
            let name = &module.name;
            match item {
                Item::Const(decl) => {
                    let info = resolver.resolve_const(name, decl)?;
                    resolver.module_mut(name).consts.push(info);
                }
                Item::Struct(decl) => {
                    let info = resolver.resolve_struct(name, decl)?;
                    resolver.module_mut(name).structs.push(info);
                }
                Item::Interface(decl) => {
                    let info = resolver.resolve_interface(name, decl)?;
                    resolver.module_mut(name).interfaces.push(info);
                }
                Item::Enum(_) => {}
            }
        }
    }

    let touched: BTreeSet<&str> = file.modules.iter().map(|m| m.name.as_str()).collect();
    for module in &touched {
        resolver.check_module(module)?;
    }
    Ok(resolver.staged)
}

struct FileResolver {
    staged: Schema,
    visible: BTreeSet<String>,
    /// Declarations of the file being resolved, by qualified name.
    pending: HashMap<String, DeclKind>,
}

impl FileResolver {
    fn module_mut(&mut self, name: &str) -> &mut ModuleInfo {
        self.staged
            .modules
            .entry(name.to_string())
            .or_insert_with(|| ModuleInfo::new(name))
    }

    /// Register every name the file declares, rejecting duplicates.
    fn declare(&mut self, file: &IdlFile) -> Result<(), CompileError> {
        for module in &file.modules {
            let existing = self.staged.module(&module.name);
            for item in &module.items {
                let name = item.name();
                let qualified = qualify(&module.name, name);
                let clash_existing = existing.is_some_and(|m| m.declares(name));
                if clash_existing || self.pending.contains_key(&qualified) {
                    return Err(CompileError::DuplicateDeclaration {
                        scope: format!("module {}", module.name),
                        name: name.to_string(),
                    });
                }
                let kind = match item {
                    Item::Struct(_) => DeclKind::Struct,
                    Item::Enum(_) => DeclKind::Enum,
                    Item::Const(_) => DeclKind::Const,
                    Item::Interface(_) => DeclKind::Interface,
                };
                self.pending.insert(qualified, kind);
            }
        }
        Ok(())
    }

    fn category_of(&self, qualified: &str) -> Option<NamedCategory> {
        match self.pending.get(qualified) {
            Some(DeclKind::Struct) => return Some(NamedCategory::Struct),
            Some(DeclKind::Enum) => return Some(NamedCategory::Enum),
            Some(_) => return None,
            None => {}
        }
        let (module, name) = split_qualified(qualified)?;
        if !self.visible.contains(module) {
            return None;
        }
        self.staged.module(module)?.category_of(name)
    }

    fn resolve_name(&self, module: &str, name: &str) -> Option<(String, NamedCategory)> {
        let qualified = if name.contains("::") {
            name.to_string()
        } else {
            qualify(module, name)
        };
        let category = self.category_of(&qualified)?;
        Some((qualified, category))
    }

    fn resolve_type(&self, module: &str, decl: &str, ty: &TypeRef) -> Result<VarType, CompileError> {
        Ok(match ty {
            TypeRef::Primitive(p) => VarType::primitive(*p),
            TypeRef::Vector(elem) => VarType::vector(self.resolve_type(module, decl, elem)?),
            TypeRef::Array(elem, len) => {
                VarType::array(self.resolve_type(module, decl, elem)?, *len)
            }
            TypeRef::Map(key, value) => VarType::map(
                self.resolve_type(module, decl, key)?,
                self.resolve_type(module, decl, value)?,
            ),
            TypeRef::Named(name) => {
                let (qualified, category) =
                    self.resolve_name(module, name)
                        .ok_or_else(|| CompileError::UnresolvedType {
                            decl: decl.to_string(),
                            name: name.clone(),
                        })?;
                VarType::named(qualified, category)
            }
        })
    }

    fn resolve_const(&self, module: &str, decl: &ConstDecl) -> Result<ConstInfo, CompileError> {
        let name = qualify(module, &decl.name);
        let ty = self.resolve_type(module, &name, &decl.ty)?;
        let literal = check_literal(&ty, &decl.value, |q| self.staged.enum_info(q))
            .map_err(|reason| CompileError::InvalidConst { decl: name, reason })?;
        Ok(ConstInfo {
            binding_name: const_ident(&decl.name),
            wire_name: decl.name.clone(),
            ty,
            literal,
        })
    }

    fn resolve_struct(&self, module: &str, decl: &StructDecl) -> Result<StructInfo, CompileError> {
        let name = qualify(module, &decl.name);
        let all_untagged = decl.members.iter().all(|m| m.tag.is_none());

        let mut seen_names = HashSet::new();
        let mut seen_tags = HashSet::new();
        let mut members = Vec::with_capacity(decl.members.len());
        for (index, member) in decl.members.iter().enumerate() {
            if !seen_names.insert(member.name.as_str()) {
                return Err(CompileError::DuplicateDeclaration {
                    scope: format!("struct {name}"),
                    name: member.name.clone(),
                });
            }
            let raw_tag = match member.tag {
                Some(tag) => tag,
                None if all_untagged => index as i128,
                None => {
                    return Err(CompileError::OmittedTag {
                        decl: name,
                        member: member.name.clone(),
                    });
                }
            };
            let tag = u8::try_from(raw_tag).map_err(|_| CompileError::InvalidTag {
                decl: name.clone(),
                member: member.name.clone(),
                tag: raw_tag,
            })?;
            if !seen_tags.insert(tag) {
                return Err(CompileError::DuplicateTag { decl: name, tag });
            }

            let ty = self.resolve_type(module, &name, &member.ty)?;
            let default = match &member.default {
                Some(literal) => Some(check_literal(&ty, literal, |q| self.staged.enum_info(q)).map_err(
                    |reason| CompileError::InvalidDefault {
                        decl: name.clone(),
                        member: member.name.clone(),
                        reason,
                    },
                )?),
                None => None,
            };
            members.push(StructMember {
                binding_name: field_ident(&member.name),
                wire_name: member.name.clone(),
                tag,
                ty,
                required: member.required,
                default,
            });
        }
        members.sort_by_key(|m| m.tag);
        trace!(decl = %name, members = members.len(), "resolved struct");

        Ok(StructInfo {
            binding_name: type_ident(&decl.name),
            wire_name: decl.name.clone(),
            module: module.to_string(),
            members,
        })
    }

    fn resolve_interface(
        &self,
        module: &str,
        decl: &InterfaceDecl,
    ) -> Result<InterfaceInfo, CompileError> {
        let iface_name = qualify(module, &decl.name);
        let mut seen = HashSet::new();
        let mut functions = Vec::with_capacity(decl.functions.len());
        for fun in &decl.functions {
            if !seen.insert(fun.name.as_str()) {
                return Err(CompileError::DuplicateDeclaration {
                    scope: format!("interface {iface_name}"),
                    name: fun.name.clone(),
                });
            }
            let fun_name = format!("{iface_name}::{}", fun.name);
            let return_type = match &fun.ret {
                Some(ty) => Some(self.resolve_type(module, &fun_name, ty)?),
                None => None,
            };

            let mut arg_names = HashSet::new();
            let mut args = Vec::with_capacity(fun.args.len());
            for (index, arg) in fun.args.iter().enumerate() {
                if !arg_names.insert(arg.name.as_str()) {
                    return Err(CompileError::DuplicateDeclaration {
                        scope: format!("function {fun_name}"),
                        name: arg.name.clone(),
                    });
                }
                let raw_tag = index as i128 + 1;
                let tag = u8::try_from(raw_tag).map_err(|_| CompileError::InvalidTag {
                    decl: fun_name.clone(),
                    member: arg.name.clone(),
                    tag: raw_tag,
                })?;
                args.push(ArgInfo {
                    binding_name: field_ident(&arg.name),
                    wire_name: arg.name.clone(),
                    tag,
                    ty: self.resolve_type(module, &fun_name, &arg.ty)?,
                    is_output: arg.is_output,
                    required: !arg.optional,
                });
            }
            functions.push(FunInfo {
                binding_name: field_ident(&fun.name),
                wire_name: fun.name.clone(),
                args,
                return_type,
            });
        }
        Ok(InterfaceInfo {
            binding_name: type_ident(&decl.name),
            wire_name: decl.name.clone(),
            module: module.to_string(),
            functions,
        })
    }

    /// Checks that need the whole module resolved: map keys, struct cycles
    /// and the module dependency list.
    fn check_module(&mut self, module: &str) -> Result<(), CompileError> {
        let Some(info) = self.staged.module(module) else {
            return Ok(());
        };

        let mut typed: Vec<(String, &VarType)> = Vec::new();
        for s in &info.structs {
            for m in &s.members {
                typed.push((s.qualified_name(), &m.ty));
            }
        }
        for i in &info.interfaces {
            for f in &i.functions {
                let decl = format!("{}::{}", i.qualified_name(), f.wire_name);
                if let Some(ret) = &f.return_type {
                    typed.push((decl.clone(), ret));
                }
                for a in &f.args {
                    typed.push((decl.clone(), &a.ty));
                }
            }
        }

        let mut depends_on = BTreeSet::new();
        for (decl, ty) in &typed {
            check_map_keys(&self.staged, decl, ty)?;
            ty.for_each_named(&mut |name, _| {
                if let Some((m, _)) = split_qualified(name) {
                    if m != module {
                        depends_on.insert(m.to_string());
                    }
                }
            });
        }

        for s in &info.structs {
            if struct_reaches(&self.staged, &s.qualified_name(), &s.qualified_name()) {
                return Err(CompileError::RecursiveStruct {
                    decl: s.qualified_name(),
                });
            }
        }

        self.module_mut(module).depends_on.extend(depends_on);
        Ok(())
    }
}

fn resolve_enum(module: &str, decl: &EnumDecl) -> Result<EnumInfo, CompileError> {
    let name = qualify(module, &decl.name);
    let mut members: Vec<EnumMember> = Vec::with_capacity(decl.members.len());
    let mut next: i128 = 0;
    for member in &decl.members {
        if members.iter().any(|m| m.key == member.key) {
            return Err(CompileError::DuplicateDeclaration {
                scope: format!("enum {name}"),
                name: member.key.clone(),
            });
        }
        let fit = |value: i128| {
            i32::try_from(value).map_err(|_| CompileError::InvalidEnumValue {
                decl: name.clone(),
                member: member.key.clone(),
                value,
            })
        };
        let (value, resolved) = match &member.value {
            None => (EnumValue::Auto, fit(next)?),
            Some(EnumValueExpr::Int(v)) => {
                let v = fit(*v)?;
                (EnumValue::Explicit(v), v)
            }
            Some(EnumValueExpr::Ref(reference)) => {
                let key = match split_qualified(reference) {
                    Some((qualifier, key))
                        if qualifier == decl.name || qualifier == name =>
                    {
                        key
                    }
                    _ => reference.as_str(),
                };
                let target = members.iter().find(|m| m.key == key).ok_or_else(|| {
                    CompileError::EnumForwardReference {
                        decl: name.clone(),
                        member: member.key.clone(),
                        reference: reference.clone(),
                    }
                })?;
                (EnumValue::Reference(key.to_string()), target.resolved)
            }
        };
        next = i128::from(resolved) + 1;
        members.push(EnumMember {
            key: member.key.clone(),
            binding_name: const_ident(&member.key),
            value,
            resolved,
        });
    }
    Ok(EnumInfo {
        binding_name: type_ident(&decl.name),
        wire_name: decl.name.clone(),
        module: module.to_string(),
        members,
    })
}

fn check_map_keys(schema: &Schema, decl: &str, ty: &VarType) -> Result<(), CompileError> {
    match ty {
        VarType::Primitive { .. } | VarType::Named { .. } => Ok(()),
        VarType::Vector { elem } | VarType::Array { elem, .. } => check_map_keys(schema, decl, elem),
        VarType::Map { key, value } => {
            if schema.type_contains_float(key) {
                return Err(CompileError::UnsupportedMapKey {
                    decl: decl.to_string(),
                    ty: key.to_string(),
                });
            }
            check_map_keys(schema, decl, key)?;
            check_map_keys(schema, decl, value)
        }
    }
}

/// Whether `from` holds `target` inline, through members or fixed arrays.
fn struct_reaches(schema: &Schema, from: &str, target: &str) -> bool {
    let mut stack = vec![from.to_string()];
    let mut visited = BTreeSet::new();
    while let Some(current) = stack.pop() {
        let Some(info) = schema.struct_info(&current) else {
            continue;
        };
        for member in &info.members {
            if let Some(inner) = inline_struct(&member.ty) {
                if inner == target {
                    return true;
                }
                if visited.insert(inner.to_string()) {
                    stack.push(inner.to_string());
                }
            }
        }
    }
    false
}

fn inline_struct(ty: &VarType) -> Option<&str> {
    match ty {
        VarType::Named {
            name,
            category: NamedCategory::Struct,
        } => Some(name),
        VarType::Array { elem, .. } => inline_struct(elem),
        _ => None,
    }
}
