//! Rust source emitter.
//!
//! Every IDL module becomes one Rust file, plus a `mod.rs` that declares
//! them all. Modules are emitted dependencies first, each once per run; the
//! memo lives in [`EmitContext`] and is dropped with it.

mod code_writer;
mod interface;
mod items;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::logging::{debug, info};
use crate::model::{Compilation, CompileError, LiteralValue, ModuleInfo, Schema};
use crate::naming::{const_ident, module_ident, type_ident};
use crate::types::{Primitive, VarType, split_qualified};

use code_writer::CodeWriter;

/// The longest fixed array the generated code supports (serde and `Default`
/// stop at 32 elements).
pub const MAX_ARRAY_LEN: usize = 32;

/// Emitter switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmitOptions {
    /// Capitalize module file names and paths (`Demo` instead of `demo`).
    pub module_upper: bool,
    /// Skip serializing members that hold their type's default value.
    pub json_omit_empty: bool,
    /// Emit servant traits and dispatchers, not only client proxies.
    pub add_servant: bool,
    /// Path of the runtime crate in generated `use` items.
    pub runtime_crate: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            module_upper: false,
            json_omit_empty: false,
            add_servant: true,
            runtime_crate: "tars_idl".to_string(),
        }
    }
}

/// One emitted source file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: String,
    pub module: Option<String>,
    pub contents: String,
}

/// Per-run state: which modules are done and what has been produced.
struct EmitContext<'a> {
    schema: &'a Schema,
    options: &'a EmitOptions,
    emitted: BTreeSet<String>,
    files: Vec<GeneratedFile>,
}

/// Emit Rust sources for every module in `compilation`.
pub fn emit_compilation(
    compilation: &Compilation,
    options: &EmitOptions,
) -> Result<Vec<GeneratedFile>, CompileError> {
    let mut ctx = EmitContext {
        schema: &compilation.schema,
        options,
        emitted: BTreeSet::new(),
        files: Vec::new(),
    };
    for file in &compilation.files {
        for module in &file.modules {
            ctx.visit(module)?;
        }
    }
    let index = ctx.index();
    ctx.files.push(index);
    info!(files = ctx.files.len(), root = %compilation.root, "emitted rust sources");
    Ok(ctx.files)
}

impl EmitContext<'_> {
    fn visit(&mut self, name: &str) -> Result<(), CompileError> {
        if !self.emitted.insert(name.to_string()) {
            return Ok(());
        }
        let Some(module) = self.schema.module(name) else {
            return Ok(());
        };
        for dep in &module.depends_on {
            self.visit(dep)?;
        }
        let scope = ModuleScope {
            schema: self.schema,
            module,
            options: self.options,
        };
        let contents = scope.emit()?;
        debug!(module = name, bytes = contents.len(), "emitted module");
        self.files.push(GeneratedFile {
            path: format!("{}.rs", module_ident(name, self.options.module_upper)),
            module: Some(name.to_string()),
            contents,
        });
        Ok(())
    }

    fn index(&self) -> GeneratedFile {
        let mut w = CodeWriter::new();
        w.line("//! Generated by tars2rs. Do not edit.");
        w.blank();
        let mut names: Vec<String> = self
            .files
            .iter()
            .filter_map(|f| f.module.as_deref())
            .map(|m| module_ident(m, self.options.module_upper))
            .collect();
        names.sort();
        for name in names {
            if self.options.module_upper {
                w.line("#[allow(non_snake_case)]");
            }
            w.line(format!("pub mod {name};"));
        }
        GeneratedFile {
            path: "mod.rs".to_string(),
            module: None,
            contents: w.finish(),
        }
    }
}

/// Rendering helpers for one module.
pub(crate) struct ModuleScope<'a> {
    pub(crate) schema: &'a Schema,
    pub(crate) module: &'a ModuleInfo,
    pub(crate) options: &'a EmitOptions,
}

impl ModuleScope<'_> {
    fn emit(&self) -> Result<String, CompileError> {
        let mut w = CodeWriter::new();
        let rt = self.rt();
        let files = self.module.files.join(", ");
        w.line(format!(
            "//! Module `{}`, generated by tars2rs from {files}. Do not edit.",
            self.module.name
        ));
        w.blank();
        w.line("#![allow(unused_imports, dead_code, clippy::all)]");
        w.blank();
        w.line("use std::collections::BTreeMap;");
        w.blank();
        w.line(format!("use {rt}::codec::{{DecodeError, EncodeError, TarsReader, TarsWriter}};"));
        w.line(format!("use {rt}::rpc::json_field::{{self, Json, JsonError, JsonField}};"));
        w.line(format!("use {rt}::rpc::{{TarsField, TarsStruct}};"));
        w.line(format!("use {rt}::serde::{{Deserialize, Serialize}};"));
        if !self.module.interfaces.is_empty() {
            w.line(format!(
                "use {rt}::rpc::{{ArgRef, ArgSlot, CallContext, ClientCore, DispatchError, \
                 DispatchObserver, Invoker, MethodCall, PayloadCodec, RequestPacket, \
                 ResponsePacket, RpcError, ServantContext, ServantDispatch, ServantError, \
                 execute}};"
            ));
        }

        for info in &self.module.consts {
            w.blank();
            self.emit_const(&mut w, info);
        }
        for info in &self.module.enums {
            w.blank();
            self.emit_enum(&mut w, info);
        }
        for info in &self.module.structs {
            w.blank();
            self.emit_struct(&mut w, info)?;
        }
        for info in &self.module.interfaces {
            w.blank();
            self.emit_interface(&mut w, info)?;
        }
        Ok(w.finish())
    }

    pub(crate) fn rt(&self) -> &str {
        &self.options.runtime_crate
    }

    /// Rust path of a named type, relative to this module.
    pub(crate) fn named_path(&self, qualified: &str) -> String {
        let (module, name) = split_qualified(qualified).unwrap_or(("", qualified));
        let ident = self
            .schema
            .struct_info(qualified)
            .map(|s| s.binding_name.clone())
            .or_else(|| self.schema.enum_info(qualified).map(|e| e.binding_name.clone()))
            .unwrap_or_else(|| type_ident(name));
        if module.is_empty() || module == self.module.name {
            ident
        } else {
            format!(
                "super::{}::{ident}",
                module_ident(module, self.options.module_upper)
            )
        }
    }

    pub(crate) fn rust_type(&self, ty: &VarType) -> String {
        match ty {
            VarType::Primitive { primitive } => primitive.rust_name().to_string(),
            VarType::Vector { elem } => format!("Vec<{}>", self.rust_type(elem)),
            VarType::Array { elem, len } => format!("[{}; {len}]", self.rust_type(elem)),
            VarType::Map { key, value } => {
                format!("BTreeMap<{}, {}>", self.rust_type(key), self.rust_type(value))
            }
            VarType::Named { name, .. } => self.named_path(name),
        }
    }

    /// Rust expression for a checked literal of type `ty`.
    pub(crate) fn literal(&self, ty: &VarType, value: &LiteralValue) -> String {
        match value {
            LiteralValue::Bool(b) => b.to_string(),
            LiteralValue::Int(v) => match ty.as_primitive() {
                Some(p) if p.is_float() => format!("{v}.0"),
                _ => v.to_string(),
            },
            LiteralValue::Float(v) => match ty.as_primitive() {
                Some(Primitive::Float) => format!("{:?}", *v as f32),
                _ => format!("{v:?}"),
            },
            LiteralValue::Str(s) => format!("String::from({s:?})"),
            LiteralValue::Enum {
                enum_name, member, ..
            } => format!("{}::{}", self.named_path(enum_name), const_ident(member)),
        }
    }

    /// Reject types the Rust target cannot represent.
    pub(crate) fn check_type(&self, decl: &str, ty: &VarType) -> Result<(), CompileError> {
        match ty {
            VarType::Primitive { .. } | VarType::Named { .. } => Ok(()),
            VarType::Vector { elem } => self.check_type(decl, elem),
            VarType::Array { elem, len } => {
                if *len > MAX_ARRAY_LEN {
                    return Err(CompileError::UnsupportedArrayLength {
                        decl: decl.to_string(),
                        len: *len,
                        max: MAX_ARRAY_LEN,
                    });
                }
                self.check_type(decl, elem)
            }
            VarType::Map { key, value } => {
                self.check_type(decl, key)?;
                self.check_type(decl, value)
            }
        }
    }
}
