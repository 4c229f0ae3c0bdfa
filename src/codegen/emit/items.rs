//! Constants, enums and structs.

use std::collections::BTreeSet;

use super::ModuleScope;
use super::code_writer::CodeWriter;
use crate::model::{CompileError, ConstInfo, EnumInfo, LiteralValue, StructInfo};
use crate::types::{Primitive, VarType};

impl ModuleScope<'_> {
    pub(super) fn emit_const(&self, w: &mut CodeWriter, info: &ConstInfo) {
        let (ty, value) = match (&info.ty, &info.literal) {
            (VarType::Primitive { primitive: Primitive::String }, LiteralValue::Str(s)) => {
                ("&str".to_string(), format!("{s:?}"))
            }
            (ty, literal) => (self.rust_type(ty), self.literal(ty, literal)),
        };
        w.line(format!("pub const {}: {ty} = {value};", info.binding_name));
    }

    pub(super) fn emit_enum(&self, w: &mut CodeWriter, info: &EnumInfo) {
        let name = &info.binding_name;
        let rt = self.rt();
        w.line(format!("/// Enum `{}`; unknown values are kept as is.", info.wire_name));
        w.line(
            "#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, \
             Serialize, Deserialize)]",
        );
        w.line(format!("#[serde(crate = \"{rt}::serde\", transparent)]"));
        w.line(format!("pub struct {name}(pub i32);"));
        w.blank();

        w.open(format!("impl {name} {{"));
        for member in &info.members {
            w.line(format!(
                "pub const {}: Self = Self({});",
                member.binding_name, member.resolved
            ));
        }
        w.blank();
        w.line("/// IDL name of the first member with this value.");
        w.open("pub fn name(self) -> Option<&'static str> {");
        w.open("match self.0 {");
        let mut seen = BTreeSet::new();
        for member in &info.members {
            if seen.insert(member.resolved) {
                w.line(format!("{} => Some({:?}),", member.resolved, member.key));
            }
        }
        w.line("_ => None,");
        w.close("}");
        w.close("}");
        w.close("}");
        w.blank();

        w.open(format!("impl TarsField for {name} {{"));
        w.open("fn write_field(&self, writer: &mut TarsWriter, tag: u8) -> Result<(), EncodeError> {");
        w.line("self.0.write_field(writer, tag)");
        w.close("}");
        w.blank();
        w.open(
            "fn read_field(&mut self, reader: &mut TarsReader<'_>, tag: u8, required: bool) \
             -> Result<(), DecodeError> {",
        );
        w.line("self.0.read_field(reader, tag, required)");
        w.close("}");
        w.close("}");
        w.blank();
        emit_json_field(w, name, true);
    }

    pub(super) fn emit_struct(&self, w: &mut CodeWriter, info: &StructInfo) -> Result<(), CompileError> {
        let qualified = info.qualified_name();
        for member in &info.members {
            self.check_type(&qualified, &member.ty)?;
        }
        let name = &info.binding_name;
        let rt = self.rt();

        let mut derives = vec!["Debug", "Clone", "PartialEq"];
        if !self.schema.struct_contains_float(&qualified) {
            derives.extend(["Eq", "PartialOrd", "Ord", "Hash"]);
        }
        derives.extend(["Serialize", "Deserialize"]);

        w.line(format!("/// Struct `{qualified}`."));
        w.line(format!("#[derive({})]", derives.join(", ")));
        w.line(format!("#[serde(crate = \"{rt}::serde\", default)]"));
        w.open(format!("pub struct {name} {{"));
        for member in &info.members {
            let mut attrs = Vec::new();
            if member.binding_name != member.wire_name {
                attrs.push(format!("rename = {:?}", member.wire_name));
            }
            attrs.push(format!("with = \"{rt}::rpc::json_field\""));
            if self.options.json_omit_empty {
                attrs.push(format!("skip_serializing_if = \"{rt}::rpc::is_default\""));
            }
            w.line(format!("#[serde({})]", attrs.join(", ")));
            w.line(format!(
                "pub {}: {},",
                member.binding_name,
                self.rust_type(&member.ty)
            ));
        }
        w.close("}");
        w.blank();

        w.open(format!("impl Default for {name} {{"));
        w.open("fn default() -> Self {");
        w.open("Self {");
        for member in &info.members {
            let value = member
                .default
                .as_ref()
                .map(|d| self.literal(&member.ty, d))
                .unwrap_or_else(|| "Default::default()".to_string());
            w.line(format!("{}: {value},", member.binding_name));
        }
        w.close("}");
        w.close("}");
        w.close("}");
        w.blank();

        w.open(format!("impl TarsStruct for {name} {{"));
        w.open("fn decode_body(&mut self, reader: &mut TarsReader<'_>) -> Result<(), DecodeError> {");
        w.line("self.reset_to_defaults();");
        for member in &info.members {
            w.line(format!(
                "self.{}.read_field(reader, {}, {})?;",
                member.binding_name, member.tag, member.required
            ));
        }
        w.line("Ok(())");
        w.close("}");
        w.blank();
        w.open("fn encode_body(&self, writer: &mut TarsWriter) -> Result<(), EncodeError> {");
        for member in &info.members {
            w.line(format!(
                "self.{}.write_field(writer, {})?;",
                member.binding_name, member.tag
            ));
        }
        w.line("Ok(())");
        w.close("}");
        w.close("}");
        w.blank();

        w.open(format!("impl TarsField for {name} {{"));
        w.open("fn write_field(&self, writer: &mut TarsWriter, tag: u8) -> Result<(), EncodeError> {");
        w.line("self.encode_tagged(writer, tag)");
        w.close("}");
        w.blank();
        w.open(
            "fn read_field(&mut self, reader: &mut TarsReader<'_>, tag: u8, required: bool) \
             -> Result<(), DecodeError> {",
        );
        w.line("self.decode_tagged(reader, tag, required)");
        w.close("}");
        w.close("}");
        w.blank();
        emit_json_field(w, name, false);
        Ok(())
    }
}

/// JSON goes through the derived serde impls; enums key JSON objects.
fn emit_json_field(w: &mut CodeWriter, name: &str, object_key: bool) {
    w.open(format!("impl JsonField for {name} {{"));
    if object_key {
        w.line("const OBJECT_KEY: bool = true;");
        w.blank();
    }
    w.open("fn to_json(&self) -> Result<Json, JsonError> {");
    w.line("json_field::to_json_serde(self)");
    w.close("}");
    w.blank();
    w.open("fn from_json(json: Json) -> Result<Self, JsonError> {");
    w.line("json_field::from_json_serde(json)");
    w.close("}");
    w.close("}");
}
