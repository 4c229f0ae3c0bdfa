//! Resolution tests: names, tags, enum values, includes and rejected input.

mod common;

use tars_idl::idl::MemorySource;
use tars_idl::model::{CompileError, Compiler, LiteralValue, compile_str};
use tars_idl::types::{NamedCategory, Primitive, VarType};

fn compile_err(source: &str) -> CompileError {
    compile_str("bad.tars", source).unwrap_err()
}

#[test]
fn test_enum_values_follow_references() {
    let compilation = common::demo();
    let level = compilation.schema.enum_info("Demo::Level").unwrap();
    let values: Vec<(&str, i32)> = level
        .members
        .iter()
        .map(|m| (m.key.as_str(), m.resolved))
        .collect();
    assert_eq!(values, vec![("LOW", 0), ("MID", 1), ("HIGH", 1)]);
    assert_eq!(level.member_for_value(1).unwrap().key, "MID");
}

#[test]
fn test_struct_members_and_defaults() {
    let compilation = common::demo();
    let team = compilation.schema.struct_info("Demo::Team").unwrap();
    let tags: Vec<u8> = team.members.iter().map(|m| m.tag).collect();
    assert_eq!(tags, vec![0, 1, 2, 3, 4, 5]);

    let members = team.member_by_wire_name("members").unwrap();
    assert_eq!(
        members.ty,
        VarType::vector(VarType::named("Demo::User", NamedCategory::Struct))
    );
    assert!(!members.required);
    assert_eq!(
        team.member_by_tag(3).unwrap().ty,
        VarType::vector(VarType::primitive(Primitive::Int8))
    );

    let user = compilation.schema.struct_info("Demo::User").unwrap();
    let age = user.member_by_wire_name("age").unwrap();
    assert_eq!(age.default, Some(LiteralValue::Int(18)));
    assert_eq!(age.ty, VarType::primitive(Primitive::Int32));
    assert!(user.member_by_wire_name("name").unwrap().required);

    assert!(compilation.schema.struct_contains_float("Demo::Team"));
    assert!(!compilation.schema.struct_contains_float("Demo::User"));
}

#[test]
fn test_interface_argument_tags() {
    let compilation = common::demo();
    let greeter = compilation.schema.interface("Demo::Greeter").unwrap();
    let add = greeter.function("add").unwrap();
    let args: Vec<(&str, u8, bool)> = add
        .args
        .iter()
        .map(|a| (a.wire_name.as_str(), a.tag, a.is_output))
        .collect();
    assert_eq!(args, vec![("a", 1, false), ("b", 2, false), ("text", 3, true)]);
    assert_eq!(add.inputs().count(), 2);
    assert_eq!(add.return_type, Some(VarType::primitive(Primitive::Int32)));
    assert_eq!(greeter.function("notify").unwrap().return_type, None);
}

#[test]
fn test_names_keep_wire_spelling() {
    let compilation = compile_str(
        "names.tars",
        "module App { struct Login { 0 require string userName; 1 optional string type; }; };",
    )
    .unwrap();
    let login = compilation.schema.struct_info("App::Login").unwrap();
    let names: Vec<(&str, &str)> = login
        .members
        .iter()
        .map(|m| (m.binding_name.as_str(), m.wire_name.as_str()))
        .collect();
    assert_eq!(names, vec![("user_name", "userName"), ("type_", "type")]);
}

#[test]
fn test_untagged_members_are_numbered() {
    let compilation =
        compile_str("u.tars", "module M { struct S { require int a; optional string b; }; };")
            .unwrap();
    let s = compilation.schema.struct_info("M::S").unwrap();
    assert_eq!(s.member_by_wire_name("b").unwrap().tag, 1);
}

#[test]
fn test_tag_errors() {
    assert!(matches!(
        compile_err("module M { struct S { 0 require int a; 0 optional int b; }; };"),
        CompileError::DuplicateTag { tag: 0, .. }
    ));
    assert!(matches!(
        compile_err("module M { struct S { 0 require int a; optional int b; }; };"),
        CompileError::OmittedTag { .. }
    ));
    assert!(matches!(
        compile_err("module M { struct S { 300 require int a; }; };"),
        CompileError::InvalidTag { tag: 300, .. }
    ));
}

#[test]
fn test_rejected_declarations() {
    assert!(matches!(
        compile_err("module M { struct S { 0 require Missing a; }; };"),
        CompileError::UnresolvedType { .. }
    ));
    assert!(matches!(
        compile_err("module M { struct S { 0 require int a; }; struct S { 0 require int b; }; };"),
        CompileError::DuplicateDeclaration { .. }
    ));
    assert!(matches!(
        compile_err("module M { enum E { A = B, B }; };"),
        CompileError::EnumForwardReference { .. }
    ));
    assert!(matches!(
        compile_err("module M { struct S { 0 optional byte b = 300; }; };"),
        CompileError::InvalidDefault { .. }
    ));
    assert!(matches!(
        compile_err("module M { struct S { 0 optional map<float, int> m; }; };"),
        CompileError::UnsupportedMapKey { .. }
    ));
    assert_eq!(
        compile_err("module M { struct Node { 0 optional Node next; }; };"),
        CompileError::RecursiveStruct {
            decl: "M::Node".into()
        }
    );
}

#[test]
fn test_parse_error_has_position() {
    match compile_err("module M {\n  struct S { 0 maybe int a; };\n};") {
        CompileError::Parse { file, line, .. } => {
            assert_eq!(file, "bad.tars");
            assert_eq!(line, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_includes_and_module_merging() {
    let source = MemorySource::new()
        .with_file(
            "base.tars",
            "module Base { enum Kind { A, B }; struct Tag { 0 require string v; }; };",
        )
        .with_file(
            "extra.tars",
            "#include \"base.tars\"\nmodule Base { struct Pair { 0 require Tag a; 1 require Tag b; }; };",
        )
        .with_file(
            "app.tars",
            "#include \"base.tars\"\n#include \"extra.tars\"\n\
             module App { struct Item { 0 require Base::Pair p; 1 optional Base::Kind k = Base::Kind::B; }; };",
        );
    let compilation = Compiler::new(source).compile("app.tars").unwrap();

    // base.tars is loaded once even though two files include it
    let keys: Vec<&str> = compilation.files.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(keys, vec!["base.tars", "extra.tars", "app.tars"]);

    let base = compilation.schema.module("Base").unwrap();
    assert_eq!(base.structs.len(), 2);
    assert_eq!(base.files, vec!["base.tars", "extra.tars"]);

    let app = compilation.schema.module("App").unwrap();
    assert!(app.depends_on.contains("Base"));
    let item = compilation.schema.struct_info("App::Item").unwrap();
    assert!(matches!(
        item.member_by_wire_name("k").unwrap().default,
        Some(LiteralValue::Enum { value: 1, .. })
    ));
    assert_eq!(compilation.root_modules(), ["App".to_string()]);
}

#[test]
fn test_include_failures() {
    let missing = MemorySource::new().with_file("a.tars", "#include \"nope.tars\"\n");
    assert!(matches!(
        Compiler::new(missing).compile("a.tars"),
        Err(CompileError::IncludeNotFound { .. })
    ));

    let cycle = MemorySource::new()
        .with_file("a.tars", "#include \"b.tars\"\nmodule A { };")
        .with_file("b.tars", "#include \"a.tars\"\nmodule B { };");
    let err = Compiler::new(cycle).compile("a.tars").unwrap_err();
    assert!(err.is_source_error());
    assert_eq!(
        err,
        CompileError::IncludeCycle {
            chain: vec!["a.tars".into(), "b.tars".into(), "a.tars".into()]
        }
    );
}

#[test]
fn test_constants() {
    let compilation = common::demo();
    let demo = compilation.schema.module("Demo").unwrap();
    let literals: Vec<(&str, &LiteralValue)> = demo
        .consts
        .iter()
        .map(|c| (c.wire_name.as_str(), &c.literal))
        .collect();
    assert_eq!(
        literals,
        vec![
            ("MAX_AGE", &LiteralValue::Int(150)),
            ("GREETING", &LiteralValue::Str("hello".into()))
        ]
    );
    assert!(matches!(
        compile_err("module M { const int BIG = 99999999999; };"),
        CompileError::InvalidConst { .. }
    ));
}
