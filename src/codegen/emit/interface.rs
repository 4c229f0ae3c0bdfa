//! Servant traits, client proxies and dispatchers.

use super::ModuleScope;
use super::code_writer::CodeWriter;
use crate::model::{ArgInfo, CompileError, FunInfo, InterfaceInfo};
use crate::naming::type_ident;

/// Local name of the return value in generated bodies.
const RET: &str = "tars_ret";

/// Name of the context parameter in generated signatures.
const CTX: &str = "tars_ctx";

impl ModuleScope<'_> {
    pub(super) fn emit_interface(
        &self,
        w: &mut CodeWriter,
        info: &InterfaceInfo,
    ) -> Result<(), CompileError> {
        let qualified = info.qualified_name();
        for fun in &info.functions {
            for arg in &fun.args {
                self.check_type(&qualified, &arg.ty)?;
            }
            if let Some(ty) = &fun.return_type {
                self.check_type(&qualified, ty)?;
            }
        }

        if self.options.add_servant {
            self.emit_servant_trait(w, info);
            w.blank();
        }
        self.emit_proxy(w, info);
        if self.options.add_servant {
            w.blank();
            self.emit_dispatcher(w, info);
        }
        Ok(())
    }

    fn ret_type(&self, fun: &FunInfo) -> String {
        fun.return_type
            .as_ref()
            .map(|ty| self.rust_type(ty))
            .unwrap_or_else(|| "()".to_string())
    }

    fn servant_params(&self, fun: &FunInfo) -> Vec<String> {
        fun.args
            .iter()
            .map(|arg| {
                let ty = self.rust_type(&arg.ty);
                if arg.is_output {
                    format!("{}: &mut {ty}", arg.binding_name)
                } else {
                    format!("{}: {ty}", arg.binding_name)
                }
            })
            .collect()
    }

    /// The plain servant trait, its context-aware twin and the blanket impl
    /// that lifts one into the other.
    fn emit_servant_trait(&self, w: &mut CodeWriter, info: &InterfaceInfo) {
        let servant = &info.binding_name;
        let with_context = format!("{servant}WithContext");
        w.line(format!(
            "/// Server side of `{}`. Inputs are passed by value, outputs by reference.",
            info.qualified_name()
        ));
        w.open(format!("pub trait {servant}: Send + Sync {{"));
        for fun in &info.functions {
            let params = [vec!["&self".to_string()], self.servant_params(fun)].concat();
            w.line(format!(
                "fn {}({}) -> Result<{}, ServantError>;",
                fun.binding_name,
                params.join(", "),
                self.ret_type(fun)
            ));
        }
        w.close("}");
        w.blank();

        w.line(format!(
            "/// [`{servant}`] with the request context. Every [`{servant}`] implements it."
        ));
        w.open(format!("pub trait {with_context}: Send + Sync {{"));
        for fun in &info.functions {
            let params = [
                vec!["&self".to_string(), format!("{CTX}: &mut ServantContext")],
                self.servant_params(fun),
            ]
            .concat();
            w.line(format!(
                "fn {}({}) -> Result<{}, ServantError>;",
                fun.binding_name,
                params.join(", "),
                self.ret_type(fun)
            ));
        }
        w.close("}");
        w.blank();

        w.open(format!("impl<T: {servant}> {with_context} for T {{"));
        for (i, fun) in info.functions.iter().enumerate() {
            if i > 0 {
                w.blank();
            }
            let params = [
                vec!["&self".to_string(), format!("_{CTX}: &mut ServantContext")],
                self.servant_params(fun),
            ]
            .concat();
            w.open(format!(
                "fn {}({}) -> Result<{}, ServantError> {{",
                fun.binding_name,
                params.join(", "),
                self.ret_type(fun)
            ));
            let args: Vec<&str> = std::iter::once("self")
                .chain(fun.args.iter().map(|a| a.binding_name.as_str()))
                .collect();
            w.line(format!(
                "{servant}::{}({})",
                fun.binding_name,
                args.join(", ")
            ));
            w.close("}");
        }
        w.close("}");
    }

    fn emit_proxy(&self, w: &mut CodeWriter, info: &InterfaceInfo) {
        let proxy = format!("{}Proxy", info.binding_name);
        w.line(format!("/// Client proxy for `{}`.", info.qualified_name()));
        w.line("#[derive(Debug)]");
        w.open(format!("pub struct {proxy}<I> {{"));
        w.line("core: ClientCore<I>,");
        w.close("}");
        w.blank();

        w.open(format!("impl<I: Invoker> {proxy}<I> {{"));
        w.open("pub fn new(core: ClientCore<I>) -> Self {");
        w.line("Self { core }");
        w.close("}");
        w.blank();
        w.open("pub fn core(&self) -> &ClientCore<I> {");
        w.line("&self.core");
        w.close("}");

        for fun in &info.functions {
            w.blank();
            self.emit_proxy_two_way(w, fun);
            w.blank();
            self.emit_proxy_one_way(w, fun);
        }
        w.close("}");
    }

    fn input_refs(&self, fun: &FunInfo) -> String {
        let refs: Vec<String> = fun
            .inputs()
            .map(|a| format!("ArgRef::new({:?}, {}, {})", a.wire_name, a.tag, a.binding_name))
            .collect();
        format!("&[{}]", refs.join(", "))
    }

    fn proxy_params(&self, fun: &FunInfo) -> Vec<String> {
        let mut params = vec!["&self".to_string()];
        for arg in &fun.args {
            let ty = self.rust_type(&arg.ty);
            if arg.is_output {
                params.push(format!("{}: &mut {ty}", arg.binding_name));
            } else {
                params.push(format!("{}: &{ty}", arg.binding_name));
            }
        }
        params
    }

    fn emit_proxy_two_way(&self, w: &mut CodeWriter, fun: &FunInfo) {
        let name = &fun.binding_name;
        let ret = self.ret_type(fun);
        let params = self.proxy_params(fun);
        let args: Vec<&str> = fun.args.iter().map(|a| a.binding_name.as_str()).collect();

        w.open(format!(
            "pub fn {name}({}) -> Result<{ret}, RpcError> {{",
            params.join(", ")
        ));
        w.line(format!(
            "self.{name}_with_context({}&mut CallContext::default())",
            args.iter().map(|a| format!("{a}, ")).collect::<String>()
        ));
        w.close("}");
        w.blank();

        w.open(format!(
            "pub fn {name}_with_context({}, {CTX}: &mut CallContext) -> Result<{ret}, RpcError> {{",
            params.join(", ")
        ));
        let mut slots = Vec::new();
        if let Some(ty) = &fun.return_type {
            w.line(format!("let mut {RET}: {} = Default::default();", self.rust_type(ty)));
            slots.push(format!("ArgSlot::ret(&mut {RET})"));
        }
        for arg in fun.outputs() {
            slots.push(output_slot(arg, ""));
        }
        w.line("self.core.call_with_context(");
        w.line(format!("    {:?},", fun.wire_name));
        w.line(format!("    {},", self.input_refs(fun)));
        w.line(format!("    &mut [{}],", slots.join(", ")));
        w.line(format!("    {CTX},"));
        w.line(")?;");
        if fun.return_type.is_some() {
            w.line(format!("Ok({RET})"));
        } else {
            w.line("Ok(())");
        }
        w.close("}");
    }

    fn emit_proxy_one_way(&self, w: &mut CodeWriter, fun: &FunInfo) {
        let name = &fun.binding_name;
        let mut params = vec!["&self".to_string()];
        for arg in fun.inputs() {
            params.push(format!("{}: &{}", arg.binding_name, self.rust_type(&arg.ty)));
        }
        let args: String = fun
            .inputs()
            .map(|a| format!("{}, ", a.binding_name))
            .collect();

        w.open(format!(
            "pub fn {name}_one_way({}) -> Result<(), RpcError> {{",
            params.join(", ")
        ));
        w.line(format!(
            "self.{name}_one_way_with_context({args}&CallContext::default())"
        ));
        w.close("}");
        w.blank();

        w.open(format!(
            "pub fn {name}_one_way_with_context({}, {CTX}: &CallContext) -> Result<(), RpcError> {{",
            params.join(", ")
        ));
        w.line(format!(
            "self.core.call_one_way_with_context({:?}, {}, {CTX})",
            fun.wire_name,
            self.input_refs(fun)
        ));
        w.close("}");
    }

    fn emit_dispatcher(&self, w: &mut CodeWriter, info: &InterfaceInfo) {
        let servant = format!("{}WithContext", info.binding_name);
        let dispatcher = format!("{}Dispatcher", info.binding_name);

        for fun in &info.functions {
            self.emit_method_call(w, info, fun);
            w.blank();
        }

        w.line(format!(
            "/// Routes requests for `{}` to a [`{}`] implementation.",
            info.qualified_name(),
            info.binding_name
        ));
        w.line("#[derive(Debug)]");
        w.open(format!("pub struct {dispatcher}<S> {{"));
        w.line("servant: S,");
        w.close("}");
        w.blank();
        w.open(format!("impl<S: {servant}> {dispatcher}<S> {{"));
        w.open("pub fn new(servant: S) -> Self {");
        w.line("Self { servant }");
        w.close("}");
        w.blank();
        w.open("pub fn servant(&self) -> &S {");
        w.line("&self.servant");
        w.close("}");
        w.close("}");
        w.blank();

        w.open(format!("impl<S: {servant}> ServantDispatch for {dispatcher}<S> {{"));
        w.open("fn functions(&self) -> Vec<String> {");
        let mut names: Vec<String> = info
            .functions
            .iter()
            .map(|f| format!("{:?}.to_string()", f.wire_name))
            .collect();
        names.sort();
        w.line(format!("vec![{}]", names.join(", ")));
        w.close("}");
        w.blank();
        w.open(
            "fn dispatch_with(&self, request: &RequestPacket, observer: &dyn DispatchObserver) \
             -> Result<Option<ResponsePacket>, DispatchError> {",
        );
        w.open("match request.func_name.as_str() {");
        for fun in &info.functions {
            w.open(format!("{:?} => {{", fun.wire_name));
            w.line(format!(
                "let mut call = {}::new(&self.servant);",
                call_struct(info, fun)
            ));
            w.line("execute(request, &mut call, observer)");
            w.close("}");
        }
        w.open("_ => Err(DispatchError::NoSuchFunction {");
        w.line("servant: request.servant_name.clone(),");
        w.line("function: request.func_name.clone(),");
        w.close("}),");
        w.close("}");
        w.close("}");
        w.close("}");
    }

    /// The per-call state struct: inputs, outputs and return value, owned
    /// for the duration of one request.
    fn emit_method_call(&self, w: &mut CodeWriter, info: &InterfaceInfo, fun: &FunInfo) {
        let servant = format!("{}WithContext", info.binding_name);
        let name = call_struct(info, fun);

        w.open(format!("struct {name}<'a, S> {{"));
        w.line("servant: &'a S,");
        for arg in &fun.args {
            w.line(format!("{}: {},", arg_field(arg), self.rust_type(&arg.ty)));
        }
        if fun.return_type.is_some() {
            w.line(format!("{RET}: {},", self.ret_type(fun)));
        }
        w.close("}");
        w.blank();

        w.open(format!("impl<'a, S: {servant}> {name}<'a, S> {{"));
        w.open("fn new(servant: &'a S) -> Self {");
        w.open("Self {");
        w.line("servant,");
        for arg in &fun.args {
            w.line(format!("{}: Default::default(),", arg_field(arg)));
        }
        if fun.return_type.is_some() {
            w.line(format!("{RET}: Default::default(),"));
        }
        w.close("}");
        w.close("}");
        w.close("}");
        w.blank();

        w.open(format!("impl<S: {servant}> MethodCall for {name}<'_, S> {{"));
        w.open(
            "fn decode_inputs(&mut self, codec: &dyn PayloadCodec, payload: &[u8]) \
             -> Result<(), DecodeError> {",
        );
        let slots: Vec<String> = fun.inputs().map(|a| output_slot(a, "self.")).collect();
        w.line(format!("codec.decode(payload, &mut [{}])", slots.join(", ")));
        w.close("}");
        w.blank();

        w.open(format!(
            "fn invoke(&mut self, {CTX}: &mut ServantContext) -> Result<(), ServantError> {{"
        ));
        let args: Vec<String> = std::iter::once(CTX.to_string())
            .chain(fun.args.iter().map(|a| {
                if a.is_output {
                    format!("&mut self.{}", arg_field(a))
                } else {
                    format!("std::mem::take(&mut self.{})", arg_field(a))
                }
            }))
            .collect();
        let invoke = format!(
            "{servant}::{}(self.servant, {})?",
            fun.binding_name,
            args.join(", ")
        );
        if fun.return_type.is_some() {
            w.line(format!("self.{RET} = {invoke};"));
        } else {
            w.line(format!("{invoke};"));
        }
        w.line("Ok(())");
        w.close("}");
        w.blank();

        w.open("fn encode_outputs(&self, codec: &dyn PayloadCodec) -> Result<Vec<u8>, EncodeError> {");
        let mut refs = Vec::new();
        if fun.return_type.is_some() {
            refs.push(format!("ArgRef::ret(&self.{RET})"));
        }
        for arg in fun.outputs() {
            refs.push(format!(
                "ArgRef::new({:?}, {}, &self.{})",
                arg.wire_name,
                arg.tag,
                arg_field(arg)
            ));
        }
        w.line(format!("codec.encode(&[{}])", refs.join(", ")));
        w.close("}");
        w.close("}");
    }
}

fn call_struct(info: &InterfaceInfo, fun: &FunInfo) -> String {
    format!("{}{}Call", info.binding_name, type_ident(&fun.wire_name))
}

fn arg_field(arg: &ArgInfo) -> String {
    format!("arg_{}", arg.binding_name.trim_end_matches('_'))
}

fn output_slot(arg: &ArgInfo, prefix: &str) -> String {
    let target = if prefix.is_empty() {
        arg.binding_name.clone()
    } else {
        format!("&mut {prefix}{}", arg_field(arg))
    };
    format!(
        "ArgSlot::new({:?}, {}, {}, {target})",
        arg.wire_name, arg.tag, arg.required
    )
}

#[cfg(test)]
mod tests {
    use super::super::{EmitOptions, emit_compilation};
    use crate::model::compile_str;

    const IDL: &str = r#"
module Demo {
    interface Hello {
        int sayHello(string name, out string greeting);
        void notify(long id);
    };
};
"#;

    fn demo_source(options: &EmitOptions) -> String {
        let compilation = compile_str("demo.tars", IDL).unwrap();
        emit_compilation(&compilation, options)
            .unwrap()
            .into_iter()
            .find(|f| f.path == "demo.rs")
            .map(|f| f.contents)
            .unwrap()
    }

    #[test]
    fn test_servant_trait() {
        let src = demo_source(&EmitOptions::default());
        assert!(src.contains("pub trait Hello: Send + Sync {"));
        assert!(src.contains(
            "fn say_hello(&self, name: String, greeting: &mut String) -> Result<i32, ServantError>;"
        ));
        assert!(src.contains("fn notify(&self, id: i64) -> Result<(), ServantError>;"));

        assert!(src.contains("pub trait HelloWithContext: Send + Sync {"));
        assert!(src.contains(
            "fn notify(&self, tars_ctx: &mut ServantContext, id: i64) -> Result<(), ServantError>;"
        ));
        assert!(src.contains("impl<T: Hello> HelloWithContext for T {"));
        assert!(src.contains("        Hello::say_hello(self, name, greeting)\n"));
    }

    #[test]
    fn test_proxy_methods() {
        let src = demo_source(&EmitOptions::default());
        assert!(src.contains(
            "pub fn say_hello(&self, name: &String, greeting: &mut String) -> Result<i32, RpcError> {"
        ));
        assert!(src.contains("&[ArgRef::new(\"name\", 1, name)],"));
        assert!(src.contains(
            "&mut [ArgSlot::ret(&mut tars_ret), ArgSlot::new(\"greeting\", 2, true, greeting)],"
        ));
        assert!(src.contains(
            "self.say_hello_with_context(name, greeting, &mut CallContext::default())"
        ));
        assert!(src.contains(
            "pub fn say_hello_with_context(&self, name: &String, greeting: &mut String, \
             tars_ctx: &mut CallContext) -> Result<i32, RpcError> {"
        ));
        assert!(src.contains("self.notify_one_way_with_context(id, &CallContext::default())"));
        assert!(src.contains(
            "self.core.call_one_way_with_context(\"notify\", &[ArgRef::new(\"id\", 1, id)], tars_ctx)"
        ));
    }

    #[test]
    fn test_dispatcher() {
        let src = demo_source(&EmitOptions::default());
        assert!(src.contains("struct HelloSayHelloCall<'a, S> {"));
        assert!(src.contains(
            "codec.decode(payload, &mut [ArgSlot::new(\"name\", 1, true, &mut self.arg_name)])"
        ));
        assert!(src.contains(
            "self.tars_ret = HelloWithContext::say_hello(self.servant, tars_ctx, \
             std::mem::take(&mut self.arg_name), &mut self.arg_greeting)?;"
        ));
        assert!(src.contains(
            "codec.encode(&[ArgRef::ret(&self.tars_ret), ArgRef::new(\"greeting\", 2, &self.arg_greeting)])"
        ));
        assert!(src.contains("\"sayHello\" => {"));
        assert!(src.contains("impl<S: HelloWithContext> ServantDispatch for HelloDispatcher<S> {"));
        assert!(src.contains("vec![\"notify\".to_string(), \"sayHello\".to_string()]"));
    }

    #[test]
    fn test_proxy_only() {
        let options = EmitOptions {
            add_servant: false,
            ..EmitOptions::default()
        };
        let src = demo_source(&options);
        assert!(src.contains("pub struct HelloProxy<I> {"));
        assert!(!src.contains("pub trait Hello"));
        assert!(!src.contains("HelloDispatcher"));
    }
}
