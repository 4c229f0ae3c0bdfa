//! Recursive-descent parser over the token stream.

use super::ast::{
    ArgDecl, ConstDecl, EnumDecl, EnumMemberDecl, EnumValueExpr, FunctionDecl, IdlFile, Include,
    InterfaceDecl, Item, Literal, MemberDecl, ModuleDecl, Pos, StructDecl, TypeRef,
};
use super::lexer::{tokenize, Spanned, Token};
use super::ParseError;
use crate::types::Primitive;

/// Parse one IDL source file.
pub fn parse_idl(source: &str) -> Result<IdlFile, ParseError> {
    let tokens = tokenize(source)?;
    Parser { tokens, pos: 0 }.file()
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .map(|s| &s.token)
            .unwrap_or(&Token::Eof)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.pos + offset)
            .map(|s| &s.token)
            .unwrap_or(&Token::Eof)
    }

    fn here(&self) -> Pos {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|s| s.pos)
            .unwrap_or_default()
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T, ParseError> {
        Err(ParseError {
            pos: self.here(),
            message: message.into(),
        })
    }

    fn unexpected<T>(&self, wanted: &str) -> Result<T, ParseError> {
        self.error(format!("expected {wanted}, found {}", self.peek().describe()))
    }

    fn is_punct(&self, c: char) -> bool {
        *self.peek() == Token::Punct(c)
    }

    fn is_word(&self, word: &str) -> bool {
        matches!(self.peek(), Token::Ident(name) if name == word)
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.is_punct(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.is_word(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, c: char) -> Result<(), ParseError> {
        if self.eat_punct(c) {
            Ok(())
        } else {
            self.unexpected(&format!("'{c}'"))
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<(), ParseError> {
        if self.eat_word(word) {
            Ok(())
        } else {
            self.unexpected(&format!("'{word}'"))
        }
    }

    fn ident(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Token::Ident(name) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => self.unexpected("identifier"),
        }
    }

    /// `Name` or `A::B`.
    fn path(&mut self) -> Result<String, ParseError> {
        let mut name = self.ident()?;
        while *self.peek() == Token::PathSep {
            self.pos += 1;
            name.push_str("::");
            name.push_str(&self.ident()?);
        }
        Ok(name)
    }

    fn int_literal(&mut self) -> Result<i128, ParseError> {
        let negative = self.eat_punct('-');
        if !negative {
            self.eat_punct('+');
        }
        match self.peek() {
            Token::Int(v) => {
                let v = *v;
                self.pos += 1;
                Ok(if negative { -v } else { v })
            }
            _ => self.unexpected("integer"),
        }
    }

    fn file(mut self) -> Result<IdlFile, ParseError> {
        let mut file = IdlFile::default();
        loop {
            match self.peek() {
                Token::Eof => return Ok(file),
                Token::Include => {
                    let pos = self.here();
                    self.pos += 1;
                    match self.advance() {
                        Token::Str(path) => file.includes.push(Include { path, pos }),
                        _ => return self.error("expected a quoted path after #include"),
                    }
                }
                _ if self.is_word("module") => file.modules.push(self.module()?),
                _ => return self.unexpected("'module' or '#include'"),
            }
        }
    }

    fn module(&mut self) -> Result<ModuleDecl, ParseError> {
        let pos = self.here();
        self.expect_word("module")?;
        let name = self.ident()?;
        self.expect_punct('{')?;
        let mut items = Vec::new();
        while !self.eat_punct('}') {
            if self.eat_punct(';') {
                continue;
            }
            if self.is_word("key") && *self.peek_at(1) == Token::Punct('[') {
                self.skip_key_declaration()?;
                continue;
            }
            let item = match self.peek() {
                Token::Ident(word) if word == "struct" => Item::Struct(self.struct_decl()?),
                Token::Ident(word) if word == "enum" => Item::Enum(self.enum_decl()?),
                Token::Ident(word) if word == "const" => Item::Const(self.const_decl()?),
                Token::Ident(word) if word == "interface" => {
                    Item::Interface(self.interface_decl()?)
                }
                _ => return self.unexpected("'struct', 'enum', 'const', 'interface' or '}'"),
            };
            items.push(item);
        }
        self.eat_punct(';');
        Ok(ModuleDecl { name, pos, items })
    }

    /// `key[Struct, field, ...];` only affects other generators.
    fn skip_key_declaration(&mut self) -> Result<(), ParseError> {
        while !self.eat_punct(';') {
            if *self.peek() == Token::Eof {
                return self.unexpected("';'");
            }
            self.pos += 1;
        }
        Ok(())
    }

    fn struct_decl(&mut self) -> Result<StructDecl, ParseError> {
        let pos = self.here();
        self.expect_word("struct")?;
        let name = self.ident()?;
        self.expect_punct('{')?;
        let mut members = Vec::new();
        while !self.eat_punct('}') {
            members.push(self.member()?);
        }
        self.eat_punct(';');
        Ok(StructDecl { name, pos, members })
    }

    fn member(&mut self) -> Result<MemberDecl, ParseError> {
        let pos = self.here();
        let tag = match self.peek() {
            Token::Int(_) | Token::Punct('-') => Some(self.int_literal()?),
            _ => None,
        };
        let required = if self.eat_word("require") || self.eat_word("required") {
            true
        } else if self.eat_word("optional") {
            false
        } else {
            return self.unexpected("'require' or 'optional'");
        };
        let mut ty = self.type_ref()?;
        let name = self.ident()?;
        if self.eat_punct('[') {
            ty = self.array_suffix(ty)?;
        }
        let default = if self.eat_punct('=') {
            Some(self.literal()?)
        } else {
            None
        };
        self.expect_punct(';')?;
        Ok(MemberDecl {
            tag,
            required,
            ty,
            name,
            default,
            pos,
        })
    }

    /// The part after `[` in `T name[N]` or `T[N]`.
    fn array_suffix(&mut self, elem: TypeRef) -> Result<TypeRef, ParseError> {
        let len = self.int_literal()?;
        let len = usize::try_from(len)
            .ok()
            .filter(|n| *n > 0)
            .map_or_else(|| self.error(format!("invalid array length {len}")), Ok)?;
        self.expect_punct(']')?;
        Ok(TypeRef::Array(Box::new(elem), len))
    }

    fn type_ref(&mut self) -> Result<TypeRef, ParseError> {
        let mut ty = self.base_type()?;
        while self.eat_punct('[') {
            ty = self.array_suffix(ty)?;
        }
        Ok(ty)
    }

    fn base_type(&mut self) -> Result<TypeRef, ParseError> {
        if self.eat_word("unsigned") {
            let prim = match self.peek() {
                Token::Ident(w) if w == "byte" => Primitive::UInt8,
                Token::Ident(w) if w == "short" => Primitive::UInt16,
                Token::Ident(w) if w == "int" => Primitive::UInt32,
                Token::Ident(w) if w == "long" => Primitive::UInt64,
                _ => return self.unexpected("'byte', 'short', 'int' or 'long' after 'unsigned'"),
            };
            self.pos += 1;
            return Ok(TypeRef::Primitive(prim));
        }

        let prim = match self.peek() {
            Token::Ident(w) => match w.as_str() {
                "bool" => Some(Primitive::Bool),
                "byte" => Some(Primitive::Int8),
                "short" => Some(Primitive::Int16),
                "int" => Some(Primitive::Int32),
                "long" => Some(Primitive::Int64),
                "float" => Some(Primitive::Float),
                "double" => Some(Primitive::Double),
                "string" => Some(Primitive::String),
                _ => None,
            },
            _ => return self.unexpected("type"),
        };
        if let Some(prim) = prim {
            self.pos += 1;
            return Ok(TypeRef::Primitive(prim));
        }

        if self.eat_word("vector") {
            self.expect_punct('<')?;
            let elem = self.type_ref()?;
            self.expect_punct('>')?;
            return Ok(TypeRef::Vector(Box::new(elem)));
        }
        if self.eat_word("map") {
            self.expect_punct('<')?;
            let key = self.type_ref()?;
            self.expect_punct(',')?;
            let value = self.type_ref()?;
            self.expect_punct('>')?;
            return Ok(TypeRef::Map(Box::new(key), Box::new(value)));
        }
        Ok(TypeRef::Named(self.path()?))
    }

    fn literal(&mut self) -> Result<Literal, ParseError> {
        match self.peek() {
            Token::Str(s) => {
                let s = s.clone();
                self.pos += 1;
                Ok(Literal::Str(s))
            }
            Token::Float(v) => {
                let v = *v;
                self.pos += 1;
                Ok(Literal::Float(v))
            }
            Token::Ident(w) if w == "true" || w == "false" => {
                let v = w == "true";
                self.pos += 1;
                Ok(Literal::Bool(v))
            }
            Token::Ident(_) => Ok(Literal::Ident(self.path()?)),
            Token::Punct('-') if matches!(self.peek_at(1), Token::Float(_)) => {
                self.pos += 1;
                match self.advance() {
                    Token::Float(v) => Ok(Literal::Float(-v)),
                    _ => self.unexpected("number"),
                }
            }
            _ => Ok(Literal::Int(self.int_literal()?)),
        }
    }

    fn enum_decl(&mut self) -> Result<EnumDecl, ParseError> {
        let pos = self.here();
        self.expect_word("enum")?;
        let name = self.ident()?;
        self.expect_punct('{')?;
        let mut members = Vec::new();
        while !self.eat_punct('}') {
            let member_pos = self.here();
            let key = self.ident()?;
            let value = if self.eat_punct('=') {
                match self.peek() {
                    Token::Ident(_) => Some(EnumValueExpr::Ref(self.path()?)),
                    _ => Some(EnumValueExpr::Int(self.int_literal()?)),
                }
            } else {
                None
            };
            members.push(EnumMemberDecl {
                key,
                value,
                pos: member_pos,
            });
            if !self.eat_punct(',') && !self.is_punct('}') {
                return self.unexpected("',' or '}'");
            }
        }
        self.eat_punct(';');
        Ok(EnumDecl { name, pos, members })
    }

    fn const_decl(&mut self) -> Result<ConstDecl, ParseError> {
        let pos = self.here();
        self.expect_word("const")?;
        let ty = self.type_ref()?;
        let name = self.ident()?;
        self.expect_punct('=')?;
        let value = self.literal()?;
        self.expect_punct(';')?;
        Ok(ConstDecl {
            ty,
            name,
            value,
            pos,
        })
    }

    fn interface_decl(&mut self) -> Result<InterfaceDecl, ParseError> {
        let pos = self.here();
        self.expect_word("interface")?;
        let name = self.ident()?;
        self.expect_punct('{')?;
        let mut functions = Vec::new();
        while !self.eat_punct('}') {
            functions.push(self.function()?);
        }
        self.eat_punct(';');
        Ok(InterfaceDecl {
            name,
            pos,
            functions,
        })
    }

    fn function(&mut self) -> Result<FunctionDecl, ParseError> {
        let pos = self.here();
        let ret = if self.eat_word("void") {
            None
        } else {
            Some(self.type_ref()?)
        };
        let name = self.ident()?;
        self.expect_punct('(')?;
        let mut args = Vec::new();
        if !self.eat_punct(')') {
            loop {
                args.push(self.arg()?);
                if self.eat_punct(')') {
                    break;
                }
                self.expect_punct(',')?;
            }
        }
        self.expect_punct(';')?;
        Ok(FunctionDecl {
            name,
            ret,
            args,
            pos,
        })
    }

    fn arg(&mut self) -> Result<ArgDecl, ParseError> {
        let pos = self.here();
        let mut is_output = false;
        let mut optional = false;
        let mut routekey = false;
        loop {
            if self.eat_word("out") {
                is_output = true;
            } else if self.eat_word("optional") {
                optional = true;
            } else if self.eat_word("routekey") {
                routekey = true;
            } else {
                break;
            }
        }
        let mut ty = self.type_ref()?;
        let name = self.ident()?;
        if self.eat_punct('[') {
            ty = self.array_suffix(ty)?;
        }
        Ok(ArgDecl {
            name,
            ty,
            is_output,
            optional,
            routekey,
            pos,
        })
    }
}
