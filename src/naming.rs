//! Binding-name derivation for the Rust target.
//!
//! Wire names are never changed; these helpers only compute the identifier a
//! declaration gets in generated code.

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

pub fn is_keyword(ident: &str) -> bool {
    RUST_KEYWORDS.contains(&ident)
}

/// Append `_` to identifiers that collide with a Rust keyword.
pub fn escape_keyword(ident: String) -> String {
    if is_keyword(&ident) {
        ident + "_"
    } else {
        ident
    }
}

/// Capitalize the first letter, leaving the rest untouched.
pub fn upper_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert `camelCase`, `PascalCase` or `HTTPServer` to `snake_case`.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in chars.iter().copied().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).and_then(|p| chars.get(p)).copied();
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p == '_' => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Identifier for a struct field, function or argument.
pub fn field_ident(name: &str) -> String {
    escape_keyword(snake_case(name))
}

/// Identifier for a struct, enum or interface type.
pub fn type_ident(name: &str) -> String {
    escape_keyword(upper_first(name))
}

/// Identifier for a constant or enum member.
pub fn const_ident(name: &str) -> String {
    escape_keyword(snake_case(name).to_uppercase())
}

/// Identifier for a module. Upper-cased first letter on request.
pub fn module_ident(name: &str, module_upper: bool) -> String {
    if module_upper {
        escape_keyword(upper_first(name))
    } else {
        escape_keyword(snake_case(name))
    }
}
