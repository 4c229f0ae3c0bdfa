//! Tokenizer for IDL source.

use super::ast::Pos;
use super::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Int(i128),
    Float(f64),
    Str(String),
    /// `#include`
    Include,
    /// `::`
    PathSep,
    Punct(char),
    Eof,
}

impl Token {
    pub fn describe(&self) -> String {
        match self {
            Self::Ident(name) => format!("identifier '{name}'"),
            Self::Int(v) => format!("integer {v}"),
            Self::Float(v) => format!("number {v}"),
            Self::Str(s) => format!("string \"{s}\""),
            Self::Include => "#include".to_string(),
            Self::PathSep => "'::'".to_string(),
            Self::Punct(c) => format!("'{c}'"),
            Self::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub pos: Pos,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: u32,
    col: u32,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            col: 1,
        }
    }

    fn pos(&self) -> Pos {
        Pos {
            line: self.line,
            col: self.col,
        }
    }

    fn error(&self, pos: Pos, message: impl Into<String>) -> ParseError {
        ParseError {
            pos,
            message: message.into(),
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Peek one past the next character.
    fn peek2(&self) -> Option<char> {
        let mut it = self.chars.clone();
        it.next();
        it.next()
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek2() == Some('/') => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                Some('/') if self.peek2() == Some('*') => {
                    let start = self.pos();
                    self.bump();
                    self.bump();
                    let mut closed = false;
                    while let Some(c) = self.bump() {
                        if c == '*' && self.peek() == Some('/') {
                            self.bump();
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        return Err(self.error(start, "unterminated block comment"));
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> Result<Spanned, ParseError> {
        self.skip_trivia()?;
        let pos = self.pos();
        let Some(c) = self.peek() else {
            return Ok(Spanned {
                token: Token::Eof,
                pos,
            });
        };

        let token = if c.is_alphabetic() || c == '_' {
            Token::Ident(self.take_while(|c| c.is_alphanumeric() || c == '_'))
        } else if c.is_ascii_digit() {
            self.number(pos)?
        } else if c == '"' {
            self.string(pos)?
        } else if c == '#' {
            self.bump();
            let word = self.take_while(|c| c.is_alphabetic());
            if word != "include" {
                return Err(self.error(pos, format!("unknown directive '#{word}'")));
            }
            Token::Include
        } else if c == ':' && self.peek2() == Some(':') {
            self.bump();
            self.bump();
            Token::PathSep
        } else if "{}()<>[];,=-+".contains(c) {
            self.bump();
            Token::Punct(c)
        } else {
            return Err(self.error(pos, format!("unexpected character '{c}'")));
        };
        Ok(Spanned { token, pos })
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }

    fn number(&mut self, pos: Pos) -> Result<Token, ParseError> {
        if self.peek() == Some('0') && matches!(self.peek2(), Some('x' | 'X')) {
            self.bump();
            self.bump();
            let digits = self.take_while(|c| c.is_ascii_hexdigit());
            return i128::from_str_radix(&digits, 16)
                .map(Token::Int)
                .map_err(|_| self.error(pos, format!("invalid hex literal '0x{digits}'")));
        }

        let mut text = self.take_while(|c| c.is_ascii_digit());
        let mut is_float = false;
        if self.peek() == Some('.') {
            is_float = true;
            text.push('.');
            self.bump();
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            text.push('e');
            self.bump();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                text.push(sign);
                self.bump();
            }
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }
        // C-style float suffix.
        if matches!(self.peek(), Some('f' | 'F')) {
            is_float = true;
            self.bump();
        }

        if is_float {
            text.parse::<f64>()
                .map(Token::Float)
                .map_err(|_| self.error(pos, format!("invalid number '{text}'")))
        } else {
            text.parse::<i128>()
                .map(Token::Int)
                .map_err(|_| self.error(pos, format!("invalid integer '{text}'")))
        }
    }

    fn string(&mut self, pos: Pos) -> Result<Token, ParseError> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error(pos, "unterminated string literal")),
                Some('"') => return Ok(Token::Str(out)),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('0') => out.push('\0'),
                    Some(c) => out.push(c),
                    None => return Err(self.error(pos, "unterminated string literal")),
                },
                Some(c) => out.push(c),
            }
        }
    }
}

/// Split source into tokens. The last token is always [`Token::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let spanned = lexer.next_token()?;
        let done = spanned.token == Token::Eof;
        tokens.push(spanned);
        if done {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_tokens_and_comments() {
        let tokens = kinds("// line\nstruct /* block */ A { 0 require int x = -0x10; };");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("struct".into()),
                Token::Ident("A".into()),
                Token::Punct('{'),
                Token::Int(0),
                Token::Ident("require".into()),
                Token::Ident("int".into()),
                Token::Ident("x".into()),
                Token::Punct('='),
                Token::Punct('-'),
                Token::Int(16),
                Token::Punct(';'),
                Token::Punct('}'),
                Token::Punct(';'),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_include_path_and_float() {
        let tokens = kinds("#include \"base.tars\" Base::Point 1.5f 2e3");
        assert_eq!(
            tokens,
            vec![
                Token::Include,
                Token::Str("base.tars".into()),
                Token::Ident("Base".into()),
                Token::PathSep,
                Token::Ident("Point".into()),
                Token::Float(1.5),
                Token::Float(2000.0),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("a\n  b").unwrap();
        assert_eq!(tokens.get(1).unwrap().pos, Pos { line: 2, col: 3 });
    }

    #[test]
    fn test_unterminated_comment() {
        let err = tokenize("/* open").unwrap_err();
        assert_eq!(err.pos, Pos { line: 1, col: 1 });
    }
}
