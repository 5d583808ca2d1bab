//! Type expression syntax.
//!
//! Parses the canonical rendering produced by `Display for Type` as well as
//! the spellings found in source annotations:
//!
//! - scalars: `uint8`, `byte`, `word`, `int32`, `number`, `boolean`, `string`
//! - sequences: `T[]`, `Array<T>`, `Array.<T>`, `array`, `Uint32Array`
//! - optionals: `T?`, `?T`, `T|null`, `T|undefined`
//! - maps: `map<K, V>`, `Map<K, V>`, `Object<K, V>`
//! - functions: `(A, B) => R`, `function(A, B): R`
//!
//! Unions of two non-null types keep their first member.

use std::ops::Range;

use logos::Logos;

use crate::types::Type;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
enum Token<'src> {
    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("<")]
    LAngle,

    #[token(".<")]
    DotLAngle,

    #[token(">")]
    RAngle,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    #[token("?")]
    Question,

    #[token("!")]
    Bang,

    #[token("|")]
    Pipe,

    #[token("=>")]
    Arrow,

    #[token(":")]
    Colon,

    #[token("*")]
    Star,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*(\.[A-Za-z_$][A-Za-z0-9_$]*)*", |lex| lex.slice())]
    Ident(&'src str),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeParseError {
    #[error("unexpected character {text:?} at offset {offset}")]
    UnexpectedChar { text: String, offset: usize },

    #[error("expected {expected} at offset {offset}")]
    Expected {
        expected: &'static str,
        offset: usize,
    },

    #[error("unexpected end of type expression")]
    UnexpectedEnd,

    #[error("type `{0}` has no static equivalent")]
    Unsupported(String),

    #[error("unexpected input after type at offset {0}")]
    Trailing(usize),
}

/// Parse a type expression.
pub fn parse_type(input: &str) -> Result<Type, TypeParseError> {
    let mut parser = Parser::new(input)?;
    if parser.tokens.is_empty() {
        return Err(TypeParseError::UnexpectedEnd);
    }
    let ty = parser.parse_union()?;
    if parser.pos < parser.tokens.len() {
        return Err(TypeParseError::Trailing(parser.current_span().start));
    }
    Ok(ty)
}

struct Parser<'src> {
    tokens: Vec<(Token<'src>, Range<usize>)>,
    pos: usize,
    input: &'src str,
}

impl<'src> Parser<'src> {
    fn new(input: &'src str) -> Result<Self, TypeParseError> {
        let mut tokens = Vec::new();
        for (result, span) in Token::lexer(input).spanned() {
            match result {
                Ok(token) => tokens.push((token, span)),
                Err(_) => {
                    return Err(TypeParseError::UnexpectedChar {
                        text: input[span.clone()].to_string(),
                        offset: span.start,
                    });
                }
            }
        }
        Ok(Self {
            tokens,
            pos: 0,
            input,
        })
    }

    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token<'src>> {
        self.tokens.get(self.pos + offset).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<Token<'src>> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token<'src>) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn current_span(&self) -> Range<usize> {
        self.tokens
            .get(self.pos)
            .map(|(_, s)| s.clone())
            .unwrap_or(self.input.len()..self.input.len())
    }

    fn expect(&mut self, expected: Token<'src>, what: &'static str) -> Result<(), TypeParseError> {
        if self.eat(&expected) {
            return Ok(());
        }
        if self.peek().is_none() {
            return Err(TypeParseError::UnexpectedEnd);
        }
        Err(TypeParseError::Expected {
            expected: what,
            offset: self.current_span().start,
        })
    }

    fn at_null_member(&self, has_members: bool) -> bool {
        let is_null = matches!(self.peek(), Some(Token::Ident("null" | "undefined")));
        is_null && (has_members || self.peek_at(1) == Some(&Token::Pipe))
    }

    fn parse_union(&mut self) -> Result<Type, TypeParseError> {
        let mut nullable = false;
        let mut members = Vec::new();
        loop {
            if self.at_null_member(!members.is_empty()) {
                self.advance();
                nullable = true;
            } else {
                members.push(self.parse_postfix()?);
            }
            if !self.eat(&Token::Pipe) {
                break;
            }
        }

        let Some(first) = members.into_iter().next() else {
            return Err(TypeParseError::Unsupported("null".to_string()));
        };
        Ok(if nullable { Type::optional(first) } else { first })
    }

    fn parse_postfix(&mut self) -> Result<Type, TypeParseError> {
        if self.eat(&Token::Question) {
            return Ok(Type::optional(self.parse_postfix()?));
        }
        if self.eat(&Token::Bang) {
            return self.parse_postfix();
        }

        let mut ty = self.parse_atom()?;
        loop {
            if self.peek() == Some(&Token::LBracket) {
                self.advance();
                self.expect(Token::RBracket, "`]`")?;
                ty = Type::seq(ty);
            } else if self.eat(&Token::Question) {
                ty = Type::optional(ty);
            } else {
                return Ok(ty);
            }
        }
    }

    fn parse_atom(&mut self) -> Result<Type, TypeParseError> {
        match self.advance() {
            None => Err(TypeParseError::UnexpectedEnd),
            Some(Token::LParen) => {
                let items = self.parse_list(Token::RParen, "`)`")?;
                if self.eat(&Token::Arrow) {
                    let ret = self.parse_union()?;
                    return Ok(Type::func(items, ret));
                }
                match <[Type; 1]>::try_from(items) {
                    Ok([single]) => Ok(single),
                    Err(_) => Err(TypeParseError::Expected {
                        expected: "`=>`",
                        offset: self.current_span().start,
                    }),
                }
            }
            Some(Token::Star) => Err(TypeParseError::Unsupported("*".to_string())),
            Some(Token::Ident("function")) if self.peek() == Some(&Token::LParen) => {
                self.advance();
                let params = self.parse_list(Token::RParen, "`)`")?;
                let ret = if self.eat(&Token::Colon) {
                    self.parse_union()?
                } else {
                    Type::void()
                };
                Ok(Type::func(params, ret))
            }
            Some(Token::Ident(name)) => {
                if self.eat(&Token::LAngle) || self.eat(&Token::DotLAngle) {
                    let args = self.parse_list(Token::RAngle, "`>`")?;
                    return generic_type(name, args);
                }
                named_type(name)
            }
            Some(_) => Err(TypeParseError::Expected {
                expected: "type",
                offset: self.tokens[self.pos - 1].1.start,
            }),
        }
    }

    /// Comma-separated types up to `close`, which is consumed.
    fn parse_list(
        &mut self,
        close: Token<'src>,
        what: &'static str,
    ) -> Result<Vec<Type>, TypeParseError> {
        let mut items = Vec::new();
        if self.eat(&close) {
            return Ok(items);
        }
        loop {
            items.push(self.parse_union()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(close, what)?;
        Ok(items)
    }
}

fn named_type(name: &str) -> Result<Type, TypeParseError> {
    let ty = match name {
        "bool" | "boolean" | "Boolean" => Type::bool(),
        "uint8" | "u8" | "byte" | "octet" => Type::u8(),
        "uint16" | "u16" => Type::u16(),
        "uint32" | "u32" | "uint" | "word" | "dword" | "number" | "Number" | "integer" => {
            Type::u32()
        }
        "uint64" | "u64" | "qword" | "bigint" | "BigInt" => Type::u64(),
        "int8" | "i8" | "sbyte" => Type::int(8, true),
        "int16" | "i16" => Type::int(16, true),
        "int32" | "i32" | "int" => Type::i32(),
        "int64" | "i64" => Type::int(64, true),
        "float32" | "f32" | "float" | "single" => Type::float(32),
        "float64" | "f64" | "double" => Type::f64(),
        "string" | "String" | "str" => Type::string(),
        "void" | "undefined" => Type::void(),
        "unknown" => Type::Unknown,
        "array" | "Array" | "bytes" | "ByteArray" | "Uint8Array" | "Uint8ClampedArray" => {
            Type::bytes()
        }
        "Uint16Array" => Type::seq(Type::u16()),
        "Uint32Array" => Type::words(),
        "BigUint64Array" => Type::seq(Type::u64()),
        "Int8Array" => Type::seq(Type::int(8, true)),
        "Int16Array" => Type::seq(Type::int(16, true)),
        "Int32Array" => Type::seq(Type::i32()),
        "Float32Array" => Type::seq(Type::float(32)),
        "Float64Array" => Type::seq(Type::f64()),
        "null" | "any" | "mixed" | "Object" | "object" | "Function" | "function" => {
            return Err(TypeParseError::Unsupported(name.to_string()));
        }
        other => Type::named(other),
    };
    Ok(ty)
}

fn generic_type(name: &str, args: Vec<Type>) -> Result<Type, TypeParseError> {
    let mut args = args.into_iter();
    match (name, args.next(), args.next(), args.next()) {
        ("Array" | "array" | "ReadonlyArray", Some(element), None, None) => Ok(Type::seq(element)),
        ("Map" | "map" | "Object" | "Record", Some(key), Some(value), None) => {
            Ok(Type::map(key, value))
        }
        _ => Err(TypeParseError::Unsupported(format!("{name}<..>"))),
    }
}
