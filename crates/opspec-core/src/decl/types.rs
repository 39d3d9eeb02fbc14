//! Type expressions used by operation declarations.
//!
//! Declarations spell types as short text:
//!
//! | text              | meaning                                        |
//! |-------------------|------------------------------------------------|
//! | `string`, `uuid`… | a primitive                                    |
//! | `Job`             | a type declared in the catalog                 |
//! | `T?`              | optional `T`                                   |
//! | `[T]`             | homogeneous list of `T`                        |
//! | `{T}`             | string-keyed map of `T`                        |
//! | `A \| B`          | one of the alternatives                        |
//! | `stream<E, R>`    | events of type `E`, then a final value of `R`  |
//! | `none`            | no data                                        |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Built-in scalar and well-known formatted types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Integer,
    Number,
    String,
    Uuid,
    Date,
    DateTime,
    Bytes,
}

impl Primitive {
    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Integer => "integer",
            Primitive::Number => "number",
            Primitive::String => "string",
            Primitive::Uuid => "uuid",
            Primitive::Date => "date",
            Primitive::DateTime => "datetime",
            Primitive::Bytes => "bytes",
        }
    }

    fn from_keyword(word: &str) -> Option<Self> {
        let primitive = match word {
            "boolean" => Primitive::Boolean,
            "integer" => Primitive::Integer,
            "number" => Primitive::Number,
            "string" => Primitive::String,
            "uuid" => Primitive::Uuid,
            "date" => Primitive::Date,
            "datetime" => Primitive::DateTime,
            "bytes" => Primitive::Bytes,
            _ => return None,
        };
        Some(primitive)
    }

    /// Types that can travel in a URL path segment or query string.
    pub fn is_simple(self) -> bool {
        matches!(
            self,
            Primitive::Boolean
                | Primitive::Integer
                | Primitive::Number
                | Primitive::String
                | Primitive::Uuid
        )
    }
}

/// A type descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeExpr {
    #[default]
    None,
    Primitive(Primitive),
    Named(String),
    Optional(Box<TypeExpr>),
    List(Box<TypeExpr>),
    Map(Box<TypeExpr>),
    Union(Vec<TypeExpr>),
    Stream {
        event: Box<TypeExpr>,
        result: Box<TypeExpr>,
    },
}

impl TypeExpr {
    pub fn named(name: &str) -> Self {
        TypeExpr::Named(name.to_string())
    }

    pub fn list(item: TypeExpr) -> Self {
        TypeExpr::List(Box::new(item))
    }

    /// Wrap in an optional; wrapping twice is the same as wrapping once.
    pub fn optional(inner: TypeExpr) -> Self {
        match inner {
            TypeExpr::Optional(_) | TypeExpr::None => inner,
            other => TypeExpr::Optional(Box::new(other)),
        }
    }

    /// Build a union, flattening nested unions and folding `none` into an optional.
    pub fn union_of(members: Vec<TypeExpr>) -> Self {
        let mut flat: Vec<TypeExpr> = Vec::new();
        let mut nullable = false;

        let mut pending = members;
        pending.reverse();
        while let Some(member) = pending.pop() {
            match member {
                TypeExpr::None => nullable = true,
                TypeExpr::Optional(inner) => {
                    nullable = true;
                    pending.push(*inner);
                }
                TypeExpr::Union(nested) => pending.extend(nested.into_iter().rev()),
                other => {
                    if !flat.contains(&other) {
                        flat.push(other);
                    }
                }
            }
        }

        let base = match flat.len() {
            0 => TypeExpr::None,
            1 => flat.remove(0),
            _ => TypeExpr::Union(flat),
        };
        if nullable {
            TypeExpr::optional(base)
        } else {
            base
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, TypeExpr::None)
    }

    /// Strip one level of optionality, reporting whether it was present.
    pub fn unwrap_optional(&self) -> (&TypeExpr, bool) {
        match self {
            TypeExpr::Optional(inner) => (inner.as_ref(), true),
            other => (other, false),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            TypeExpr::Named(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Whether a `stream<…>` appears anywhere inside this type.
    pub fn contains_stream(&self) -> bool {
        match self {
            TypeExpr::Stream { .. } => true,
            TypeExpr::Optional(inner) | TypeExpr::List(inner) | TypeExpr::Map(inner) => {
                inner.contains_stream()
            }
            TypeExpr::Union(members) => members.iter().any(TypeExpr::contains_stream),
            TypeExpr::None | TypeExpr::Primitive(_) | TypeExpr::Named(_) => false,
        }
    }

    fn from_ident(word: &str) -> Self {
        if word == "none" {
            return TypeExpr::None;
        }
        match Primitive::from_keyword(word) {
            Some(p) => TypeExpr::Primitive(p),
            None => TypeExpr::Named(word.to_string()),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::None => write!(f, "none"),
            TypeExpr::Primitive(p) => write!(f, "{}", p.keyword()),
            TypeExpr::Named(name) => write!(f, "{name}"),
            TypeExpr::Optional(inner) => match inner.as_ref() {
                TypeExpr::Union(_) => write!(f, "({inner})?"),
                _ => write!(f, "{inner}?"),
            },
            TypeExpr::List(item) => write!(f, "[{item}]"),
            TypeExpr::Map(value) => write!(f, "{{{value}}}"),
            TypeExpr::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
            TypeExpr::Stream { event, result } => write!(f, "stream<{event}, {result}>"),
        }
    }
}

impl FromStr for TypeExpr {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| ParseError::InvalidType {
            input: input.to_string(),
            reason,
        };
        let tokens = tokenize(input).map_err(invalid)?;
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.parse_union().map_err(invalid)?;
        if let Some(tok) = parser.tokens.get(parser.pos) {
            return Err(invalid(format!("unexpected trailing `{tok}`")));
        }
        Ok(expr)
    }
}

impl TryFrom<String> for TypeExpr {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeExpr> for String {
    fn from(value: TypeExpr) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Punct(char),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(word) => write!(f, "{word}"),
            Token::Punct(c) => write!(f, "{c}"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '[' | ']' | '{' | '}' | '(' | ')' | '<' | '>' | ',' | '|' | '?' => {
                tokens.push(Token::Punct(c))
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' || d == '.' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(input[start..end].to_string()));
            }
            other => return Err(format!("unexpected character `{other}`")),
        }
    }

    if tokens.is_empty() {
        return Err("empty type expression".to_string());
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, c: char) -> bool {
        if self.tokens.get(self.pos) == Some(&Token::Punct(c)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), String> {
        if self.eat(c) {
            return Ok(());
        }
        match self.tokens.get(self.pos) {
            Some(tok) => Err(format!("expected `{c}`, found `{tok}`")),
            None => Err(format!("expected `{c}`, found end of input")),
        }
    }

    fn parse_union(&mut self) -> Result<TypeExpr, String> {
        let mut members = vec![self.parse_postfix()?];
        while self.eat('|') {
            members.push(self.parse_postfix()?);
        }
        if members.len() == 1 {
            return Ok(members.remove(0));
        }
        Ok(TypeExpr::union_of(members))
    }

    fn parse_postfix(&mut self) -> Result<TypeExpr, String> {
        let mut expr = self.parse_atom()?;
        while self.eat('?') {
            expr = TypeExpr::optional(expr);
        }
        Ok(expr)
    }

    fn parse_atom(&mut self) -> Result<TypeExpr, String> {
        match self.next() {
            Some(Token::Punct('[')) => {
                let item = self.parse_union()?;
                self.expect(']')?;
                Ok(TypeExpr::List(Box::new(item)))
            }
            Some(Token::Punct('{')) => {
                let value = self.parse_union()?;
                self.expect('}')?;
                Ok(TypeExpr::Map(Box::new(value)))
            }
            Some(Token::Punct('(')) => {
                let inner = self.parse_union()?;
                self.expect(')')?;
                Ok(inner)
            }
            Some(Token::Ident(word)) if word == "stream" && self.eat('<') => {
                let event = self.parse_union()?;
                self.expect(',')?;
                let result = self.parse_union()?;
                self.expect('>')?;
                Ok(TypeExpr::Stream {
                    event: Box::new(event),
                    result: Box::new(result),
                })
            }
            Some(Token::Ident(word)) => Ok(TypeExpr::from_ident(&word)),
            Some(Token::Punct(c)) => Err(format!("unexpected `{c}`")),
            None => Err("unexpected end of input".to_string()),
        }
    }
}
