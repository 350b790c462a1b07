//! Type descriptor and signature parser

use logos::Logos;

use crate::descriptor::{Param, Signature, TypeDescriptor};
use crate::error::{Result, SpecError};
use crate::lexer::Token;

/// Deepest generic nesting accepted in a descriptor
pub const MAX_TYPE_DEPTH: usize = 32;

/// Parse a single type descriptor
pub fn parse_type(text: &str) -> Result<TypeDescriptor> {
    let malformed = |message: &str| SpecError::MalformedType {
        descriptor: text.to_string(),
        message: message.to_string(),
    };

    let tokens = Token::lexer(text)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| malformed("unexpected character"))?;
    if tokens.is_empty() {
        return Err(malformed("empty type"));
    }

    let mut parser = Parser {
        text,
        tokens: &tokens,
        pos: 0,
    };
    let ty = parser.parse_type(0)?;
    if parser.pos != tokens.len() {
        return Err(malformed("trailing tokens"));
    }
    Ok(ty)
}

/// Parse a `"type1:name1,type2:name2"` parameter list
///
/// Commas split parameters only outside `<...>`. A parameter without a name
/// is called `value#<index>`.
pub fn parse_signature(text: &str) -> Result<Signature> {
    let malformed = |message: String| SpecError::MalformedSignature {
        signature: text.to_string(),
        message,
    };

    let text_trimmed = text.trim();
    if text_trimmed.is_empty() {
        return Ok(Signature::default());
    }

    let mut params = Vec::new();
    for (index, part) in split_top_level(text_trimmed)
        .map_err(|m| malformed(m.to_string()))?
        .into_iter()
        .enumerate()
    {
        let part = part.trim();
        if part.is_empty() {
            return Err(malformed(format!("empty parameter at position {}", index)));
        }
        let (ty, name) = match part.split_once(':') {
            Some((ty, name)) => (ty.trim(), name.trim()),
            None => (part, ""),
        };
        let name = if name.is_empty() {
            format!("value#{}", index)
        } else {
            name.to_string()
        };
        params.push(Param {
            name,
            ty: parse_type(ty)?,
        });
    }
    Ok(Signature::new(params))
}

/// Split at commas that are not inside angle brackets
fn split_top_level(text: &str) -> std::result::Result<Vec<&str>, &'static str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.checked_sub(1).ok_or("unbalanced '>'")?,
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err("unbalanced '<'");
    }
    parts.push(&text[start..]);
    Ok(parts)
}

struct Parser<'a> {
    text: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> SpecError {
        SpecError::MalformedType {
            descriptor: self.text.to_string(),
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<()> {
        match self.next() {
            Some(token) if *token == expected => Ok(()),
            _ => Err(self.error(format!("expected {}", what))),
        }
    }

    fn parse_type(&mut self, depth: usize) -> Result<TypeDescriptor> {
        if depth > MAX_TYPE_DEPTH {
            return Err(self.error("nesting too deep"));
        }

        let name = match self.next() {
            Some(Token::Identifier(name)) => name.as_str(),
            _ => return Err(self.error("expected type name")),
        };

        if self.peek() != Some(&Token::LAngle) {
            return TypeDescriptor::base(name).ok_or_else(|| SpecError::UnsupportedType(name.to_string()));
        }
        self.pos += 1;

        let ty = match name {
            "array" => {
                let elem = self.parse_type(depth + 1)?;
                TypeDescriptor::Array(Box::new(elem))
            }
            "map" => {
                let key = self.parse_type(depth + 1)?;
                self.expect(Token::Comma, "',' between map key and value")?;
                let value = self.parse_type(depth + 1)?;
                TypeDescriptor::Map(Box::new(key), Box::new(value))
            }
            "struct" => {
                let mut members = Vec::new();
                if self.peek() != Some(&Token::RAngle) {
                    members.push(self.parse_type(depth + 1)?);
                    while self.peek() == Some(&Token::Comma) {
                        self.pos += 1;
                        members.push(self.parse_type(depth + 1)?);
                    }
                }
                TypeDescriptor::Struct(members)
            }
            other => return Err(SpecError::UnsupportedType(other.to_string())),
        };
        self.expect(Token::RAngle, "'>'")?;
        Ok(ty)
    }
}
