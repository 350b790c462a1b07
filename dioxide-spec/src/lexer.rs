//! # Lexer for Type Descriptors

use logos::Logos;

/// Tokens of the type descriptor grammar
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    /// Type name (base types and the `array`/`map`/`struct` constructors)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    /// Opening angle bracket
    #[token("<")]
    LAngle,

    /// Closing angle bracket
    #[token(">")]
    RAngle,

    /// Comma
    #[token(",")]
    Comma,
}
