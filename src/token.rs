//! Tokens
//!
//!     A lexer turns source text into a flat list of tokens, produced once per text and then
//!     treated as read-only. A token records where it came from (byte index and length in the
//!     source) and an opaque payload `V` chosen by the grammar.
//!
//!     [Lexeme] is the payload produced by the built-in [terminals](crate::terminals) and
//!     [indentation](crate::indentation) lexers. Grammars with their own token enums (for
//!     example one derived with logos, see [adapter]) use those directly as `V`.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod adapter;

pub use adapter::tokenize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token<V> {
    /// Byte index of the first character in the source.
    pub index: usize,
    /// Length in bytes.
    pub length: usize,
    pub value: V,
}

impl<V> Token<V> {
    pub fn new(index: usize, length: usize, value: V) -> Self {
        Token {
            index,
            length,
            value,
        }
    }

    /// Byte index one past the last character.
    pub fn end(&self) -> usize {
        self.index + self.length
    }

    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> Token<U> {
        Token {
            index: self.index,
            length: self.length,
            value: f(self.value),
        }
    }
}

impl<V: fmt::Display> fmt::Display for Token<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}

/// Classification of a text fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// Operator or keyword.
    Reserved,
    Identifier,
    Integer,
    Decimal,
}

/// Payload of the tokens produced by the built-in lexers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lexeme {
    /// Operator or keyword, in canonical spelling.
    Reserved(String),
    Identifier(String),
    /// Integer literal text.
    Integer(String),
    /// Decimal literal text.
    Decimal(String),
    Scientific {
        significand: String,
        exponent: String,
    },
    /// String literal, quotes removed and escapes translated.
    Str(String),
    Char(char),
    Long(i64),
    /// Integer literal with its radix; `text` has the radix prefix stripped.
    IntegerLiteral {
        radix: u32,
        text: String,
    },
    Indent,
    Outdent,
    LineFeed,
}

impl Lexeme {
    /// The fragment tag and text, for the four fragment kinds.
    pub fn fragment(&self) -> Option<(Tag, &str)> {
        match self {
            Lexeme::Reserved(text) => Some((Tag::Reserved, text.as_str())),
            Lexeme::Identifier(text) => Some((Tag::Identifier, text.as_str())),
            Lexeme::Integer(text) => Some((Tag::Integer, text.as_str())),
            Lexeme::Decimal(text) => Some((Tag::Decimal, text.as_str())),
            _ => None,
        }
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        matches!(self, Lexeme::Reserved(text) if text == name)
    }
}

impl fmt::Display for Lexeme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lexeme::Reserved(text)
            | Lexeme::Identifier(text)
            | Lexeme::Integer(text)
            | Lexeme::Decimal(text) => f.write_str(text),
            Lexeme::Scientific {
                significand,
                exponent,
            } => write!(f, "{significand}e{exponent}"),
            Lexeme::Str(text) => write!(f, "{text:?}"),
            Lexeme::Char(c) => write!(f, "{c:?}"),
            Lexeme::Long(n) => write!(f, "{n}"),
            Lexeme::IntegerLiteral { radix: 16, text } => write!(f, "0x{text}"),
            Lexeme::IntegerLiteral { radix: 8, text } => write!(f, "0{text}"),
            Lexeme::IntegerLiteral { text, .. } => f.write_str(text),
            Lexeme::Indent => f.write_str("INDENT"),
            Lexeme::Outdent => f.write_str("OUTDENT"),
            Lexeme::LineFeed => f.write_str("LF"),
        }
    }
}
