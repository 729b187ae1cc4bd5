//! Character-level parsers
//!
//!     Scanners are `Parser<(), str>` values built from [Pattern]s. A scanner that fails
//!     records its name as missing at the cursor, so `string("select")` reports
//!     "select expected". Chain [Parser::source] to get the matched text, or
//!     [Parser::token] to turn the match into a token.

use crate::pattern::chars::{self, CharPredicate};
use crate::pattern::{self, literals, Pattern};

use super::{Fail, Parser};

/// Runs `pattern`, reporting `name` on mismatch.
pub fn pattern(pattern: Pattern, name: impl Into<String>) -> Parser<(), str> {
    let name: String = name.into();
    Parser::new(move |ctx| match ctx.scan(&pattern) {
        Some(len) => {
            ctx.advance(len);
            Ok(())
        }
        None => {
            ctx.missing(name.clone());
            Err(Fail::Mismatch)
        }
    })
}

/// One character satisfying `predicate`, reported under the predicate's name.
pub fn is_char(predicate: CharPredicate) -> Parser<(), str> {
    let name = predicate.name().to_string();
    self::pattern(pattern::is_char(predicate), name)
}

pub fn is_char_lit(c: char) -> Parser<(), str> {
    is_char(chars::is(c))
}

pub fn not_char(c: char) -> Parser<(), str> {
    is_char(chars::not_char(c))
}

pub fn among(set: &str) -> Parser<(), str> {
    is_char(chars::among(set))
}

pub fn any_char() -> Parser<(), str> {
    self::pattern(pattern::any_char(), "any character")
}

pub fn string(s: &str) -> Parser<(), str> {
    self::pattern(pattern::string(s), s)
}

pub fn string_case_insensitive(s: &str) -> Parser<(), str> {
    self::pattern(pattern::string_case_insensitive(s), s)
}

/// Zero or more characters satisfying `predicate`.
pub fn many_chars(predicate: CharPredicate) -> Parser<(), str> {
    let name = predicate.name().to_string();
    self::pattern(pattern::many_chars(predicate), name)
}

/// One or more characters satisfying `predicate`.
pub fn many1_chars(predicate: CharPredicate) -> Parser<(), str> {
    let name = predicate.name().to_string();
    self::pattern(pattern::many1_chars(predicate), name)
}

pub fn whitespaces() -> Parser<(), str> {
    self::pattern(literals::WHITESPACES.clone(), "whitespaces")
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`
pub fn identifier() -> Parser<(), str> {
    self::pattern(literals::WORD.clone(), "word")
}

pub fn integer() -> Parser<(), str> {
    self::pattern(literals::INTEGER.clone(), "integer")
}

pub fn dec_integer() -> Parser<(), str> {
    self::pattern(literals::DEC_INTEGER.clone(), "decimal integer")
}

pub fn oct_integer() -> Parser<(), str> {
    self::pattern(literals::OCT_INTEGER.clone(), "octal integer")
}

pub fn hex_integer() -> Parser<(), str> {
    self::pattern(literals::HEX_INTEGER.clone(), "hexadecimal integer")
}

pub fn decimal() -> Parser<(), str> {
    self::pattern(literals::DECIMAL.clone(), "decimal number")
}

pub fn scientific_notation() -> Parser<(), str> {
    self::pattern(literals::SCIENTIFIC_NOTATION.clone(), "scientific notation")
}

/// `"..."` with backslash escapes.
pub fn double_quote_string() -> Parser<(), str> {
    self::pattern(literals::DOUBLE_QUOTE_STRING.clone(), "double quoted string")
}

/// `'...'` with `''` for a literal quote.
pub fn single_quote_string() -> Parser<(), str> {
    self::pattern(literals::SINGLE_QUOTE_STRING.clone(), "quoted string")
}

pub fn single_quote_char() -> Parser<(), str> {
    self::pattern(literals::SINGLE_QUOTE_CHAR.clone(), "character literal")
}

pub fn line_comment(start: &str) -> Parser<(), str> {
    self::pattern(pattern::line_comment(start), start)
}

/// `// ...`
pub fn java_line_comment() -> Parser<(), str> {
    line_comment("//")
}

/// `-- ...`
pub fn sql_line_comment() -> Parser<(), str> {
    line_comment("--")
}

/// `-- ...`
pub fn haskell_line_comment() -> Parser<(), str> {
    line_comment("--")
}

/// `/* ... */`, not nesting.
pub fn java_block_comment() -> Parser<(), str> {
    block_comment("/*", "*/")
}

pub fn block_comment(open: &str, close: &str) -> Parser<(), str> {
    self::pattern(pattern::block_comment(open, close), open)
}

/// `{- ... -}` with nesting.
pub fn haskell_block_comment() -> Parser<(), str> {
    nestable_block_comment("{-", "-}")
}

/// A block comment where every `open` inside must be matched by its own `close`.
pub fn nestable_block_comment(open: &str, close: &str) -> Parser<(), str> {
    let open_pattern = pattern::string(open);
    let close_pattern = pattern::string(close);
    let (name, close_name) = (open.to_string(), close.to_string());
    Parser::new(move |ctx| {
        let Some(len) = ctx.scan(&open_pattern) else {
            ctx.missing(name.clone());
            return Err(Fail::Mismatch);
        };
        ctx.advance(len);
        let mut depth = 1;
        while depth > 0 {
            if let Some(len) = ctx.scan(&close_pattern) {
                depth -= 1;
                ctx.advance(len);
            } else if let Some(len) = ctx.scan(&open_pattern) {
                depth += 1;
                ctx.advance(len);
            } else if let Some(c) = ctx.peek_char() {
                ctx.advance(c.len_utf8());
            } else {
                ctx.missing(close_name.clone());
                return Err(Fail::Mismatch);
            }
        }
        Ok(())
    })
}
