//! Literal tokenizers
//!
//!     Character-level parsers that recognize one literal and produce its [Lexeme]. They are
//!     meant to be combined with [Terminals::tokenizer](super::Terminals::tokenizer) into the
//!     tokenizer handed to [Parser::from]:
//!
//!         or(vec![double_quote_string_tokenizer(), decimal_tokenizer(), terms.tokenizer()])
//!
//!     Quoted literals are unquoted here, so the token payload is the literal's value. Numeric
//!     tokenizers keep the text, except the `long_*` family which evaluates it to an `i64`.

use once_cell::sync::Lazy;
use std::num::ParseIntError;

use crate::parser::scanners::{self, pattern};
use crate::parser::{or, Parser};
use crate::pattern::chars::{is, is_digit, range};
use crate::pattern::literals::DEC_INTEGER;
use crate::pattern::{self as patterns, is_char, many1_chars, Pattern};
use crate::token::Lexeme;

/// `'0' [0-7]+`; unlike the general octal shape, a lone "0" is not octal.
static STRICT_OCT_INTEGER: Lazy<Pattern> =
    Lazy::new(|| is_char(is('0')).next(&many1_chars(range('0', '7'))));

/// A lone "0" not followed by more digits, or `[1-9] digit*`.
static STRICT_DEC_INTEGER: Lazy<Pattern> = Lazy::new(|| {
    let zero = is_char(is('0')).next(&many1_chars(is_digit()).not());
    patterns::or([zero, DEC_INTEGER.clone()])
});

/// `[a-zA-Z_][a-zA-Z0-9_]*` as [Lexeme::Identifier].
pub fn identifier_tokenizer() -> Parser<Lexeme, str> {
    scanners::identifier().source().map(Lexeme::Identifier)
}

/// Digits as [Lexeme::Integer].
pub fn integer_tokenizer() -> Parser<Lexeme, str> {
    scanners::integer().source().map(Lexeme::Integer)
}

/// `123`, `1.5`, `1.` or `.5` as [Lexeme::Decimal].
pub fn decimal_tokenizer() -> Parser<Lexeme, str> {
    scanners::decimal().source().map(Lexeme::Decimal)
}

pub fn scientific_tokenizer() -> Parser<Lexeme, str> {
    scanners::scientific_notation()
        .source()
        .map(|text| split_scientific(&text))
}

/// `"..."`; `\r`, `\n` and `\t` are translated, any other escaped character stands for itself.
pub fn double_quote_string_tokenizer() -> Parser<Lexeme, str> {
    scanners::double_quote_string()
        .source()
        .map(|text| Lexeme::Str(unescape_double_quoted(&text)))
}

/// `'...'` with `''` standing for a single quote.
pub fn single_quote_string_tokenizer() -> Parser<Lexeme, str> {
    scanners::single_quote_string()
        .source()
        .map(|text| Lexeme::Str(unquote_single_quoted(&text)))
}

/// `'c'` or `'\c'`, the latter standing for `c`.
pub fn single_quote_char_tokenizer() -> Parser<Lexeme, str> {
    scanners::single_quote_char().source().map(|text| {
        let body = &text[1..text.len() - 1];
        let mut chars = body.chars();
        let c = match chars.next() {
            Some('\\') => chars.next(),
            first => first,
        };
        Lexeme::Char(c.unwrap_or_default())
    })
}

/// `[1-9] digit*` evaluated as [Lexeme::Long].
pub fn dec_long_tokenizer() -> Parser<Lexeme, str> {
    scanners::dec_integer()
        .source()
        .try_map(|text| parse_long(&text, 10))
}

/// `'0' [0-7]*` evaluated as [Lexeme::Long].
pub fn oct_long_tokenizer() -> Parser<Lexeme, str> {
    scanners::oct_integer()
        .source()
        .try_map(|text| parse_long(&text, 8))
}

/// `0x` or `0X` followed by hex digits, evaluated as [Lexeme::Long].
pub fn hex_long_tokenizer() -> Parser<Lexeme, str> {
    scanners::hex_integer()
        .source()
        .try_map(|text| parse_long(&text[2..], 16))
}

/// Hexadecimal, decimal or octal, evaluated as [Lexeme::Long].
pub fn long_tokenizer() -> Parser<Lexeme, str> {
    or(vec![
        hex_long_tokenizer(),
        dec_long_tokenizer(),
        oct_long_tokenizer(),
    ])
}

/// Integer literal classified by radix, the way C-family languages read it: `0x` starts
/// a hexadecimal literal, a `0` followed by octal digits an octal one, and anything else
/// (including a lone `0`) is decimal. The text has the radix prefix removed.
pub fn integer_literal_tokenizer() -> Parser<Lexeme, str> {
    let hex = scanners::hex_integer()
        .source()
        .map(|text| integer_literal(16, &text[2..]));
    let oct = pattern(STRICT_OCT_INTEGER.clone(), "octal integer")
        .source()
        .map(|text| integer_literal(8, &text[1..]));
    let dec = pattern(STRICT_DEC_INTEGER.clone(), "decimal integer")
        .source()
        .map(|text| integer_literal(10, &text));
    or(vec![hex, oct, dec])
}

fn integer_literal(radix: u32, text: &str) -> Lexeme {
    Lexeme::IntegerLiteral {
        radix,
        text: text.to_string(),
    }
}

fn parse_long(digits: &str, radix: u32) -> Result<Lexeme, ParseIntError> {
    i64::from_str_radix(digits, radix).map(Lexeme::Long)
}

fn split_scientific(text: &str) -> Lexeme {
    let (significand, exponent) = text.split_once(['e', 'E']).unwrap_or((text, ""));
    Lexeme::Scientific {
        significand: significand.to_string(),
        exponent: exponent.strip_prefix('+').unwrap_or(exponent).to_string(),
    }
}

/// Body of a double quoted literal with escapes translated.
pub(crate) fn unescape_double_quoted(text: &str) -> String {
    let body = &text[1..text.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Body of a single quoted literal with doubled quotes collapsed.
pub(crate) fn unquote_single_quoted(text: &str) -> String {
    text[1..text.len() - 1].replace("''", "'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn lexeme(p: Parser<Lexeme, str>, s: &str) -> Lexeme {
        p.parse(s).unwrap()
    }

    #[test]
    fn test_quoted_literals() {
        assert_eq!(
            lexeme(double_quote_string_tokenizer(), r#""a\tb\"c\\""#),
            Lexeme::Str("a\tb\"c\\".into())
        );
        assert_eq!(
            lexeme(single_quote_string_tokenizer(), "'it''s'"),
            Lexeme::Str("it's".into())
        );
        assert_eq!(lexeme(single_quote_char_tokenizer(), "'x'"), Lexeme::Char('x'));
        assert_eq!(lexeme(single_quote_char_tokenizer(), r"'\''"), Lexeme::Char('\''));
    }

    #[test]
    fn test_longs() {
        assert_eq!(lexeme(long_tokenizer(), "0x1F"), Lexeme::Long(31));
        assert_eq!(lexeme(long_tokenizer(), "017"), Lexeme::Long(15));
        assert_eq!(lexeme(long_tokenizer(), "0"), Lexeme::Long(0));
        assert_eq!(lexeme(long_tokenizer(), "120"), Lexeme::Long(120));
    }

    #[test]
    fn test_long_overflow_is_semantic_error() {
        let err = long_tokenizer().parse("99999999999999999999").unwrap_err();
        assert_eq!(err.kind, ErrorKind::SemanticMap);
        assert_eq!(err.index, 0);
    }

    #[test]
    fn test_scientific() {
        assert_eq!(
            lexeme(scientific_tokenizer(), "1.5e+10"),
            Lexeme::Scientific {
                significand: "1.5".into(),
                exponent: "10".into()
            }
        );
        assert_eq!(
            lexeme(scientific_tokenizer(), "2E-3"),
            Lexeme::Scientific {
                significand: "2".into(),
                exponent: "-3".into()
            }
        );
    }

    #[test]
    fn test_integer_literal_rejects_leading_zero_decimal() {
        assert!(integer_literal_tokenizer().parse("09").is_err());
        assert_eq!(
            lexeme(integer_literal_tokenizer(), "0"),
            Lexeme::IntegerLiteral {
                radix: 10,
                text: "0".into()
            }
        );
    }
}
