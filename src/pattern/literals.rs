//! Standard lexical patterns
//!
//!     Numeric literal shapes are reproduced exactly as the lexers downstream expect them:
//!
//!         INTEGER             = digit+
//!         DEC_INTEGER         = [1-9] digit*
//!         OCT_INTEGER         = '0' [0-7]*
//!         HEX_INTEGER         = ('0x' | '0X') hexdigit+
//!         STRICT_DECIMAL      = INTEGER ('.' digit*)?
//!         FRACTION            = '.' digit+
//!         DECIMAL             = STRICT_DECIMAL | FRACTION
//!         SCIENTIFIC_NOTATION = DECIMAL [eE] [+-]? INTEGER
//!
//!     A lone "0" is a valid OCT_INTEGER of length 1. Lexers that want "0" to be decimal
//!     classify it themselves (see [terminals::literals](crate::terminals::literals)).

use once_cell::sync::Lazy;

use super::chars::{among, is, is_alpha_, is_alpha_numeric, is_digit, is_hex_digit, range};
use super::chars::{is_whitespace, not_among, not_char};
use super::{any_char, is_char, many1_chars, many_chars, or, sequence, string, Pattern};

pub static INTEGER: Lazy<Pattern> = Lazy::new(|| many1_chars(is_digit()));

pub static DEC_INTEGER: Lazy<Pattern> =
    Lazy::new(|| is_char(range('1', '9')).next(&many_chars(is_digit())));

pub static OCT_INTEGER: Lazy<Pattern> =
    Lazy::new(|| is_char(is('0')).next(&many_chars(range('0', '7'))));

pub static HEX_INTEGER: Lazy<Pattern> = Lazy::new(|| {
    sequence([
        or([string("0x"), string("0X")]),
        many1_chars(is_hex_digit()),
    ])
});

pub static STRICT_DECIMAL: Lazy<Pattern> = Lazy::new(|| {
    let fraction_digits = is_char(is('.')).next(&many_chars(is_digit()));
    INTEGER.next(&fraction_digits.optional())
});

pub static FRACTION: Lazy<Pattern> = Lazy::new(|| is_char(is('.')).next(&INTEGER));

pub static DECIMAL: Lazy<Pattern> = Lazy::new(|| STRICT_DECIMAL.or(&FRACTION));

pub static SCIENTIFIC_NOTATION: Lazy<Pattern> = Lazy::new(|| {
    sequence([
        DECIMAL.clone(),
        is_char(among("eE")),
        is_char(among("+-")).optional(),
        INTEGER.clone(),
    ])
});

/// `[a-zA-Z_][a-zA-Z0-9_]*`
pub static WORD: Lazy<Pattern> =
    Lazy::new(|| is_char(is_alpha_()).next(&many_chars(is_alpha_numeric())));

/// A backslash followed by any character.
pub static ESCAPED: Lazy<Pattern> = Lazy::new(|| is_char(is('\\')).next(&any_char()));

pub static WHITESPACES: Lazy<Pattern> = Lazy::new(|| many1_chars(is_whitespace()));

/// `"..."` with backslash escapes.
pub static DOUBLE_QUOTE_STRING: Lazy<Pattern> = Lazy::new(|| {
    let body = ESCAPED.or(&is_char(not_among("\"\\")));
    sequence([is_char(is('"')), body.many(), is_char(is('"'))])
});

/// `'...'` where a quote inside the literal is written twice.
pub static SINGLE_QUOTE_STRING: Lazy<Pattern> = Lazy::new(|| {
    let body = string("''").or(&is_char(not_char('\'')));
    sequence([is_char(is('\'')), body.many(), is_char(is('\''))])
});

/// `'c'` or an escaped `'\c'`.
pub static SINGLE_QUOTE_CHAR: Lazy<Pattern> = Lazy::new(|| {
    let body = ESCAPED.or(&is_char(not_among("'\\")));
    sequence([is_char(is('\'')), body, is_char(is('\''))])
});

#[cfg(test)]
mod tests {
    use super::*;

    fn len(p: &Pattern, s: &str) -> Option<usize> {
        p.matches(s, 0, s.len())
    }

    #[test]
    fn test_integers() {
        assert_eq!(len(&INTEGER, "0123x"), Some(4));
        assert_eq!(len(&DEC_INTEGER, "109"), Some(3));
        assert_eq!(len(&DEC_INTEGER, "012"), None);
        assert_eq!(len(&OCT_INTEGER, "012"), Some(3));
        assert_eq!(len(&OCT_INTEGER, "0"), Some(1));
        assert_eq!(len(&OCT_INTEGER, "089"), Some(1));
        assert_eq!(len(&HEX_INTEGER, "0x3F"), Some(4));
        assert_eq!(len(&HEX_INTEGER, "0X3fz"), Some(4));
        assert_eq!(len(&HEX_INTEGER, "0x"), None);
    }

    #[test]
    fn test_decimals() {
        assert_eq!(len(&STRICT_DECIMAL, "12.5"), Some(4));
        assert_eq!(len(&STRICT_DECIMAL, "12."), Some(3));
        assert_eq!(len(&STRICT_DECIMAL, ".5"), None);
        assert_eq!(len(&FRACTION, ".5"), Some(2));
        assert_eq!(len(&FRACTION, "."), None);
        assert_eq!(len(&DECIMAL, ".25"), Some(3));
        assert_eq!(len(&DECIMAL, "3.25"), Some(4));
    }

    #[test]
    fn test_scientific_notation() {
        assert_eq!(len(&SCIENTIFIC_NOTATION, "1e10"), Some(4));
        assert_eq!(len(&SCIENTIFIC_NOTATION, "1.5E-3"), Some(6));
        assert_eq!(len(&SCIENTIFIC_NOTATION, ".5e+2"), Some(5));
        assert_eq!(len(&SCIENTIFIC_NOTATION, "1e"), None);
        assert_eq!(len(&SCIENTIFIC_NOTATION, "15"), None);
    }

    #[test]
    fn test_word() {
        assert_eq!(len(&WORD, "_foo1 bar"), Some(5));
        assert_eq!(len(&WORD, "1foo"), None);
    }

    #[test]
    fn test_quoted_literals() {
        assert_eq!(len(&DOUBLE_QUOTE_STRING, r#""a\"b" rest"#), Some(6));
        assert_eq!(len(&DOUBLE_QUOTE_STRING, r#""open"#), None);
        assert_eq!(len(&SINGLE_QUOTE_STRING, "'it''s' x"), Some(7));
        assert_eq!(len(&SINGLE_QUOTE_CHAR, "'a'"), Some(3));
        assert_eq!(len(&SINGLE_QUOTE_CHAR, r"'\n'"), Some(4));
        assert_eq!(len(&SINGLE_QUOTE_CHAR, "'ab'"), None);
    }
}
