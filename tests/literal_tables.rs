//! Literal tokenizer classification tables.

use parsec::error::ErrorKind;
use parsec::terminals::{
    decimal_tokenizer, integer_literal_tokenizer, long_tokenizer, scientific_tokenizer,
};
use parsec::token::{Lexeme, Token};
use rstest::rstest;

#[rstest]
#[case("0x3F", 16, "3F", 4)]
#[case("0XaB", 16, "aB", 4)]
#[case("012", 8, "12", 3)]
#[case("109", 10, "109", 3)]
#[case("0", 10, "0", 1)]
fn test_integer_literal_radix(
    #[case] src: &str,
    #[case] radix: u32,
    #[case] text: &str,
    #[case] length: usize,
) {
    let token = integer_literal_tokenizer().token().parse(src).unwrap();
    assert_eq!(
        token,
        Token::new(
            0,
            length,
            Lexeme::IntegerLiteral {
                radix,
                text: text.to_string(),
            }
        )
    );
}

#[rstest]
#[case("08")]
#[case("0x")]
#[case("x1")]
fn test_integer_literal_rejects(#[case] src: &str) {
    assert!(integer_literal_tokenizer().parse(src).is_err());
}

#[rstest]
#[case("0x10", 16)]
#[case("010", 8)]
#[case("10", 10)]
#[case("0", 0)]
fn test_long_values(#[case] src: &str, #[case] value: i64) {
    assert_eq!(long_tokenizer().parse(src).unwrap(), Lexeme::Long(value));
}

#[test]
fn test_long_out_of_range_keeps_cause() {
    let err = long_tokenizer().parse("0xFFFFFFFFFFFFFFFFF").unwrap_err();
    assert_eq!(err.kind, ErrorKind::SemanticMap);
    let cause = std::error::Error::source(&err).unwrap();
    assert!(cause.is::<std::num::ParseIntError>());
}

#[rstest]
#[case("1.5", "1.5")]
#[case("1.", "1.")]
#[case(".5", ".5")]
#[case("42", "42")]
fn test_decimals(#[case] src: &str, #[case] text: &str) {
    assert_eq!(
        decimal_tokenizer().parse(src).unwrap(),
        Lexeme::Decimal(text.to_string())
    );
}

#[rstest]
#[case("1e10", "1", "10")]
#[case("1.5E-3", "1.5", "-3")]
#[case("2e+4", "2", "4")]
fn test_scientific(#[case] src: &str, #[case] significand: &str, #[case] exponent: &str) {
    assert_eq!(
        scientific_tokenizer().parse(src).unwrap(),
        Lexeme::Scientific {
            significand: significand.to_string(),
            exponent: exponent.to_string(),
        }
    );
}
