//! Property-based tests for patterns, repetition, choice and incremental lexing.

use parsec::incremental::IncrementalLexer;
use parsec::parser::scanners::{many_chars, string, whitespaces};
use parsec::pattern::chars::is_digit;
use parsec::pattern::literals::{DECIMAL, WORD};
use parsec::terminals::{integer_tokenizer, operators, Terminals};
use parsec::token::{Lexeme, Token};
use proptest::prelude::*;

fn calc_tokenizer() -> parsec::Parser<Lexeme, str> {
    integer_tokenizer().or(Terminals::operators(["+", "+=", "="]).tokenizer())
}

proptest! {
    #[test]
    fn test_patterns_are_pure_and_bounded(input in "[a-z0-9_. ]{0,24}") {
        for end in 0..=input.len() {
            for pattern in [&*WORD, &*DECIMAL] {
                let first = pattern.matches(&input, 0, end);
                prop_assert_eq!(first, pattern.matches(&input, 0, end));
                if let Some(len) = first {
                    prop_assert!(len <= end);
                }
            }
        }
    }

    #[test]
    fn test_zero_width_repetition_terminates(digits in "[0-9]{0,20}") {
        let p = many_chars(is_digit()).many().source();
        prop_assert_eq!(p.parse(&digits).unwrap(), digits);
    }

    #[test]
    fn test_choice_backtracks_after_consumption(prefix in "[a-z]{1,8}") {
        let p = string(&prefix)
            .next(string("x"))
            .source()
            .or(string(&prefix).next(string("y")).source());
        let input = format!("{prefix}y");
        prop_assert_eq!(p.parse(&input).unwrap(), input);
    }

    #[test]
    fn test_operator_order_never_shadows(names in prop::collection::vec("[-+=<>]{1,3}", 0..8)) {
        let sorted = operators::sort(&names);
        for (i, earlier) in sorted.iter().enumerate() {
            for later in &sorted[i + 1..] {
                prop_assert!(
                    !later.starts_with(earlier.as_str()),
                    "{earlier} is tried before {later}"
                );
            }
        }
        let mut expected: Vec<&String> = names.iter().collect();
        expected.sort();
        expected.dedup();
        let mut actual: Vec<&String> = sorted.iter().collect();
        actual.sort();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn test_incremental_lexing_matches_whole_input(
        input in "[0-9]{1,3}( ([0-9]{1,3}|\\+=?|=)){0,6}",
        split in 0usize..32,
    ) {
        let split = split.min(input.len());
        let whole: Vec<Token<Lexeme>> = calc_tokenizer()
            .lexer(whitespaces().optional())
            .parse(&input)
            .unwrap();
        let mut lexer = IncrementalLexer::new(calc_tokenizer(), whitespaces());
        let mut pieces = lexer.feed(&input[..split]).unwrap();
        pieces.extend(lexer.feed(&input[split..]).unwrap());
        pieces.extend(lexer.finish().unwrap());
        prop_assert_eq!(pieces, whole);
    }
}
