//! Indentation-sensitive lexing
//!
//!     For languages where blocks are delimited by indentation, the lexer emits a line-feed
//!     token for every newline and [Indentation::analyze] then rewrites the token list:
//!     line feeds are dropped and INDENT / OUTDENT pseudo-tokens (length 0) are inserted
//!     wherever the indentation of a line changes.
//!
//!         foo             foo
//!          bar     =>     INDENT bar
//!           baz           INDENT baz OUTDENT OUTDENT
//!
//! Indentation Levels
//!
//!     The analysis keeps a stack of open indentation widths. The first line sets the base
//!     level. A deeper line pushes a level and emits INDENT; a shallower line pops levels,
//!     emitting one OUTDENT per pop, until it lands on a level equal to its own. Landing
//!     between two levels, or below the base level, is an [IndentationError]. At the end of
//!     the input every level but the base is closed with an OUTDENT.
//!
//!     Lines that hold nothing but a line feed do not take part. A backslash right before
//!     the newline (trailing whitespace allowed) continues the line; the continuation is
//!     consumed as whitespace, so no line feed is emitted for it.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::error::ErrorKind;
use crate::parser::scanners::{self, is_char_lit};
use crate::parser::tokens::token_value;
use crate::parser::{or, Parser, TokenParser};
use crate::pattern::chars::{self, CharPredicate};
use crate::pattern::{self, Pattern};
use crate::token::{Lexeme, Token};

/// A line whose indentation matches no enclosing level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentationError {
    /// Byte index of the first token on the offending line.
    pub index: usize,
    /// Width of the offending line's indentation.
    pub indentation: usize,
    /// Open levels when the line was reached, outermost first.
    pub levels: Vec<usize>,
}

impl fmt::Display for IndentationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "indentation {} matches none of the enclosing levels {:?}",
            self.indentation, self.levels
        )
    }
}

impl Error for IndentationError {}

/// Whitespace other than the newline.
pub fn inline_whitespace() -> CharPredicate {
    chars::is_whitespace()
        .and(&chars::not_char('\n'))
        .named("whitespace")
}

/// One or more inline whitespace characters.
pub fn inline_whitespaces() -> Pattern {
    pattern::many1_chars(inline_whitespace())
}

/// `\`, optional inline whitespace, newline.
pub fn line_continuation() -> Pattern {
    pattern::sequence([
        pattern::is_char(chars::is('\\')),
        pattern::many_chars(inline_whitespace()),
        pattern::is_char(chars::is('\n')),
    ])
}

/// Inline whitespace and line continuations, the delimiter for [Indentation::lexer].
pub fn whitespaces() -> Parser<(), str> {
    scanners::pattern(
        inline_whitespaces().or(&line_continuation()).many1(),
        "whitespaces",
    )
}

/// The tokens standing for a line feed, an indentation and an outdentation.
#[derive(Debug, Clone, PartialEq)]
pub struct Indentation<V> {
    indent: V,
    outdent: V,
    line_feed: V,
}

impl Default for Indentation<Lexeme> {
    fn default() -> Self {
        Indentation::new(Lexeme::Indent, Lexeme::Outdent, Lexeme::LineFeed)
    }
}

impl<V> Indentation<V> {
    pub fn new(indent: V, outdent: V, line_feed: V) -> Self {
        Indentation {
            indent,
            outdent,
            line_feed,
        }
    }
}

impl<V: Clone + PartialEq> Indentation<V> {
    /// Replaces line feeds in `tokens` with indentation pseudo-tokens. Tokens are expected
    /// in source order; one starting before the end of the preceding line feed counts as
    /// unindented.
    pub fn analyze(&self, tokens: Vec<Token<V>>) -> Result<Vec<Token<V>>, IndentationError> {
        let Some(end) = tokens.last().map(Token::end) else {
            return Ok(tokens);
        };
        let mut result = Vec::with_capacity(tokens.len() + tokens.len() / 16);
        let mut levels: Vec<usize> = Vec::new();
        let mut fresh_line = true;
        let mut line_start = 0;
        for token in tokens {
            if token.value == self.line_feed {
                fresh_line = true;
                line_start = token.end();
                continue;
            }
            if fresh_line {
                let indentation = token.index.saturating_sub(line_start);
                self.new_line(&mut levels, indentation, token.index, &mut result)?;
                fresh_line = false;
            }
            result.push(token);
        }
        for _ in 1..levels.len() {
            result.push(Token::new(end, 0, self.outdent.clone()));
        }
        Ok(result)
    }

    fn new_line(
        &self,
        levels: &mut Vec<usize>,
        indentation: usize,
        index: usize,
        result: &mut Vec<Token<V>>,
    ) -> Result<(), IndentationError> {
        let Some(&top) = levels.last() else {
            levels.push(indentation);
            return Ok(());
        };
        if indentation > top {
            levels.push(indentation);
            result.push(Token::new(index, 0, self.indent.clone()));
            return Ok(());
        }
        if !levels.contains(&indentation) {
            return Err(IndentationError {
                index,
                indentation,
                levels: levels.clone(),
            });
        }
        while levels.last() != Some(&indentation) {
            levels.pop();
            result.push(Token::new(index, 0, self.outdent.clone()));
        }
        Ok(())
    }
}

impl<V> Indentation<V>
where
    V: Clone + PartialEq + fmt::Display + Send + Sync + 'static,
{
    /// Lexes with `tokenizer` and `delim`, turning newlines into line feeds, then analyzes
    /// the indentation. `delim` must not consume newlines; see [whitespaces].
    pub fn lexer<D: 'static>(
        &self,
        tokenizer: Parser<V, str>,
        delim: Parser<D, str>,
    ) -> Parser<Vec<Token<V>>, str> {
        let line_feed = is_char_lit('\n').retn(self.line_feed.clone());
        let lexer = or(vec![tokenizer, line_feed]).lexer(delim);
        let this = self.clone();
        Parser::new(move |ctx| {
            let tokens = lexer.apply(ctx)?;
            this.analyze(tokens).map_err(|e| {
                let message = e.to_string();
                ctx.set_at(e.index);
                ctx.abort(ErrorKind::Lex, message, Some(Arc::new(e)))
            })
        })
    }

    pub fn indent(&self) -> TokenParser<Token<V>, V> {
        token_value(self.indent.clone())
    }

    pub fn outdent(&self) -> TokenParser<Token<V>, V> {
        token_value(self.outdent.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminals::identifier_tokenizer;

    fn lex(src: &str) -> Result<Vec<Lexeme>, crate::error::ParseError> {
        Indentation::default()
            .lexer(identifier_tokenizer(), whitespaces().optional())
            .parse(src)
            .map(|tokens| tokens.into_iter().map(|t| t.value).collect())
    }

    fn id(s: &str) -> Lexeme {
        Lexeme::Identifier(s.into())
    }

    #[test]
    fn test_patterns() {
        let cont = line_continuation();
        assert_eq!(cont.matches("\\\n", 0, 2), Some(2));
        assert_eq!(cont.matches("\\  \t\r\n", 0, 6), Some(6));
        assert_eq!(cont.matches("\\a", 0, 2), None);
        assert_eq!(inline_whitespaces().matches("\n", 0, 1), None);
        assert_eq!(inline_whitespaces().matches("  \t\r", 0, 4), Some(4));
        assert!(!inline_whitespace().test('\n'));
        assert_eq!(inline_whitespace().name(), "whitespace");
    }

    #[test]
    fn test_nested_blocks() {
        assert_eq!(
            lex("foo\n bar\n  baz").unwrap(),
            vec![
                id("foo"),
                Lexeme::Indent,
                id("bar"),
                Lexeme::Indent,
                id("baz"),
                Lexeme::Outdent,
                Lexeme::Outdent,
            ]
        );
    }

    #[test]
    fn test_dedent_to_enclosing_level() {
        assert_eq!(
            lex("a\n  b\n    c\n  d\ne").unwrap(),
            vec![
                id("a"),
                Lexeme::Indent,
                id("b"),
                Lexeme::Indent,
                id("c"),
                Lexeme::Outdent,
                id("d"),
                Lexeme::Outdent,
                id("e"),
            ]
        );
    }

    #[test]
    fn test_blank_lines_and_continuations_are_ignored() {
        assert_eq!(
            lex("a\n\n  \n  b c \\\nd\n  e").unwrap(),
            vec![id("a"), Lexeme::Indent, id("b"), id("c"), id("d"), id("e"), Lexeme::Outdent]
        );
    }

    #[test]
    fn test_base_level_is_first_line() {
        assert_eq!(lex("  a\n  b").unwrap(), vec![id("a"), id("b")]);
    }

    #[test]
    fn test_inconsistent_outdent_is_lexical_error() {
        let err = lex("a\n  b\n c").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lex);
        assert_eq!(err.index, 7);
        assert_eq!((err.line, err.column), (3, 2));
        let cause = err.source().and_then(|e| e.downcast_ref::<IndentationError>());
        assert_eq!(
            cause,
            Some(&IndentationError {
                index: 7,
                indentation: 1,
                levels: vec![0, 2],
            })
        );
    }

    #[test]
    fn test_outdent_below_base_is_error() {
        let err = Indentation::default()
            .analyze(vec![
                Token::new(2, 1, id("a")),
                Token::new(3, 1, Lexeme::LineFeed),
                Token::new(4, 1, id("b")),
            ])
            .unwrap_err();
        assert_eq!(err.indentation, 0);
        assert_eq!(err.levels, vec![2]);
    }

    #[test]
    fn test_token_before_its_line_feed_is_unindented() {
        let tokens = Indentation::default()
            .analyze(vec![
                Token::new(0, 1, id("a")),
                Token::new(5, 1, Lexeme::LineFeed),
                Token::new(2, 1, id("b")),
            ])
            .unwrap();
        let values: Vec<Lexeme> = tokens.into_iter().map(|t| t.value).collect();
        assert_eq!(values, vec![id("a"), id("b")]);
    }

    #[test]
    fn test_indent_and_outdent_parsers() {
        let ind = Indentation::default();
        let body = crate::terminals::identifier()
            .many1()
            .between(ind.indent(), ind.outdent());
        let block = crate::terminals::identifier().then(body);
        let p = block.from_lexer(ind.lexer(identifier_tokenizer(), whitespaces().optional()));
        assert_eq!(
            p.parse("if\n  x\n  y").unwrap(),
            ("if".to_string(), vec!["x".to_string(), "y".to_string()])
        );
        let err = p.parse("if\nx").unwrap_err();
        assert_eq!(err.expected, vec!["INDENT"]);
    }
}
