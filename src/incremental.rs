//! Incremental lexing and parsing
//!
//!     Input that arrives in pieces (a REPL line, chunks read from a pipe) is appended to a
//!     buffer that may still grow. A primitive that looked at the end of such a buffer
//!     cannot be trusted: "sel" does not match "select" now, but might once "ect" arrives.
//!     Every run records whether any primitive touched the end of its input, and the
//!     incremental drivers turn such outcomes into "need more input" instead of a verdict.
//!
//!     [IncrementalLexer] commits tokens as soon as they are settled, i.e. their match
//!     ended before the end of the buffer. [IncrementalParser] re-runs a grammar over the
//!     whole buffer after every feed and reports failure only once the failure no longer
//!     depends on what may follow. Both give the final answer on `finish`, where the end of
//!     the buffer is the end of the text.

use std::fmt;

use crate::error::{ParseError, EOF};
use crate::parser::{Fail, ParseContext, Parser};
use crate::token::Token;

/// Outcome of feeding more text to an [IncrementalParser].
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// Nothing conclusive yet; feed more text or finish.
    NeedMore,
    /// The text so far cannot be the start of a valid input.
    Failed(ParseError),
}

/// Lexer over a growing buffer.
pub struct IncrementalLexer<V> {
    step: Parser<Token<V>, str>,
    trailing: Parser<(), str>,
    buffer: String,
    committed: usize,
}

impl<V> fmt::Debug for IncrementalLexer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncrementalLexer")
            .field("buffered", &self.buffer.len())
            .field("committed", &self.committed)
            .finish()
    }
}

impl<V: 'static> IncrementalLexer<V> {
    /// Lexes with `tokenizer`, skipping `delim` before every token and at the end.
    pub fn new<D: 'static>(tokenizer: Parser<V, str>, delim: Parser<D, str>) -> Self {
        IncrementalLexer {
            step: delim.clone().optional().next(tokenizer.token()),
            trailing: delim.optional().map(|_| ()),
            buffer: String::new(),
            committed: 0,
        }
    }

    /// Appends `text` and returns the tokens it settled.
    pub fn feed(&mut self, text: &str) -> Result<Vec<Token<V>>, ParseError> {
        self.buffer.push_str(text);
        self.drain(false)
    }

    /// Marks the end of the text and returns the remaining tokens.
    pub fn finish(mut self) -> Result<Vec<Token<V>>, ParseError> {
        self.drain(true)
    }

    /// Byte index up to which the input has been turned into tokens.
    pub fn committed(&self) -> usize {
        self.committed
    }

    fn drain(&mut self, is_final: bool) -> Result<Vec<Token<V>>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let buffer = self.buffer.as_str();
            let mut ctx = ParseContext::starting_at(buffer, buffer, None, self.committed);
            let outcome = ctx.lexing(|ctx| self.step.apply(ctx));
            let settled = is_final || !ctx.touched_end();
            match outcome {
                // An empty token would be produced again and again at the same place.
                Ok(_) if settled && ctx.at() == self.committed => {
                    return if is_final {
                        self.finish_trailing(ctx).map(|()| tokens)
                    } else {
                        Ok(tokens)
                    };
                }
                Ok(token) if settled => {
                    self.committed = ctx.at();
                    tokens.push(token);
                }
                Ok(_) => return Ok(tokens),
                Err(Fail::Mismatch) if !settled => return Ok(tokens),
                Err(Fail::Mismatch) if is_final => {
                    return self.finish_trailing(ctx).map(|()| tokens);
                }
                Err(fail) => return Err(ctx.into_error(fail)),
            }
        }
    }

    /// After the last token only delimiters may remain.
    fn finish_trailing(&self, mut ctx: ParseContext<'_, str>) -> Result<(), ParseError> {
        ctx.set_at(self.committed);
        let outcome = ctx.lexing(|ctx| {
            self.trailing.apply(ctx)?;
            if ctx.is_eof() {
                Ok(())
            } else {
                ctx.missing(EOF);
                Err(Fail::Mismatch)
            }
        });
        outcome.map_err(|fail| ctx.into_error(fail))
    }
}

/// Parser over a growing buffer.
pub struct IncrementalParser<T> {
    parser: Parser<T, str>,
    module: Option<String>,
    buffer: String,
}

impl<T> fmt::Debug for IncrementalParser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncrementalParser")
            .field("module", &self.module)
            .field("buffered", &self.buffer.len())
            .finish()
    }
}

impl<T: 'static> IncrementalParser<T> {
    pub fn new(parser: Parser<T, str>) -> Self {
        IncrementalParser {
            parser,
            module: None,
            buffer: String::new(),
        }
    }

    /// Names `module` in diagnostics.
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Appends `text` and checks whether the buffer can still become valid input.
    pub fn feed(&mut self, text: &str) -> Progress {
        self.buffer.push_str(text);
        match self.parser.run_source(&self.buffer, self.module.as_deref()) {
            (Err(error), false) => Progress::Failed(error),
            _ => Progress::NeedMore,
        }
    }

    /// Parses the buffer as the complete text.
    pub fn finish(self) -> Result<T, ParseError> {
        self.parser
            .run_source(&self.buffer, self.module.as_deref())
            .0
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parser::scanners::{string, whitespaces};
    use crate::terminals::{integer_tokenizer, Terminals};
    use crate::token::Lexeme;

    fn lexer() -> IncrementalLexer<Lexeme> {
        let terms = Terminals::operators(["+", "+=", "="]).keywords(["select"]);
        IncrementalLexer::new(
            integer_tokenizer().or(terms.tokenizer()),
            whitespaces(),
        )
    }

    fn values(tokens: Vec<Token<Lexeme>>) -> Vec<String> {
        tokens.into_iter().map(|t| t.value.to_string()).collect()
    }

    fn values_of(tokens: Vec<Token<String>>) -> Vec<String> {
        tokens.into_iter().map(|t| t.value).collect()
    }

    #[test]
    fn test_tokens_are_held_until_settled() {
        let mut lex = lexer();
        assert_eq!(values(lex.feed("sel").unwrap()), Vec::<String>::new());
        assert_eq!(values(lex.feed("ect 12").unwrap()), vec!["select"]);
        assert_eq!(lex.committed(), 6);
        assert_eq!(values(lex.feed(" +").unwrap()), vec!["12"]);
        assert_eq!(values(lex.feed("= 3 ").unwrap()), vec!["+=", "3"]);
        assert_eq!(values(lex.finish().unwrap()), Vec::<String>::new());
    }

    #[test]
    fn test_finish_settles_the_tail() {
        let mut lex = lexer();
        assert!(lex.feed("1 +").unwrap().iter().map(|t| t.index).eq([0]));
        let rest = lex.finish().unwrap();
        assert_eq!(rest, vec![Token::new(2, 1, Lexeme::Reserved("+".into()))]);
    }

    #[test]
    fn test_lexical_error_is_reported_early() {
        let mut lex = lexer();
        let err = lex.feed("1 $ 2").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lex);
        assert_eq!(err.index, 2);
    }

    #[test]
    fn test_empty_tokens_end_the_drain() {
        let maybe_a = string("a").optional().source();
        let mut lex = IncrementalLexer::new(maybe_a, whitespaces());
        assert_eq!(values_of(lex.feed("b").unwrap()), Vec::<String>::new());
        assert_eq!(lex.committed(), 0);
        let err = lex.finish().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lex);
        assert_eq!(err.index, 0);

        let mut lex = IncrementalLexer::new(string("a").optional().source(), whitespaces());
        assert_eq!(values_of(lex.feed("a ab").unwrap()), vec!["a", "a"]);
        assert_eq!(lex.committed(), 3);
    }

    #[test]
    fn test_parser_waits_for_more_input() {
        let grammar = string("select").next(whitespaces()).next(string("1")).source();
        let mut p = IncrementalParser::new(grammar);
        assert_eq!(p.feed("sel"), Progress::NeedMore);
        assert_eq!(p.feed("ect "), Progress::NeedMore);
        assert_eq!(p.feed("1"), Progress::NeedMore);
        assert_eq!(p.finish().unwrap(), "select 1");
    }

    #[test]
    fn test_parser_fails_once_conclusive() {
        let mut p = IncrementalParser::new(string("select").source()).with_module("repl");
        match p.feed("sex") {
            Progress::Failed(err) => {
                assert_eq!(err.index, 0);
                assert_eq!(err.module.as_deref(), Some("repl"));
            }
            Progress::NeedMore => panic!("mismatch should be conclusive"),
        }
        assert_eq!(p.buffer(), "sex");
    }

    #[test]
    fn test_finish_reports_incomplete_input() {
        let mut p = IncrementalParser::new(string("select").source());
        assert_eq!(p.feed("sel"), Progress::NeedMore);
        let err = p.finish().unwrap_err();
        assert_eq!(err.expected, vec!["select"]);
    }
}
