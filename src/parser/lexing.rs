//! From characters to tokens
//!
//!     Token grammars run in two phases. A character-level lexer turns the whole input into
//!     a token list, skipping delimiters (whitespace, comments) between tokens but never
//!     inside them. A token-level parser then runs over that list.
//!
//!         tokenizer.lexer(delim)          Parser<Vec<Token<V>>, str>
//!         grammar.from(tokenizer, delim)  Parser<T, str>
//!
//!     The tokenizer produces bare payloads; the lexer wraps each one in a [Token] spanning
//!     the characters it matched.
//!
//!     Failures of the token-level phase are reported at the source position of the
//!     offending token; failures of the lexing phase are marked as lexical errors.

use std::fmt;

use crate::token::Token;

use super::{Fail, ParseContext, Parser};

impl<T: 'static> Parser<T, str> {
    /// Wraps the value in a [Token] spanning the matched characters.
    pub fn token(self) -> Parser<Token<T>, str> {
        Parser::new(move |ctx| {
            let start = ctx.at();
            let value = self.apply(ctx)?;
            Ok(Token::new(start, ctx.at() - start, value))
        })
    }

    /// Lexes tokens separated by `delim`, which may also lead and trail. `delim` should
    /// accept the empty string if tokens may touch each other.
    pub fn lexer<D: 'static>(self, delim: Parser<D, str>) -> Parser<Vec<Token<T>>, str> {
        delim.clone().optional().next(self.token().sep_end_by(delim))
    }
}

impl<T: 'static, V: fmt::Display + 'static> Parser<T, [Token<V>]> {
    /// Runs this token grammar over the tokens produced by `tokenizer`, with `delim`
    /// skipped between tokens.
    pub fn from<D: 'static>(
        self,
        tokenizer: Parser<V, str>,
        delim: Parser<D, str>,
    ) -> Parser<T, str> {
        self.from_lexer(tokenizer.lexer(delim))
    }

    /// Runs this token grammar over the tokens produced by `lexer`. The lexer must
    /// consume the whole input and the grammar must consume every token.
    pub fn from_lexer(self, lexer: Parser<Vec<Token<V>>, str>) -> Parser<T, str> {
        Parser::new(move |ctx| {
            let touched_before = ctx.touched_end();
            let saved = ctx.save_failures();
            let tokens = ctx.lexing(|ctx| {
                let tokens = lexer.apply(ctx)?;
                if ctx.is_eof() {
                    ctx.touch_end();
                    Ok(tokens)
                } else {
                    ctx.missing(crate::error::EOF);
                    Err(Fail::Mismatch)
                }
            })?;
            // Failed token attempts of a successful lexer do not count.
            ctx.restore_failures(saved);
            let mut nested = ParseContext::new(tokens.as_slice(), ctx.source(), ctx.module());
            nested.put_trace(ctx.take_trace());
            let outcome = self.run_to_end(&mut nested);
            ctx.put_trace(nested.take_trace());
            match outcome {
                Ok(value) => {
                    ctx.absorb_touched_end(&nested);
                    Ok(value)
                }
                Err(fail) => {
                    // A mismatch before the last token stands whatever text follows.
                    let settled = matches!(fail, Fail::Mismatch | Fail::Cut)
                        && !nested.touched_end()
                        && nested.failure_position() + 1 < tokens.len();
                    ctx.adopt_failure(&nested);
                    if settled {
                        ctx.reset_touched_end(touched_before);
                    }
                    Err(fail)
                }
            }
        })
    }
}
