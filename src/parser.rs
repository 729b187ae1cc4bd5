//! Parser core
//!
//!     A [Parser] is an immutable combinator graph describing how to consume input and what
//!     value to build from it. Building the graph and running it are separate phases: a
//!     parser is built once, then run any number of times, from any number of threads. All
//!     state of a run lives in the [ParseContext] created for that run.
//!
//!     Parsers run either over text (`Parser<T, str>`, positions are byte offsets) or over a
//!     token list produced by a lexer (`TokenParser<T, V>`, positions are token indices).
//!     [Parser::from] bridges the two.
//!
//! Failure Outcomes
//!
//!     Running a parser yields `Ok(value)` or one of three failures:
//!
//!         Mismatch   the input did not match; enclosing choices may try something else
//!         Cut        an atomic parser failed after consuming input; choices do not retry
//!         Abort      a result callback failed or a reference was never set; the run ends
//!
//!     Ordered choice ([Parser::or], [or](combinators::or)) restores the cursor before
//!     every alternative, no matter how far the failed alternative got. [Parser::atomic]
//!     is the opt-in that turns such a late failure into a Cut.
//!
//!     What was expected where is not carried by the failure itself; primitives record it in
//!     the context, which keeps only the furthest position (see [context]).

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::error::{ErrorKind, ParseError, EOF};
use crate::token::Token;

pub mod combinators;
pub mod context;
pub mod lexing;
pub mod reference;
pub mod repetition;
pub mod scanners;
pub mod tokens;
pub mod trace;

pub use combinators::{
    constant, eof, expect, fail, index, longest, or, sequence2, sequence3, sequence4,
    sequence5, shortest, unexpected,
};
pub use context::{Input, ParseContext};
pub use reference::Reference;
pub use trace::ParseTree;

/// Why a parser did not produce a value.
#[derive(Debug)]
pub enum Fail {
    Mismatch,
    Cut,
    Abort(Box<ParseError>),
}

pub type PResult<T> = Result<T, Fail>;

/// A reusable, thread-safe parser producing `T` from input `I`.
pub struct Parser<T, I: ?Sized = str> {
    run: Arc<dyn Fn(&mut ParseContext<'_, I>) -> PResult<T> + Send + Sync>,
}

/// A parser over the tokens produced by a lexer.
pub type TokenParser<T, V> = Parser<T, [Token<V>]>;

impl<T, I: ?Sized> Clone for Parser<T, I> {
    fn clone(&self) -> Self {
        Parser {
            run: Arc::clone(&self.run),
        }
    }
}

impl<T, I: ?Sized> fmt::Debug for Parser<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Parser")
    }
}

impl<T, I: ?Sized> Parser<T, I> {
    /// Wraps a raw parse function. The function must leave the cursor after what it
    /// consumed on success; on failure the cursor position is unspecified.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut ParseContext<'_, I>) -> PResult<T> + Send + Sync + 'static,
    {
        Parser { run: Arc::new(f) }
    }

    pub fn apply(&self, ctx: &mut ParseContext<'_, I>) -> PResult<T> {
        (self.run)(ctx)
    }
}

impl<T: 'static, I: ?Sized + Input + 'static> Parser<T, I> {
    pub fn map<R: 'static, F>(self, f: F) -> Parser<R, I>
    where
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        Parser::new(move |ctx| self.apply(ctx).map(&f))
    }

    /// Like [Parser::map], but the callback may fail. A failure aborts the whole run with
    /// [ErrorKind::SemanticMap], keeping the callback's error as the source.
    pub fn try_map<R: 'static, E, F>(self, f: F) -> Parser<R, I>
    where
        E: Error + Send + Sync + 'static,
        F: Fn(T) -> Result<R, E> + Send + Sync + 'static,
    {
        Parser::new(move |ctx| {
            let start = ctx.at();
            let value = self.apply(ctx)?;
            f(value).map_err(|e| {
                ctx.set_at(start);
                ctx.abort(ErrorKind::SemanticMap, e.to_string(), Some(Arc::new(e)))
            })
        })
    }

    pub fn retn<R>(self, value: R) -> Parser<R, I>
    where
        R: Clone + Send + Sync + 'static,
    {
        self.map(move |_| value.clone())
    }

    /// Runs `self` then `next`, keeping both results.
    pub fn then<R: 'static>(self, next: Parser<R, I>) -> Parser<(T, R), I> {
        Parser::new(move |ctx| {
            let first = self.apply(ctx)?;
            let second = next.apply(ctx)?;
            Ok((first, second))
        })
    }

    /// Runs `self` then `next`, keeping the result of `next`.
    pub fn next<R: 'static>(self, next: Parser<R, I>) -> Parser<R, I> {
        Parser::new(move |ctx| {
            self.apply(ctx)?;
            next.apply(ctx)
        })
    }

    /// Runs `self` then `next`, keeping the result of `self`.
    pub fn followed_by<R: 'static>(self, next: Parser<R, I>) -> Parser<T, I> {
        Parser::new(move |ctx| {
            let value = self.apply(ctx)?;
            next.apply(ctx)?;
            Ok(value)
        })
    }

    pub fn between<A: 'static, B: 'static>(
        self,
        open: Parser<A, I>,
        close: Parser<B, I>,
    ) -> Parser<T, I> {
        open.next(self.followed_by(close))
    }

    pub fn or(self, other: Parser<T, I>) -> Parser<T, I> {
        combinators::or(vec![self, other])
    }

    /// `Some(value)` if `self` matches, `None` (with the cursor restored) if it mismatches.
    pub fn optional(self) -> Parser<Option<T>, I> {
        Parser::new(move |ctx| {
            let start = ctx.at();
            let mark = ctx.tree_mark();
            match self.apply(ctx) {
                Ok(value) => Ok(Some(value)),
                Err(Fail::Mismatch) => {
                    ctx.set_at(start);
                    ctx.reset_tree(mark);
                    Ok(None)
                }
                Err(fail) => Err(fail),
            }
        })
    }

    pub fn optional_or(self, default: T) -> Parser<T, I>
    where
        T: Clone + Send + Sync,
    {
        self.optional()
            .map(move |value| value.unwrap_or_else(|| default.clone()))
    }

    /// Zero-width negative lookahead, reporting whatever sits at the cursor as unexpected.
    pub fn not(self) -> Parser<(), I> {
        self.negate(None)
    }

    /// Zero-width negative lookahead, reporting `name` as unexpected.
    pub fn not_labeled(self, name: impl Into<String>) -> Parser<(), I> {
        self.negate(Some(name.into()))
    }

    fn negate(self, name: Option<String>) -> Parser<(), I> {
        Parser::new(move |ctx| {
            let start = ctx.at();
            let outcome = ctx.with_errors_suppressed(|ctx| self.apply(ctx));
            ctx.set_at(start);
            match outcome {
                Ok(_) => {
                    let name = name.clone().unwrap_or_else(|| ctx.describe_current());
                    ctx.unexpected(name);
                    Err(Fail::Mismatch)
                }
                Err(Fail::Mismatch | Fail::Cut) => Ok(()),
                Err(abort) => Err(abort),
            }
        })
    }

    /// Zero-width positive lookahead.
    pub fn peek(self) -> Parser<T, I> {
        Parser::new(move |ctx| {
            let start = ctx.at();
            let outcome = self.apply(ctx);
            ctx.set_at(start);
            match outcome {
                Err(Fail::Cut) => Err(Fail::Mismatch),
                other => other,
            }
        })
    }

    /// If `self` matches, continue with `consequence`; otherwise run `alternative` from
    /// where `self` started. Failures of the condition are not reported.
    pub fn if_else<R: 'static>(
        self,
        consequence: Parser<R, I>,
        alternative: Parser<R, I>,
    ) -> Parser<R, I> {
        Parser::new(move |ctx| {
            let start = ctx.at();
            match ctx.with_errors_suppressed(|ctx| self.apply(ctx)) {
                Ok(_) => consequence.apply(ctx),
                Err(Fail::Mismatch | Fail::Cut) => {
                    ctx.set_at(start);
                    alternative.apply(ctx)
                }
                Err(abort) => Err(abort),
            }
        })
    }

    /// Reports "`name` expected" at the start position when `self` mismatches, taking
    /// precedence over the lower-level expectations recorded there. In debug runs the
    /// labeled parser becomes a node of the parse tree.
    pub fn label(self, name: impl Into<String>) -> Parser<T, I> {
        let name: String = name.into();
        Parser::new(move |ctx| {
            let start = ctx.at();
            let node = ctx.enter_node(&name);
            let outcome = match self.apply(ctx) {
                Err(Fail::Mismatch) => {
                    ctx.set_at(start);
                    ctx.expected(name.clone());
                    Err(Fail::Mismatch)
                }
                other => other,
            };
            if let Some(previous) = node {
                let value = outcome
                    .is_ok()
                    .then(|| ctx.slice(start, ctx.at()).to_string());
                ctx.exit_node(previous, value);
            }
            outcome
        })
    }

    /// Forbids backtracking once input was consumed: a mismatch that happens after the
    /// cursor moved past the start becomes a [Fail::Cut].
    pub fn atomic(self) -> Parser<T, I> {
        Parser::new(move |ctx| {
            let start = ctx.at();
            match self.apply(ctx) {
                Err(Fail::Mismatch) if ctx.at() > start => Err(Fail::Cut),
                other => other,
            }
        })
    }

    /// The source text covered by the match, instead of its value.
    pub fn source(self) -> Parser<String, I> {
        Parser::new(move |ctx| {
            let start = ctx.at();
            self.apply(ctx)?;
            Ok(ctx.slice(start, ctx.at()).to_string())
        })
    }

    /// The value together with the source text it was parsed from.
    pub fn with_source(self) -> Parser<(T, String), I> {
        Parser::new(move |ctx| {
            let start = ctx.at();
            let value = self.apply(ctx)?;
            Ok((value, ctx.slice(start, ctx.at()).to_string()))
        })
    }

    /// Runs `self` and requires the whole input to be consumed.
    pub(crate) fn run_to_end(&self, ctx: &mut ParseContext<'_, I>) -> PResult<T> {
        let value = self.apply(ctx)?;
        if ctx.is_eof() {
            ctx.touch_end();
            Ok(value)
        } else {
            ctx.missing(EOF);
            Err(Fail::Mismatch)
        }
    }
}

impl<T: 'static> Parser<T, str> {
    /// Parses all of `source`.
    pub fn parse(&self, source: &str) -> Result<T, ParseError> {
        self.run_source(source, None).0
    }

    /// Parses all of `source`, naming `module` in diagnostics.
    pub fn parse_with_module(&self, source: &str, module: &str) -> Result<T, ParseError> {
        self.run_source(source, Some(module)).0
    }

    /// Parses all of `source` while recording a [ParseTree] of the labeled parsers. A
    /// failure carries the partial tree in [ParseError::parse_tree].
    pub fn parse_debug(&self, source: &str) -> Result<T, ParseError> {
        self.run_traced(source).map(|(value, _)| value)
    }

    /// Parses all of `source` and returns the tree of the labeled parsers that matched.
    pub fn parse_tree(&self, source: &str) -> Result<ParseTree, ParseError> {
        self.run_traced(source).map(|(_, tree)| tree)
    }

    fn run_traced(&self, source: &str) -> Result<(T, ParseTree), ParseError> {
        let mut ctx = ParseContext::new(source, source, None);
        ctx.enable_trace();
        match self.run_to_end(&mut ctx) {
            Ok(value) => Ok((value, ctx.finished_tree())),
            Err(fail) => Err(ctx.into_error(fail)),
        }
    }

    /// Parses all of `source` and also reports whether the outcome depended on the end of
    /// the text, i.e. whether more text could change it.
    pub(crate) fn run_source(
        &self,
        source: &str,
        module: Option<&str>,
    ) -> (Result<T, ParseError>, bool) {
        let mut ctx = ParseContext::new(source, source, module);
        let outcome = self.run_to_end(&mut ctx);
        let touched_end = ctx.touched_end();
        match outcome {
            Ok(value) => (Ok(value), touched_end),
            Err(fail) => (Err(ctx.into_error(fail)), touched_end),
        }
    }
}

impl<T: 'static, V: fmt::Display + 'static> Parser<T, [Token<V>]> {
    /// Parses a complete token list lexed from `source`.
    pub fn parse_tokens(&self, tokens: &[Token<V>], source: &str) -> Result<T, ParseError> {
        let mut ctx = ParseContext::new(tokens, source, None);
        match self.run_to_end(&mut ctx) {
            Ok(value) => Ok(value),
            Err(fail) => Err(ctx.into_error(fail)),
        }
    }
}
