//! Per-run parser state
//!
//!     A ParseContext is created fresh for every top-level run and dropped when the run ends.
//!     It holds the cursor, the input being parsed (characters or tokens), the source text the
//!     input came from and the furthest-failure record.
//!
//! Furthest Failure
//!
//!     Every failing primitive reports what it wanted at the cursor position. The context
//!     keeps only the facts tied to the deepest position seen so far:
//!
//!         - a fact at a shallower position is ignored
//!         - a fact at a deeper position replaces everything recorded
//!         - at the same position, a stronger fact replaces weaker ones and facts of the
//!           same mergeable strength accumulate ("a or b expected")
//!
//!     Strength, weakest first: delimiting, unexpected, missing, expecting, failure. Only
//!     missing and expecting merge.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::error::{ErrorKind, ParseError, SourceLocator, EOF};
use crate::pattern::{Pattern, PatternInput};
use crate::token::Token;

use super::trace::{ParseTree, Trace};
use super::Fail;

const ROOT_NAME: &str = "root";

/// Something a parser can run over.
///
/// Positions are indices into the input: byte offsets for `str`, token indices for token
/// slices. Every position maps back to a byte index in the source text for diagnostics.
pub trait Input {
    /// One past the last position.
    fn end(&self) -> usize;

    /// Byte index in the source text where position `pos` starts.
    fn source_index(&self, pos: usize, source_len: usize) -> usize;

    /// Byte index in the source text where the element before `pos` ends.
    fn source_end(&self, pos: usize, source_len: usize) -> usize;

    /// Name of the element at `pos` for "X encountered" messages.
    fn describe_at(&self, pos: usize) -> String;
}

impl Input for str {
    fn end(&self) -> usize {
        self.len()
    }

    fn source_index(&self, pos: usize, _source_len: usize) -> usize {
        pos
    }

    fn source_end(&self, pos: usize, _source_len: usize) -> usize {
        pos
    }

    fn describe_at(&self, pos: usize) -> String {
        self.get(pos..)
            .and_then(|rest| rest.chars().next())
            .map_or_else(|| EOF.to_string(), |c| c.to_string())
    }
}

impl<V: fmt::Display> Input for [Token<V>] {
    fn end(&self) -> usize {
        self.len()
    }

    fn source_index(&self, pos: usize, source_len: usize) -> usize {
        self.get(pos).map_or(source_len, |token| token.index)
    }

    fn source_end(&self, pos: usize, _source_len: usize) -> usize {
        match pos.checked_sub(1).and_then(|prev| self.get(prev)) {
            Some(token) => token.end(),
            None => self.first().map_or(0, |token| token.index),
        }
    }

    fn describe_at(&self, pos: usize) -> String {
        self.get(pos)
            .map_or_else(|| EOF.to_string(), |token| token.value.to_string())
    }
}

/// Strength of a recorded failure fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub(crate) enum Level {
    #[default]
    None,
    Delimiting,
    Unexpected,
    Missing,
    Expecting,
    Failure,
}

impl Level {
    fn mergeable(self) -> bool {
        matches!(self, Level::Missing | Level::Expecting)
    }
}

/// The facts tied to the furthest failure position.
#[derive(Debug, Clone, Default)]
pub(crate) struct FailureRecord {
    pub(crate) at: usize,
    pub(crate) level: Level,
    pub(crate) items: Vec<String>,
    /// Set when the record was copied from a nested token-level run.
    pub(crate) encountered: Option<String>,
    /// Set when the facts were raised while lexing for a token grammar.
    pub(crate) lexical: bool,
    /// Parse tree node open when the facts were recorded, in traced runs.
    pub(crate) node: Option<usize>,
}

pub struct ParseContext<'a, I: ?Sized> {
    input: &'a I,
    source: &'a str,
    module: Option<&'a str>,
    at: usize,
    record: FailureRecord,
    suppressed: bool,
    delimiting: bool,
    lexing: bool,
    touched_end: bool,
    trace: Option<Trace>,
}

impl<'a, I: ?Sized + Input> ParseContext<'a, I> {
    pub(crate) fn new(input: &'a I, source: &'a str, module: Option<&'a str>) -> Self {
        Self::starting_at(input, source, module, 0)
    }

    pub(crate) fn starting_at(
        input: &'a I,
        source: &'a str,
        module: Option<&'a str>,
        at: usize,
    ) -> Self {
        ParseContext {
            input,
            source,
            module,
            at,
            record: FailureRecord {
                at,
                ..FailureRecord::default()
            },
            suppressed: false,
            delimiting: false,
            lexing: false,
            touched_end: false,
            trace: None,
        }
    }

    /// Current position in the input.
    pub fn at(&self) -> usize {
        self.at
    }

    /// Moves the cursor. Backtracking combinators use this to restore a saved position.
    pub fn set_at(&mut self, at: usize) {
        self.at = at;
    }

    pub fn advance(&mut self, n: usize) {
        self.at += n;
    }

    pub fn input(&self) -> &'a I {
        self.input
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn module(&self) -> Option<&'a str> {
        self.module
    }

    pub fn is_eof(&self) -> bool {
        self.at >= self.input.end()
    }

    /// Byte index in the source text of the current position.
    pub fn index(&self) -> usize {
        self.input.source_index(self.at, self.source.len())
    }

    /// Source text covered by the input positions `from..to`.
    pub fn slice(&self, from: usize, to: usize) -> &'a str {
        if to <= from {
            return "";
        }
        let len = self.source.len();
        let begin = self.input.source_index(from, len);
        let end = self.input.source_end(to, len);
        self.source.get(begin..end).unwrap_or("")
    }

    /// Records that a primitive needed to look at the end of the input. Only meaningful
    /// to incremental runs, where the end of the buffer is not the end of the text.
    pub fn touch_end(&mut self) {
        self.touched_end = true;
    }

    pub(crate) fn touched_end(&self) -> bool {
        self.touched_end
    }

    pub(crate) fn reset_touched_end(&mut self, touched: bool) {
        self.touched_end = touched;
    }

    /// Input position of the furthest failure recorded so far.
    pub(crate) fn failure_position(&self) -> usize {
        self.record.at
    }

    /// Name of what sits at the cursor, `EOF` at the end.
    pub fn describe_current(&self) -> String {
        self.input.describe_at(self.at)
    }

    /// Records that `what` was expected here. Used by labels.
    pub fn expected(&mut self, what: impl Into<String>) {
        self.raise(Level::Expecting, what.into());
    }

    /// Records that a primitive element `what` is missing here.
    pub fn missing(&mut self, what: impl Into<String>) {
        self.raise(Level::Missing, what.into());
    }

    pub fn unexpected(&mut self, what: impl Into<String>) {
        self.raise(Level::Unexpected, what.into());
    }

    pub fn failure(&mut self, message: impl Into<String>) {
        self.raise(Level::Failure, message.into());
    }

    fn raise(&mut self, level: Level, subject: String) {
        if self.suppressed || self.at < self.record.at {
            return;
        }
        let level = if self.delimiting {
            Level::Delimiting
        } else {
            level
        };
        if self.at > self.record.at || level > self.record.level {
            self.record = FailureRecord {
                at: self.at,
                level,
                items: vec![subject],
                encountered: None,
                lexical: self.lexing,
                node: self.trace.as_ref().map(Trace::current),
            };
        } else if level == self.record.level && level.mergeable() {
            self.record.items.push(subject);
        }
    }

    pub(crate) fn save_failures(&self) -> FailureRecord {
        self.record.clone()
    }

    /// Forgets every failure fact recorded since `saved` was taken.
    pub(crate) fn restore_failures(&mut self, saved: FailureRecord) {
        self.record = saved;
    }

    /// Runs `f` without recording any failure facts.
    pub(crate) fn with_errors_suppressed<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let old = std::mem::replace(&mut self.suppressed, true);
        let result = f(self);
        self.suppressed = old;
        result
    }

    /// Runs `f` recording its failures at delimiting strength.
    pub(crate) fn as_delimiter<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let old = std::mem::replace(&mut self.delimiting, true);
        let result = f(self);
        self.delimiting = old;
        result
    }

    /// Runs `f` marking any failure it records as a lexical one.
    pub(crate) fn lexing<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let old = std::mem::replace(&mut self.lexing, true);
        let result = f(self);
        self.lexing = old;
        result
    }

    /// Builds an abort carrying a complete diagnostic at the current position.
    pub fn abort(
        &self,
        kind: ErrorKind,
        message: impl Into<String>,
        cause: Option<Arc<dyn Error + Send + Sync>>,
    ) -> Fail {
        let index = self.index();
        let mut error = ParseError::new(kind, index, SourceLocator::new(self.source).locate(index));
        error.module = self.module.map(str::to_string);
        error.message = Some(message.into());
        error.encountered = self.describe_current();
        if let Some(cause) = cause {
            error = error.with_cause(cause);
        }
        if let Some(trace) = &self.trace {
            error.parse_tree = Some(trace.partial_tree(trace.current(), index, false));
        }
        Fail::Abort(Box::new(error))
    }

    pub(crate) fn absorb_touched_end<J: ?Sized>(&mut self, nested: &ParseContext<'_, J>) {
        self.touched_end |= nested.touched_end;
    }

    /// Starts recording a parse tree rooted at the current position.
    pub(crate) fn enable_trace(&mut self) {
        self.trace = Some(Trace::new(ROOT_NAME, self.index()));
    }

    pub(crate) fn take_trace(&mut self) -> Option<Trace> {
        self.trace.take()
    }

    pub(crate) fn put_trace(&mut self, trace: Option<Trace>) {
        self.trace = trace;
    }

    /// Opens a tree node for a labeled parser. Returns what is needed to undo it, or `None`
    /// when the run is not traced. Tokenizers running for a token grammar are not traced.
    pub(crate) fn enter_node(&mut self, name: &str) -> Option<Option<usize>> {
        if self.lexing {
            return None;
        }
        let begin = self.index();
        let trace = self.trace.as_mut()?;
        let previous = trace.latest_child();
        trace.push(name, begin);
        Some(previous)
    }

    /// Closes the node opened by [ParseContext::enter_node]. A node without value failed
    /// and is unlinked from its parent.
    pub(crate) fn exit_node(&mut self, previous: Option<usize>, value: Option<String>) {
        let end = self.input.source_end(self.at, self.source.len());
        if let Some(trace) = self.trace.as_mut() {
            let failed = value.is_none();
            trace.pop(end, value);
            if failed {
                trace.set_latest_child(previous);
            }
        }
    }

    /// The last child of the open tree node, for choices that may need to drop the
    /// children added by a failed alternative.
    pub(crate) fn tree_mark(&self) -> Option<usize> {
        self.trace.as_ref().and_then(Trace::latest_child)
    }

    pub(crate) fn reset_tree(&mut self, mark: Option<usize>) {
        if let Some(trace) = self.trace.as_mut() {
            trace.set_latest_child(mark);
        }
    }

    /// The tree of a traced run that ended successfully at the cursor.
    pub(crate) fn finished_tree(&self) -> ParseTree {
        let end = self.input.source_end(self.at, self.source.len());
        let text = self.source.get(..end).unwrap_or("").to_string();
        match &self.trace {
            Some(trace) => trace.tree(end, text),
            None => Trace::new(ROOT_NAME, 0).tree(end, text),
        }
    }

    /// Turns the outcome of a failed run into the diagnostic returned to the caller.
    pub(crate) fn into_error(self, fail: Fail) -> ParseError {
        let record = match fail {
            Fail::Abort(error) => return *error,
            Fail::Mismatch | Fail::Cut => self.record,
        };
        let index = self.input.source_index(record.at, self.source.len());
        let location = SourceLocator::new(self.source).locate(index);
        let mut expected = Vec::new();
        let mut unexpected = None;
        let mut message = None;
        match record.level {
            Level::Failure => message = record.items.into_iter().next(),
            Level::Unexpected => unexpected = record.items.into_iter().next(),
            Level::Missing | Level::Expecting | Level::Delimiting => expected = record.items,
            Level::None => {}
        }
        let error = ParseError::new(ErrorKind::Grammar, index, location).with_expected(expected);
        let kind = if record.lexical {
            ErrorKind::Lex
        } else if error.expected.len() > 1 {
            ErrorKind::Ambiguity
        } else {
            ErrorKind::Grammar
        };
        let parse_tree = self
            .trace
            .as_ref()
            .map(|trace| trace.partial_tree(record.node.unwrap_or(trace.current()), index, true));
        ParseError {
            kind,
            module: self.module.map(str::to_string),
            parse_tree,
            unexpected,
            message,
            encountered: record
                .encountered
                .unwrap_or_else(|| self.input.describe_at(record.at)),
            ..error
        }
    }
}

impl<'a> ParseContext<'a, str> {
    /// Merges the failure record of a finished nested run over tokens lexed from this text.
    /// Positions are compared in source bytes and the usual furthest-failure rules apply.
    pub(crate) fn adopt_failure<J: ?Sized + Input>(&mut self, nested: &ParseContext<'_, J>) {
        self.touched_end |= nested.touched_end;
        let record = &nested.record;
        if self.suppressed || record.level == Level::None {
            return;
        }
        let at = nested.input.source_index(record.at, nested.source.len());
        let level = if self.delimiting {
            Level::Delimiting
        } else {
            record.level
        };
        if at < self.record.at {
            return;
        }
        if at > self.record.at || level > self.record.level {
            self.record = FailureRecord {
                at,
                level,
                items: record.items.clone(),
                encountered: Some(
                    record
                        .encountered
                        .clone()
                        .unwrap_or_else(|| nested.input.describe_at(record.at)),
                ),
                lexical: record.lexical,
                node: record.node,
            };
        } else if level == self.record.level && level.mergeable() {
            self.record.items.extend(record.items.iter().cloned());
        }
    }

    /// Runs `pattern` at the cursor without moving it.
    pub fn scan(&mut self, pattern: &Pattern) -> Option<usize> {
        let input = PatternInput::new(self.input, self.input.len());
        let result = pattern.run(&input, self.at);
        if input.touched_end() {
            self.touched_end = true;
        }
        result
    }

    /// The character at the cursor.
    pub fn peek_char(&mut self) -> Option<char> {
        let c = self.input.get(self.at..).and_then(|rest| rest.chars().next());
        if c.is_none() {
            self.touched_end = true;
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(src: &str) -> ParseContext<'_, str> {
        ParseContext::new(src, src, None)
    }

    #[test]
    fn test_shallower_facts_are_ignored() {
        let mut ctx = context("abcdef");
        ctx.set_at(3);
        ctx.missing("x");
        ctx.set_at(1);
        ctx.expected("y");
        let err = ctx.into_error(Fail::Mismatch);
        assert_eq!(err.index, 3);
        assert_eq!(err.expected, vec!["x"]);
    }

    #[test]
    fn test_same_position_merges_and_upgrades() {
        let mut ctx = context("abc");
        ctx.missing("a");
        ctx.missing("b");
        assert_eq!(ctx.record.items, vec!["a", "b"]);
        ctx.expected("thing");
        assert_eq!(ctx.record.items, vec!["thing"]);
        ctx.missing("c");
        assert_eq!(ctx.record.items, vec!["thing"]);
        ctx.unexpected("z");
        assert_eq!(ctx.record.level, Level::Expecting);
    }

    #[test]
    fn test_unexpected_does_not_merge() {
        let mut ctx = context("abc");
        ctx.unexpected("a");
        ctx.unexpected("b");
        let err = ctx.into_error(Fail::Mismatch);
        assert_eq!(err.unexpected.as_deref(), Some("a"));
        assert_eq!(err.kind, ErrorKind::Grammar);
    }

    #[test]
    fn test_suppressed_and_delimiting() {
        let mut ctx = context("abc");
        ctx.with_errors_suppressed(|ctx| ctx.missing("hidden"));
        assert_eq!(ctx.record.level, Level::None);
        ctx.as_delimiter(|ctx| ctx.missing(","));
        assert_eq!(ctx.record.level, Level::Delimiting);
        ctx.missing("x");
        assert_eq!(ctx.record.items, vec!["x"]);
    }

    #[test]
    fn test_kind_derivation() {
        let mut ctx = context("abc");
        ctx.missing("a");
        ctx.missing("b");
        assert_eq!(ctx.into_error(Fail::Mismatch).kind, ErrorKind::Ambiguity);

        let mut ctx = context("abc");
        ctx.lexing(|ctx| ctx.missing("digit"));
        assert_eq!(ctx.into_error(Fail::Cut).kind, ErrorKind::Lex);
    }

    #[test]
    fn test_token_input_maps_positions() {
        let tokens = vec![Token::new(2, 3, "foo"), Token::new(6, 1, "+")];
        let input: &[Token<&str>] = &tokens;
        assert_eq!(input.source_index(1, 10), 6);
        assert_eq!(input.source_index(2, 10), 10);
        assert_eq!(input.source_end(1, 10), 5);
        assert_eq!(input.source_end(0, 10), 2);
        assert_eq!(input.describe_at(0), "foo");
        assert_eq!(input.describe_at(5), "EOF");
    }
}
