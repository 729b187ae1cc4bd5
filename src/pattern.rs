//! Character pattern engine
//!
//!     A Pattern answers a single question: how many bytes of `src[begin..end]`, starting at
//!     `begin`, does it match. The answer is either a length or a mismatch. Patterns are pure
//!     values: the same pattern over the same range always gives the same answer, they hold no
//!     state, and they are composed into bigger patterns rather than mutated.
//!
//!     Patterns sit below the parser layer. Scanners (see [scanners](crate::parser::scanners))
//!     wrap a pattern with an error label to turn it into a `Parser<(), str>`.
//!
//! Repetition
//!
//!     Every repeating combinator stops as soon as its sub-pattern matches zero characters.
//!     `many(optional(x))` therefore terminates on any input instead of spinning in place.
//!
//! Resumable Scanning
//!
//!     Besides the plain [Pattern::matches] contract, a pattern can be run through
//!     [Pattern::scan], which additionally reports whether the answer depended on the end of
//!     the buffer. A pattern that wanted to look past `end` cannot be trusted on a buffer that
//!     may still grow, so the scan returns [Scan::NeedMore] instead. The incremental lexer
//!     and parser are built on this signal.

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

pub mod chars;
pub mod literals;

pub use chars::CharPredicate;

/// Outcome of a resumable scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    Matched(usize),
    Mismatch,
    /// The match ran into the end of a buffer that is not final.
    NeedMore,
}

/// The range a pattern runs over, plus a flag recording whether any
/// primitive tried to read at or past `end`.
pub struct PatternInput<'a> {
    src: &'a str,
    end: usize,
    touched_end: Cell<bool>,
}

impl<'a> PatternInput<'a> {
    /// `end` is clamped to the source and floored to a character boundary.
    pub(crate) fn new(src: &'a str, end: usize) -> Self {
        let mut end = end.min(src.len());
        while !src.is_char_boundary(end) {
            end -= 1;
        }
        PatternInput {
            src,
            end,
            touched_end: Cell::new(false),
        }
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// The character at `pos`, or `None` (and the end is marked as touched) at the end.
    pub fn char_at(&self, pos: usize) -> Option<char> {
        if pos >= self.end {
            self.touch_end();
            return None;
        }
        self.src.get(pos..self.end).and_then(|rest| rest.chars().next())
    }

    /// Remaining text from `pos` to the end of the range. Does not mark the end as touched.
    pub fn rest(&self, pos: usize) -> &'a str {
        self.src.get(pos..self.end).unwrap_or("")
    }

    /// The whole source text up to the end of the range.
    pub fn text(&self) -> &'a str {
        self.src.get(..self.end).unwrap_or("")
    }

    pub fn touch_end(&self) {
        self.touched_end.set(true);
    }

    /// Whether a match may start at `begin`: inside the range and on a character boundary.
    fn starts_at(&self, begin: usize) -> bool {
        begin <= self.end && self.src.is_char_boundary(begin)
    }

    pub(crate) fn touched_end(&self) -> bool {
        self.touched_end.get()
    }
}

type MatchFn = dyn Fn(&PatternInput<'_>, usize) -> Option<usize> + Send + Sync;

/// A pure character matcher.
#[derive(Clone)]
pub struct Pattern {
    run: Arc<MatchFn>,
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pattern")
    }
}

impl Pattern {
    /// Builds a pattern from a raw match function. The function receives the input and the
    /// start position and returns the matched length in bytes.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&PatternInput<'_>, usize) -> Option<usize> + Send + Sync + 'static,
    {
        Pattern { run: Arc::new(f) }
    }

    pub(crate) fn run(&self, input: &PatternInput<'_>, begin: usize) -> Option<usize> {
        (self.run)(input, begin)
    }

    /// Matches a prefix of `src[begin..end]`, returning the matched length or `None`.
    pub fn matches(&self, src: &str, begin: usize, end: usize) -> Option<usize> {
        let input = PatternInput::new(src, end);
        if !input.starts_at(begin) {
            return None;
        }
        self.run(&input, begin)
    }

    /// Like [Pattern::matches], but reports [Scan::NeedMore] when `is_final` is false and
    /// the outcome depended on the end of the buffer.
    pub fn scan(&self, src: &str, begin: usize, end: usize, is_final: bool) -> Scan {
        let input = PatternInput::new(src, end);
        if !input.starts_at(begin) {
            return Scan::Mismatch;
        }
        let result = self.run(&input, begin);
        if !is_final && input.touched_end() {
            return Scan::NeedMore;
        }
        match result {
            Some(len) => Scan::Matched(len),
            None => Scan::Mismatch,
        }
    }

    pub fn next(&self, then: &Pattern) -> Pattern {
        sequence([self.clone(), then.clone()])
    }

    pub fn or(&self, other: &Pattern) -> Pattern {
        or([self.clone(), other.clone()])
    }

    /// Matches zero or one occurrence.
    pub fn optional(&self) -> Pattern {
        let p = self.clone();
        Pattern::new(move |input, begin| Some(p.run(input, begin).unwrap_or(0)))
    }

    pub fn many(&self) -> Pattern {
        self.at_least(0)
    }

    pub fn many1(&self) -> Pattern {
        self.at_least(1)
    }

    /// Matches `min` occurrences, then as many more as possible.
    pub fn at_least(&self, min: usize) -> Pattern {
        let p = self.clone();
        Pattern::new(move |input, begin| {
            let mut at = begin;
            for _ in 0..min {
                at += p.run(input, at)?;
            }
            Some(at + repeat_up_to(&p, input, at, usize::MAX) - begin)
        })
    }

    /// Matches up to `max` occurrences.
    pub fn at_most(&self, max: usize) -> Pattern {
        let p = self.clone();
        Pattern::new(move |input, begin| Some(repeat_up_to(&p, input, begin, max)))
    }

    /// Matches exactly `n` occurrences.
    pub fn times(&self, n: usize) -> Pattern {
        self.repeat_between(n, n)
    }

    /// Matches between `min` and `max` occurrences, both inclusive.
    pub fn repeat_between(&self, min: usize, max: usize) -> Pattern {
        let p = self.clone();
        Pattern::new(move |input, begin| {
            let mut at = begin;
            for _ in 0..min {
                at += p.run(input, at)?;
            }
            Some(at + repeat_up_to(&p, input, at, max.saturating_sub(min)) - begin)
        })
    }

    /// Zero-width negative lookahead.
    pub fn not(&self) -> Pattern {
        let p = self.clone();
        Pattern::new(move |input, begin| match p.run(input, begin) {
            Some(_) => None,
            None => Some(0),
        })
    }

    /// Zero-width positive lookahead.
    pub fn peek(&self) -> Pattern {
        let p = self.clone();
        Pattern::new(move |input, begin| p.run(input, begin).map(|_| 0))
    }

    /// If `self` matches, continue with `consequence` after it; otherwise run
    /// `alternative` from the start position.
    pub fn ifelse(&self, consequence: &Pattern, alternative: &Pattern) -> Pattern {
        let (cond, then, otherwise) = (self.clone(), consequence.clone(), alternative.clone());
        Pattern::new(move |input, begin| match cond.run(input, begin) {
            Some(len) => then.run(input, begin + len).map(|rest| len + rest),
            None => otherwise.run(input, begin),
        })
    }
}

/// Repeatedly matches `p` from `begin`, at most `max` times, stopping on a mismatch
/// or a zero-length match. Returns the total length.
fn repeat_up_to(p: &Pattern, input: &PatternInput<'_>, begin: usize, max: usize) -> usize {
    let mut at = begin;
    let mut count = 0;
    while count < max {
        match p.run(input, at) {
            Some(len) if len > 0 => at += len,
            _ => break,
        }
        count += 1;
    }
    at - begin
}

/// Runs every pattern in order, each starting where the previous one ended.
pub fn sequence(patterns: impl IntoIterator<Item = Pattern>) -> Pattern {
    let patterns: Vec<Pattern> = patterns.into_iter().collect();
    Pattern::new(move |input, begin| {
        let mut at = begin;
        for p in &patterns {
            at += p.run(input, at)?;
        }
        Some(at - begin)
    })
}

/// First alternative that matches, tried left to right.
pub fn or(patterns: impl IntoIterator<Item = Pattern>) -> Pattern {
    let patterns: Vec<Pattern> = patterns.into_iter().collect();
    Pattern::new(move |input, begin| patterns.iter().find_map(|p| p.run(input, begin)))
}

/// The alternative with the longest match; the first listed wins ties.
pub fn longest(patterns: impl IntoIterator<Item = Pattern>) -> Pattern {
    let patterns: Vec<Pattern> = patterns.into_iter().collect();
    Pattern::new(move |input, begin| {
        patterns
            .iter()
            .filter_map(|p| p.run(input, begin))
            .fold(None, |best: Option<usize>, len| match best {
                Some(b) if b >= len => Some(b),
                _ => Some(len),
            })
    })
}

/// The alternative with the shortest match; the first listed wins ties.
pub fn shortest(patterns: impl IntoIterator<Item = Pattern>) -> Pattern {
    let patterns: Vec<Pattern> = patterns.into_iter().collect();
    Pattern::new(move |input, begin| {
        patterns
            .iter()
            .filter_map(|p| p.run(input, begin))
            .fold(None, |best: Option<usize>, len| match best {
                Some(b) if b <= len => Some(b),
                _ => Some(len),
            })
    })
}

pub fn always() -> Pattern {
    Pattern::new(|_, _| Some(0))
}

pub fn never() -> Pattern {
    Pattern::new(|_, _| None)
}

/// Exactly one character of any kind.
pub fn any_char() -> Pattern {
    Pattern::new(|input, begin| input.char_at(begin).map(char::len_utf8))
}

pub fn is_char(predicate: CharPredicate) -> Pattern {
    Pattern::new(move |input, begin| match input.char_at(begin) {
        Some(c) if predicate.test(c) => Some(c.len_utf8()),
        _ => None,
    })
}

/// Exactly `n` characters, all satisfying `predicate`.
pub fn chars_n(predicate: CharPredicate, n: usize) -> Pattern {
    is_char(predicate).times(n)
}

pub fn many_chars(predicate: CharPredicate) -> Pattern {
    Pattern::new(move |input, begin| Some(scan_chars(&predicate, input, begin)))
}

pub fn many1_chars(predicate: CharPredicate) -> Pattern {
    Pattern::new(move |input, begin| match scan_chars(&predicate, input, begin) {
        0 => None,
        len => Some(len),
    })
}

fn scan_chars(predicate: &CharPredicate, input: &PatternInput<'_>, begin: usize) -> usize {
    let mut at = begin;
    while let Some(c) = input.char_at(at) {
        if !predicate.test(c) {
            break;
        }
        at += c.len_utf8();
    }
    at - begin
}

pub fn string(expected: impl Into<String>) -> Pattern {
    let expected: String = expected.into();
    Pattern::new(move |input, begin| {
        let rest = input.rest(begin);
        if rest.starts_with(expected.as_str()) {
            Some(expected.len())
        } else {
            if expected.starts_with(rest) {
                input.touch_end();
            }
            None
        }
    })
}

pub fn string_case_insensitive(expected: impl Into<String>) -> Pattern {
    let expected: Vec<char> = expected.into().chars().collect();
    Pattern::new(move |input, begin| {
        let mut at = begin;
        for want in &expected {
            let c = input.char_at(at)?;
            if !c.to_lowercase().eq(want.to_lowercase()) {
                return None;
            }
            at += c.len_utf8();
        }
        Some(at - begin)
    })
}

/// One character, provided `excluded` does not start at this position.
pub fn not_string(excluded: impl Into<String>) -> Pattern {
    let guard = string(excluded);
    Pattern::new(move |input, begin| {
        let c = input.char_at(begin)?;
        match guard.run(input, begin) {
            Some(_) => None,
            None => Some(c.len_utf8()),
        }
    })
}

/// Zero-width; matches if at least `n` characters remain.
pub fn has_at_least(n: usize) -> Pattern {
    Pattern::new(move |input, begin| {
        if input.rest(begin).chars().count() >= n {
            Some(0)
        } else {
            input.touch_end();
            None
        }
    })
}

/// Matches the rest of the input if exactly `n` characters remain.
pub fn has_exact(n: usize) -> Pattern {
    Pattern::new(move |input, begin| {
        input.touch_end();
        let rest = input.rest(begin);
        (rest.chars().count() == n).then_some(rest.len())
    })
}

/// `start` followed by everything up to, not including, the next line feed.
pub fn line_comment(start: &str) -> Pattern {
    string(start).next(&many_chars(chars::not_char('\n')))
}

/// `open`, then anything, then `close`. Does not nest.
pub fn block_comment(open: &str, close: &str) -> Pattern {
    sequence([string(open), not_string(close).many(), string(close)])
}

/// A regular expression anchored at the start position.
pub fn regex(re: &str) -> Result<Pattern, regex::Error> {
    let re = regex::Regex::new(re)?;
    Ok(Pattern::new(move |input, begin| {
        let found = re
            .find_at(input.text(), begin)
            .filter(|m| m.start() == begin)
            .map(|m| m.len());
        if found.map_or(true, |len| begin + len == input.end()) {
            input.touch_end();
        }
        found
    }))
}
