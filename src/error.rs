//! Parse diagnostics
//!
//!     A failed run produces exactly one [ParseError]. It describes the single furthest
//!     position the parser reached, with everything that was expected there, converted to
//!     a 1-based line and column.
//!
//! Error Kinds
//!
//!     Lex                   no tokenizer rule matched while lexing for a token grammar
//!     Grammar               a structural expectation was not met
//!     Ambiguity             several alternatives failed at the same furthest position
//!     SemanticMap           a result callback failed after its input matched
//!     UnresolvedReference   a parser reference was run before it was set
//!
//!     The first three are ordinary backtracking outcomes and only surface once the whole
//!     parse is out of alternatives. The last two abort the run as soon as they happen.
//!
//! Rendering
//!
//!     The Display form mirrors the classic layout:
//!
//!         (module) line 1, column 8:
//!         select or from expected, insert encountered.

use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

pub mod location;

pub use location::{Location, SourceLocator};

use crate::parser::trace::ParseTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    Lex,
    Grammar,
    Ambiguity,
    SemanticMap,
    UnresolvedReference,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Lex => "lexical error",
            ErrorKind::Grammar => "grammar error",
            ErrorKind::Ambiguity => "no alternative matched",
            ErrorKind::SemanticMap => "result mapping failed",
            ErrorKind::UnresolvedReference => "unresolved parser reference",
        };
        f.write_str(name)
    }
}

/// The diagnostic returned by every `parse` entry point.
#[derive(Debug, Clone, Serialize)]
pub struct ParseError {
    pub kind: ErrorKind,
    /// Byte index into the source text.
    pub index: usize,
    pub line: usize,
    pub column: usize,
    pub module: Option<String>,
    /// What would have been accepted at `index`, without duplicates.
    pub expected: Vec<String>,
    pub unexpected: Option<String>,
    /// Explicit failure message, if the failure came from `fail` or an aborted run.
    pub message: Option<String>,
    /// The character or token found at `index`, or `EOF`.
    pub encountered: String,
    /// Partial parse tree up to the failure, in debug runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_tree: Option<ParseTree>,
    #[serde(skip)]
    pub(crate) cause: Option<Arc<dyn Error + Send + Sync>>,
}

impl ParseError {
    pub(crate) fn new(kind: ErrorKind, index: usize, location: Location) -> Self {
        ParseError {
            kind,
            index,
            line: location.line,
            column: location.column,
            module: None,
            expected: Vec::new(),
            unexpected: None,
            message: None,
            encountered: String::from(EOF),
            parse_tree: None,
            cause: None,
        }
    }

    /// A lexical error at `index` of `source`, for tokenizers that run outside a parser.
    pub fn lexical(source: &str, index: usize, unexpected: impl Into<String>) -> Self {
        let location = SourceLocator::new(source).locate(index);
        let unexpected = unexpected.into();
        ParseError {
            encountered: unexpected.clone(),
            unexpected: Some(unexpected),
            ..ParseError::new(ErrorKind::Lex, index, location)
        }
    }

    pub fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }

    pub(crate) fn with_expected(mut self, expected: Vec<String>) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(expected.len());
        for item in expected {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        self.expected = unique;
        self
    }

    pub(crate) fn with_cause(mut self, cause: Arc<dyn Error + Send + Sync>) -> Self {
        self.cause = Some(cause);
        self
    }
}

pub(crate) const EOF: &str = "EOF";

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(module) = &self.module {
            write!(f, "({module}) ")?;
        }
        writeln!(f, "{}:", self.location())?;
        if let Some(message) = &self.message {
            write!(f, "{message}")
        } else if !self.expected.is_empty() {
            write_alternatives(f, &self.expected)?;
            write!(f, " expected, {} encountered.", self.encountered)
        } else if let Some(unexpected) = &self.unexpected {
            write!(f, "unexpected {unexpected}.")
        } else {
            write!(f, "{}.", self.kind)
        }
    }
}

/// `a`, `a or b`, `a, b or c`
fn write_alternatives(f: &mut fmt::Formatter<'_>, items: &[String]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            let separator = if i + 1 == items.len() { " or " } else { ", " };
            f.write_str(separator)?;
        }
        f.write_str(item)?;
    }
    Ok(())
}

/// Compares everything but the cause.
impl PartialEq for ParseError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.index == other.index
            && self.line == other.line
            && self.column == other.column
            && self.module == other.module
            && self.expected == other.expected
            && self.unexpected == other.unexpected
            && self.message == other.message
            && self.encountered == other.encountered
            && self.parse_tree == other.parse_tree
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause
            .as_ref()
            .map(|cause| cause.as_ref() as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_at(source: &str, index: usize) -> ParseError {
        ParseError::new(
            ErrorKind::Grammar,
            index,
            SourceLocator::new(source).locate(index),
        )
    }

    #[test]
    fn test_expected_list_rendering() {
        let mut err = error_at("select", 0).with_expected(vec![
            "a".to_string(),
            "b".to_string(),
            "a".to_string(),
            "c".to_string(),
        ]);
        err.encountered = "x".to_string();
        assert_eq!(err.expected, vec!["a", "b", "c"]);
        assert_eq!(
            err.to_string(),
            "line 1, column 1:\na, b or c expected, x encountered."
        );
    }

    #[test]
    fn test_module_prefix_and_message() {
        let mut err = error_at("ab\ncd", 4);
        err.module = Some("query.sql".to_string());
        err.message = Some("division by zero".to_string());
        assert_eq!(
            err.to_string(),
            "(query.sql) line 2, column 2:\ndivision by zero"
        );
    }

    #[test]
    fn test_lexical_error() {
        let err = ParseError::lexical("a $", 2, "$");
        assert_eq!(err.kind, ErrorKind::Lex);
        assert_eq!(err.location(), Location::new(1, 3));
        assert_eq!(err.to_string(), "line 1, column 3:\nunexpected $.");
    }

    #[test]
    fn test_cause_is_exposed_as_source() {
        let cause: Arc<dyn Error + Send + Sync> =
            Arc::new("12x".parse::<i64>().unwrap_err());
        let err = error_at("12x", 0).with_cause(cause);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_serializes_without_cause() {
        let err = error_at("x", 0).with_expected(vec!["y".to_string()]);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "Grammar");
        assert_eq!(json["expected"][0], "y");
        assert!(json.get("cause").is_none());
    }
}
