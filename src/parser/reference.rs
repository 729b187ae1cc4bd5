//! Forward declarations for recursive grammars
//!
//!     Grammar rules are plain values, so a rule that refers to itself (or two rules that
//!     refer to each other) needs an indirection. A Reference is created empty, handed out
//!     through [Reference::lazy] wherever the rule is needed, and tied exactly once with
//!     [Reference::set] after every rule is defined.
//!
//!     Running a reference that was never tied is a grammar construction defect, not a
//!     mismatch: the run aborts with [ErrorKind::UnresolvedReference].
//!
//! Lifetime
//!
//!     Lazy parsers keep the reference's cell alive, so a rule can be returned from the
//!     function that built it while the Reference itself is dropped. A rule tied to a
//!     reference it contains is a reference cycle and is never freed. Build recursive
//!     grammars once and share them (parsers are `Send + Sync`) instead of rebuilding them
//!     for every input.

use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::error::ErrorKind;

use super::{Input, Parser};

pub struct Reference<T, I: ?Sized = str> {
    cell: Arc<OnceCell<Parser<T, I>>>,
}

impl<T, I: ?Sized> Clone for Reference<T, I> {
    fn clone(&self) -> Self {
        Reference {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: 'static, I: ?Sized + Input + 'static> Default for Reference<T, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static, I: ?Sized + Input + 'static> Reference<T, I> {
    pub fn new() -> Self {
        Reference {
            cell: Arc::new(OnceCell::new()),
        }
    }

    /// Ties the reference. A reference can only be tied once; a second parser is handed
    /// back unchanged.
    pub fn set(&self, parser: Parser<T, I>) -> Result<(), Parser<T, I>> {
        self.cell.set(parser)
    }

    pub fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }

    /// A parser that resolves the reference each time it runs. It holds the reference
    /// alive; see the module docs for the cycle this creates once tied.
    pub fn lazy(&self) -> Parser<T, I> {
        let cell = Arc::clone(&self.cell);
        Parser::new(move |ctx| match cell.get() {
            Some(parser) => parser.apply(ctx),
            None => Err(ctx.abort(
                ErrorKind::UnresolvedReference,
                "parser reference used before it was set",
                None,
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::scanners::{is_char_lit, string};
    use crate::parser::{or, sequence3};

    /// Balanced parentheses: `expr := '(' expr ')' | 'x'`, counting depth.
    fn nested() -> Parser<usize> {
        let expr: Reference<usize> = Reference::new();
        let parenthesized = sequence3(is_char_lit('('), expr.lazy(), is_char_lit(')'), |_, d, _| {
            d + 1
        });
        let rule = or(vec![parenthesized, string("x").retn(0)]);
        assert!(expr.set(rule.clone()).is_ok());
        rule
    }

    #[test]
    fn test_recursive_rule() {
        let p = nested();
        assert_eq!(p.parse("x").unwrap(), 0);
        assert_eq!(p.parse("(((x)))").unwrap(), 3);
        assert!(p.parse("((x)").is_err());
    }

    #[test]
    fn test_rule_outlives_its_reference() {
        let rule = {
            let r: Reference<()> = Reference::new();
            let lazy = r.lazy();
            assert!(r.set(string("a")).is_ok());
            lazy
        };
        assert!(rule.parse("a").is_ok());
    }

    #[test]
    fn test_set_only_once() {
        let r: Reference<()> = Reference::new();
        assert!(!r.is_set());
        assert!(r.set(string("a")).is_ok());
        assert!(r.is_set());
        assert!(r.set(string("b")).is_err());
        assert!(r.lazy().parse("a").is_ok());
    }

    #[test]
    fn test_unset_reference_is_distinct_from_mismatch() {
        let r: Reference<()> = Reference::new();
        let p = r.lazy().or(string("a"));
        let err = p.parse("a").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnresolvedReference);
    }
}
