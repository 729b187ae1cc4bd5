//! Repetition combinators
//!
//!     All repetition is driven by loops, not by recursion, so stack depth does not grow
//!     with the number of repetitions. A repetition stops as soon as its element succeeds
//!     without moving the cursor; the zero-width result is discarded and the loop ends.

use super::{Fail, Input, PResult, ParseContext, Parser};

/// Applies `parser` up to `max` more times, handing each result to `sink`. Stops at the
/// first mismatch (restoring the cursor) or the first success that consumed nothing.
fn repeat<T, I: ?Sized + Input>(
    parser: &Parser<T, I>,
    ctx: &mut ParseContext<'_, I>,
    max: usize,
    mut sink: impl FnMut(T),
) -> PResult<()> {
    let mut count = 0;
    while count < max {
        let before = ctx.at();
        let mark = ctx.tree_mark();
        match parser.apply(ctx) {
            Ok(value) => {
                if ctx.at() == before {
                    break;
                }
                sink(value);
            }
            Err(Fail::Mismatch) => {
                ctx.set_at(before);
                ctx.reset_tree(mark);
                break;
            }
            Err(fail) => return Err(fail),
        }
        count += 1;
    }
    Ok(())
}

impl<T: 'static, I: ?Sized + Input + 'static> Parser<T, I> {
    pub fn many(self) -> Parser<Vec<T>, I> {
        self.at_least(0)
    }

    pub fn many1(self) -> Parser<Vec<T>, I> {
        self.at_least(1)
    }

    /// At least `min` occurrences, then as many as possible.
    pub fn at_least(self, min: usize) -> Parser<Vec<T>, I> {
        self.times_between(min, usize::MAX)
    }

    /// Exactly `n` occurrences.
    pub fn times(self, n: usize) -> Parser<Vec<T>, I> {
        self.times_between(n, n)
    }

    /// Between `min` and `max` occurrences, both inclusive.
    pub fn times_between(self, min: usize, max: usize) -> Parser<Vec<T>, I> {
        Parser::new(move |ctx| {
            let mut items = Vec::new();
            for _ in 0..min {
                items.push(self.apply(ctx)?);
            }
            repeat(&self, ctx, max.saturating_sub(min), |item| items.push(item))?;
            Ok(items)
        })
    }

    pub fn skip_many(self) -> Parser<(), I> {
        self.skip_at_least(0)
    }

    pub fn skip_many1(self) -> Parser<(), I> {
        self.skip_at_least(1)
    }

    /// Like [Parser::at_least], without collecting the results.
    pub fn skip_at_least(self, min: usize) -> Parser<(), I> {
        Parser::new(move |ctx| {
            for _ in 0..min {
                self.apply(ctx)?;
            }
            repeat(&self, ctx, usize::MAX, drop)
        })
    }

    /// Zero or more occurrences separated by `delim`.
    pub fn sep_by<D: 'static>(self, delim: Parser<D, I>) -> Parser<Vec<T>, I> {
        self.separated(delim, 0, false)
    }

    /// One or more occurrences separated by `delim`.
    pub fn sep_by1<D: 'static>(self, delim: Parser<D, I>) -> Parser<Vec<T>, I> {
        self.separated(delim, 1, false)
    }

    /// Zero or more occurrences separated and optionally terminated by `delim`.
    pub fn sep_end_by<D: 'static>(self, delim: Parser<D, I>) -> Parser<Vec<T>, I> {
        self.separated(delim, 0, true)
    }

    /// One or more occurrences separated and optionally terminated by `delim`.
    pub fn sep_end_by1<D: 'static>(self, delim: Parser<D, I>) -> Parser<Vec<T>, I> {
        self.separated(delim, 1, true)
    }

    /// Zero or more occurrences, each terminated by `delim`.
    pub fn end_by<D: 'static>(self, delim: Parser<D, I>) -> Parser<Vec<T>, I> {
        self.followed_by(delim).many()
    }

    /// One or more occurrences, each terminated by `delim`.
    pub fn end_by1<D: 'static>(self, delim: Parser<D, I>) -> Parser<Vec<T>, I> {
        self.followed_by(delim).many1()
    }

    /// Occurrences of `self` up to, not including, the first match of `end`.
    pub fn until<E: 'static>(self, end: Parser<E, I>) -> Parser<Vec<T>, I> {
        end.clone()
            .not()
            .next(self)
            .many()
            .followed_by(end.peek())
    }

    fn separated<D: 'static>(
        self,
        delim: Parser<D, I>,
        min: usize,
        allow_trailing: bool,
    ) -> Parser<Vec<T>, I> {
        Parser::new(move |ctx| {
            let mut items = Vec::new();
            let start = ctx.at();
            match self.apply(ctx) {
                Ok(first) => items.push(first),
                Err(Fail::Mismatch) if min == 0 => {
                    ctx.set_at(start);
                    return Ok(items);
                }
                Err(fail) => return Err(fail),
            }
            loop {
                let before = ctx.at();
                match ctx.as_delimiter(|ctx| delim.apply(ctx)) {
                    Ok(_) => {}
                    Err(Fail::Mismatch) => {
                        ctx.set_at(before);
                        break;
                    }
                    Err(fail) => return Err(fail),
                }
                let after_delim = ctx.at();
                match self.apply(ctx) {
                    Ok(item) => {
                        if ctx.at() == before {
                            break;
                        }
                        items.push(item);
                    }
                    Err(Fail::Mismatch) => {
                        ctx.set_at(if allow_trailing { after_delim } else { before });
                        break;
                    }
                    Err(fail) => return Err(fail),
                }
            }
            Ok(items)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::scanners::{is_char_lit, string, whitespaces};
    use crate::error::ErrorKind;

    #[test]
    fn test_many_of_zero_width_terminates() {
        let p = string("x").optional().many();
        assert_eq!(p.parse("").unwrap().len(), 0);
        let q = string("a").many().many();
        assert_eq!(q.parse("aaa").unwrap(), vec![vec![(), (), ()]]);
    }

    #[test]
    fn test_many_long_input_does_not_grow_stack() {
        let input = "a".repeat(200_000);
        let p = is_char_lit('a').skip_many();
        assert!(p.parse(&input).is_ok());
    }

    #[test]
    fn test_counts() {
        let a = || is_char_lit('a');
        assert!(a().many1().parse("").is_err());
        assert_eq!(a().times(2).followed_by(a()).parse("aaa").unwrap().len(), 2);
        assert!(a().times(3).parse("aa").is_err());
        assert_eq!(a().times_between(1, 2).parse("aa").unwrap().len(), 2);
        assert!(a().times_between(1, 2).parse("aaa").is_err());
        assert!(a().skip_many1().parse("").is_err());
    }

    #[test]
    fn test_sep_by() {
        let item = string("x").source();
        let p = item.clone().sep_by(is_char_lit(','));
        assert_eq!(p.parse("").unwrap().len(), 0);
        assert_eq!(p.parse("x,x,x").unwrap().len(), 3);
        let err = p.parse("x,x,").unwrap_err();
        assert_eq!(err.index, 4);
        assert_eq!(err.expected, vec!["x"]);

        let q = item.sep_end_by1(is_char_lit(','));
        assert_eq!(q.parse("x,x,").unwrap().len(), 2);
        assert!(q.parse("").is_err());
    }

    #[test]
    fn test_delimiter_failures_are_weakest() {
        let p = string("x").sep_by1(is_char_lit(',')).followed_by(string(";"));
        let err = p.parse("x!").unwrap_err();
        assert_eq!(err.expected, vec![";"]);
        assert_eq!(err.kind, ErrorKind::Grammar);
    }

    #[test]
    fn test_end_by_and_until() {
        let p = string("x").end_by(is_char_lit(';'));
        assert_eq!(p.parse("x;x;").unwrap().len(), 2);
        let q = crate::parser::scanners::any_char()
            .until(string("*/"))
            .followed_by(string("*/"));
        assert_eq!(q.parse("ab*/").unwrap().len(), 2);
    }

    #[test]
    fn test_whitespace_separated_words() {
        let word = string("w").source();
        let p = word.sep_by(whitespaces());
        assert_eq!(p.parse("w w  w").unwrap().len(), 3);
    }
}
