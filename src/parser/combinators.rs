//! Free-standing parser constructors: choice, sequencing and the trivial parsers.

use super::{Fail, Input, Parser};

/// Always succeeds with `value`, consuming nothing.
pub fn constant<T, I>(value: T) -> Parser<T, I>
where
    T: Clone + Send + Sync + 'static,
    I: ?Sized + 'static,
{
    Parser::new(move |_| Ok(value.clone()))
}

/// Always fails, reporting `message`.
pub fn fail<T: 'static, I: ?Sized + Input + 'static>(message: impl Into<String>) -> Parser<T, I> {
    let message: String = message.into();
    Parser::new(move |ctx| {
        ctx.failure(message.clone());
        Err(Fail::Mismatch)
    })
}

/// Always fails, reporting "`name` expected".
pub fn expect<T: 'static, I: ?Sized + Input + 'static>(name: impl Into<String>) -> Parser<T, I> {
    let name: String = name.into();
    Parser::new(move |ctx| {
        ctx.expected(name.clone());
        Err(Fail::Mismatch)
    })
}

/// Always fails, reporting "unexpected `name`".
pub fn unexpected<T: 'static, I: ?Sized + Input + 'static>(
    name: impl Into<String>,
) -> Parser<T, I> {
    let name: String = name.into();
    Parser::new(move |ctx| {
        ctx.unexpected(name.clone());
        Err(Fail::Mismatch)
    })
}

/// Matches the end of the input.
pub fn eof<I: ?Sized + Input + 'static>() -> Parser<(), I> {
    Parser::new(|ctx| {
        if ctx.is_eof() {
            ctx.touch_end();
            Ok(())
        } else {
            ctx.missing(crate::error::EOF);
            Err(Fail::Mismatch)
        }
    })
}

/// The current byte index in the source text.
pub fn index<I: ?Sized + Input + 'static>() -> Parser<usize, I> {
    Parser::new(|ctx| Ok(ctx.index()))
}

/// Ordered choice: the first alternative that does not mismatch. The cursor is restored
/// before each alternative. Cuts and aborts are not retried.
pub fn or<T: 'static, I: ?Sized + Input + 'static>(alternatives: Vec<Parser<T, I>>) -> Parser<T, I> {
    Parser::new(move |ctx| {
        let start = ctx.at();
        let mark = ctx.tree_mark();
        for alternative in &alternatives {
            match alternative.apply(ctx) {
                Err(Fail::Mismatch) => {
                    ctx.set_at(start);
                    ctx.reset_tree(mark);
                }
                outcome => return outcome,
            }
        }
        Err(Fail::Mismatch)
    })
}

/// Runs every alternative from the same start and keeps the longest match. The first
/// listed alternative wins ties.
pub fn longest<T: 'static, I: ?Sized + Input + 'static>(
    alternatives: Vec<Parser<T, I>>,
) -> Parser<T, I> {
    best(alternatives, |candidate, best| candidate > best)
}

/// Runs every alternative from the same start and keeps the shortest match. The first
/// listed alternative wins ties.
pub fn shortest<T: 'static, I: ?Sized + Input + 'static>(
    alternatives: Vec<Parser<T, I>>,
) -> Parser<T, I> {
    best(alternatives, |candidate, best| candidate < best)
}

fn best<T: 'static, I: ?Sized + Input + 'static>(
    alternatives: Vec<Parser<T, I>>,
    better: fn(usize, usize) -> bool,
) -> Parser<T, I> {
    Parser::new(move |ctx| {
        let start = ctx.at();
        let mark = ctx.tree_mark();
        let mut winner: Option<(usize, T, Option<usize>)> = None;
        for alternative in &alternatives {
            ctx.set_at(start);
            ctx.reset_tree(mark);
            match alternative.apply(ctx) {
                Ok(value) => {
                    let end = ctx.at();
                    if winner.as_ref().map_or(true, |(best, ..)| better(end, *best)) {
                        winner = Some((end, value, ctx.tree_mark()));
                    }
                }
                Err(Fail::Mismatch) => {}
                Err(fail) => return Err(fail),
            }
        }
        match winner {
            Some((end, value, tree)) => {
                ctx.set_at(end);
                ctx.reset_tree(tree);
                Ok(value)
            }
            None => {
                ctx.set_at(start);
                ctx.reset_tree(mark);
                Err(Fail::Mismatch)
            }
        }
    })
}

macro_rules! sequence_fn {
    ($(#[$doc:meta])* $name:ident, $($p:ident => $v:ident : $t:ident),+) => {
        $(#[$doc])*
        pub fn $name<$($t: 'static,)+ R: 'static, I: ?Sized + Input + 'static, F>(
            $($p: Parser<$t, I>,)+
            f: F,
        ) -> Parser<R, I>
        where
            F: Fn($($t),+) -> R + Send + Sync + 'static,
        {
            Parser::new(move |ctx| {
                $(let $v = $p.apply(ctx)?;)+
                Ok(f($($v),+))
            })
        }
    };
}

sequence_fn!(
    /// Runs two parsers in order and combines their results.
    sequence2, p1 => v1: A, p2 => v2: B
);
sequence_fn!(
    /// Runs three parsers in order and combines their results.
    sequence3, p1 => v1: A, p2 => v2: B, p3 => v3: C
);
sequence_fn!(
    /// Runs four parsers in order and combines their results.
    sequence4, p1 => v1: A, p2 => v2: B, p3 => v3: C, p4 => v4: D
);
sequence_fn!(
    /// Runs five parsers in order and combines their results.
    sequence5, p1 => v1: A, p2 => v2: B, p3 => v3: C, p4 => v4: D, p5 => v5: E
);

#[cfg(test)]
mod tests {
    use super::super::scanners::{is_char_lit, string};
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_or_reports_all_alternatives() {
        let p = or(vec![string("select"), string("from")]);
        let err = p.parse("insert").unwrap_err();
        assert_eq!(err.expected, vec!["select", "from"]);
        assert_eq!(err.kind, ErrorKind::Ambiguity);
        assert_eq!(err.column, 1);
    }

    #[test]
    fn test_empty_or_never_matches() {
        assert!(or::<(), str>(vec![]).parse("").is_err());
    }

    #[test]
    fn test_longest_and_shortest_tie_break() {
        let alts = || {
            vec![
                string("ab").retn(1),
                string("abc").retn(2),
                string("ab").retn(3),
            ]
        };
        assert_eq!(longest(alts()).followed_by(string("d")).parse("abcd").unwrap(), 2);
        assert_eq!(shortest(alts()).followed_by(string("cd")).parse("abcd").unwrap(), 1);
        assert_eq!(longest(vec![string("ab").retn(1), string("ab").retn(2)]).parse("ab").unwrap(), 1);
    }

    #[test]
    fn test_sequences() {
        let digit = |c| is_char_lit(c).source();
        let p = sequence3(digit('1'), digit('2'), digit('3'), |a, b, c| a + &b + &c);
        assert_eq!(p.parse("123").unwrap(), "123");
        let p = sequence5(
            digit('1'),
            digit('2'),
            digit('3'),
            digit('4'),
            digit('5'),
            |a, b, c, d, e| [a, b, c, d, e].concat(),
        );
        assert_eq!(p.parse("12345").unwrap(), "12345");
        let err = p.parse("12x45").unwrap_err();
        assert_eq!(err.index, 2);
    }

    #[test]
    fn test_trivial_parsers() {
        assert_eq!(constant::<_, str>(7).parse("").unwrap(), 7);
        let err = fail::<(), str>("no way").parse("x").unwrap_err();
        assert_eq!(err.message.as_deref(), Some("no way"));
        let err = expect::<(), str>("thing").parse("x").unwrap_err();
        assert_eq!(err.expected, vec!["thing"]);
        let err = unexpected::<(), str>("x").parse("x").unwrap_err();
        assert_eq!(err.unexpected.as_deref(), Some("x"));
        assert!(eof::<str>().parse("").is_ok());
        assert_eq!(string("ab").next(index()).parse("ab").unwrap(), 2);
    }
}
