//! Operator precedence
//!
//!     An [OperatorTable] turns an operand parser plus a list of declared operators into one
//!     expression parser. Each operator is a parser producing the function that combines its
//!     operands, tagged with a precedence and a fixity.
//!
//!         OperatorTable::new()
//!             .infixl(terms.term("+").retn(binary(|a, b| a + b)), 10)
//!             .infixl(terms.term("*").retn(binary(|a, b| a * b)), 20)
//!             .prefix(terms.term("-").retn(unary(|a: i64| -a)), 50)
//!             .build(number)
//!
//!     Operators are grouped by (precedence, fixity). Groups are layered around the operand
//!     from the highest precedence outwards, so every layer parses operands of the layer
//!     inside it. Within a precedence, the fixities are layered prefix, postfix, left, none,
//!     right, innermost first.
//!
//!         prefix       op* operand                  applied innermost first
//!         postfix      operand op*                  applied left to right
//!         infixl       operand (op operand)*        folded to the left
//!         infixr       operand (op operand)*        folded to the right
//!         infixn       operand (op operand)?        a second op at the same layer fails
//!
//!     The layering methods are also available on [Parser] directly for hand-built grammars.

use std::cmp::Reverse;
use std::fmt;
use std::sync::Arc;

use crate::parser::{or, Input, Parser};

/// Function produced by a prefix or postfix operator.
pub type UnaryOp<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

/// Function produced by an infix operator.
pub type BinaryOp<T> = Arc<dyn Fn(T, T) -> T + Send + Sync>;

pub fn unary<T>(f: impl Fn(T) -> T + Send + Sync + 'static) -> UnaryOp<T> {
    Arc::new(f)
}

pub fn binary<T>(f: impl Fn(T, T) -> T + Send + Sync + 'static) -> BinaryOp<T> {
    Arc::new(f)
}

/// Where an operator sits relative to its operands. The declaration order is the order in
/// which equal-precedence layers are nested, innermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fixity {
    Prefix,
    Postfix,
    InfixLeft,
    InfixNone,
    InfixRight,
}

enum OperatorParser<T, I: ?Sized> {
    Unary(Parser<UnaryOp<T>, I>),
    Binary(Parser<BinaryOp<T>, I>),
}

struct Operator<T, I: ?Sized> {
    precedence: i32,
    fixity: Fixity,
    parser: OperatorParser<T, I>,
}

/// Declared operators, compiled to an expression parser by [OperatorTable::build].
pub struct OperatorTable<T, I: ?Sized = str> {
    operators: Vec<Operator<T, I>>,
}

impl<T, I: ?Sized> Default for OperatorTable<T, I> {
    fn default() -> Self {
        OperatorTable {
            operators: Vec::new(),
        }
    }
}

impl<T, I: ?Sized> fmt::Debug for OperatorTable<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.operators.iter().map(|op| (op.precedence, op.fixity)))
            .finish()
    }
}

impl<T: 'static, I: ?Sized + Input + 'static> OperatorTable<T, I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(self, op: Parser<UnaryOp<T>, I>, precedence: i32) -> Self {
        self.with(precedence, Fixity::Prefix, OperatorParser::Unary(op))
    }

    pub fn postfix(self, op: Parser<UnaryOp<T>, I>, precedence: i32) -> Self {
        self.with(precedence, Fixity::Postfix, OperatorParser::Unary(op))
    }

    /// Left associative: `a - b - c` is `(a - b) - c`.
    pub fn infixl(self, op: Parser<BinaryOp<T>, I>, precedence: i32) -> Self {
        self.with(precedence, Fixity::InfixLeft, OperatorParser::Binary(op))
    }

    /// Right associative: `a = b = c` is `a = (b = c)`.
    pub fn infixr(self, op: Parser<BinaryOp<T>, I>, precedence: i32) -> Self {
        self.with(precedence, Fixity::InfixRight, OperatorParser::Binary(op))
    }

    /// Non associative: `a == b == c` is rejected.
    pub fn infixn(self, op: Parser<BinaryOp<T>, I>, precedence: i32) -> Self {
        self.with(precedence, Fixity::InfixNone, OperatorParser::Binary(op))
    }

    fn with(mut self, precedence: i32, fixity: Fixity, parser: OperatorParser<T, I>) -> Self {
        self.operators.push(Operator {
            precedence,
            fixity,
            parser,
        });
        self
    }

    /// Builds the expression parser around `operand`.
    pub fn build(mut self, operand: Parser<T, I>) -> Parser<T, I> {
        self.operators
            .sort_by_key(|op| (Reverse(op.precedence), op.fixity));
        let mut expr = operand;
        let mut rest = self.operators.as_slice();
        while let Some(first) = rest.first() {
            let len = rest
                .iter()
                .take_while(|op| op.precedence == first.precedence && op.fixity == first.fixity)
                .count();
            let (group, tail) = rest.split_at(len);
            expr = layer(expr, first.fixity, group);
            rest = tail;
        }
        expr
    }
}

/// Wraps `operand` with one layer of equal (precedence, fixity) operators.
fn layer<T: 'static, I: ?Sized + Input + 'static>(
    operand: Parser<T, I>,
    fixity: Fixity,
    group: &[Operator<T, I>],
) -> Parser<T, I> {
    let unary = || {
        or(group
            .iter()
            .filter_map(|op| match &op.parser {
                OperatorParser::Unary(p) => Some(p.clone()),
                OperatorParser::Binary(_) => None,
            })
            .collect())
    };
    let binary = || {
        or(group
            .iter()
            .filter_map(|op| match &op.parser {
                OperatorParser::Binary(p) => Some(p.clone()),
                OperatorParser::Unary(_) => None,
            })
            .collect())
    };
    match fixity {
        Fixity::Prefix => operand.prefix(unary()),
        Fixity::Postfix => operand.postfix(unary()),
        Fixity::InfixLeft => operand.infixl(binary()),
        Fixity::InfixNone => operand.infixn(binary()),
        Fixity::InfixRight => operand.infixr(binary()),
    }
}

impl<T: 'static, I: ?Sized + Input + 'static> Parser<T, I> {
    /// Any number of prefix operators before `self`; the one nearest the operand applies
    /// first.
    pub fn prefix(self, op: Parser<UnaryOp<T>, I>) -> Parser<T, I> {
        op.many()
            .then(self)
            .map(|(ops, operand)| ops.into_iter().rev().fold(operand, |acc, f| f(acc)))
    }

    /// Any number of postfix operators after `self`, applied left to right.
    pub fn postfix(self, op: Parser<UnaryOp<T>, I>) -> Parser<T, I> {
        self.then(op.many())
            .map(|(operand, ops)| ops.into_iter().fold(operand, |acc, f| f(acc)))
    }

    pub fn infixl(self, op: Parser<BinaryOp<T>, I>) -> Parser<T, I> {
        self.clone()
            .then(op.then(self).many())
            .map(|(first, rest)| rest.into_iter().fold(first, |acc, (f, rhs)| f(acc, rhs)))
    }

    pub fn infixr(self, op: Parser<BinaryOp<T>, I>) -> Parser<T, I> {
        self.clone()
            .then(op.then(self).many())
            .map(|(first, rest)| fold_right(first, rest))
    }

    /// At most one application of `op`; a second one directly after is reported as
    /// unexpected.
    pub fn infixn(self, op: Parser<BinaryOp<T>, I>) -> Parser<T, I> {
        self.clone()
            .then(op.clone().then(self).optional())
            .followed_by(op.not())
            .map(|(lhs, rest)| match rest {
                Some((f, rhs)) => f(lhs, rhs),
                None => lhs,
            })
    }
}

fn fold_right<T>(first: T, rest: Vec<(BinaryOp<T>, T)>) -> T {
    let mut pending = rest.into_iter().rev();
    let Some((mut op, mut acc)) = pending.next() else {
        return first;
    };
    for (prev_op, operand) in pending {
        acc = op(operand, acc);
        op = prev_op;
    }
    op(first, acc)
}
