//! Token-level primitives
//!
//!     Every token grammar bottoms out in [token_where]: look at the token under the cursor,
//!     accept it (and produce a value) or record `label` as missing.

use std::fmt;

use crate::token::Token;

use super::{Fail, TokenParser};

/// Accepts the current token if `accept` returns a value for it.
pub fn token_where<V, R, F>(label: impl Into<String>, accept: F) -> TokenParser<R, V>
where
    V: fmt::Display + 'static,
    R: 'static,
    F: Fn(&Token<V>) -> Option<R> + Send + Sync + 'static,
{
    let label: String = label.into();
    TokenParser::new(move |ctx| {
        let accepted = match ctx.input().get(ctx.at()) {
            Some(token) => accept(token),
            None => {
                ctx.touch_end();
                None
            }
        };
        match accepted {
            Some(value) => {
                ctx.advance(1);
                Ok(value)
            }
            None => {
                ctx.missing(label.clone());
                Err(Fail::Mismatch)
            }
        }
    })
}

/// Accepts any single token.
pub fn any_token<V>() -> TokenParser<Token<V>, V>
where
    V: Clone + fmt::Display + Send + Sync + 'static,
{
    token_where("any token", |token: &Token<V>| Some(token.clone()))
}

/// Accepts a token whose payload equals `value`, reported as `value`'s display form.
pub fn token_value<V>(value: V) -> TokenParser<Token<V>, V>
where
    V: Clone + PartialEq + fmt::Display + Send + Sync + 'static,
{
    let label = value.to_string();
    token_where(label, move |token: &Token<V>| {
        (token.value == value).then(|| token.clone())
    })
}
