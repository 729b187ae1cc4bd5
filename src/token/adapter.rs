//! Token lists from logos lexers
//!
//!     Grammars that already describe their tokens with `#[derive(Logos)]` do not need the
//!     combinator tokenizers at all: [tokenize] runs the logos lexer over the source and
//!     packs every match into a [Token] carrying the logos variant as payload. The result
//!     feeds straight into [Parser::parse_tokens](crate::parser::Parser::parse_tokens).

use logos::Logos;

use crate::error::ParseError;

use super::Token;

/// Lexes all of `source` with `L`. Stops at the first byte logos cannot match and
/// reports it as a lexical error.
pub fn tokenize<'s, L>(source: &'s str) -> Result<Vec<Token<L>>, ParseError>
where
    L: Logos<'s, Source = str>,
    L::Extras: Default,
{
    let mut lexer = L::lexer(source);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(value) => tokens.push(Token::new(span.start, span.len(), value)),
            Err(_) => return Err(ParseError::lexical(source, span.start, lexer.slice())),
        }
    }
    Ok(tokens)
}
