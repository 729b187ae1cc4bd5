//! Terminals
//!
//!     A [Terminals] value describes the fixed vocabulary of a language: its operators and
//!     its keywords. It provides the character-level tokenizer that recognizes them and the
//!     token-level parsers that match them by name.
//!
//!         let terms = Terminals::operators(["+", "-", "(", ")"]).keywords(["select", "from"]);
//!         let grammar = terms.term("select").next(identifier())
//!             .from(terms.tokenizer(), whitespaces().optional());
//!
//! Tokenization
//!
//!     The tokenizer applies maximal munch between the operator lexer and the word lexer.
//!     Operators are tried longest first, so "+=" is never lexed as "+" followed by "=". Words
//!     are matched with the word pattern (an identifier shape by default) and then looked up
//!     in the keyword table: a keyword becomes [Lexeme::Reserved], anything else
//!     [Lexeme::Identifier]. With case insensitive keywords, "SELECT" and "select" both lex
//!     to the keyword as declared.
//!
//!     Literals (strings, numbers) are not part of the vocabulary; combine the tokenizers in
//!     [literals] with [Terminals::tokenizer] using `or` or `longest`.
//!
//! Token Parsers
//!
//!     [Terminals::term] matches one reserved token. [Terminals::phrase] matches a run of
//!     them ("order by"). [Terminals::adjacent] matches an operator spelled as single-char
//!     tokens that must touch each other, for grammars that keep ">>" out of the operator
//!     list so that nested generics ("List<List<T>>") still lex as two ">".
//!
//!     The free functions ([identifier], [integer], ...) match one token of a fragment or
//!     literal kind and return its payload.

use std::collections::HashMap;
use std::sync::Arc;

use crate::parser::scanners::{self, pattern};
use crate::parser::tokens::token_where;
use crate::parser::{longest, or, Fail, Parser, TokenParser};
use crate::pattern::{literals::WORD, Pattern};
use crate::token::{Lexeme, Tag, Token};

pub mod literals;
pub mod operators;

pub use literals::{
    decimal_tokenizer, double_quote_string_tokenizer, identifier_tokenizer,
    integer_literal_tokenizer, integer_tokenizer, long_tokenizer, scientific_tokenizer,
    single_quote_char_tokenizer, single_quote_string_tokenizer,
};

/// Operators and keywords of a language.
#[derive(Debug, Clone)]
pub struct Terminals {
    /// In matching order, see [operators::sort].
    operators: Vec<String>,
    /// Lookup key (lowercased when case insensitive) to declared spelling.
    keywords: Arc<HashMap<String, String>>,
    case_insensitive: bool,
    words: Pattern,
}

impl Terminals {
    /// Starts a vocabulary with the given operators and no keywords.
    pub fn operators<S: AsRef<str>>(ops: impl IntoIterator<Item = S>) -> Self {
        let names: Vec<S> = ops.into_iter().collect();
        Terminals {
            operators: operators::sort(&names),
            keywords: Arc::new(HashMap::new()),
            case_insensitive: false,
            words: WORD.clone(),
        }
    }

    /// Sets the pattern words are lexed with.
    pub fn words(mut self, pattern: Pattern) -> Self {
        self.words = pattern;
        self
    }

    pub fn keywords<S: AsRef<str>>(self, words: impl IntoIterator<Item = S>) -> Self {
        self.with_keywords(words, false)
    }

    /// Keywords matched regardless of case. Tokens carry the spelling declared here.
    pub fn case_insensitive_keywords<S: AsRef<str>>(
        self,
        words: impl IntoIterator<Item = S>,
    ) -> Self {
        self.with_keywords(words, true)
    }

    fn with_keywords<S: AsRef<str>>(
        mut self,
        words: impl IntoIterator<Item = S>,
        case_insensitive: bool,
    ) -> Self {
        let mut table = HashMap::new();
        for word in words {
            let word = word.as_ref();
            table
                .entry(keyword_key(word, case_insensitive))
                .or_insert_with(|| word.to_string());
        }
        self.keywords = Arc::new(table);
        self.case_insensitive = case_insensitive;
        self
    }

    /// Operators in the order the tokenizer tries them.
    pub fn operator_names(&self) -> &[String] {
        &self.operators
    }

    /// Declared keywords, sorted.
    pub fn keyword_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.keywords.values().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// The token an operator or keyword named `name` lexes to.
    pub fn word(&self, name: &str) -> Option<Lexeme> {
        if self.operators.iter().any(|op| op == name) {
            return Some(Lexeme::Reserved(name.to_string()));
        }
        self.keywords
            .get(&keyword_key(name, self.case_insensitive))
            .map(|keyword| Lexeme::Reserved(keyword.clone()))
    }

    /// Character-level tokenizer for operators, keywords and identifiers.
    pub fn tokenizer(&self) -> Parser<Lexeme, str> {
        let operators = or(self
            .operators
            .iter()
            .map(|op| {
                let scanner = match single_char(op) {
                    Some(c) => scanners::is_char_lit(c),
                    None => scanners::string(op),
                };
                scanner.retn(Lexeme::Reserved(op.clone()))
            })
            .collect());
        let keywords = Arc::clone(&self.keywords);
        let case_insensitive = self.case_insensitive;
        let words = pattern(self.words.clone(), "word")
            .source()
            .map(move |word| match keywords.get(&keyword_key(&word, case_insensitive)) {
                Some(keyword) => Lexeme::Reserved(keyword.clone()),
                None => Lexeme::Identifier(word),
            });
        longest(vec![operators, words])
    }

    /// Matches one token reserved under any of `names`.
    pub fn token(&self, names: &[&str]) -> TokenParser<Token<Lexeme>, Lexeme> {
        or(names.iter().map(|name| self.term(name)).collect())
    }

    /// Matches the reserved token `name`, reporting `name` when it is missing.
    ///
    /// # Panics
    ///
    /// If `name` is neither an operator nor a keyword of this vocabulary. Use
    /// [Terminals::try_term] for names that are not known up front.
    pub fn term(&self, name: &str) -> TokenParser<Token<Lexeme>, Lexeme> {
        match self.try_term(name) {
            Some(parser) => parser,
            None => panic!("token {name} unavailable"),
        }
    }

    /// Like [Terminals::term], or `None` if `name` is not part of this vocabulary.
    pub fn try_term(&self, name: &str) -> Option<TokenParser<Token<Lexeme>, Lexeme>> {
        let reserved = self.word(name)?;
        Some(token_where(name, move |token: &Token<Lexeme>| {
            (reserved == token.value).then(|| token.clone())
        }))
    }

    /// Matches the reserved tokens `words` in a row, producing one token that spans them.
    pub fn phrase(&self, words: &[&str]) -> TokenParser<Token<Lexeme>, Lexeme> {
        let parts: Vec<_> = words.iter().map(|word| self.term(word)).collect();
        let joined = words.join(" ");
        let label = joined.clone();
        Parser::new(move |ctx| {
            let index = ctx.index();
            let mut end = index;
            for part in &parts {
                end = part.apply(ctx)?.end();
            }
            Ok(Token::new(
                index,
                end - index,
                Lexeme::Reserved(joined.clone()),
            ))
        })
        .label(label)
    }

    /// Matches `operator` spelled as one reserved token per character, with no gap between
    /// them. Produces one token spanning the whole operator.
    pub fn adjacent(&self, operator: &str) -> TokenParser<Token<Lexeme>, Lexeme> {
        let parts: Vec<_> = operator
            .chars()
            .map(|c| self.term(c.encode_utf8(&mut [0; 4])))
            .collect();
        let operator = operator.to_string();
        Parser::new(move |ctx| {
            let start = ctx.at();
            let index = ctx.index();
            let mut end = index;
            for (i, part) in parts.iter().enumerate() {
                let token = part.apply(ctx)?;
                if i > 0 && token.index != end {
                    ctx.set_at(start);
                    ctx.expected(operator.clone());
                    return Err(Fail::Mismatch);
                }
                end = token.end();
            }
            Ok(Token::new(
                index,
                end - index,
                Lexeme::Reserved(operator.clone()),
            ))
        })
    }
}

fn keyword_key(word: &str, case_insensitive: bool) -> String {
    if case_insensitive {
        word.to_lowercase()
    } else {
        word.to_string()
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Matches a fragment token tagged `tag` and returns its text.
pub fn fragment(tag: Tag, label: &str) -> TokenParser<String, Lexeme> {
    token_where(label, move |token: &Token<Lexeme>| match token.value.fragment() {
        Some((found, text)) if found == tag => Some(text.to_string()),
        _ => None,
    })
}

/// Any operator or keyword, as its text.
pub fn reserved() -> TokenParser<String, Lexeme> {
    fragment(Tag::Reserved, "reserved word")
}

pub fn identifier() -> TokenParser<String, Lexeme> {
    fragment(Tag::Identifier, "identifier")
}

/// Text of an [integer_tokenizer] token.
pub fn integer() -> TokenParser<String, Lexeme> {
    fragment(Tag::Integer, "integer")
}

/// Text of a [decimal_tokenizer] token.
pub fn decimal() -> TokenParser<String, Lexeme> {
    fragment(Tag::Decimal, "decimal number")
}

pub fn string_literal() -> TokenParser<String, Lexeme> {
    token_where("string literal", |token: &Token<Lexeme>| match &token.value {
        Lexeme::Str(text) => Some(text.clone()),
        _ => None,
    })
}

pub fn char_literal() -> TokenParser<char, Lexeme> {
    token_where("character literal", |token: &Token<Lexeme>| match token.value {
        Lexeme::Char(c) => Some(c),
        _ => None,
    })
}

/// Value of a [long_tokenizer] token.
pub fn long_literal() -> TokenParser<i64, Lexeme> {
    token_where("integer literal", |token: &Token<Lexeme>| match token.value {
        Lexeme::Long(n) => Some(n),
        _ => None,
    })
}

/// Radix and prefix-free digits of an [integer_literal_tokenizer] token.
pub fn integer_literal() -> TokenParser<(u32, String), Lexeme> {
    token_where("integer literal", |token: &Token<Lexeme>| match &token.value {
        Lexeme::IntegerLiteral { radix, text } => Some((*radix, text.clone())),
        _ => None,
    })
}

/// Significand and exponent of a [scientific_tokenizer] token.
pub fn scientific_literal() -> TokenParser<(String, String), Lexeme> {
    token_where(
        "scientific number literal",
        |token: &Token<Lexeme>| match &token.value {
            Lexeme::Scientific {
                significand,
                exponent,
            } => Some((significand.clone(), exponent.clone())),
            _ => None,
        },
    )
}
