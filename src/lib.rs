//! # parsec
//!
//! Parser combinators with ordered-choice backtracking, labeled error reporting, operator
//! precedence tables and an indentation-aware lexing layer.
//!
//! ## Layers
//!
//! - [pattern]: pure character-level recognizers that report a match length. No errors, no
//!   values; the building blocks of scanners.
//! - [parser]: the combinator core. A [Parser] consumes text or a token list and produces a
//!   value, recording what was expected at the furthest position reached.
//! - [terminals] and [token]: operator/keyword vocabularies, literal tokenizers and the
//!   token-level parsers that match them. [Parser::from] runs a token grammar on top of a
//!   character-level tokenizer.
//! - [operator_table]: expression parsers from declared prefix, postfix and infix operators.
//! - [indentation]: INDENT / OUTDENT pseudo-tokens for layout-sensitive languages.
//! - [incremental]: lexing and parsing of input that arrives in pieces.
//! - [config]: vocabularies loaded from YAML or JSON.
//!
//! ## Errors
//!
//! Every run ends in a value or a [ParseError] carrying the position, the expected labels
//! and an [ErrorKind] telling lexical, grammatical, ambiguous and semantic failures apart.
//! [Parser::parse_debug] and [Parser::parse_tree] additionally record the labeled parsers
//! as a [ParseTree], complete or cut at the failure.

pub mod config;
pub mod error;
pub mod incremental;
pub mod indentation;
pub mod operator_table;
pub mod parser;
pub mod pattern;
pub mod terminals;
pub mod token;

pub use config::{ConfigError, GrammarRegistry, TerminalsConfig};
pub use error::{ErrorKind, Location, ParseError, SourceLocator};
pub use incremental::{IncrementalLexer, IncrementalParser, Progress};
pub use indentation::{Indentation, IndentationError};
pub use operator_table::{binary, unary, BinaryOp, Fixity, OperatorTable, UnaryOp};
pub use parser::{ParseTree, Parser, Reference, TokenParser};
pub use pattern::{CharPredicate, Pattern, Scan};
pub use terminals::Terminals;
pub use token::{tokenize, Lexeme, Tag, Token};
