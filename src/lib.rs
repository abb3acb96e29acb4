//! # descent
//!
//! Runtime core for hand-written recursive-descent parsers.
//!
//! Grammar authors describe their token categories once, register virtual lexers that add
//! structural tokens (such as the [indentation lexer](lexing::indentation)), and write rules
//! as plain functions over a [Parser]. Every branch point is decided by a bounded lookahead
//! over precomputed [Decidable] paths, so the parser never backtracks; ambiguous decisions
//! are rejected while the grammar is assembled.
//!
//! Layers, bottom up:
//!
//!     - [source]: source text, positions and spans
//!     - [token]: token categories, tokens and the token stream
//!     - [grammar]: the category table, matchers and decision validation
//!     - [lexing]: the base scanner and the virtual lexer protocol
//!     - [parsing]: lookahead decisions and the combinator runtime
//!     - [diagnostics]: rendering errors with a source excerpt
//!     - [config]: loading grammars from TOML
//!
//! ## Testing
//!
//! Shared grammar fixtures live in the [testing] module.

pub mod config;
pub mod diagnostics;
pub mod grammar;
pub mod lexing;
pub mod parsing;
pub mod source;
pub mod testing;
pub mod token;

use thiserror::Error;

pub use diagnostics::{Diagnostic, DiagnosticSeverity};
pub use grammar::{CategoryDef, Grammar, GrammarBuilder, GrammarError, Matcher};
pub use lexing::{IndentationLexer, LexError, LexErrorKind};
pub use parsing::{
    Alternative, Choice, Decidable, LookaheadPath, ParseError, ParseErrorKind, ParseResult,
    Parser, Selection,
};
pub use source::{Position, SourceFile, Span};
pub use token::{CategorySet, Token, TokenCategory, TokenStream};

/// Any failure the crate can report.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Config(#[from] ::config::ConfigError),

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] Box<ParseError>),
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
