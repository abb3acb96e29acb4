//! Common lexer module
//!
//! This module contains the error type and the interfaces shared by the base scanner and
//! every virtual lexer.

use thiserror::Error;

use crate::grammar::{CategoryDef, CategoryTable, GrammarError};
use crate::source::{SourceFile, Span};
use crate::token::Token;

/// Errors that can occur during lexing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {span}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    /// A line is indented more than one level deeper than the previous one.
    #[error("indentation increased by more than one level (depth {depth}, found {found})")]
    IndentationJump { depth: usize, found: usize },

    /// A tab run at the start of a line follows spaces.
    #[error("tab indentation after leading spaces")]
    MisplacedTab,

    /// No category matches the input at this position.
    #[error("unrecognized input `{text}`")]
    UnrecognizedInput { text: String },
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Whether this is one of the malformed-indentation errors.
    pub fn is_indentation(&self) -> bool {
        matches!(
            self.kind,
            LexErrorKind::IndentationJump { .. } | LexErrorKind::MisplacedTab
        )
    }
}

/// A pull-based producer of tokens over one source.
///
/// This is the virtual lexer protocol: the base scanner implements it, and every virtual
/// lexer implements it by wrapping the source below it. A source yields a finite sequence
/// and cannot be restarted; once it has yielded an error it yields nothing more.
pub trait TokenSource<'s> {
    /// The text being lexed.
    fn source(&self) -> &'s SourceFile;

    /// Byte offset of the next unread character.
    fn offset(&self) -> usize;

    /// Skip raw input up to `offset`. Never moves backwards.
    fn advance_to(&mut self, offset: usize);

    /// Produce the next token, ignored categories included.
    fn next_token(&mut self) -> Option<Result<Token, LexError>>;
}

/// A virtual lexer as registered on a grammar builder.
pub trait VirtualLexer: Send + Sync {
    /// Categories this lexer adds to the grammar.
    fn categories(&self) -> Vec<CategoryDef>;

    /// Resolve the lexer's categories against the final table.
    fn bind(&self, table: &CategoryTable) -> Result<Box<dyn LexerLayer>, GrammarError>;
}

/// A virtual lexer bound to a grammar, ready to be layered over a token source.
pub trait LexerLayer: Send + Sync {
    fn wrap<'s>(&'s self, inner: Box<dyn TokenSource<'s> + 's>) -> Box<dyn TokenSource<'s> + 's>;
}
