//! Lexing pipeline
//!
//!     Lexing runs the grammar's base scanner with every registered virtual lexer layered on
//!     top of it, in registration order:
//!
//!         source text -> Scanner -> virtual lexer 1 -> ... -> virtual lexer n -> Tokens
//!
//!     Each stage is a [TokenSource] pulled by the stage above it. The top of the pipeline
//!     drops ignored categories, so [Tokens] yields exactly what the parser will see.
//!
//!     Lexing is lazy: nothing is scanned until a token is pulled, and the first error ends
//!     the sequence. [lex] collects the whole sequence into a [TokenStream].

pub mod base_tokenization;
pub mod common;
pub mod indentation;

pub use base_tokenization::Scanner;
pub use common::{LexError, LexErrorKind, LexerLayer, TokenSource, VirtualLexer};
pub use indentation::IndentationLexer;

use std::iter::FusedIterator;

use tracing::debug;

use crate::grammar::Grammar;
use crate::source::SourceFile;
use crate::token::{Token, TokenStream};

/// Visible tokens of one source, pulled through the grammar's lexing pipeline.
pub struct Tokens<'s> {
    source: Box<dyn TokenSource<'s> + 's>,
    grammar: &'s Grammar,
    done: bool,
}

impl<'s> Iterator for Tokens<'s> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.source.next_token() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(err));
                }
                Some(Ok(token)) if self.grammar.is_ignored(token.category) => continue,
                Some(Ok(token)) => return Some(Ok(token)),
            }
        }
    }
}

impl FusedIterator for Tokens<'_> {}

/// Start lexing `source` with `grammar`.
pub fn tokens<'s>(grammar: &'s Grammar, source: &'s SourceFile) -> Tokens<'s> {
    let mut pipeline: Box<dyn TokenSource<'s> + 's> =
        Box::new(Scanner::new(grammar.matchers(), source));
    for layer in grammar.layers() {
        pipeline = layer.wrap(pipeline);
    }
    Tokens {
        source: pipeline,
        grammar,
        done: false,
    }
}

/// Lex the whole of `source` into a stream ready for parsing.
pub fn lex(grammar: &Grammar, source: &SourceFile) -> Result<TokenStream, LexError> {
    let tokens = tokens(grammar, source).collect::<Result<Vec<_>, _>>()?;
    debug!(
        source = %source.display_name(),
        tokens = tokens.len(),
        "lexed source"
    );
    Ok(TokenStream::new(source.clone(), tokens))
}
