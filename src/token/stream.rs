//! Token stream with a forward-only cursor
//!
//!     A `TokenStream` is the parser's whole view of the input: the visible tokens of one
//!     source, in order, plus the index of the next token to read.
//!
//!     Invariants:
//!         - `0 <= cursor <= len`
//!         - tokens are never modified after construction
//!         - the cursor only moves forward, and only through [`TokenStream::advance`], which
//!           the parser calls from its consuming operations
//!
//!     Re-tokenizing never mutates a stream; the parser replaces it wholesale.

use crate::source::{SourceFile, Span};
use crate::token::Token;

#[derive(Debug, Clone)]
pub struct TokenStream {
    source: SourceFile,
    tokens: Vec<Token>,
    cursor: usize,
}

impl TokenStream {
    pub fn new(source: SourceFile, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            cursor: 0,
        }
    }

    /// A stream over empty input.
    pub fn empty() -> Self {
        Self::new(SourceFile::new(""), Vec::new())
    }

    pub fn source(&self) -> &SourceFile {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Tokens not consumed yet.
    pub fn remaining(&self) -> &[Token] {
        &self.tokens[self.cursor..]
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    /// Token at `offset` positions past the cursor, if any.
    pub fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.cursor + offset)
    }

    pub fn current(&self) -> Option<&Token> {
        self.peek(0)
    }

    /// Span of the token at `offset` past the cursor, or the end-of-input span.
    pub fn span_at(&self, offset: usize) -> Span {
        match self.peek(offset) {
            Some(token) => self.source.span(token.range()),
            None => self.source.eof_span(),
        }
    }

    /// Move the cursor forward by `count` tokens, clamped to the end of the stream.
    pub(crate) fn advance(&mut self, count: usize) {
        debug_assert!(
            self.cursor + count <= self.tokens.len(),
            "cursor advanced past end of stream"
        );
        self.cursor = (self.cursor + count).min(self.tokens.len());
    }
}

impl Default for TokenStream {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenCategory;

    fn stream(source: &str, ranges: &[std::ops::Range<usize>]) -> TokenStream {
        let source = SourceFile::new(source);
        let tokens = ranges
            .iter()
            .map(|r| Token::from_source(TokenCategory::from_index(0), &source, r.clone()))
            .collect();
        TokenStream::new(source, tokens)
    }

    #[test]
    fn test_peek_and_advance() {
        let mut s = stream("a b c", &[0..1, 2..3, 4..5]);
        assert_eq!(s.peek(0).map(|t| t.text.as_str()), Some("a"));
        assert_eq!(s.peek(2).map(|t| t.text.as_str()), Some("c"));
        assert!(s.peek(3).is_none());

        s.advance(2);
        assert_eq!(s.cursor(), 2);
        assert_eq!(s.current().map(|t| t.text.as_str()), Some("c"));
        assert_eq!(s.remaining().len(), 1);
        assert!(!s.is_at_end());

        s.advance(1);
        assert!(s.is_at_end());
        assert!(s.current().is_none());
    }

    #[test]
    fn test_span_at_end_of_input() {
        let s = stream("ab\ncd", &[0..2]);
        let span = s.span_at(1);
        assert!(span.is_empty());
        assert_eq!((span.line, span.column), (2, 2));
    }

    #[test]
    fn test_empty_stream() {
        let s = TokenStream::empty();
        assert!(s.is_empty());
        assert!(s.is_at_end());
        assert_eq!(s.cursor(), 0);
    }
}
