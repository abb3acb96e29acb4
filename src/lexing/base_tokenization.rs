//! Base tokenization
//!
//! This module provides the raw tokenization over the grammar's category table. This is
//! the bottom of every lexing pipeline: virtual lexers wrap it, and it is the only place
//! where source text is matched against category matchers.
//!
//! This is NOT a transformation - it does not see other tokens, only text.

use crate::grammar::matcher::CompiledMatchers;
use crate::lexing::common::{LexError, LexErrorKind, TokenSource};
use crate::source::SourceFile;
use crate::token::Token;

/// Longest-match scanner over a grammar's base categories.
pub struct Scanner<'s> {
    matchers: &'s CompiledMatchers,
    source: &'s SourceFile,
    offset: usize,
    failed: bool,
}

impl<'s> Scanner<'s> {
    pub(crate) fn new(matchers: &'s CompiledMatchers, source: &'s SourceFile) -> Self {
        Self {
            matchers,
            source,
            offset: 0,
            failed: false,
        }
    }
}

impl<'s> TokenSource<'s> for Scanner<'s> {
    fn source(&self) -> &'s SourceFile {
        self.source
    }

    fn offset(&self) -> usize {
        self.offset
    }

    fn advance_to(&mut self, offset: usize) {
        self.offset = offset.clamp(self.offset, self.source.len());
    }

    fn next_token(&mut self) -> Option<Result<Token, LexError>> {
        if self.failed || self.offset >= self.source.len() {
            return None;
        }

        let text = self.source.text();
        match self.matchers.longest_at(text, self.offset) {
            Some((category, length)) => {
                let range = self.offset..self.offset + length;
                self.offset = range.end;
                Some(Ok(Token::from_source(category, self.source, range)))
            }
            None => {
                self.failed = true;
                let width = text[self.offset..]
                    .chars()
                    .next()
                    .map(char::len_utf8)
                    .unwrap_or(1);
                let span = self.source.span(self.offset..self.offset + width);
                Some(Err(LexError::new(
                    LexErrorKind::UnrecognizedInput {
                        text: span.text().to_string(),
                    },
                    span,
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;

    fn grammar() -> Grammar {
        Grammar::builder()
            .pattern("Word", "[a-z]+")
            .ignore("Space", " +")
            .build()
            .unwrap()
    }

    #[test]
    fn test_tokenizes() {
        let grammar = grammar();
        let source = SourceFile::new("hello world");
        let mut scanner = Scanner::new(grammar.matchers(), &source);

        let mut texts = Vec::new();
        while let Some(token) = scanner.next_token() {
            texts.push(token.unwrap().text);
        }
        assert_eq!(texts, vec!["hello", " ", "world"]);
        assert_eq!(scanner.offset(), 11);
    }

    #[test]
    fn test_unrecognized_input_stops_scanning() {
        let grammar = grammar();
        let source = SourceFile::new("ab?cd");
        let mut scanner = Scanner::new(grammar.matchers(), &source);

        assert!(scanner.next_token().unwrap().is_ok());
        let err = scanner.next_token().unwrap().unwrap_err();
        assert_eq!(
            err.kind,
            LexErrorKind::UnrecognizedInput { text: "?".into() }
        );
        assert_eq!(err.span.range(), 2..3);
        assert!(scanner.next_token().is_none());
    }

    #[test]
    fn test_advance_to_never_moves_backwards() {
        let grammar = grammar();
        let source = SourceFile::new("abc def");
        let mut scanner = Scanner::new(grammar.matchers(), &source);
        scanner.advance_to(4);
        scanner.advance_to(1);
        assert_eq!(scanner.offset(), 4);
        assert_eq!(scanner.next_token().unwrap().unwrap().text, "def");
    }
}
