//! Token types shared by the lexing and parsing layers.
//!
//! Token Layers
//!
//!     Base Tokens:
//!         Produced by the scanner from the grammar's category table (literal, regular
//!         expression or enumerated alternation matchers). Categories flagged `ignore` are
//!         produced and seen by virtual lexers but never reach the parser.
//!
//!     Synthetic Tokens:
//!         Contributed by virtual lexers to encode structure that is not spelled out by any
//!         single character run, such as Indent, Deindent and IndentContinue from the
//!         [indentation lexer](crate::lexing::indentation). They flow through the parser
//!         exactly like base tokens.
//!
//!     The parser only ever sees a [TokenStream]: the visible tokens of one source plus a
//!     cursor. See [stream] for its invariants.

pub mod stream;

pub use stream::TokenStream;

use std::fmt;
use std::ops::Range as ByteRange;

use crate::source::SourceFile;

/// Identifies one entry of a grammar's category table.
///
/// Ids are only meaningful for the grammar that issued them; grammar-author code obtains
/// them once through [`Grammar::category`](crate::grammar::Grammar::category).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenCategory(u16);

impl TokenCategory {
    /// Number of distinct ids a grammar can issue.
    pub const LIMIT: usize = u16::MAX as usize + 1;

    pub(crate) fn try_from_index(index: usize) -> Option<Self> {
        u16::try_from(index).ok().map(TokenCategory)
    }

    #[cfg(test)]
    pub(crate) fn from_index(index: usize) -> Self {
        TokenCategory(u16::try_from(index).expect("category index in range"))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A set of categories accepted at one lookahead offset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CategorySet(Vec<TokenCategory>);

impl CategorySet {
    pub fn new() -> Self {
        CategorySet(Vec::new())
    }

    pub fn insert(&mut self, category: TokenCategory) {
        if let Err(at) = self.0.binary_search(&category) {
            self.0.insert(at, category);
        }
    }

    pub fn contains(&self, category: TokenCategory) -> bool {
        self.0.binary_search(&category).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = TokenCategory> + '_ {
        self.0.iter().copied()
    }

    /// Categories present in both sets.
    pub fn intersection(&self, other: &CategorySet) -> CategorySet {
        CategorySet(
            self.0
                .iter()
                .copied()
                .filter(|category| other.contains(*category))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<TokenCategory> for CategorySet {
    fn from(category: TokenCategory) -> Self {
        CategorySet(vec![category])
    }
}

impl From<&TokenCategory> for CategorySet {
    fn from(category: &TokenCategory) -> Self {
        CategorySet(vec![*category])
    }
}

impl From<&CategorySet> for CategorySet {
    fn from(set: &CategorySet) -> Self {
        set.clone()
    }
}

impl<const N: usize> From<[TokenCategory; N]> for CategorySet {
    fn from(categories: [TokenCategory; N]) -> Self {
        categories.into_iter().collect()
    }
}

impl FromIterator<TokenCategory> for CategorySet {
    fn from_iter<I: IntoIterator<Item = TokenCategory>>(iter: I) -> Self {
        let mut categories: Vec<TokenCategory> = iter.into_iter().collect();
        categories.sort();
        categories.dedup();
        CategorySet(categories)
    }
}

/// A lexed token. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub category: TokenCategory,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Token {
    /// Build a token for `range` of `source`, computing its line and column.
    pub fn from_source(category: TokenCategory, source: &SourceFile, range: ByteRange<usize>) -> Self {
        let position = source.position(range.start);
        Token {
            category,
            text: source.text()[range.clone()].to_string(),
            start: range.start,
            end: range.end,
            line: position.line,
            column: position.column,
        }
    }

    pub fn range(&self) -> ByteRange<usize> {
        self.start..self.end
    }

    pub fn is(&self, category: TokenCategory) -> bool {
        self.category == category
    }
}
