//! Category matchers and the longest-match scanner tables
//!
//!     Every base category is described by a [Matcher]. Matchers are compiled to anchored
//!     regular expressions once, when the grammar is built; scanning then asks a single
//!     `RegexSet` which categories can start at the current offset and measures only those.
//!
//!     Longest match wins. Ties go to the category registered first, which is why virtual
//!     lexer categories (registered before the grammar's own) take precedence on equal
//!     lengths. Zero-length matches never count: a pattern such as `[0-9]*` only matches
//!     when at least one character is consumed.

use regex::{Regex, RegexSet};

use crate::grammar::GrammarError;
use crate::token::TokenCategory;

/// How a base category recognizes its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Exact text.
    Literal(String),
    /// A regular expression (`regex` crate syntax).
    Pattern(String),
    /// Any one of several exact texts.
    OneOf(Vec<String>),
}

impl Matcher {
    /// Whether tokens of this category are worth printing with their text.
    pub fn has_variable_text(&self) -> bool {
        !matches!(self, Matcher::Literal(_))
    }

    /// Regular expression source for this matcher, unanchored.
    fn regex_source(&self, name: &str) -> Result<String, GrammarError> {
        match self {
            Matcher::Literal(text) => {
                if text.is_empty() {
                    return Err(GrammarError::EmptyMatcher {
                        name: name.to_string(),
                    });
                }
                Ok(regex::escape(text))
            }
            Matcher::Pattern(pattern) => Ok(pattern.clone()),
            Matcher::OneOf(alternatives) => {
                if alternatives.is_empty() || alternatives.iter().any(String::is_empty) {
                    return Err(GrammarError::EmptyMatcher {
                        name: name.to_string(),
                    });
                }
                // Longer alternatives first so that `true|t` style overlaps match greedily.
                let mut sorted: Vec<&String> = alternatives.iter().collect();
                sorted.sort_by(|a, b| b.len().cmp(&a.len()));
                Ok(sorted
                    .into_iter()
                    .map(|alternative| regex::escape(alternative))
                    .collect::<Vec<_>>()
                    .join("|"))
            }
        }
    }
}

/// Compiled scanner tables for every base category of a grammar.
#[derive(Debug, Clone)]
pub(crate) struct CompiledMatchers {
    set: RegexSet,
    patterns: Vec<(TokenCategory, Regex)>,
}

impl CompiledMatchers {
    /// Compile matchers in registration order.
    pub(crate) fn compile<'a, I>(matchers: I) -> Result<Self, GrammarError>
    where
        I: IntoIterator<Item = (TokenCategory, &'a str, &'a Matcher)>,
    {
        let mut sources = Vec::new();
        let mut patterns = Vec::new();

        for (category, name, matcher) in matchers {
            let source = format!("^(?:{})", matcher.regex_source(name)?);
            let regex = Regex::new(&source).map_err(|err| GrammarError::InvalidPattern {
                name: name.to_string(),
                message: err.to_string(),
            })?;
            sources.push(source);
            patterns.push((category, regex));
        }

        let set = RegexSet::new(&sources).map_err(|err| GrammarError::InvalidPattern {
            name: "<scanner>".to_string(),
            message: err.to_string(),
        })?;

        Ok(Self { set, patterns })
    }

    /// Longest non-empty match starting at `offset`, as `(category, length)`.
    pub(crate) fn longest_at(&self, text: &str, offset: usize) -> Option<(TokenCategory, usize)> {
        let rest = text.get(offset..)?;
        if rest.is_empty() {
            return None;
        }

        let mut best: Option<(TokenCategory, usize)> = None;
        for index in self.set.matches(rest).into_iter() {
            let (category, regex) = &self.patterns[index];
            let Some(found) = regex.find(rest) else {
                continue;
            };
            let length = found.end();
            if length == 0 {
                continue;
            }
            if best.map_or(true, |(_, best_length)| length > best_length) {
                best = Some((*category, length));
            }
        }
        best
    }

    pub(crate) fn len(&self) -> usize {
        self.patterns.len()
    }
}
