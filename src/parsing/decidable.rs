//! Lookahead decisions
//!
//!     A [Decidable] says, for one branch point of a grammar, which upcoming tokens select it.
//!     It is a set of [LookaheadPath]s; a path is a short sequence of category sets, the i-th
//!     set constraining the token i positions past the cursor. A decision matches when any of
//!     its paths matches, so deciding never costs more than `lookahead` token peeks.
//!
//!     Decisions are plain data, built once while assembling the grammar:
//!
//!         let item = Decidable::branch([
//!             Decidable::path([key, colon]),
//!             Decidable::path([num]),
//!         ]);
//!
//!     An `or` construct takes one [Alternative] per branch. Alternatives are tried in
//!     declaration order and the first match wins, so a path may be a strict prefix of a
//!     later alternative's path. Two alternatives with an identical path can never both be
//!     reached; [Choice] rejects them with `AmbiguousGrammar` while the grammar is assembled.

use std::slice;

use crate::grammar::{Grammar, GrammarError};
use crate::token::{CategorySet, TokenCategory, TokenStream};

/// One concrete lookahead path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookaheadPath(Vec<CategorySet>);

impl LookaheadPath {
    pub fn new<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CategorySet>,
    {
        Self(steps.into_iter().map(Into::into).collect())
    }

    pub fn steps(&self) -> &[CategorySet] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the tokens at the cursor follow this path. The empty path always matches.
    pub fn matches(&self, stream: &TokenStream) -> bool {
        self.0.iter().enumerate().all(|(offset, set)| {
            stream
                .peek(offset)
                .is_some_and(|token| set.contains(token.category))
        })
    }

    fn categories(&self) -> impl Iterator<Item = TokenCategory> + '_ {
        self.0.iter().flat_map(CategorySet::iter)
    }

    /// The token sequences accepted by both paths, if any. Paths of different lengths
    /// never overlap: the shorter one is a prefix resolved by declaration order.
    fn overlap(&self, other: &LookaheadPath) -> Option<LookaheadPath> {
        if self.len() != other.len() {
            return None;
        }
        let steps: Vec<CategorySet> = self
            .0
            .iter()
            .zip(&other.0)
            .map(|(left, right)| left.intersection(right))
            .collect();
        if steps.iter().any(CategorySet::is_empty) {
            None
        } else {
            Some(LookaheadPath(steps))
        }
    }

    /// Step names as `A|B`, one entry per offset.
    pub(crate) fn describe(&self, grammar: &Grammar) -> Vec<String> {
        self.0
            .iter()
            .map(|set| grammar.describe_set(set).join("|"))
            .collect()
    }

    fn validate(&self, alternative: usize, grammar: &Grammar) -> Result<(), GrammarError> {
        if let Some(unknown) = self
            .categories()
            .find(|category| !grammar.categories().contains(*category))
        {
            return Err(GrammarError::ForeignCategory {
                id: unknown.index(),
            });
        }
        if self.len() > grammar.lookahead() {
            return Err(GrammarError::LookaheadExceeded {
                alternative,
                length: self.len(),
                budget: grammar.lookahead(),
            });
        }
        Ok(())
    }
}

/// Finite-lookahead decision data for one branch point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decidable {
    paths: Vec<LookaheadPath>,
}

impl Decidable {
    /// A decision with a single path.
    pub fn path<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CategorySet>,
    {
        Self {
            paths: vec![LookaheadPath::new(steps)],
        }
    }

    /// The union of several decisions, keeping path order.
    pub fn branch<I>(decidables: I) -> Self
    where
        I: IntoIterator<Item = Decidable>,
    {
        let mut paths: Vec<LookaheadPath> = Vec::new();
        for decidable in decidables {
            for path in decidable.paths {
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }
        Self { paths }
    }

    pub fn paths(&self) -> &[LookaheadPath] {
        &self.paths
    }

    /// Lookahead needed to evaluate this decision.
    pub fn depth(&self) -> usize {
        self.paths.iter().map(LookaheadPath::len).max().unwrap_or(0)
    }

    pub fn matches(&self, stream: &TokenStream) -> bool {
        self.paths.iter().any(|path| path.matches(stream))
    }

    pub(crate) fn validate(&self, alternative: usize, grammar: &Grammar) -> Result<(), GrammarError> {
        self.paths
            .iter()
            .try_for_each(|path| path.validate(alternative, grammar))
    }
}

impl From<LookaheadPath> for Decidable {
    fn from(path: LookaheadPath) -> Self {
        Self { paths: vec![path] }
    }
}

/// One branch of an `or` construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alternative {
    /// A rule invocation, selected by its decision.
    Rule(Decidable),
    /// A fixed token sequence, selected by itself and consumed by the runtime.
    Tokens(LookaheadPath),
}

impl Alternative {
    pub fn rule(decidable: Decidable) -> Self {
        Alternative::Rule(decidable)
    }

    pub fn tokens<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CategorySet>,
    {
        Alternative::Tokens(LookaheadPath::new(steps))
    }

    pub fn paths(&self) -> &[LookaheadPath] {
        match self {
            Alternative::Rule(decidable) => decidable.paths(),
            Alternative::Tokens(path) => slice::from_ref(path),
        }
    }

    pub fn matches(&self, stream: &TokenStream) -> bool {
        match self {
            Alternative::Rule(decidable) => decidable.matches(stream),
            Alternative::Tokens(path) => path.matches(stream),
        }
    }
}

/// The validated alternatives of one `or` construct. Built through [Grammar::choice].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    alternatives: Vec<Alternative>,
}

impl Choice {
    pub(crate) fn validated(
        alternatives: Vec<Alternative>,
        grammar: &Grammar,
    ) -> Result<Self, GrammarError> {
        for (index, alternative) in alternatives.iter().enumerate() {
            for path in alternative.paths() {
                path.validate(index, grammar)?;
            }
        }

        for (first, earlier) in alternatives.iter().enumerate() {
            for (second, later) in alternatives.iter().enumerate().skip(first + 1) {
                let overlap = earlier.paths().iter().find_map(|path| {
                    later
                        .paths()
                        .iter()
                        .find_map(|other| path.overlap(other))
                });
                if let Some(path) = overlap {
                    return Err(GrammarError::AmbiguousGrammar {
                        first,
                        second,
                        path: path.describe(grammar),
                    });
                }
            }
        }

        Ok(Self { alternatives })
    }

    pub fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }

    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// Index of the first alternative matching at the cursor.
    pub fn select(&self, stream: &TokenStream) -> Option<usize> {
        self.alternatives
            .iter()
            .position(|alternative| alternative.matches(stream))
    }

    /// Every category that can start one of the alternatives.
    pub fn first_categories(&self) -> CategorySet {
        self.alternatives
            .iter()
            .flat_map(Alternative::paths)
            .filter_map(|path| path.steps().first())
            .flat_map(CategorySet::iter)
            .collect()
    }
}
