//! Grammar configuration: the category table, virtual lexers and the lookahead budget
//!
//!     A [Grammar] is assembled once and is immutable afterwards. It fixes:
//!
//!         - the token categories, each with a [Matcher] (base categories) or none
//!           (synthetic categories contributed by virtual lexers), and an `ignore` flag;
//!         - the virtual lexers layered over the base scanner, in registration order;
//!         - the lookahead budget every [Choice] and [Decidable] is validated against.
//!
//!     Grammar-author code resolves the categories it uses once through
//!     [Grammar::category] and validates its decision points through [Grammar::choice] and
//!     [Grammar::decidable], so that ambiguity is reported while assembling the grammar and
//!     never while parsing.
//!
//!     A grammar is `Send + Sync`; parsers share it through an `Arc`.

pub mod matcher;

pub use matcher::Matcher;

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::lexing::{LexerLayer, VirtualLexer};
use crate::parsing::decidable::{Alternative, Choice, Decidable};
use crate::token::{CategorySet, Token, TokenCategory};
use matcher::CompiledMatchers;

/// Lookahead budget used when none is configured.
pub const DEFAULT_LOOKAHEAD: usize = 4;

static CATEGORY_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("category name pattern"));

/// Errors raised while assembling a grammar. None of these can happen during a parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("category `{name}` is defined more than once")]
    DuplicateCategory { name: String },

    #[error("`{name}` is not a valid category name")]
    InvalidCategoryName { name: String },

    #[error("category `{name}` matches the empty string")]
    EmptyMatcher { name: String },

    #[error("category `{name}` has an invalid pattern: {message}")]
    InvalidPattern { name: String, message: String },

    #[error("category `{name}`: {reason}")]
    InvalidMatcher { name: String, reason: String },

    #[error("unknown category `{name}`")]
    UnknownCategory { name: String },

    #[error("category id {id} is not in this grammar")]
    ForeignCategory { id: usize },

    #[error("a grammar holds at most {limit} categories")]
    TooManyCategories { limit: usize },

    #[error("virtual lexer `{name}` is registered more than once")]
    DuplicateVirtualLexer { name: String },

    #[error("lookahead budget must be at least 1")]
    InvalidLookahead,

    #[error("alternative {alternative} needs {length} tokens of lookahead, budget is {budget}")]
    LookaheadExceeded {
        alternative: usize,
        length: usize,
        budget: usize,
    },

    #[error("alternatives {first} and {second} are both decided by [{}]", .path.join(" "))]
    AmbiguousGrammar {
        first: usize,
        second: usize,
        path: Vec<String>,
    },
}

/// A category definition as supplied by grammar authors and virtual lexers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDef {
    pub name: String,
    /// `None` for synthetic categories, which the base scanner never produces.
    pub matcher: Option<Matcher>,
    pub ignore: bool,
}

impl CategoryDef {
    pub fn literal(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_matcher(name, Matcher::Literal(text.into()))
    }

    pub fn pattern(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::with_matcher(name, Matcher::Pattern(pattern.into()))
    }

    pub fn one_of<I, S>(name: impl Into<String>, alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_matcher(
            name,
            Matcher::OneOf(alternatives.into_iter().map(Into::into).collect()),
        )
    }

    pub fn synthetic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matcher: None,
            ignore: false,
        }
    }

    fn with_matcher(name: impl Into<String>, matcher: Matcher) -> Self {
        Self {
            name: name.into(),
            matcher: Some(matcher),
            ignore: false,
        }
    }

    /// Mark the category as consumed by the lexer but invisible to the parser.
    pub fn ignored(mut self) -> Self {
        self.ignore = true;
        self
    }
}

/// One registered category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInfo {
    pub category: TokenCategory,
    pub name: String,
    pub matcher: Option<Matcher>,
    pub ignore: bool,
}

/// Name <-> id table for every category of a grammar.
#[derive(Debug, Clone, Default)]
pub struct CategoryTable {
    entries: Vec<CategoryInfo>,
    by_name: HashMap<String, TokenCategory>,
}

impl CategoryTable {
    fn push(&mut self, def: CategoryDef) -> Result<TokenCategory, GrammarError> {
        if !CATEGORY_NAME.is_match(&def.name) {
            return Err(GrammarError::InvalidCategoryName { name: def.name });
        }
        if self.by_name.contains_key(&def.name) {
            return Err(GrammarError::DuplicateCategory { name: def.name });
        }
        let category = TokenCategory::try_from_index(self.entries.len()).ok_or(
            GrammarError::TooManyCategories {
                limit: TokenCategory::LIMIT,
            },
        )?;
        self.by_name.insert(def.name.clone(), category);
        self.entries.push(CategoryInfo {
            category,
            name: def.name,
            matcher: def.matcher,
            ignore: def.ignore,
        });
        Ok(category)
    }

    pub fn get(&self, name: &str) -> Option<TokenCategory> {
        self.by_name.get(name).copied()
    }

    /// Like [`CategoryTable::get`], failing with `UnknownCategory`.
    pub fn resolve(&self, name: &str) -> Result<TokenCategory, GrammarError> {
        self.get(name).ok_or_else(|| GrammarError::UnknownCategory {
            name: name.to_string(),
        })
    }

    pub fn info(&self, category: TokenCategory) -> Option<&CategoryInfo> {
        self.entries.get(category.index())
    }

    pub fn name(&self, category: TokenCategory) -> &str {
        self.info(category)
            .map(|info| info.name.as_str())
            .unwrap_or("<unknown>")
    }

    pub fn contains(&self, category: TokenCategory) -> bool {
        category.index() < self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryInfo> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Immutable grammar configuration shared by every parse that uses it.
pub struct Grammar {
    table: CategoryTable,
    matchers: CompiledMatchers,
    layers: Vec<(String, Box<dyn LexerLayer>)>,
    lookahead: usize,
}

impl Grammar {
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::new()
    }

    /// Resolve a category by name.
    pub fn category(&self, name: &str) -> Result<TokenCategory, GrammarError> {
        self.table.resolve(name)
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.table
    }

    pub fn name_of(&self, category: TokenCategory) -> &str {
        self.table.name(category)
    }

    pub fn is_ignored(&self, category: TokenCategory) -> bool {
        self.table.info(category).is_some_and(|info| info.ignore)
    }

    pub fn is_synthetic(&self, category: TokenCategory) -> bool {
        self.table
            .info(category)
            .is_some_and(|info| info.matcher.is_none())
    }

    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    /// Names of the registered virtual lexers, in layering order.
    pub fn virtual_lexers(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|(name, _)| name.as_str())
    }

    /// Validate the alternatives of one `or` construct.
    pub fn choice<I>(&self, alternatives: I) -> Result<Choice, GrammarError>
    where
        I: IntoIterator<Item = Alternative>,
    {
        Choice::validated(alternatives.into_iter().collect(), self)
    }

    /// Validate the decision of a `maybe` / `many` construct.
    pub fn decidable(&self, decidable: Decidable) -> Result<Decidable, GrammarError> {
        decidable.validate(0, self)?;
        Ok(decidable)
    }

    /// Human-readable names of a category set, in id order.
    pub fn describe_set(&self, set: &CategorySet) -> Vec<String> {
        set.iter().map(|c| self.name_of(c).to_string()).collect()
    }

    /// `Name` for fixed-text categories, `Name(text)` otherwise.
    pub fn describe(&self, token: &Token) -> String {
        let name = self.name_of(token.category);
        let variable = self
            .table
            .info(token.category)
            .and_then(|info| info.matcher.as_ref())
            .is_some_and(Matcher::has_variable_text);
        if variable {
            format!("{}({})", name, token.text)
        } else {
            name.to_string()
        }
    }

    pub(crate) fn matchers(&self) -> &CompiledMatchers {
        &self.matchers
    }

    pub(crate) fn layers(&self) -> impl Iterator<Item = &(dyn LexerLayer + 'static)> {
        self.layers.iter().map(|(_, layer)| layer.as_ref())
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("categories", &self.table.len())
            .field(
                "virtual_lexers",
                &self.virtual_lexers().collect::<Vec<_>>(),
            )
            .field("lookahead", &self.lookahead)
            .finish()
    }
}

/// Assembles a [Grammar].
pub struct GrammarBuilder {
    categories: Vec<CategoryDef>,
    lexers: Vec<(String, Box<dyn VirtualLexer>)>,
    lookahead: usize,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self {
            categories: Vec::new(),
            lexers: Vec::new(),
            lookahead: DEFAULT_LOOKAHEAD,
        }
    }

    pub fn category(mut self, def: CategoryDef) -> Self {
        self.categories.push(def);
        self
    }

    pub fn literal(self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.category(CategoryDef::literal(name, text))
    }

    pub fn pattern(self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.category(CategoryDef::pattern(name, pattern))
    }

    pub fn one_of<I, S>(self, name: impl Into<String>, alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.category(CategoryDef::one_of(name, alternatives))
    }

    /// Shorthand for an ignored pattern category (whitespace, comments).
    pub fn ignore(self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.category(CategoryDef::pattern(name, pattern).ignored())
    }

    pub fn virtual_lexer(mut self, name: impl Into<String>, lexer: impl VirtualLexer + 'static) -> Self {
        self.lexers.push((name.into(), Box::new(lexer)));
        self
    }

    pub fn lookahead(mut self, budget: usize) -> Self {
        self.lookahead = budget;
        self
    }

    pub fn build(self) -> Result<Grammar, GrammarError> {
        if self.lookahead == 0 {
            return Err(GrammarError::InvalidLookahead);
        }

        let mut table = CategoryTable::default();
        let mut seen_lexers: Vec<&str> = Vec::new();
        for (name, lexer) in &self.lexers {
            if seen_lexers.contains(&name.as_str()) {
                return Err(GrammarError::DuplicateVirtualLexer { name: name.clone() });
            }
            seen_lexers.push(name.as_str());
            for def in lexer.categories() {
                table.push(def)?;
            }
        }
        for def in self.categories {
            table.push(def)?;
        }

        let matchers = CompiledMatchers::compile(table.iter().filter_map(|info| {
            info.matcher
                .as_ref()
                .map(|matcher| (info.category, info.name.as_str(), matcher))
        }))?;

        let mut layers = Vec::with_capacity(self.lexers.len());
        for (name, lexer) in self.lexers {
            layers.push((name, lexer.bind(&table)?));
        }

        debug!(
            categories = table.len(),
            matchers = matchers.len(),
            virtual_lexers = layers.len(),
            lookahead = self.lookahead,
            "grammar assembled"
        );

        Ok(Grammar {
            table,
            matchers,
            layers,
            lookahead: self.lookahead,
        })
    }
}

impl Default for GrammarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexing::IndentationLexer;

    fn brackets() -> Grammar {
        Grammar::builder()
            .literal("LeftBracket", "[")
            .literal("RightBracket", "]")
            .literal("Comma", ",")
            .pattern("Num", "[0-9]+")
            .ignore("Space", "[ \t\n]+")
            .build()
            .expect("grammar builds")
    }

    #[test]
    fn test_categories_resolve_by_name() {
        let grammar = brackets();
        let num = grammar.category("Num").unwrap();
        assert_eq!(grammar.name_of(num), "Num");
        assert!(!grammar.is_ignored(num));
        assert!(grammar.is_ignored(grammar.category("Space").unwrap()));
        assert!(matches!(
            grammar.category("Missing"),
            Err(GrammarError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_duplicate_category_is_rejected() {
        let result = Grammar::builder()
            .literal("Comma", ",")
            .literal("Comma", ";")
            .build();
        assert_eq!(
            result.err(),
            Some(GrammarError::DuplicateCategory {
                name: "Comma".into()
            })
        );
    }

    #[test]
    fn test_invalid_category_name_is_rejected() {
        let result = Grammar::builder().literal("not a name", ",").build();
        assert!(matches!(
            result,
            Err(GrammarError::InvalidCategoryName { .. })
        ));
    }

    #[test]
    fn test_virtual_lexer_categories_collide_with_grammar() {
        let result = Grammar::builder()
            .literal("Indent", ">>")
            .virtual_lexer("indent", IndentationLexer::new())
            .build();
        assert_eq!(
            result.err(),
            Some(GrammarError::DuplicateCategory {
                name: "Indent".into()
            })
        );
    }

    #[test]
    fn test_virtual_lexer_registered_twice() {
        let result = Grammar::builder()
            .virtual_lexer("indent", IndentationLexer::new())
            .virtual_lexer("indent", IndentationLexer::new())
            .build();
        assert!(matches!(
            result,
            Err(GrammarError::DuplicateVirtualLexer { .. })
        ));
    }

    #[test]
    fn test_zero_lookahead_is_rejected() {
        let result = Grammar::builder().literal("A", "a").lookahead(0).build();
        assert_eq!(result.err(), Some(GrammarError::InvalidLookahead));
    }

    #[test]
    fn test_synthetic_categories() {
        let grammar = Grammar::builder()
            .literal("Colon", ":")
            .virtual_lexer("indent", IndentationLexer::new())
            .build()
            .unwrap();
        assert!(grammar.is_synthetic(grammar.category("Indent").unwrap()));
        assert!(!grammar.is_synthetic(grammar.category("Colon").unwrap()));
        assert_eq!(grammar.virtual_lexers().collect::<Vec<_>>(), vec!["indent"]);
    }

    #[test]
    fn test_describe_token() {
        let grammar = brackets();
        let source = crate::source::SourceFile::new("[42");
        let bracket = Token::from_source(grammar.category("LeftBracket").unwrap(), &source, 0..1);
        let num = Token::from_source(grammar.category("Num").unwrap(), &source, 1..3);
        assert_eq!(grammar.describe(&bracket), "LeftBracket");
        assert_eq!(grammar.describe(&num), "Num(42)");
    }

    #[test]
    fn test_category_table_is_bounded() {
        let mut table = CategoryTable::default();
        for index in 0..TokenCategory::LIMIT {
            table
                .push(CategoryDef::synthetic(format!("C{index}")))
                .expect("within the id range");
        }
        assert_eq!(
            table.push(CategoryDef::synthetic("Overflow")),
            Err(GrammarError::TooManyCategories {
                limit: TokenCategory::LIMIT
            })
        );
        assert_eq!(table.len(), TokenCategory::LIMIT);
    }
}
