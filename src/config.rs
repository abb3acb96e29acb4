//! Grammar configuration loader.
//!
//! `defaults/descent.default.toml` is embedded into the library so that the documented
//! defaults and runtime behavior stay in sync. Callers layer their own files, inline TOML
//! and key overrides on top of it via [`Loader`] before deserializing into
//! [`GrammarConfig`], which then builds a [`Grammar`].
//!
//! A grammar file looks like this:
//!
//!     [parser]
//!     lookahead = 2
//!
//!     [[categories]]
//!     name = "Num"
//!     regex = "[0-9]+"
//!
//!     [[categories]]
//!     name = "Comment"
//!     regex = "#[^\n]*"
//!     ignore = true
//!
//!     [[virtual_lexers]]
//!     name = "indentation"
//!     kind = "indentation"

use std::path::Path;

use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;

use crate::grammar::{CategoryDef, Grammar, GrammarError, Matcher};
use crate::lexing::IndentationLexer;

const DEFAULT_TOML: &str = include_str!("../defaults/descent.default.toml");

/// Top-level grammar configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GrammarConfig {
    pub parser: ParserConfig,
    pub categories: Vec<CategoryConfig>,
    pub virtual_lexers: Vec<VirtualLexerConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    pub lookahead: usize,
}

/// One category. Exactly one of `literal`, `regex` and `one_of` must be set.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    #[serde(default)]
    pub literal: Option<String>,
    #[serde(default)]
    pub regex: Option<String>,
    #[serde(default)]
    pub one_of: Option<Vec<String>>,
    #[serde(default)]
    pub ignore: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VirtualLexerConfig {
    pub name: String,
    pub kind: VirtualLexerKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VirtualLexerKind {
    Indentation,
}

impl CategoryConfig {
    fn to_def(&self) -> Result<CategoryDef, GrammarError> {
        let matcher = match (&self.literal, &self.regex, &self.one_of) {
            (Some(text), None, None) => Matcher::Literal(text.clone()),
            (None, Some(pattern), None) => Matcher::Pattern(pattern.clone()),
            (None, None, Some(alternatives)) => Matcher::OneOf(alternatives.clone()),
            (None, None, None) => {
                return Err(GrammarError::InvalidMatcher {
                    name: self.name.clone(),
                    reason: "one of `literal`, `regex` or `one_of` is required".to_string(),
                })
            }
            _ => {
                return Err(GrammarError::InvalidMatcher {
                    name: self.name.clone(),
                    reason: "only one of `literal`, `regex` or `one_of` may be set".to_string(),
                })
            }
        };
        Ok(CategoryDef {
            name: self.name.clone(),
            matcher: Some(matcher),
            ignore: self.ignore,
        })
    }
}

impl GrammarConfig {
    /// Assemble the configured grammar.
    pub fn build(&self) -> Result<Grammar, GrammarError> {
        let mut builder = Grammar::builder().lookahead(self.parser.lookahead);
        for lexer in &self.virtual_lexers {
            builder = match lexer.kind {
                VirtualLexerKind::Indentation => {
                    builder.virtual_lexer(lexer.name.clone(), IndentationLexer::new())
                }
            };
        }
        for category in &self.categories {
            builder = builder.category(category.to_def()?);
        }
        builder.build()
    }
}

/// Helper for layering user grammars over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer inline TOML.
    pub fn with_toml(mut self, text: &str) -> Self {
        self.builder = self.builder.add_source(File::from_str(text, FileFormat::Toml));
        self
    }

    /// Apply a single key/value override.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<GrammarConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<GrammarConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.parser.lookahead, 4);
        assert!(config.categories.is_empty());
        assert!(config.virtual_lexers.is_empty());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("parser.lookahead", 2_i64)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.parser.lookahead, 2);
    }

    #[test]
    fn builds_grammar_from_toml() {
        let config = Loader::new()
            .with_toml(
                r##"
                [[categories]]
                name = "Num"
                regex = "[0-9]+"

                [[categories]]
                name = "Bool"
                one_of = ["true", "false"]

                [[categories]]
                name = "Comment"
                regex = "#[^\n]*"
                ignore = true

                [[virtual_lexers]]
                name = "indentation"
                kind = "indentation"
                "##,
            )
            .build()
            .expect("config to build");
        let grammar = config.build().expect("grammar to build");
        assert!(grammar.is_ignored(grammar.category("Comment").unwrap()));
        assert!(grammar.category("Bool").is_ok());
        assert!(grammar.category("Indent").is_ok());
        assert_eq!(grammar.lookahead(), 4);
    }

    #[test]
    fn rejects_ambiguous_matcher() {
        let config = Loader::new()
            .with_toml(
                r#"
                [[categories]]
                name = "Num"
                regex = "[0-9]+"
                literal = "1"
                "#,
            )
            .build()
            .expect("config to build");
        assert!(matches!(
            config.build(),
            Err(GrammarError::InvalidMatcher { ref name, .. }) if name == "Num"
        ));
    }

    #[test]
    fn rejects_missing_matcher() {
        let config = Loader::new()
            .with_toml("[[categories]]\nname = \"Num\"\n")
            .build()
            .expect("config to build");
        assert!(matches!(
            config.build(),
            Err(GrammarError::InvalidMatcher { .. })
        ));
    }
}
