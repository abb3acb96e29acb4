//! Parse errors

use std::fmt;

use thiserror::Error;

use crate::source::Span;

/// One active rule invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFrame {
    pub name: &'static str,
    /// Cursor when the rule was entered.
    pub start: usize,
}

impl fmt::Display for RuleFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.start)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected {}, found {found}", .expected.join(" or "))]
    UnexpectedToken { expected: Vec<String>, found: String },

    #[error("no alternative matches {found}, expected {}", .expected.join(" or "))]
    NoMatchingAlternative { expected: Vec<String>, found: String },

    #[error("expected at least one {}, found {found}", .expected.join(" or "))]
    ExpectedAtLeastOne { expected: Vec<String>, found: String },

    #[error("unexpected {found} after the end of the input")]
    TrailingInput { found: String },

    #[error("repetition made no progress")]
    StalledRepetition,
}

/// A parse failure: what went wrong, where, and inside which rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {span}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    /// Outermost rule first.
    pub rules: Vec<RuleFrame>,
}

impl ParseError {
    /// Rule names as `outer > inner`, empty outside any rule.
    pub fn rule_path(&self) -> String {
        self.rules
            .iter()
            .map(|frame| frame.name)
            .collect::<Vec<_>>()
            .join(" > ")
    }

    /// Category names the parser would have accepted, if this error has any.
    pub fn expected(&self) -> &[String] {
        match &self.kind {
            ParseErrorKind::UnexpectedToken { expected, .. }
            | ParseErrorKind::NoMatchingAlternative { expected, .. }
            | ParseErrorKind::ExpectedAtLeastOne { expected, .. } => expected,
            ParseErrorKind::TrailingInput { .. } | ParseErrorKind::StalledRepetition => &[],
        }
    }
}

/// Type alias for parser results with boxed errors (reduces stack size)
pub type ParseResult<T> = Result<T, Box<ParseError>>;
