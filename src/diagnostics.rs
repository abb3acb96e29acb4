//! Diagnostic rendering
//!
//!     Turns lexing and parsing failures into human-readable reports with a source excerpt:
//!
//!         error: unexpected token
//!          --> list.txt:1:5
//!           |
//!         1 | [1,2,]
//!           |      ^ expected Num, found RightBracket
//!           = note: while parsing list
//!
//!     This is purely presentational. Nothing here feeds back into lexing or parsing.

use std::fmt;

use crate::lexing::{LexError, LexErrorKind};
use crate::parsing::{ParseError, ParseErrorKind};
use crate::source::Span;
use crate::Error;

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Error => write!(f, "error"),
            DiagnosticSeverity::Warning => write!(f, "warning"),
            DiagnosticSeverity::Note => write!(f, "note"),
        }
    }
}

/// A located message, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub title: String,
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(
        severity: DiagnosticSeverity,
        title: impl Into<String>,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            severity,
            title: title.into(),
            message: message.into(),
            span,
            notes: Vec::new(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticSeverity::Error, title, message, span)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Diagnostic for a crate error. Grammar and configuration errors have no location.
    pub fn from_error(error: &Error) -> Option<Self> {
        match error {
            Error::Lex(err) => Some(Self::from(err)),
            Error::Parse(err) => Some(Self::from(&**err)),
            Error::Grammar(_) | Error::Config(_) => None,
        }
    }

    /// Render the report. The output has no trailing newline.
    pub fn render(&self) -> String {
        let span = &self.span;
        let source = &span.source;
        let gutter = span.line.to_string().len();
        let pad = " ".repeat(gutter);

        let mut lines = vec![
            format!("{}: {}", self.severity, self.title),
            format!("{}--> {}", pad, span),
            format!("{} |", pad),
        ];

        if span.line > 1 {
            if let Some(previous) = source.line_text(span.line - 1) {
                lines.push(format!("{:>gutter$} | {}", span.line - 1, previous));
            }
        }

        let line_text = source.line_text(span.line).unwrap_or("");
        lines.push(format!("{:>gutter$} | {}", span.line, line_text));

        let column = span.column.min(line_text.len());
        let indent: String = line_text
            .get(..column)
            .unwrap_or("")
            .chars()
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        let end = (column + span.end.saturating_sub(span.start)).min(line_text.len());
        let width = line_text
            .get(column..end)
            .map_or(0, |marked| marked.chars().count())
            .max(1);
        lines.push(format!(
            "{} | {}{} {}",
            pad,
            indent,
            "^".repeat(width),
            self.message
        ));

        for note in &self.notes {
            lines.push(format!("{} = note: {}", pad, note));
        }

        lines
            .iter()
            .map(|line| line.trim_end())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl From<&LexError> for Diagnostic {
    fn from(err: &LexError) -> Self {
        let title = match err.kind {
            LexErrorKind::IndentationJump { .. } | LexErrorKind::MisplacedTab => {
                "indentation error"
            }
            LexErrorKind::UnrecognizedInput { .. } => "unrecognized input",
        };
        Diagnostic::error(title, err.kind.to_string(), err.span.clone())
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(err: &ParseError) -> Self {
        let title = match err.kind {
            ParseErrorKind::UnexpectedToken { .. } => "unexpected token",
            ParseErrorKind::NoMatchingAlternative { .. } => "no matching alternative",
            ParseErrorKind::ExpectedAtLeastOne { .. } => "expected at least one item",
            ParseErrorKind::TrailingInput { .. } => "trailing input",
            ParseErrorKind::StalledRepetition => "repetition made no progress",
        };
        let diagnostic = Diagnostic::error(title, err.kind.to_string(), err.span.clone());
        if err.rules.is_empty() {
            diagnostic
        } else {
            diagnostic.with_note(format!("while parsing {}", err.rule_path()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::RuleFrame;
    use crate::source::SourceFile;

    #[test]
    fn test_render_parse_error() {
        let source = SourceFile::named("list.txt", "[1,2,]");
        let err = ParseError {
            kind: ParseErrorKind::UnexpectedToken {
                expected: vec!["Num".into()],
                found: "RightBracket".into(),
            },
            span: source.span(5..6),
            rules: vec![RuleFrame {
                name: "list",
                start: 0,
            }],
        };
        insta::assert_snapshot!(Diagnostic::from(&err).render(), @r###"
        error: unexpected token
         --> list.txt:1:5
          |
        1 | [1,2,]
          |      ^ expected Num, found RightBracket
          = note: while parsing list
        "###);
    }

    #[test]
    fn test_render_shows_previous_line() {
        let source = SourceFile::new("a:\n\t\tb: 1\n");
        let err = LexError::new(
            LexErrorKind::IndentationJump { depth: 0, found: 2 },
            source.span(3..5),
        );
        let rendered = Diagnostic::from(&err).render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "error: indentation error");
        assert_eq!(lines[1], " --> <input>:2:0");
        assert_eq!(lines[3], "1 | a:");
        assert_eq!(lines[4], "2 | \t\tb: 1");
        assert_eq!(
            lines[5],
            "  | ^^ indentation increased by more than one level (depth 0, found 2)"
        );
    }

    #[test]
    fn test_zero_width_span_gets_one_caret() {
        let source = SourceFile::new("[1");
        let diagnostic = Diagnostic::error("unexpected token", "expected RightBracket", source.eof_span());
        insta::assert_snapshot!(diagnostic.render(), @r###"
        error: unexpected token
         --> <input>:1:2
          |
        1 | [1
          |   ^ expected RightBracket
        "###);
    }

    #[test]
    fn test_from_error_without_location() {
        let err = Error::from(crate::grammar::GrammarError::InvalidLookahead);
        assert!(Diagnostic::from_error(&err).is_none());
    }
}
