//! Source text and location tracking
//!
//!     Every token and every failure points back into the text it came from. This module
//!     owns that text ([`SourceFile`]) and the conversions from byte offsets to the
//!     line/column pairs diagnostics need ([`Position`], [`Span`]).
//!
//! Conventions
//!
//!     - Offsets are byte offsets into the source text.
//!     - Lines are 1-based: the number of newlines before the offset, plus one.
//!     - Columns are 0-based: the offset minus the offset at which its line starts.
//!
//!     Conversion is O(log n) by binary search over the line starts computed once when the
//!     source is created.

use std::fmt;
use std::ops::Range as ByteRange;
use std::sync::Arc;

/// A line:column position in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug)]
struct SourceInner {
    name: Option<String>,
    text: String,
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

/// Source text plus an optional file name.
///
/// Cloning is cheap: the text is shared. A `SourceFile` is immutable once created.
#[derive(Debug, Clone)]
pub struct SourceFile {
    inner: Arc<SourceInner>,
}

impl SourceFile {
    /// Create an anonymous source.
    pub fn new(text: impl Into<String>) -> Self {
        Self::build(None, text.into())
    }

    /// Create a source that remembers where it came from.
    pub fn named(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::build(Some(name.into()), text.into())
    }

    fn build(name: Option<String>, text: String) -> Self {
        let mut line_starts = vec![0];
        for (byte_pos, ch) in text.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }
        Self {
            inner: Arc::new(SourceInner {
                name,
                text,
                line_starts,
            }),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// Name used when rendering locations.
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or("<input>")
    }

    pub fn text(&self) -> &str {
        &self.inner.text
    }

    pub fn len(&self) -> usize {
        self.inner.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.text.is_empty()
    }

    /// Convert a byte offset to a line/column position.
    ///
    /// Offsets past the end of the text are clamped to the end.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len());
        let line_index = match self.inner.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index - 1,
        };
        let column = offset - self.inner.line_starts[line_index];
        Position::new(line_index + 1, column)
    }

    /// Build a span covering `range`.
    pub fn span(&self, range: ByteRange<usize>) -> Span {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        let position = self.position(start);
        Span {
            source: self.clone(),
            start,
            end,
            line: position.line,
            column: position.column,
        }
    }

    /// A zero-width span at the end of the text.
    pub fn eof_span(&self) -> Span {
        self.span(self.len()..self.len())
    }

    /// Number of lines in the source. An empty source has one (empty) line.
    pub fn line_count(&self) -> usize {
        self.inner.line_starts.len()
    }

    /// Text of a 1-based line, without its terminator.
    pub fn line_text(&self, line: usize) -> Option<&str> {
        let index = line.checked_sub(1)?;
        let start = *self.inner.line_starts.get(index)?;
        let end = self
            .inner
            .line_starts
            .get(index + 1)
            .map(|next| next - 1)
            .unwrap_or(self.len());
        let text = &self.inner.text[start..end];
        Some(text.strip_suffix('\r').unwrap_or(text))
    }
}

impl PartialEq for SourceFile {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.inner.name == other.inner.name && self.inner.text == other.inner.text)
    }
}

impl Eq for SourceFile {}

impl From<&str> for SourceFile {
    fn from(text: &str) -> Self {
        SourceFile::new(text)
    }
}

impl From<String> for SourceFile {
    fn from(text: String) -> Self {
        SourceFile::new(text)
    }
}

/// A located range of source text, handed to diagnostics on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub source: SourceFile,
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn range(&self) -> ByteRange<usize> {
        self.start..self.end
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// The source text covered by this span.
    pub fn text(&self) -> &str {
        &self.source.text()[self.start..self.end]
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.source.display_name(),
            self.line,
            self.column
        )
    }
}
