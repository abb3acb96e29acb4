//! Indentation virtual lexer
//!
//!     This lexer turns tab-based indentation into structural tokens, so that rules can read
//!     blocks the way c-style grammars read braces:
//!
//!         - `Indent`: a line starts one level deeper than the previous one
//!         - `Deindent`: one per level dropped, including the levels still open at the end
//!           of input
//!         - `IndentContinue`: a line starts at the same non-zero depth, marking the next
//!           sibling inside a block
//!
//!     Layout (newlines, space runs, tab runs) is recognized here with a small logos lexer.
//!     Everything else is delegated to the wrapped source. Newlines and spaces are emitted as
//!     the ignored `Newline` and `Space` categories, so the parser never sees them.
//!
//! Algorithm
//!
//!     1. At the start of a line, a tab run is held back as the candidate depth.
//!     2. When the first non-layout token of the line arrives, compare the candidate
//!        (0 without a tab run) with the current depth:
//!        - one deeper: emit Indent
//!        - equal: emit IndentContinue when the depth is not 0
//!        - shallower: emit one Deindent per level
//!        - two or more deeper: fail with an indentation jump
//!     3. Tab runs anywhere else are plain space.
//!     4. Lines holding only spaces, tabs and ignored tokens (comments) never change the
//!        depth.
//!     5. At the end of input, emit Deindent until the depth is 0.
//!
//!     Indent tracking is one token per tab: four spaces are not a level.

use std::collections::VecDeque;
use std::ops::Range as ByteRange;

use logos::Logos;
use tracing::trace;

use crate::grammar::{CategoryDef, CategoryTable, GrammarError};
use crate::lexing::common::{LexError, LexErrorKind, LexerLayer, TokenSource, VirtualLexer};
use crate::source::SourceFile;
use crate::token::{CategorySet, Token, TokenCategory};

pub const INDENT: &str = "Indent";
pub const DEINDENT: &str = "Deindent";
pub const INDENT_CONTINUE: &str = "IndentContinue";
pub const NEWLINE: &str = "Newline";
pub const SPACE: &str = "Space";

/// Layout characters the indentation lexer handles itself.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    #[regex(r"\r?\n")]
    Newline,

    #[regex(r"\t+")]
    Tabs,

    #[regex(r" +")]
    Spaces,
}

/// Layout token starting at `offset`, as `(kind, length)`.
fn layout_at(text: &str, offset: usize) -> Option<(Layout, usize)> {
    let mut lexer = Layout::lexer(text.get(offset..)?);
    match lexer.next() {
        Some(Ok(kind)) => Some((kind, lexer.span().end)),
        _ => None,
    }
}

/// The indentation lexer as registered on a grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndentationLexer;

impl IndentationLexer {
    pub fn new() -> Self {
        IndentationLexer
    }
}

impl VirtualLexer for IndentationLexer {
    fn categories(&self) -> Vec<CategoryDef> {
        vec![
            CategoryDef::synthetic(INDENT),
            CategoryDef::synthetic(DEINDENT),
            CategoryDef::synthetic(INDENT_CONTINUE),
            CategoryDef::pattern(NEWLINE, r"\r?\n").ignored(),
            CategoryDef::pattern(SPACE, r"[ \t]+").ignored(),
        ]
    }

    fn bind(&self, table: &CategoryTable) -> Result<Box<dyn LexerLayer>, GrammarError> {
        Ok(Box::new(IndentationLayer {
            indent: table.resolve(INDENT)?,
            deindent: table.resolve(DEINDENT)?,
            indent_continue: table.resolve(INDENT_CONTINUE)?,
            newline: table.resolve(NEWLINE)?,
            space: table.resolve(SPACE)?,
            ignored: table
                .iter()
                .filter(|info| info.ignore)
                .map(|info| info.category)
                .collect(),
        }))
    }
}

/// Category ids of an indentation lexer bound to one grammar.
#[derive(Debug, Clone)]
struct IndentationLayer {
    indent: TokenCategory,
    deindent: TokenCategory,
    indent_continue: TokenCategory,
    newline: TokenCategory,
    space: TokenCategory,
    /// Every ignored category of the grammar. These never open a line.
    ignored: CategorySet,
}

impl LexerLayer for IndentationLayer {
    fn wrap<'s>(&'s self, inner: Box<dyn TokenSource<'s> + 's>) -> Box<dyn TokenSource<'s> + 's> {
        Box::new(IndentationScanner {
            inner,
            layout: self,
            state: IndentationState::default(),
            pending: VecDeque::new(),
            finished: false,
        })
    }
}

/// Per-invocation state. Never shared between two lexing runs.
#[derive(Debug, Clone)]
struct IndentationState {
    depth: usize,
    /// Tab run seen at the start of the current line, if any.
    pending_tabs: Option<ByteRange<usize>>,
    /// Tab run found after leading spaces on the current line.
    misplaced_tabs: Option<ByteRange<usize>>,
    spaces_seen: bool,
    /// An ignored token was seen before any content on the current line.
    ignored_seen: bool,
    line_start: bool,
}

impl Default for IndentationState {
    fn default() -> Self {
        Self {
            depth: 0,
            pending_tabs: None,
            misplaced_tabs: None,
            spaces_seen: false,
            ignored_seen: false,
            line_start: true,
        }
    }
}

impl IndentationState {
    fn pending_tab_width(&self) -> usize {
        self.pending_tabs.as_ref().map_or(0, ByteRange::len)
    }

    fn start_line(&mut self) {
        self.pending_tabs = None;
        self.misplaced_tabs = None;
        self.spaces_seen = false;
        self.ignored_seen = false;
        self.line_start = true;
    }
}

struct IndentationScanner<'s> {
    inner: Box<dyn TokenSource<'s> + 's>,
    layout: &'s IndentationLayer,
    state: IndentationState,
    pending: VecDeque<Result<Token, LexError>>,
    finished: bool,
}

impl<'s> IndentationScanner<'s> {
    fn synthetic(&self, category: TokenCategory, range: ByteRange<usize>) -> Token {
        Token::from_source(category, self.inner.source(), range)
    }

    /// Depth bookkeeping for the first content token of a line, starting at `offset`.
    fn open_line(&mut self, source: &SourceFile, offset: usize) -> Result<(), LexError> {
        self.state.line_start = false;
        if let Some(range) = self.state.misplaced_tabs.take() {
            return Err(LexError::new(LexErrorKind::MisplacedTab, source.span(range)));
        }

        let depth = self.state.depth;
        let candidate = self.state.pending_tab_width();
        let tabs = self.state.pending_tabs.take().unwrap_or(offset..offset);

        if candidate > depth + 1 {
            return Err(LexError::new(
                LexErrorKind::IndentationJump {
                    depth,
                    found: candidate,
                },
                source.span(tabs),
            ));
        }

        if candidate == depth + 1 {
            trace!(depth = candidate, "indent");
            let token = self.synthetic(self.layout.indent, tabs);
            self.pending.push_back(Ok(token));
        } else if candidate == depth {
            if depth > 0 {
                trace!(depth, "indent continue");
                let token = self.synthetic(self.layout.indent_continue, tabs);
                self.pending.push_back(Ok(token));
            }
        } else {
            trace!(from = depth, to = candidate, "deindent");
            for _ in candidate..depth {
                let token = self.synthetic(self.layout.deindent, offset..offset);
                self.pending.push_back(Ok(token));
            }
        }
        self.state.depth = candidate;
        Ok(())
    }

    /// Unwind every open level at the end of input.
    fn close(&mut self, source: &SourceFile) {
        let end = source.len();
        if self.state.depth > 0 {
            trace!(from = self.state.depth, "deindent at end of input");
        }
        for _ in 0..self.state.depth {
            let token = self.synthetic(self.layout.deindent, end..end);
            self.pending.push_back(Ok(token));
        }
        self.state.depth = 0;
        self.finished = true;
    }

    fn fail(&mut self, err: LexError) -> Option<Result<Token, LexError>> {
        self.pending.clear();
        self.finished = true;
        Some(Err(err))
    }
}

impl<'s> TokenSource<'s> for IndentationScanner<'s> {
    fn source(&self) -> &'s SourceFile {
        self.inner.source()
    }

    fn offset(&self) -> usize {
        self.inner.offset()
    }

    fn advance_to(&mut self, offset: usize) {
        self.inner.advance_to(offset)
    }

    fn next_token(&mut self) -> Option<Result<Token, LexError>> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                if item.is_err() {
                    self.pending.clear();
                    self.finished = true;
                }
                return Some(item);
            }
            if self.finished {
                return None;
            }

            let source = self.inner.source();
            let offset = self.inner.offset();
            if offset >= source.len() {
                self.close(source);
                continue;
            }

            match layout_at(source.text(), offset) {
                Some((Layout::Newline, length)) => {
                    let range = offset..offset + length;
                    self.inner.advance_to(range.end);
                    self.state.start_line();
                    return Some(Ok(Token::from_source(self.layout.newline, source, range)));
                }
                Some((Layout::Tabs, length))
                    if self.state.line_start && !self.state.ignored_seen =>
                {
                    let range = offset..offset + length;
                    self.inner.advance_to(range.end);
                    if self.state.spaces_seen {
                        if self.state.misplaced_tabs.is_none() {
                            self.state.misplaced_tabs = Some(range);
                        }
                    } else {
                        self.state.pending_tabs = Some(range);
                    }
                }
                Some((_, length)) => {
                    let range = offset..offset + length;
                    self.inner.advance_to(range.end);
                    if self.state.line_start {
                        self.state.spaces_seen = true;
                    }
                    return Some(Ok(Token::from_source(self.layout.space, source, range)));
                }
                None => match self.inner.next_token() {
                    Some(Ok(token)) if self.state.line_start => {
                        if self.layout.ignored.contains(token.category) {
                            self.state.ignored_seen = true;
                        } else if let Err(err) = self.open_line(source, token.start) {
                            return self.fail(err);
                        }
                        self.pending.push_back(Ok(token));
                    }
                    Some(item) => self.pending.push_back(item),
                    None => self.close(source),
                },
            }
        }
    }
}
