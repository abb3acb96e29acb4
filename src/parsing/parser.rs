//! Parser runtime
//!
//!     A [Parser] owns one [TokenStream] and walks it with grammar-author rules. Rules are
//!     ordinary functions taking `&mut Parser`; they call each other directly and compose the
//!     primitive operations below:
//!
//!         - consume / consume_one: match and take tokens
//!         - or: pick one alternative of a [Choice]
//!         - maybe / many / maybe_many: optional and repeated bodies guarded by a [Decidable]
//!         - many_separated / maybe_many_separated: separated repetition
//!         - exit: require the whole stream to be consumed
//!
//!     Every branch is decided by peeking before anything is consumed, so a rejected
//!     alternative never moves the cursor and the runtime never rewinds. The cursor moves
//!     only forward, and only when tokens are consumed.
//!
//!     A parser is single threaded and serves one parse at a time. Grammars are shared:
//!     several parsers (on several threads) can hold the same `Arc<Grammar>`.
//!
//! Example
//!
//!     fn list(p: &mut Parser, c: &ListCategories) -> ParseResult<Vec<u64>> {
//!         p.rule("list", |p| {
//!             p.consume_one(c.left)?;
//!             let items = p.maybe_many_separated(&c.item, &c.comma, |p| number(p, c))?;
//!             p.consume_one(c.right)?;
//!             Ok(items)
//!         })
//!     }

use std::sync::Arc;

use tracing::{debug, trace};

use crate::grammar::Grammar;
use crate::lexing::{self, LexError};
use crate::parsing::decidable::{Alternative, Choice, Decidable};
use crate::parsing::error::{ParseError, ParseErrorKind, ParseResult, RuleFrame};
use crate::source::SourceFile;
use crate::token::{CategorySet, Token, TokenStream};

/// The alternative chosen by [`Parser::or`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A rule alternative; the body invokes the rule.
    Rule(usize),
    /// A token alternative, already consumed.
    Tokens { index: usize, tokens: Vec<Token> },
}

impl Selection {
    pub fn index(&self) -> usize {
        match self {
            Selection::Rule(index) | Selection::Tokens { index, .. } => *index,
        }
    }
}

#[derive(Debug)]
pub struct Parser {
    grammar: Arc<Grammar>,
    stream: TokenStream,
    rules: Vec<RuleFrame>,
}

impl Parser {
    /// A parser over empty input. Call [`Parser::reset`] to load a source.
    pub fn new(grammar: Arc<Grammar>) -> Self {
        Self {
            grammar,
            stream: TokenStream::empty(),
            rules: Vec::new(),
        }
    }

    /// A parser over `source`.
    pub fn for_source(grammar: Arc<Grammar>, source: impl Into<SourceFile>) -> Result<Self, LexError> {
        let mut parser = Self::new(grammar);
        parser.reset(source)?;
        Ok(parser)
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Drop the current stream and lex `source` from scratch.
    ///
    /// On failure the parser is left over empty input.
    pub fn reset(&mut self, source: impl Into<SourceFile>) -> Result<(), LexError> {
        let source = source.into();
        self.rules.clear();
        self.stream = TokenStream::empty();
        self.stream = lexing::lex(&self.grammar, &source)?;
        Ok(())
    }

    /// Lex `source`, run `top` and require all input to be consumed.
    pub fn parse<T, F>(&mut self, source: impl Into<SourceFile>, top: F) -> crate::Result<T>
    where
        F: FnOnce(&mut Self) -> ParseResult<T>,
    {
        self.reset(source)?;
        let value = top(self)?;
        self.exit()?;
        Ok(value)
    }

    pub fn stream(&self) -> &TokenStream {
        &self.stream
    }

    pub fn cursor(&self) -> usize {
        self.stream.cursor()
    }

    pub fn peek(&self, offset: usize) -> Option<&Token> {
        self.stream.peek(offset)
    }

    /// Whether `decidable` matches at the cursor.
    pub fn at(&self, decidable: &Decidable) -> bool {
        decidable.matches(&self.stream)
    }

    /// Active rules, outermost first.
    pub fn rule_stack(&self) -> &[RuleFrame] {
        &self.rules
    }

    /// Run `body` as the rule `name`, so that errors raised inside it name the rule.
    pub fn rule<T, F>(&mut self, name: &'static str, body: F) -> ParseResult<T>
    where
        F: FnOnce(&mut Self) -> ParseResult<T>,
    {
        self.rules.push(RuleFrame {
            name,
            start: self.cursor(),
        });
        let result = body(self);
        self.rules.pop();
        result
    }

    /// Take one token per step, failing without consuming anything on the first mismatch.
    pub fn consume<I, S>(&mut self, steps: I) -> ParseResult<Vec<Token>>
    where
        I: IntoIterator<Item = S>,
        S: Into<CategorySet>,
    {
        let steps: Vec<CategorySet> = steps.into_iter().map(Into::into).collect();
        for (offset, set) in steps.iter().enumerate() {
            let accepted = self
                .stream
                .peek(offset)
                .is_some_and(|token| set.contains(token.category));
            if !accepted {
                return Err(self.unexpected(set, offset));
            }
        }
        Ok(self.take(steps.len()))
    }

    pub fn consume_one(&mut self, category: impl Into<CategorySet>) -> ParseResult<Token> {
        let set: CategorySet = category.into();
        let token = match self.stream.current() {
            Some(token) if set.contains(token.category) => token.clone(),
            _ => return Err(self.unexpected(&set, 0)),
        };
        self.take(1);
        Ok(token)
    }

    /// Run `body` with the first alternative of `choice` that matches at the cursor.
    ///
    /// Token alternatives are consumed before `body` runs and handed over in the
    /// [Selection]; rule alternatives leave the cursor where it is.
    pub fn or<T, F>(&mut self, choice: &Choice, body: F) -> ParseResult<T>
    where
        F: FnOnce(&mut Self, Selection) -> ParseResult<T>,
    {
        let Some(index) = choice.select(&self.stream) else {
            let kind = ParseErrorKind::NoMatchingAlternative {
                expected: self.grammar.describe_set(&choice.first_categories()),
                found: self.found(0),
            };
            return Err(self.error(kind, 0));
        };

        debug!(
            rule = self.current_rule(),
            alternative = index,
            cursor = self.cursor(),
            "selected alternative"
        );
        let selection = match &choice.alternatives()[index] {
            Alternative::Rule(_) => Selection::Rule(index),
            Alternative::Tokens(path) => Selection::Tokens {
                index,
                tokens: self.take(path.len()),
            },
        };
        body(self, selection)
    }

    /// Run `body` once if `decidable` matches, otherwise return `None` without consuming.
    pub fn maybe<T, F>(&mut self, decidable: &Decidable, body: F) -> ParseResult<Option<T>>
    where
        F: FnOnce(&mut Self) -> ParseResult<T>,
    {
        if !self.at(decidable) {
            return Ok(None);
        }
        trace!(rule = self.current_rule(), cursor = self.cursor(), "maybe taken");
        body(self).map(Some)
    }

    /// Run `body` while `decidable` matches; at least once.
    pub fn many<T, F>(&mut self, decidable: &Decidable, body: F) -> ParseResult<Vec<T>>
    where
        F: FnMut(&mut Self) -> ParseResult<T>,
    {
        if !self.at(decidable) {
            return Err(self.expected_at_least_one(decidable));
        }
        self.maybe_many(decidable, body)
    }

    /// Run `body` while `decidable` matches; zero iterations is fine.
    pub fn maybe_many<T, F>(&mut self, decidable: &Decidable, mut body: F) -> ParseResult<Vec<T>>
    where
        F: FnMut(&mut Self) -> ParseResult<T>,
    {
        let mut items = Vec::new();
        while self.at(decidable) {
            let before = self.cursor();
            items.push(body(self)?);
            if self.cursor() == before {
                return Err(self.error(ParseErrorKind::StalledRepetition, 0));
            }
        }
        trace!(
            rule = self.current_rule(),
            iterations = items.len(),
            "repetition done"
        );
        Ok(items)
    }

    /// `body (separator body)*`, at least one `body`.
    ///
    /// A matched separator commits: the next `body` runs unconditionally, so a trailing
    /// separator surfaces as the error `body` raises.
    pub fn many_separated<T, F>(
        &mut self,
        decidable: &Decidable,
        separator: &Decidable,
        body: F,
    ) -> ParseResult<Vec<T>>
    where
        F: FnMut(&mut Self) -> ParseResult<T>,
    {
        if !self.at(decidable) {
            return Err(self.expected_at_least_one(decidable));
        }
        self.maybe_many_separated(decidable, separator, body)
    }

    /// Zero or more `body`, separated by `separator`.
    pub fn maybe_many_separated<T, F>(
        &mut self,
        decidable: &Decidable,
        separator: &Decidable,
        mut body: F,
    ) -> ParseResult<Vec<T>>
    where
        F: FnMut(&mut Self) -> ParseResult<T>,
    {
        let mut items = Vec::new();
        if !self.at(decidable) {
            return Ok(items);
        }
        items.push(body(self)?);

        loop {
            let Some(length) = separator
                .paths()
                .iter()
                .find(|path| path.matches(&self.stream))
                .map(|path| path.len())
            else {
                break;
            };
            let before = self.cursor();
            self.take(length);
            items.push(body(self)?);
            if self.cursor() == before {
                return Err(self.error(ParseErrorKind::StalledRepetition, 0));
            }
        }
        trace!(
            rule = self.current_rule(),
            items = items.len(),
            "separated repetition done"
        );
        Ok(items)
    }

    /// Require the cursor to be at the end of the stream.
    pub fn exit(&mut self) -> ParseResult<()> {
        if self.stream.is_at_end() {
            return Ok(());
        }
        let kind = ParseErrorKind::TrailingInput {
            found: self.found(0),
        };
        Err(self.error(kind, 0))
    }

    fn take(&mut self, count: usize) -> Vec<Token> {
        let tokens = self.stream.remaining()[..count.min(self.stream.remaining().len())].to_vec();
        for token in &tokens {
            trace!(token = %self.grammar.describe(token), "consume");
        }
        self.stream.advance(tokens.len());
        tokens
    }

    fn current_rule(&self) -> &'static str {
        self.rules.last().map_or("<top>", |frame| frame.name)
    }

    fn found(&self, offset: usize) -> String {
        match self.stream.peek(offset) {
            Some(token) => self.grammar.describe(token),
            None => "end of input".to_string(),
        }
    }

    fn unexpected(&self, expected: &CategorySet, offset: usize) -> Box<ParseError> {
        let kind = ParseErrorKind::UnexpectedToken {
            expected: self.grammar.describe_set(expected),
            found: self.found(offset),
        };
        self.error(kind, offset)
    }

    fn expected_at_least_one(&self, decidable: &Decidable) -> Box<ParseError> {
        let first: CategorySet = decidable
            .paths()
            .iter()
            .filter_map(|path| path.steps().first())
            .flat_map(CategorySet::iter)
            .collect();
        let kind = ParseErrorKind::ExpectedAtLeastOne {
            expected: self.grammar.describe_set(&first),
            found: self.found(0),
        };
        self.error(kind, 0)
    }

    fn error(&self, kind: ParseErrorKind, offset: usize) -> Box<ParseError> {
        Box::new(ParseError {
            kind,
            span: self.stream.span_at(offset),
            rules: self.rules.clone(),
        })
    }
}
