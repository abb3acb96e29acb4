//! Testing utilities: shared grammar fixtures
//!
//!     Two small grammars cover the whole runtime and are reused by unit and integration
//!     tests alike:
//!
//!         - [BracketList]: `[1, 2, 3]` style lists, exercising consumption and separated
//!           repetition
//!         - [Outline]: indented `key: value` blocks, exercising the indentation lexer,
//!           choices and recursive rules
//!
//!     Both are built from code rather than configuration so tests can hold on to the
//!     category ids and decisions they need.

use std::sync::Arc;

use crate::grammar::{Grammar, GrammarError};
use crate::lexing::indentation::{DEINDENT, INDENT, INDENT_CONTINUE};
use crate::lexing::IndentationLexer;
use crate::parsing::{Alternative, Choice, Decidable, ParseResult, Parser, Selection};
use crate::token::{TokenCategory, TokenStream};

/// `Name` / `Name(text)` of every token in `stream`.
pub fn describe_tokens(grammar: &Grammar, stream: &TokenStream) -> Vec<String> {
    stream
        .tokens()
        .iter()
        .map(|token| grammar.describe(token))
        .collect()
}

/// Bracketed, comma separated number lists.
#[derive(Debug, Clone)]
pub struct BracketList {
    pub grammar: Arc<Grammar>,
    pub left: TokenCategory,
    pub right: TokenCategory,
    pub comma: TokenCategory,
    pub num: TokenCategory,
    pub item: Decidable,
    pub separator: Decidable,
}

impl BracketList {
    pub fn new() -> Result<Self, GrammarError> {
        let grammar = Grammar::builder()
            .literal("LeftBracket", "[")
            .literal("RightBracket", "]")
            .literal("Comma", ",")
            .pattern("Num", "[0-9]+")
            .ignore("Space", r"[ \t\r\n]+")
            .build()?;

        let num = grammar.category("Num")?;
        let comma = grammar.category("Comma")?;
        let item = grammar.decidable(Decidable::path([num]))?;
        let separator = grammar.decidable(Decidable::path([comma]))?;

        Ok(Self {
            left: grammar.category("LeftBracket")?,
            right: grammar.category("RightBracket")?,
            comma,
            num,
            item,
            separator,
            grammar: Arc::new(grammar),
        })
    }

    pub fn parser(&self) -> Parser {
        Parser::new(self.grammar.clone())
    }

    /// `list := "[" (Num ("," Num)*)? "]"`
    pub fn list(&self, p: &mut Parser) -> ParseResult<Vec<String>> {
        p.rule("list", |p| {
            p.consume_one(self.left)?;
            let items = p.maybe_many_separated(&self.item, &self.separator, |p| {
                p.rule("number", |p| Ok(p.consume_one(self.num)?.text))
            })?;
            p.consume_one(self.right)?;
            Ok(items)
        })
    }

    /// Parse a whole list and require nothing after it.
    pub fn parse(&self, input: &str) -> crate::Result<Vec<String>> {
        self.parser().parse(input, |p| self.list(p))
    }
}

/// Value of an outline entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineValue {
    Number(String),
    Block(Vec<OutlineEntry>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub key: String,
    pub value: OutlineValue,
}

/// Indented `key: value` blocks:
///
///     outline := entry+
///     entry   := Key ":" (Num | Indent entry (IndentContinue entry)* Deindent)
#[derive(Debug, Clone)]
pub struct Outline {
    pub grammar: Arc<Grammar>,
    pub key: TokenCategory,
    pub colon: TokenCategory,
    pub num: TokenCategory,
    pub indent: TokenCategory,
    pub deindent: TokenCategory,
    pub indent_continue: TokenCategory,
    pub item: Decidable,
    pub sibling: Decidable,
    pub value: Choice,
}

impl Outline {
    pub fn new() -> Result<Self, GrammarError> {
        let grammar = Grammar::builder()
            .pattern("Key", "[a-z]+")
            .literal("Colon", ":")
            .pattern("Num", "[0-9]+")
            .ignore("Comment", r"#[^\n]*")
            .virtual_lexer("indentation", IndentationLexer::new())
            .lookahead(2)
            .build()?;

        let key = grammar.category("Key")?;
        let colon = grammar.category("Colon")?;
        let num = grammar.category("Num")?;
        let indent = grammar.category(INDENT)?;
        let indent_continue = grammar.category(INDENT_CONTINUE)?;

        let item = grammar.decidable(Decidable::path([key, colon]))?;
        let sibling = grammar.decidable(Decidable::path([indent_continue]))?;
        let value = grammar.choice([
            Alternative::tokens([num]),
            Alternative::rule(Decidable::path([indent])),
        ])?;

        Ok(Self {
            key,
            colon,
            num,
            indent,
            deindent: grammar.category(DEINDENT)?,
            indent_continue,
            item,
            sibling,
            value,
            grammar: Arc::new(grammar),
        })
    }

    pub fn parser(&self) -> Parser {
        Parser::new(self.grammar.clone())
    }

    pub fn outline(&self, p: &mut Parser) -> ParseResult<Vec<OutlineEntry>> {
        p.rule("outline", |p| p.many(&self.item, |p| self.entry(p)))
    }

    pub fn entry(&self, p: &mut Parser) -> ParseResult<OutlineEntry> {
        p.rule("entry", |p| {
            let head = p.consume([self.key, self.colon])?;
            let key = head.into_iter().map(|token| token.text).next().unwrap_or_default();
            let value = p.or(&self.value, |p, selection| match selection {
                Selection::Tokens { tokens, .. } => Ok(OutlineValue::Number(
                    tokens.into_iter().map(|token| token.text).collect(),
                )),
                Selection::Rule(_) => self.block(p).map(OutlineValue::Block),
            })?;
            Ok(OutlineEntry { key, value })
        })
    }

    fn block(&self, p: &mut Parser) -> ParseResult<Vec<OutlineEntry>> {
        p.rule("block", |p| {
            p.consume_one(self.indent)?;
            let entries = p.many_separated(&self.item, &self.sibling, |p| self.entry(p))?;
            p.consume_one(self.deindent)?;
            Ok(entries)
        })
    }

    pub fn parse(&self, input: &str) -> crate::Result<Vec<OutlineEntry>> {
        self.parser().parse(input, |p| self.outline(p))
    }
}
