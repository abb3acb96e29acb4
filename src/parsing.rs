//! Parsing: lookahead decisions and the combinator runtime
//!
//!     - [decidable]: the finite-lookahead decision model, validated when the grammar is
//!       assembled
//!     - [parser]: the runtime that walks a token stream with grammar-author rules
//!     - [error]: parse errors and the boxed result type

pub mod decidable;
pub mod error;
pub mod parser;

pub use decidable::{Alternative, Choice, Decidable, LookaheadPath};
pub use error::{ParseError, ParseErrorKind, ParseResult, RuleFrame};
pub use parser::{Parser, Selection};
