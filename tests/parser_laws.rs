//! Laws of the parser runtime, checked over generated token sequences

use descent::testing::BracketList;
use descent::{Alternative, Decidable, Parser, Selection};
use proptest::prelude::*;

/// Any mix of the bracket list tokens.
fn token_soup() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof!["\\[", "\\]", ",", "[0-9]{1,3}"], 0..30)
        .prop_map(|parts| parts.join(" "))
}

fn loaded(fixture: &BracketList, input: &str) -> Parser {
    let mut parser = fixture.parser();
    parser.reset(input).expect("input lexes");
    parser
}

/// Walk `input` with `or` over every bracket, returning the selected indices.
fn selections(fixture: &BracketList, input: &str) -> Vec<usize> {
    let choice = fixture
        .grammar
        .choice([
            Alternative::tokens([fixture.left]),
            Alternative::tokens([fixture.right]),
            Alternative::tokens([fixture.comma]),
            Alternative::rule(Decidable::path([fixture.num])),
        ])
        .unwrap();
    let mut parser = loaded(fixture, input);
    let mut picked = Vec::new();
    while !parser.stream().is_at_end() {
        let index = parser
            .or(&choice, |p, selection| {
                if let Selection::Rule(_) = selection {
                    p.consume_one(fixture.num)?;
                }
                Ok(selection.index())
            })
            .unwrap();
        picked.push(index);
    }
    picked
}

proptest! {
    #[test]
    fn test_cursor_is_monotonic(input in token_soup()) {
        let fixture = BracketList::new().unwrap();
        let brackets = fixture
            .grammar
            .choice([
                Alternative::tokens([fixture.left]),
                Alternative::tokens([fixture.right]),
            ])
            .unwrap();
        let mut parser = loaded(&fixture, &input);

        while !parser.stream().is_at_end() {
            let before = parser.cursor();
            match parser.maybe(&fixture.item, |p| p.consume_one(fixture.num)).unwrap() {
                Some(_) => prop_assert_eq!(parser.cursor(), before + 1),
                None => prop_assert_eq!(parser.cursor(), before),
            }

            let before = parser.cursor();
            match parser.or(&brackets, |_, selection| Ok(selection)) {
                Ok(_) => prop_assert_eq!(parser.cursor(), before + 1),
                Err(_) => prop_assert_eq!(parser.cursor(), before),
            }

            let before = parser.cursor();
            if parser.many(&fixture.separator, |p| p.consume_one(fixture.comma)).is_err() {
                prop_assert_eq!(parser.cursor(), before);
            } else {
                prop_assert!(parser.cursor() > before);
            }
        }
    }

    #[test]
    fn test_first_match_is_deterministic(input in token_soup()) {
        let fixture = BracketList::new().unwrap();
        let first = selections(&fixture, &input);
        let second = selections(&fixture, &input);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_many_separated_returns_items_in_order(items in prop::collection::vec(0u32..1000, 1..20)) {
        let fixture = BracketList::new().unwrap();
        let input = items.iter().map(u32::to_string).collect::<Vec<_>>().join(", ");
        let mut parser = loaded(&fixture, &input);

        let parsed = parser
            .many_separated(&fixture.item, &fixture.separator, |p| Ok(p.consume_one(fixture.num)?.text))
            .unwrap();
        let expected: Vec<String> = items.iter().map(u32::to_string).collect();
        prop_assert_eq!(parsed, expected);
        prop_assert!(parser.exit().is_ok());
    }

    #[test]
    fn test_maybe_many_separated_without_items(brackets in prop::collection::vec(prop_oneof!["\\[", "\\]", ","], 0..10)) {
        let fixture = BracketList::new().unwrap();
        let mut parser = loaded(&fixture, &brackets.join(" "));

        let parsed = parser
            .maybe_many_separated(&fixture.item, &fixture.separator, |p| p.consume_one(fixture.num))
            .unwrap();
        prop_assert!(parsed.is_empty());
        prop_assert_eq!(parser.cursor(), 0);
    }
}

#[test]
fn test_prefix_alternatives_resolve_in_declaration_order() {
    let fixture = BracketList::new().unwrap();
    let choice = fixture
        .grammar
        .choice([
            Alternative::tokens([fixture.num, fixture.comma]),
            Alternative::tokens([fixture.num]),
        ])
        .unwrap();

    let mut parser = loaded(&fixture, "1, 2");
    let picked = parser.or(&choice, |_, selection| Ok(selection.index())).unwrap();
    assert_eq!(picked, 0);
    let picked = parser.or(&choice, |_, selection| Ok(selection.index())).unwrap();
    assert_eq!(picked, 1);
    assert!(parser.exit().is_ok());
}
