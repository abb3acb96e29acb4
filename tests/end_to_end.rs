//! End-to-end tests: grammar assembly, lexing, parsing and diagnostics together

use std::sync::Arc;
use std::thread;

use descent::testing::BracketList;
use descent::{Diagnostic, Error, ParseErrorKind};

#[test]
fn test_number_list() {
    let fixture = BracketList::new().unwrap();
    assert_eq!(fixture.parse("[1,2,3]").unwrap(), vec!["1", "2", "3"]);
}

#[test]
fn test_trailing_comma_points_at_bracket() {
    let fixture = BracketList::new().unwrap();
    let Err(Error::Parse(err)) = fixture.parse("[1,2,]") else {
        panic!("expected a parse error");
    };
    assert_eq!(
        err.kind,
        ParseErrorKind::UnexpectedToken {
            expected: vec!["Num".into()],
            found: "RightBracket".into(),
        }
    );
    assert_eq!(err.span.text(), "]");
    assert_eq!((err.span.line, err.span.column), (1, 5));
    assert_eq!(err.rule_path(), "list > number");
}

#[test]
fn test_trailing_input_after_list() {
    let fixture = BracketList::new().unwrap();
    let Err(Error::Parse(err)) = fixture.parse("[1] 2") else {
        panic!("expected a parse error");
    };
    assert_eq!(
        err.kind,
        ParseErrorKind::TrailingInput {
            found: "Num(2)".into()
        }
    );
}

#[test]
fn test_lex_error_surfaces_through_parse() {
    let fixture = BracketList::new().unwrap();
    let err = fixture.parse("[1; 2]").unwrap_err();
    assert!(matches!(err, Error::Lex(_)));
    let diagnostic = Diagnostic::from_error(&err).unwrap();
    assert_eq!(diagnostic.title, "unrecognized input");
}

#[test]
fn test_parser_is_reusable_across_sources() {
    let fixture = BracketList::new().unwrap();
    let mut parser = fixture.parser();
    assert_eq!(
        parser.parse("[4, 5]", |p| fixture.list(p)).unwrap(),
        vec!["4", "5"]
    );
    assert!(parser.parse("[4,", |p| fixture.list(p)).is_err());
    assert_eq!(
        parser.parse("[\n  6\n]", |p| fixture.list(p)).unwrap(),
        vec!["6"]
    );
}

#[test]
fn test_rendered_diagnostic() {
    let fixture = BracketList::new().unwrap();
    let err = fixture.parse("[1,2,]").unwrap_err();
    let diagnostic = Diagnostic::from_error(&err).unwrap();
    insta::assert_snapshot!(diagnostic.render(), @r###"
    error: unexpected token
     --> <input>:1:5
      |
    1 | [1,2,]
      |      ^ expected Num, found RightBracket
      = note: while parsing list > number
    "###);
}

#[test]
fn test_grammar_is_shared_across_threads() {
    let fixture = Arc::new(BracketList::new().unwrap());
    let handles: Vec<_> = (0..4)
        .map(|n| {
            let fixture = Arc::clone(&fixture);
            thread::spawn(move || {
                let input = format!("[{}, {}]", n, n + 1);
                fixture.parse(&input).map_err(|err| err.to_string())
            })
        })
        .collect();

    for (n, handle) in handles.into_iter().enumerate() {
        let items = handle.join().unwrap().unwrap();
        assert_eq!(items, vec![n.to_string(), (n + 1).to_string()]);
    }
}
