//! Grammars loaded from TOML configuration

use std::path::PathBuf;

use descent::config::{GrammarConfig, Loader, VirtualLexerKind};
use descent::lexing;
use descent::testing::describe_tokens;
use descent::{GrammarError, SourceFile};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn outline_config() -> GrammarConfig {
    Loader::new()
        .with_file(fixture("outline.toml"))
        .build()
        .expect("outline config loads")
}

#[test]
fn test_file_layers_over_defaults() {
    let config = outline_config();
    assert_eq!(config.parser.lookahead, 2);
    assert_eq!(config.categories.len(), 4);
    assert_eq!(config.virtual_lexers[0].kind, VirtualLexerKind::Indentation);
}

#[test]
fn test_configured_grammar_lexes() {
    let grammar = outline_config().build().unwrap();
    let source = SourceFile::new("a: # header\n\tb: 1\n");
    let stream = lexing::lex(&grammar, &source).unwrap();
    assert_eq!(
        describe_tokens(&grammar, &stream),
        vec!["Key(a)", "Colon", "Indent", "Key(b)", "Colon", "Num(1)", "Deindent"]
    );
}

#[test]
fn test_configured_comment_lines_stay_invisible() {
    let grammar = outline_config().build().unwrap();
    let source = SourceFile::new("a:\n\tb: 1\n\t# note\n# aside\n\tc: 2\n");
    let stream = lexing::lex(&grammar, &source).unwrap();
    assert_eq!(
        describe_tokens(&grammar, &stream),
        vec![
            "Key(a)",
            "Colon",
            "Indent",
            "Key(b)",
            "Colon",
            "Num(1)",
            "IndentContinue",
            "Key(c)",
            "Colon",
            "Num(2)",
            "Deindent"
        ]
    );
}

#[test]
fn test_override_wins_over_file() {
    let config = Loader::new()
        .with_file(fixture("outline.toml"))
        .set_override("parser.lookahead", 8_i64)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(config.build().unwrap().lookahead(), 8);
}

#[test]
fn test_missing_optional_file_is_ignored() {
    let config = Loader::new()
        .with_optional_file(fixture("does-not-exist.toml"))
        .build()
        .unwrap();
    assert_eq!(config.parser.lookahead, 4);
}

#[test]
fn test_missing_required_file_fails() {
    let result = Loader::new()
        .with_file(fixture("does-not-exist.toml"))
        .build();
    assert!(result.is_err());
}

#[test]
fn test_invalid_pattern_is_reported() {
    let config = Loader::new()
        .with_toml("[[categories]]\nname = \"Broken\"\nregex = \"[a-\"\n")
        .build()
        .unwrap();
    assert!(matches!(
        config.build(),
        Err(GrammarError::InvalidPattern { ref name, .. }) if name == "Broken"
    ));
}

#[test]
fn test_zero_lookahead_is_rejected() {
    let config = Loader::new()
        .with_toml("[[categories]]\nname = \"A\"\nliteral = \"a\"\n")
        .set_override("parser.lookahead", 0_i64)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(config.build().unwrap_err(), GrammarError::InvalidLookahead);
}
