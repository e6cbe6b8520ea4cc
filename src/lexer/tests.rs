//! Unit tests for the lexer module.
//!
//! Covers keyword and literal classification, escapes, operators and
//! punctuation, comments, and the layout tokens produced by indentation.

use std::collections::HashSet;

use super::{
    lexer::{preprocess, tokenize, tokenize_with},
    tokens::{Token, TokenKind},
};
use crate::errors::errors::ErrorImpl;

fn lex(source: &str) -> Vec<Token> {
    tokenize(source.to_string(), Some("test.ps".to_string())).unwrap()
}

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).iter().map(|t| t.kind).collect()
}

fn lex_error(source: &str) -> ErrorImpl {
    tokenize(source.to_string(), Some("test.ps".to_string()))
        .unwrap_err()
        .get_internal()
        .clone()
}

#[test]
fn test_tokenize_keywords() {
    let tokens = lex("start Declarations num end proc return if then endif");

    for token in &tokens[..9] {
        assert_eq!(token.kind, TokenKind::Keyword);
        assert_eq!(token.type_name(), token.value);
    }
    assert_eq!(tokens[9].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_names_and_bools() {
    let tokens = lex("foo baz_123 _under true false AND");

    assert_eq!(tokens[0].kind, TokenKind::Name);
    assert_eq!(tokens[0].type_name(), "name");
    assert_eq!(tokens[1].value, "baz_123");
    assert_eq!(tokens[2].kind, TokenKind::Name);
    assert_eq!(tokens[3].kind, TokenKind::Bool);
    assert_eq!(tokens[3].type_name(), "literal_bool");
    assert_eq!(tokens[4].kind, TokenKind::Bool);
    assert_eq!(tokens[5].kind, TokenKind::Operator);
    assert_eq!(tokens[5].type_name(), "op");
}

#[test]
fn test_tokenize_numbers() {
    let tokens = lex("42 3.14 .5 7.");

    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].value, "42");
    assert_eq!(tokens[0].type_name(), "literal_num");
    assert_eq!(tokens[1].kind, TokenKind::Float);
    assert_eq!(tokens[1].value, "3.14");
    assert_eq!(tokens[2].kind, TokenKind::Float);
    assert_eq!(tokens[2].value, ".5");
    assert_eq!(tokens[3].kind, TokenKind::Float);
    assert_eq!(tokens[3].value, "7.");
    assert_eq!(tokens[4].kind, TokenKind::EOF);
}

#[test]
fn test_malformed_number() {
    assert_eq!(
        lex_error("x = 1.2.3"),
        ErrorImpl::MalformedNumber { token: "1.2.".to_string() }
    );
}

#[test]
fn test_tokenize_string_escapes() {
    let tokens = lex(r#""a\nb" "\n\t\x41" "\q" "\s" "say \"hi\"""#);

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "a\nb");
    assert_eq!(tokens[1].value, "\n\tA");
    assert_eq!(tokens[2].value, "q");
    assert_eq!(tokens[3].value, " ");
    assert_eq!(tokens[4].value, "say \"hi\"");
    assert_eq!(tokens[5].kind, TokenKind::EOF);
}

#[test]
fn test_string_errors() {
    assert_eq!(
        lex_error("\"abc"),
        ErrorImpl::InvalidString { message: "unterminated string".to_string() }
    );
    assert_eq!(
        lex_error("\"abc\\"),
        ErrorImpl::InvalidString { message: "cannot escape end of input".to_string() }
    );
    assert_eq!(
        lex_error("\"\\xZ1\""),
        ErrorImpl::InvalidString { message: "invalid hex sequence".to_string() }
    );
}

#[test]
fn test_curly_quotes_are_normalised() {
    let source = preprocess("output \u{201C}hi\u{201D}");
    let tokens = tokenize(source, None).unwrap();

    assert_eq!(tokens[1].kind, TokenKind::String);
    assert_eq!(tokens[1].value, "hi");
}

#[test]
fn test_tokenize_operators() {
    let tokens = lex("<= >= <> < > ~ / % ^ & * - +");
    let values: Vec<&str> = tokens[..13].iter().map(|t| t.value.as_str()).collect();

    assert!(tokens[..13].iter().all(|t| t.kind == TokenKind::Operator));
    assert_eq!(
        values,
        vec!["<=", ">=", "<>", "<", ">", "~", "/", "%", "^", "&", "*", "-", "+"]
    );
}

#[test]
fn test_tokenize_punctuation() {
    let tokens = lex("( ) = [ ] { } , . ; :");

    for token in &tokens[..11] {
        assert_eq!(token.kind, TokenKind::Symbol);
        assert_eq!(token.type_name(), token.value);
    }
    assert_eq!(tokens[11].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_comments() {
    let tokens = lex("x // this is a comment\ny");

    assert_eq!(tokens.len(), 4);
    assert_eq!(tokens[0].value, "x");
    assert_eq!(tokens[1].kind, TokenKind::Newline);
    assert_eq!(tokens[2].value, "y");
    assert_eq!(tokens[3].kind, TokenKind::EOF);
}

#[test]
fn test_unrecognised_character() {
    assert_eq!(
        lex_error("x @ y"),
        ErrorImpl::UnrecognisedToken { token: "@".to_string() }
    );
}

#[test]
fn test_indent_and_dedent() {
    use TokenKind::*;

    assert_eq!(
        kinds("a\n  b\n  c\nd"),
        vec![Name, Indent, Name, Newline, Name, Dedent, Newline, Name, EOF]
    );
}

#[test]
fn test_multiple_dedents() {
    use TokenKind::*;

    assert_eq!(
        kinds("a\n b\n  c\nd"),
        vec![Name, Indent, Name, Indent, Name, Dedent, Dedent, Newline, Name, EOF]
    );
}

#[test]
fn test_dedent_between_levels_is_an_error() {
    assert_eq!(
        lex_error("a\n    b\n  c"),
        ErrorImpl::IncompatibleDedent { from: "    ".to_string(), to: "  ".to_string() }
    );
}

#[test]
fn test_mixed_tabs_and_spaces() {
    assert!(matches!(
        lex_error("a\n\tb\n  c"),
        ErrorImpl::IncompatibleDedent { .. }
    ));
}

#[test]
fn test_newlines_inside_brackets_are_ignored() {
    use TokenKind::*;

    assert_eq!(
        kinds("f(1,\n      2)\nx"),
        vec![Name, Symbol, Number, Symbol, Number, Symbol, Newline, Name, EOF]
    );
}

#[test]
fn test_blank_lines_collapse() {
    use TokenKind::*;

    assert_eq!(kinds("a\n\n\n  b"), vec![Name, Indent, Name, EOF]);
    assert_eq!(kinds("a\n    \nb"), vec![Name, Newline, Name, EOF]);
}

#[test]
fn test_no_dedents_at_end_of_input() {
    use TokenKind::*;

    assert_eq!(kinds("a\n  b\n"), vec![Name, Indent, Name, EOF]);
    assert_eq!(kinds("  a"), vec![Name, EOF]);
}

#[test]
fn test_token_spans() {
    let tokens = lex("ab \"cd\"");

    assert_eq!(tokens[0].span.start.0, 0);
    assert_eq!(tokens[0].span.end.0, 2);
    assert_eq!(tokens[1].span.start.0, 3);
    assert_eq!(tokens[1].span.end.0, 7);
    assert_eq!(tokens[1].span.start.1.as_str(), "test.ps");
}

#[test]
fn test_default_file_name() {
    let tokens = tokenize("x".to_string(), None).unwrap();
    assert_eq!(tokens[0].span.start.1.as_str(), "shell");
}

#[test]
fn test_custom_keyword_sets() {
    let keywords: HashSet<&str> = ["foo"].into_iter().collect();
    let keyops: HashSet<&str> = ["MOD"].into_iter().collect();
    let tokens = tokenize_with("foo MOD start".to_string(), None, &keywords, &keyops).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Keyword);
    assert_eq!(tokens[1].kind, TokenKind::Operator);
    assert_eq!(tokens[2].kind, TokenKind::Name);
}

#[test]
fn test_describe_tokens() {
    let tokens = lex("x \"s\"\n  y");

    assert_eq!(tokens[0].describe(), "x");
    assert_eq!(tokens[1].describe(), "\"s\"");
    assert_eq!(tokens[2].describe(), "INDENT");
    assert_eq!(tokens[4].describe(), "EOF");
}
