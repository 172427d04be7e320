use lox::reporter::Reporter;
use lox::scanner::{Literal, Scanner, Token, TokenType};
use std::sync::Arc;

fn scan(source: &str) -> (Vec<Token>, Reporter) {
    let mut reporter = Reporter::new();
    let tokens = Scanner::new(source).scan_tokens(&mut reporter);
    (tokens, reporter)
}

fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
    let (tokens, reporter) = scan(source);
    assert!(!reporter.had_error, "unexpected lex error for: {}", source);
    let actual: Vec<(TokenType, String)> = tokens
        .iter()
        .map(|t| (t.token_type.clone(), t.lexeme.to_string()))
        .collect();
    let expected: Vec<(TokenType, String)> = expected
        .iter()
        .map(|(t, l)| (t.clone(), l.to_string()))
        .collect();
    assert_eq!(actual, expected, "for: {}", source);
}

fn string_literal(s: &str) -> TokenType {
    TokenType::String(Literal::String(Arc::new(s.to_string())))
}

fn number_literal(n: f64) -> TokenType {
    TokenType::Number(Literal::Number(n))
}

#[test]
fn punctuation_and_braces() {
    assert_token_sequence(
        "({*.,+*})",
        &[
            (TokenType::LeftParen, "("),
            (TokenType::LeftBrace, "{"),
            (TokenType::Star, "*"),
            (TokenType::Dot, "."),
            (TokenType::Comma, ","),
            (TokenType::Plus, "+"),
            (TokenType::Star, "*"),
            (TokenType::RightBrace, "}"),
            (TokenType::RightParen, ")"),
            (TokenType::Eof, ""),
        ],
    );
}

#[test]
fn one_and_two_char_operators() {
    assert_token_sequence(
        "! != = == < <= > >= / -",
        &[
            (TokenType::Bang, "!"),
            (TokenType::BangEqual, "!="),
            (TokenType::Equal, "="),
            (TokenType::EqualEqual, "=="),
            (TokenType::Less, "<"),
            (TokenType::LessEqual, "<="),
            (TokenType::Greater, ">"),
            (TokenType::GreaterEqual, ">="),
            (TokenType::Slash, "/"),
            (TokenType::Minus, "-"),
            (TokenType::Eof, ""),
        ],
    );
}

#[test]
fn comments_and_whitespace_are_skipped() {
    assert_token_sequence(
        "var x; // the rest is ignored ({*\n\tprint x;",
        &[
            (TokenType::Var, "var"),
            (TokenType::Identifier, "x"),
            (TokenType::Semicolon, ";"),
            (TokenType::Print, "print"),
            (TokenType::Identifier, "x"),
            (TokenType::Semicolon, ";"),
            (TokenType::Eof, ""),
        ],
    );
}

#[test]
fn keywords_versus_identifiers() {
    assert_token_sequence(
        "class classy orchid or _under score_99",
        &[
            (TokenType::Class, "class"),
            (TokenType::Identifier, "classy"),
            (TokenType::Identifier, "orchid"),
            (TokenType::Or, "or"),
            (TokenType::Identifier, "_under"),
            (TokenType::Identifier, "score_99"),
            (TokenType::Eof, ""),
        ],
    );
}

#[test]
fn number_literals() {
    assert_token_sequence(
        "123 45.67 0.5 9.",
        &[
            (number_literal(123.0), "123"),
            (number_literal(45.67), "45.67"),
            (number_literal(0.5), "0.5"),
            // A trailing dot is not part of the number.
            (number_literal(9.0), "9"),
            (TokenType::Dot, "."),
            (TokenType::Eof, ""),
        ],
    );
}

#[test]
fn string_literals_track_lines() {
    let (tokens, reporter) = scan("\"one\ntwo\"\nx");
    assert!(!reporter.had_error);
    assert_eq!(tokens[0].token_type, string_literal("one\ntwo"));
    // The string token reports the line where it ends.
    assert_eq!(tokens[0].line, 2);
    assert_eq!(tokens[1].lexeme.as_str(), "x");
    assert_eq!(tokens[1].line, 3);
    assert_eq!(tokens[2].token_type, TokenType::Eof);
}

#[test]
fn unterminated_string_reports_and_flags() {
    let (tokens, reporter) = scan("\"never closed");
    assert!(reporter.had_error);
    // No string token is produced; only the EOF terminator remains.
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].token_type, TokenType::Eof);
}

#[test]
fn unexpected_characters_are_skipped() {
    let (tokens, reporter) = scan(",.$(#");
    assert!(reporter.had_error);
    let types: Vec<TokenType> = tokens.iter().map(|t| t.token_type.clone()).collect();
    assert_eq!(
        types,
        vec![
            TokenType::Comma,
            TokenType::Dot,
            TokenType::LeftParen,
            TokenType::Eof,
        ]
    );
}

#[test]
fn eof_carries_the_final_line() {
    let (tokens, _) = scan("1;\n2;\n");
    assert_eq!(tokens.last().map(|t| t.line), Some(3));
}

#[test]
fn lexemes_reconstruct_the_token_order() {
    let source = "var answer = 6 * 7; // trailing";
    let (tokens, reporter) = scan(source);
    assert!(!reporter.had_error);
    let joined: Vec<String> = tokens
        .iter()
        .filter(|t| t.token_type != TokenType::Eof)
        .map(|t| t.lexeme.to_string())
        .collect();
    assert_eq!(joined.join(" "), "var answer = 6 * 7 ;");
}
