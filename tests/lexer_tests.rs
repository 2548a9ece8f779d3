use pretty_assertions::assert_eq;

use frond::lexer::{Lexer, SyntaxError, Token, TokenDefinition, TokenKind};

/// The minimal table used by the indentation tests: identifiers, numbers,
/// ignored whitespace.
fn custom_lexer() -> Lexer {
    Lexer::new(vec![
        TokenDefinition::new(TokenKind::Identifier, "[a-zA-Z]+"),
        TokenDefinition::new(TokenKind::Number, r"\d+"),
        TokenDefinition::new(TokenKind::Whitespace, r"\s+").ignored(),
    ])
    .expect("definitions compile")
}

fn default_lexer() -> Lexer {
    Lexer::with_defaults().expect("default definitions compile")
}

#[test]
fn indentation_round_trip() {
    let input = "\thello 123 \n\n    321 goodbye \nmy \n\tlove ";
    let tokens = custom_lexer().tokenize(input).expect("lexing succeeds");

    assert_eq!(
        tokens,
        vec![
            Token::new(TokenKind::OpenGroup, "bof", 0, 0),
            Token::new(TokenKind::OpenGroup, "indent", 1, 0),
            Token::new(TokenKind::Identifier, "hello", 1, 4),
            Token::new(TokenKind::Number, "123", 1, 10),
            Token::new(TokenKind::Newline, "", 1, 13),
            Token::new(TokenKind::Number, "321", 3, 4),
            Token::new(TokenKind::Identifier, "goodbye", 3, 8),
            Token::new(TokenKind::Newline, "", 3, 15),
            Token::new(TokenKind::CloseGroup, "dedent", 4, 0),
            Token::new(TokenKind::Newline, "", 4, 0),
            Token::new(TokenKind::Identifier, "my", 4, 0),
            Token::new(TokenKind::Newline, "", 4, 2),
            Token::new(TokenKind::OpenGroup, "indent", 5, 0),
            Token::new(TokenKind::Identifier, "love", 5, 4),
            Token::new(TokenKind::Newline, "", 5, 8),
            Token::new(TokenKind::CloseGroup, "dedent", 5, 0),
            Token::new(TokenKind::Newline, "", 5, 0),
            Token::new(TokenKind::CloseGroup, "eof", 5, 0),
        ]
    );
}

#[test]
fn unrecognized_character_raises() {
    let result = custom_lexer().tokenize("!");
    assert_eq!(
        result,
        Err(SyntaxError::UnrecognizedToken {
            content: "!".to_string(),
            line: 1,
            column: 0,
        })
    );
}

#[test]
fn unrecognized_character_mid_line() {
    let result = custom_lexer().tokenize("hello !");
    assert!(matches!(
        result,
        Err(SyntaxError::UnrecognizedToken { column: 6, .. })
    ));
}

#[test]
fn blank_lines_produce_no_tokens() {
    let tokens = custom_lexer().tokenize("\n\n\n").expect("lexing succeeds");
    assert_eq!(
        tokens,
        vec![
            Token::new(TokenKind::OpenGroup, "bof", 0, 0),
            Token::new(TokenKind::CloseGroup, "eof", 3, 0),
        ]
    );
}

#[test]
fn comment_only_lines_are_blank() {
    let tokens = default_lexer()
        .tokenize("'just a comment'\n42")
        .expect("lexing succeeds");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::OpenGroup,
            TokenKind::DecimalNumber,
            TokenKind::Newline,
            TokenKind::CloseGroup,
        ]
    );
    assert_eq!(tokens[1].line, 2);
}

#[test]
fn numeric_literal_subtypes() {
    let tokens = default_lexer()
        .tokenize("0b101 0x1F 3/4 1+2i 3.5e2 7")
        .expect("lexing succeeds");
    let kinds: Vec<(TokenKind, &str)> = tokens
        .iter()
        .filter(|t| t.kind.is_number_literal())
        .map(|t| (t.kind, t.content.as_str()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (TokenKind::BinaryNumber, "0b101"),
            (TokenKind::HexNumber, "0x1F"),
            (TokenKind::RationalNumber, "3/4"),
            (TokenKind::ComplexNumber, "1+2i"),
            (TokenKind::DecimalNumber, "3.5e2"),
            (TokenKind::DecimalNumber, "7"),
        ]
    );
}

#[test]
fn reserved_words_and_identifiers() {
    let tokens = default_lexer()
        .tokenize("let ref frobnicate set! lambda")
        .expect("lexing succeeds");
    let kinds: Vec<(TokenKind, &str)> = tokens
        .iter()
        .filter(|t| matches!(t.kind, TokenKind::ReservedWord | TokenKind::Identifier))
        .map(|t| (t.kind, t.content.as_str()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (TokenKind::ReservedWord, "let"),
            (TokenKind::ReservedWord, "ref"),
            (TokenKind::Identifier, "frobnicate"),
            (TokenKind::ReservedWord, "set!"),
            (TokenKind::ReservedWord, "lambda"),
        ]
    );
}

#[test]
fn semicolon_lexes_as_newline() {
    let tokens = default_lexer().tokenize("[1; 2]").expect("lexing succeeds");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::OpenGroup,
            TokenKind::OpenList,
            TokenKind::DecimalNumber,
            TokenKind::Newline,
            TokenKind::DecimalNumber,
            TokenKind::CloseList,
            TokenKind::Newline,
            TokenKind::CloseGroup,
        ]
    );
}

#[test]
fn operators_lex_as_identifiers() {
    let tokens = default_lexer().tokenize("a + b").expect("lexing succeeds");
    assert_eq!(tokens[2], Token::new(TokenKind::Identifier, "+", 1, 2));
}

#[test]
fn tab_width_is_configurable() {
    let mut lexer = custom_lexer();
    lexer.set_tab_width(2);
    let tokens = lexer.tokenize("a\n\tb").expect("lexing succeeds");
    let b = tokens
        .iter()
        .find(|t| t.content == "b")
        .expect("b token present");
    assert_eq!(b.column, 2);
}

#[test]
fn dedent_realignment_is_permissive() {
    // The third line's width (4) matches no pushed level (0, 2, 6): the
    // lexer pops to the nearest remaining level without raising.
    let tokens = custom_lexer()
        .tokenize("a\n  b\n      c\n    d\ne")
        .expect("lexing succeeds");
    let dedents = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::CloseGroup && t.content == "dedent")
        .count();
    let indents = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::OpenGroup && t.content == "indent")
        .count();
    assert_eq!(indents, 2);
    // One dedent realigning 6 -> 4 (stopping above 2), one for 4 -> 0.
    assert_eq!(dedents, 2);
}
