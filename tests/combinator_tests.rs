use frond::interpreter::OperatorInfo;
use frond::lexer::{Token, TokenKind};
use frond::parser::grammar::terminals::{comma, id, newline};
use frond::parser::{
    if_so_continue_with, many, many1, optional, sep_by, sep_by1, BoxedParser, Context, Definition,
    ParseError, Parser, ParserState,
};

fn ident(content: &str) -> Token {
    Token::new(TokenKind::Identifier, content, 1, 0)
}

fn state_of(tokens: Vec<Token>) -> ParserState {
    ParserState::new(tokens, Context::new())
}

#[test]
fn seq_threads_state_and_pairs_results() {
    let mut state = state_of(vec![ident("a"), ident("b")]);
    let parser = id() + id();
    assert_eq!(
        parser.parse(&mut state),
        Ok(("a".to_string(), "b".to_string()))
    );
}

#[test]
fn seq_propagates_the_first_failure() {
    let mut state = state_of(vec![Token::new(TokenKind::ReservedWord, "let", 1, 0)]);
    let parser = id() + id();
    assert!(parser.parse(&mut state).is_err());
}

#[test]
fn map_transforms_the_result() {
    let mut state = state_of(vec![ident("hello")]);
    let parser = id() >> |name: String| name.len();
    assert_eq!(parser.parse(&mut state), Ok(5));
}

#[test]
fn or_retries_the_original_state() {
    // The first alternative consumes a token before failing; the second
    // must still see it.
    let consume_then_fail = BoxedParser::new(|state: &mut ParserState| {
        let _ = id().parse(state)?;
        Err::<String, ParseError>(ParseError::new("boom"))
    });
    let mut state = state_of(vec![ident("x")]);
    let parser = consume_then_fail | id();
    assert_eq!(parser.parse(&mut state), Ok("x".to_string()));
}

#[test]
fn or_restores_the_definition_context() {
    // Backtracking must rewind context changes, not just the cursor.
    let poison = BoxedParser::new(|state: &mut ParserState| {
        state.add_definition(Definition::operator("op", OperatorInfo::default()));
        Err::<bool, ParseError>(ParseError::new("boom"))
    });
    let check = BoxedParser::new(|state: &mut ParserState| Ok(state.is_defined_operator("op")));
    let mut state = state_of(vec![ident("x")]);
    assert_eq!((poison | check).parse(&mut state), Ok(false));
}

#[test]
fn many_collects_until_failure() {
    let mut state = state_of(vec![ident("a"), ident("b"), ident("c")]);
    assert_eq!(
        many(id()).parse(&mut state),
        Ok(vec!["a".to_string(), "b".to_string(), "c".to_string()])
    );
    assert!(!state.has_next());
}

#[test]
fn many_accepts_zero_occurrences() {
    let mut state = state_of(vec![Token::new(TokenKind::Newline, "", 1, 0)]);
    assert_eq!(many(id()).parse(&mut state), Ok(vec![]));
    assert!(state.has_next());
}

#[test]
fn many1_fails_with_the_supplied_message_when_empty() {
    let mut state = state_of(vec![Token::new(TokenKind::Newline, "", 1, 0)]);
    let result = many1(id(), "expected at least one name").parse(&mut state);
    assert_eq!(
        result.map(|_| ()).map_err(|err| err.message),
        Err("expected at least one name".to_string())
    );
}

#[test]
fn sep_by_parses_separated_elements() {
    let comma_token = || Token::new(TokenKind::Comma, ",", 1, 0);
    let mut state = state_of(vec![
        ident("a"),
        comma_token(),
        ident("b"),
        comma_token(),
        ident("c"),
    ]);
    assert_eq!(
        sep_by(id(), comma()).parse(&mut state),
        Ok(vec!["a".to_string(), "b".to_string(), "c".to_string()])
    );
}

#[test]
fn sep_by_leaves_a_trailing_separator_unconsumed() {
    let mut state = state_of(vec![ident("a"), Token::new(TokenKind::Comma, ",", 1, 0)]);
    assert_eq!(sep_by(id(), comma()).parse(&mut state), Ok(vec!["a".to_string()]));
    assert!(comma().parse(&mut state).is_ok());
}

#[test]
fn sep_by_returns_empty_when_the_first_element_fails() {
    let mut state = state_of(vec![Token::new(TokenKind::Newline, "", 1, 0)]);
    assert_eq!(sep_by(id(), comma()).parse(&mut state), Ok(vec![]));
}

#[test]
fn sep_by1_requires_an_element() {
    let mut state = state_of(vec![Token::new(TokenKind::Newline, "", 1, 0)]);
    assert!(sep_by1(id(), comma(), "expected names").parse(&mut state).is_err());
}

#[test]
fn optional_wraps_and_restores() {
    let mut state = state_of(vec![ident("a")]);
    assert_eq!(optional(id()).parse(&mut state), Ok(Some("a".to_string())));

    let mut state = state_of(vec![Token::new(TokenKind::Newline, "", 1, 0)]);
    assert_eq!(optional(id()).parse(&mut state), Ok(None));
    assert!(newline().parse(&mut state).is_ok());
}

#[test]
fn filter_downgrades_success_without_consuming_commitment() {
    let short = id().filter(|name: &String| name.len() < 3, "name too long");
    let mut state = state_of(vec![ident("ab")]);
    assert_eq!(short.clone().parse(&mut state), Ok("ab".to_string()));

    let mut state = state_of(vec![ident("abcd")]);
    assert!(short.parse(&mut state).is_err());
}

#[test]
fn if_so_continue_with_builds_greedy_chains() {
    // Concatenate identifiers as long as more follow.
    let mut state = state_of(vec![ident("a"), ident("b"), ident("c")]);
    let chain = if_so_continue_with(id(), |sofar: String| {
        id().map(move |next| format!("{sofar}{next}"))
    });
    assert_eq!(chain.parse(&mut state), Ok(Some("abc".to_string())));
}

#[test]
fn if_so_continue_with_yields_none_when_the_first_step_fails() {
    let mut state = state_of(vec![Token::new(TokenKind::Newline, "", 1, 0)]);
    let chain = if_so_continue_with(id(), |sofar: String| {
        id().map(move |next| format!("{sofar}{next}"))
    });
    assert_eq!(chain.parse(&mut state), Ok(None));
    assert!(state.has_next());
}

#[test]
fn skip_keeps_the_left_result() {
    let mut state = state_of(vec![ident("a"), Token::new(TokenKind::Comma, ",", 1, 0)]);
    assert_eq!(id().skip(comma()).parse(&mut state), Ok("a".to_string()));
    assert!(!state.has_next());
}
