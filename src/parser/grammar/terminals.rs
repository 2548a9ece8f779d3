//! Terminal parsers for the Frond grammar
//!
//! Each terminal inspects the current token and either consumes it or fails
//! with a message naming what was expected and what was found. Identifier
//! classification is context-sensitive: a token of identifier kind is only a
//! plain identifier if it is not currently known to be an operator and is
//! not temporarily reserved.

use crate::ast::{GroupType, NumberKind, NumberLiteral, StringLiteral};
use crate::lexer::TokenKind;

use super::super::combinators::BoxedParser;
use super::super::{ParseError, ParserState};

/// Parse any identifier that is not a known operator or temp-reserved word
pub fn id() -> BoxedParser<String> {
    BoxedParser::new(|state: &mut ParserState| match state.peek() {
        Some(token)
            if token.kind == TokenKind::Identifier
                && !state.is_defined_operator(&token.content)
                && !state.is_temp_reserved(&token.content) =>
        {
            Ok(state.advance().map(|t| t.content).unwrap_or_default())
        }
        token => Err(ParseError::unexpected("identifier", token)),
    })
}

/// Parse an identifier with exactly the given content
pub fn id_exact(name: &'static str) -> BoxedParser<String> {
    BoxedParser::new(move |state: &mut ParserState| match state.peek() {
        Some(token)
            if token.kind == TokenKind::Identifier
                && token.content == name
                && !state.is_defined_operator(&token.content) =>
        {
            Ok(state.advance().map(|t| t.content).unwrap_or_default())
        }
        token => Err(ParseError::unexpected(format!("identifier '{name}'"), token)),
    })
}

/// Parse an identifier other than `=` (argument lists use this so the `=`
/// that ends the parameter list is not swallowed)
pub fn id_not_equals() -> BoxedParser<String> {
    BoxedParser::new(|state: &mut ParserState| match state.peek() {
        Some(token)
            if token.kind == TokenKind::Identifier
                && token.content != "="
                && !state.is_defined_operator(&token.content) =>
        {
            Ok(state.advance().map(|t| t.content).unwrap_or_default())
        }
        token => Err(ParseError::unexpected("identifier", token)),
    })
}

/// The `=` of binding forms: an identifier token whose content is `=`
pub fn equals() -> BoxedParser<()> {
    BoxedParser::new(|state: &mut ParserState| match state.peek() {
        Some(token) if token.kind == TokenKind::Identifier && token.content == "=" => {
            state.advance();
            Ok(())
        }
        token => Err(ParseError::unexpected("'='", token)),
    })
}

/// Parse a reserved word with the given content. Temporarily-reserved
/// identifiers are accepted as reserved words too.
pub fn reserved_word(name: &'static str) -> BoxedParser<()> {
    BoxedParser::new(move |state: &mut ParserState| match state.peek() {
        Some(token)
            if (token.kind == TokenKind::ReservedWord
                || state.is_temp_reserved(&token.content))
                && token.content == name =>
        {
            state.advance();
            Ok(())
        }
        token => Err(ParseError::unexpected(format!("'{name}'"), token)),
    })
}

/// Parse an identifier currently known to be an operator
pub fn operator() -> BoxedParser<String> {
    BoxedParser::new(|state: &mut ParserState| match state.peek() {
        Some(token)
            if token.kind == TokenKind::Identifier
                && state.is_defined_operator(&token.content) =>
        {
            Ok(state.advance().map(|t| t.content).unwrap_or_default())
        }
        token => Err(ParseError::unexpected("operator", token)),
    })
}

pub fn open_group_type(content: &str) -> Option<GroupType> {
    match content {
        "bof" => Some(GroupType::TopLevel),
        "(" => Some(GroupType::Parenthesized),
        "indent" => Some(GroupType::Indented),
        _ => None,
    }
}

pub fn close_group_type(content: &str) -> Option<GroupType> {
    match content {
        "eof" => Some(GroupType::TopLevel),
        ")" => Some(GroupType::Parenthesized),
        "dedent" => Some(GroupType::Indented),
        _ => None,
    }
}

/// Parse any group opener and classify it
pub fn group_open() -> BoxedParser<GroupType> {
    BoxedParser::new(|state: &mut ParserState| match state.peek() {
        Some(token) => match open_group_type(&token.content) {
            Some(group_type) => {
                state.advance();
                Ok(group_type)
            }
            None => Err(ParseError::unexpected("group opener", Some(token))),
        },
        None => Err(ParseError::unexpected("group opener", None)),
    })
}

/// Parse a group opener of a specific type
pub fn group_open_of(group_type: GroupType) -> BoxedParser<GroupType> {
    group_open().filter(
        move |opened| *opened == group_type,
        "mismatched group opener",
    )
}

/// Parse a group closer of a specific type
pub fn group_close_of(group_type: GroupType) -> BoxedParser<GroupType> {
    BoxedParser::new(move |state: &mut ParserState| match state.peek() {
        Some(token) => match close_group_type(&token.content) {
            Some(closed) if closed == group_type => {
                state.advance();
                Ok(closed)
            }
            _ => Err(ParseError::unexpected(
                format!("{group_type:?} group closer"),
                Some(token),
            )),
        },
        None => Err(ParseError::unexpected(
            format!("{group_type:?} group closer"),
            None,
        )),
    })
}

fn punctuation(kind: TokenKind, expected: &'static str) -> BoxedParser<()> {
    BoxedParser::new(move |state: &mut ParserState| match state.peek() {
        Some(token) if token.kind == kind => {
            state.advance();
            Ok(())
        }
        token => Err(ParseError::unexpected(expected, token)),
    })
}

pub fn list_open() -> BoxedParser<()> {
    punctuation(TokenKind::OpenList, "'['")
}

pub fn list_close() -> BoxedParser<()> {
    punctuation(TokenKind::CloseList, "']'")
}

pub fn period() -> BoxedParser<()> {
    punctuation(TokenKind::Period, "'.'")
}

pub fn backquote() -> BoxedParser<()> {
    punctuation(TokenKind::Backquote, "'`'")
}

pub fn comma() -> BoxedParser<()> {
    punctuation(TokenKind::Comma, "','")
}

pub fn newline() -> BoxedParser<()> {
    punctuation(TokenKind::Newline, "newline")
}

/// The explicit empty-parens marker `()`
pub fn empty_group() -> BoxedParser<()> {
    BoxedParser::new(|state: &mut ParserState| {
        match state.peek() {
            Some(token) if token.kind == TokenKind::OpenGroup && token.content == "(" => {}
            token => return Err(ParseError::unexpected("'()'", token)),
        }
        let checkpoint = state.save();
        state.advance();
        match state.peek() {
            Some(token) if token.kind == TokenKind::CloseGroup && token.content == ")" => {
                state.advance();
                Ok(())
            }
            token => {
                let err = ParseError::unexpected("'()'", token);
                state.restore(checkpoint);
                Err(err)
            }
        }
    })
}

/// Parse a numeric literal of any concrete subtype; the abstract `Number`
/// kind is never valid here.
pub fn number() -> BoxedParser<NumberLiteral> {
    BoxedParser::new(|state: &mut ParserState| match state.peek() {
        Some(token) if token.kind.is_number_literal() => {
            let kind = NumberKind::from_token(token.kind);
            let token = state.advance();
            match (token, kind) {
                (Some(token), Some(kind)) => Ok(NumberLiteral {
                    value: token.content,
                    kind,
                }),
                _ => Err(ParseError::new("invalid number literal")),
            }
        }
        token => Err(ParseError::unexpected("number", token)),
    })
}

/// Parse a string literal, keeping the raw lexeme
pub fn string() -> BoxedParser<StringLiteral> {
    BoxedParser::new(|state: &mut ParserState| match state.peek() {
        Some(token) if token.kind == TokenKind::Str => Ok(StringLiteral {
            value: state.advance().map(|t| t.content).unwrap_or_default(),
        }),
        token => Err(ParseError::unexpected("string", token)),
    })
}
