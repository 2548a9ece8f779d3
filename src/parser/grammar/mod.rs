//! The Frond grammar, built atop the combinator engine
//!
//! The module is organized by category: `terminals` for single-token
//! parsers, `expression` for expression forms, `definition` for binding
//! forms. Parsing is context-sensitive: the grammar consults and extends the
//! live [`Context`] as it learns operators, definitions, and namespaces.

mod definition;
mod expression;
pub mod terminals;

pub use definition::{arg_list, definition};
pub use expression::{expression, group};

use tracing::debug;

use crate::ast::{ErrorNode, Expr, Group, GroupType};
use crate::lexer::{Token, TokenKind};

use super::combinators::{many, many1, sep_by, BoxedParser};
use super::{Context, ParseError, Parser, ParserState};
use terminals::{group_close_of, group_open_of, newline};

/// One element of a group body: an expression, a definition, or — at line
/// granularity (the top level and indented blocks, where newlines separate
/// whole statements) — the offending run of tokens salvaged as an error node
/// so the rest of the program can continue parsing. Inline parenthesized
/// groups stay strict: salvaging there would swallow forms like `(+)`.
fn group_element(recover: bool) -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        let strict = expression() | definition();
        if recover {
            (strict | recovered_error()).parse(state)
        } else {
            strict.parse(state)
        }
    })
}

pub(super) fn group_elements(recover: bool) -> BoxedParser<Vec<Expr>> {
    BoxedParser::new(move |state: &mut ParserState| {
        sep_by(group_element(recover), many1(newline(), "expected newline")).parse(state)
    })
}

/// Collect the run of tokens up to the next structural boundary (newline or
/// group delimiter) into an error node.
fn recovered_error() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        let mut tokens: Vec<Token> = Vec::new();
        loop {
            let at_boundary = match state.peek() {
                Some(token) => matches!(
                    token.kind,
                    TokenKind::Newline | TokenKind::OpenGroup | TokenKind::CloseGroup
                ),
                None => true,
            };
            if at_boundary {
                break;
            }
            if let Some(token) = state.advance() {
                tokens.push(token);
            }
        }
        if tokens.is_empty() {
            Err(ParseError::unexpected(
                "expression or definition",
                state.peek(),
            ))
        } else {
            debug!(tokens = tokens.len(), "recovered unparseable line");
            Ok(Expr::Error(ErrorNode { tokens }))
        }
    })
}

/// top_level := "bof" (expression | definition)(newline+ ...)* newline* "eof"
///
/// Unlike nested groups, the top level does not push a definition context:
/// definitions made here stay visible to whatever parses next against the
/// same context (the REPL relies on this).
pub fn top_level() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        group_open_of(GroupType::TopLevel).parse(state)?;
        let expressions = group_elements(true).parse(state)?;
        many(newline()).parse(state)?;
        group_close_of(GroupType::TopLevel).parse(state)?;
        Ok(Expr::Group(Group {
            group_type: GroupType::TopLevel,
            expressions,
        }))
    })
}

/// Parse a complete token stream against an empty context.
pub fn parse(tokens: Vec<Token>) -> Result<(Expr, Context), ParseError> {
    parse_with(tokens, Context::new())
}

/// Parse a complete token stream against the given starting context,
/// returning the parsed tree and the final context (so a REPL can carry
/// definitions across lines).
pub fn parse_with(tokens: Vec<Token>, context: Context) -> Result<(Expr, Context), ParseError> {
    let mut state = ParserState::new(tokens, context);
    let expr = top_level().parse(&mut state)?;
    debug!(messages = state.trace_log().len(), "parse finished");
    Ok((expr, state.context().clone()))
}
