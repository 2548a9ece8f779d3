//! Parsing for the Frond language
//!
//! A parser is a function from a [`ParserState`] to either a value plus the
//! advanced state, or a [`ParseError`]. Backtracking is unlimited: any
//! combinator may take a [`Checkpoint`] and restore it, which rewinds the
//! token cursor *and* the definition context and reserved-word set, so
//! speculative alternatives can never corrupt shared state.

mod combinators;
mod context;
pub mod grammar;
mod precedence;

pub use combinators::*;
pub use context::{Context, Definition};
pub use grammar::{parse, parse_with, top_level};
pub use precedence::PrecedenceResolver;

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::lexer::Token;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseError {
    pub message: String,
    pub expected: Option<String>,
    pub found: Option<String>,
    pub position: Option<(usize, usize)>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn found(mut self, found: impl Into<String>) -> Self {
        self.found = Some(found.into());
        self
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.position = Some((line, column));
        self
    }

    /// A terminal-mismatch error naming what was expected and what the
    /// offending token actually was.
    pub fn unexpected(expected: impl Into<String>, token: Option<&Token>) -> Self {
        match token {
            Some(token) => ParseError::new("unexpected token")
                .expected(expected)
                .found(token.describe())
                .at(token.line, token.column),
            None => ParseError::new("unexpected end of input").expected(expected),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(expected) = &self.expected {
            write!(f, ": expected {expected}")?;
            if let Some(found) = &self.found {
                write!(f, ", got {found}")?;
            }
        }
        if let Some((line, column)) = self.position {
            write!(f, " at {line},{column}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

/// A saved parsing position: cursor plus definition context plus the
/// temporarily-reserved word set. Restoring one is how `or`/`optional`/`many`
/// abandon a speculative alternative. Cheap to take: the context is a
/// persistent value and the reserved set is small.
#[derive(Clone)]
pub struct Checkpoint {
    index: usize,
    context: Context,
    reserved: HashSet<String>,
}

/// The parser's threaded state. Every token consumption or context change
/// goes through `&mut self`, but all of it can be rewound from a
/// [`Checkpoint`]; two states with the same cursor are interchangeable for
/// parsing purposes regardless of their trace-message history.
pub struct ParserState {
    tokens: Rc<[Token]>,
    index: usize,
    context: Context,
    reserved: HashSet<String>,
    trace: Vec<String>,
}

impl ParserState {
    pub fn new(tokens: Vec<Token>, context: Context) -> Self {
        Self {
            tokens: tokens.into(),
            index: 0,
            context,
            reserved: HashSet::new(),
            trace: Vec::new(),
        }
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    pub fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if let Some(token) = &token {
            self.index += 1;
            self.trace.push(format!("parsed {token}"));
            trace!(%token, "consumed token");
        }
        token
    }

    pub fn has_next(&self) -> bool {
        self.index < self.tokens.len()
    }

    pub fn save(&self) -> Checkpoint {
        Checkpoint {
            index: self.index,
            context: self.context.clone(),
            reserved: self.reserved.clone(),
        }
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.index = checkpoint.index;
        self.context = checkpoint.context;
        self.reserved = checkpoint.reserved;
    }

    /// The ordered log of trace messages accumulated so far.
    pub fn trace_log(&self) -> &[String] {
        &self.trace
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn is_defined_operator(&self, name: &str) -> bool {
        self.context
            .get_definition(name)
            .is_some_and(|def| def.operator_info.is_some())
    }

    pub fn is_temp_reserved(&self, word: &str) -> bool {
        self.reserved.contains(word)
    }

    pub fn reserve_words(&mut self, words: &[&str]) {
        for word in words {
            self.reserved.insert((*word).to_string());
        }
    }

    pub fn unreserve_words(&mut self, words: &[&str]) {
        for word in words {
            self.reserved.remove(*word);
        }
    }

    pub fn add_definition(&mut self, definition: Definition) {
        self.context = self.context.add_definition(definition);
    }

    pub fn push_context(&mut self) {
        self.context = self.context.new_child();
    }

    /// Pop back to the enclosing context, returning the inner one (the
    /// namespace production registers it under a dotted path).
    pub fn pop_context(&mut self) -> Context {
        let inner = self.context.clone();
        self.context = self.context.pop();
        inner
    }

    pub fn is_defined_namespace(&self, namespaces: &[String]) -> bool {
        self.context.get_namespace(namespaces).is_some()
    }

    pub fn add_namespace(&mut self, namespaces: &[String], inner: Context) {
        self.context = self.context.add_namespace(namespaces, inner);
    }

    pub fn use_namespace(&mut self, namespaces: &[String]) -> bool {
        match self.context.use_namespace(namespaces) {
            Some(context) => {
                self.context = context;
                true
            }
            None => false,
        }
    }
}

/// Anything that can parse a `T` out of the state. Implemented for closures
/// so ad-hoc parsers compose with [`BoxedParser`].
pub trait Parser<T> {
    fn parse(&self, state: &mut ParserState) -> ParseResult<T>;
}

impl<T, F: Fn(&mut ParserState) -> ParseResult<T>> Parser<T> for F {
    fn parse(&self, state: &mut ParserState) -> ParseResult<T> {
        self(state)
    }
}
