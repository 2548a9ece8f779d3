//! Generic parser combinators
//!
//! Grammar-independent building blocks over [`ParserState`]. Alternation and
//! repetition restore a full checkpoint on failure, so backtracking also
//! rewinds the definition context and reserved-word set.

use std::ops::{Add, BitOr, Mul, Shr, Sub};
use std::rc::Rc;

use super::{Checkpoint, ParseError, ParseResult, Parser, ParserState};

type ParserFn<T> = Rc<dyn Fn(&mut ParserState) -> ParseResult<T>>;

// === Boxed Parser for type erasure ===

pub struct BoxedParser<T> {
    parser: ParserFn<T>,
}

impl<T> Clone for BoxedParser<T> {
    fn clone(&self) -> Self {
        BoxedParser {
            parser: Rc::clone(&self.parser),
        }
    }
}

impl<T: 'static> BoxedParser<T> {
    pub fn new<P: Parser<T> + 'static>(parser: P) -> Self {
        BoxedParser {
            parser: Rc::new(move |state| parser.parse(state)),
        }
    }
}

impl<T> Parser<T> for BoxedParser<T> {
    fn parse(&self, state: &mut ParserState) -> ParseResult<T> {
        (self.parser)(state)
    }
}

// === Combinators as methods ===

impl<T: 'static> BoxedParser<T> {
    /// Sequence: parse self then other, return (T, U)
    pub fn seq<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<(T, U)> {
        BoxedParser::new(move |state: &mut ParserState| {
            let a = self.parse(state)?;
            let b = other.parse(state)?;
            Ok((a, b))
        })
    }

    /// Keep left: parse self then other, discard other's result
    pub fn skip<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParserState| {
            let a = self.parse(state)?;
            let _ = other.parse(state)?;
            Ok(a)
        })
    }

    /// Keep right: parse self then other, discard self's result
    pub fn skip_left<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<U> {
        BoxedParser::new(move |state: &mut ParserState| {
            let _ = self.parse(state)?;
            other.parse(state)
        })
    }

    /// Map: transform result
    pub fn map<U: 'static, F: Fn(T) -> U + 'static>(self, f: F) -> BoxedParser<U> {
        BoxedParser::new(move |state: &mut ParserState| {
            let a = self.parse(state)?;
            Ok(f(a))
        })
    }

    /// Monadic bind: feed the result into a function producing the next
    /// parser. The second parser continues from where the first stopped.
    pub fn bind<U: 'static, F: Fn(T) -> BoxedParser<U> + 'static>(self, f: F) -> BoxedParser<U> {
        BoxedParser::new(move |state: &mut ParserState| {
            let a = self.parse(state)?;
            f(a).parse(state)
        })
    }

    /// Choice: try self, if it fails retry the original state with other
    pub fn or(self, other: BoxedParser<T>) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParserState| {
            let checkpoint = state.save();
            match self.parse(state) {
                Ok(a) => Ok(a),
                Err(_) => {
                    state.restore(checkpoint);
                    other.parse(state)
                }
            }
        })
    }

    /// Downgrade success to failure when the predicate rejects the value
    pub fn filter<F: Fn(&T) -> bool + 'static>(
        self,
        predicate: F,
        message: &'static str,
    ) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParserState| {
            let a = self.parse(state)?;
            if predicate(&a) {
                Ok(a)
            } else {
                Err(ParseError::new(message))
            }
        })
    }

    /// Add a label to this parser for better error messages
    pub fn label(self, name: &'static str) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParserState| match self.parse(state) {
            Ok(v) => Ok(v),
            Err(err) => Err(ParseError {
                expected: Some(name.to_string()),
                ..err
            }),
        })
    }
}

// === Operator Overloading ===

/// `+` for sequence: A + B -> (A, B)
impl<T: 'static, U: 'static> Add<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<(T, U)>;

    fn add(self, rhs: BoxedParser<U>) -> Self::Output {
        self.seq(rhs)
    }
}

/// `-` for keep left: A - B -> A (parse B, discard result)
impl<T: 'static, U: 'static> Sub<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    fn sub(self, rhs: BoxedParser<U>) -> Self::Output {
        self.skip(rhs)
    }
}

/// `*` for keep right: A * B -> B (parse A, discard result)
impl<T: 'static, U: 'static> Mul<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn mul(self, rhs: BoxedParser<U>) -> Self::Output {
        self.skip_left(rhs)
    }
}

/// `|` for choice: A | B -> A or B
impl<T: 'static> BitOr<BoxedParser<T>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    fn bitor(self, rhs: BoxedParser<T>) -> Self::Output {
        self.or(rhs)
    }
}

/// `>>` for map: A >> fn -> B
impl<T: 'static, U: 'static, F: Fn(T) -> U + 'static> Shr<F> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn shr(self, f: F) -> Self::Output {
        self.map(f)
    }
}

// === Repetition and optionality ===

/// Parse zero or more occurrences
pub fn many<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Vec<T>> {
    BoxedParser::new(move |state: &mut ParserState| {
        let mut results = Vec::new();
        loop {
            let checkpoint = state.save();
            match parser.parse(state) {
                Ok(item) => results.push(item),
                Err(_) => {
                    state.restore(checkpoint);
                    break;
                }
            }
        }
        Ok(results)
    })
}

/// Parse one or more occurrences, failing with the given message when the
/// collected sequence would be empty
pub fn many1<T: 'static>(parser: BoxedParser<T>, message: &'static str) -> BoxedParser<Vec<T>> {
    BoxedParser::new(move |state: &mut ParserState| {
        let results = many(parser.clone()).parse(state)?;
        if results.is_empty() {
            Err(ParseError::new(message))
        } else {
            Ok(results)
        }
    })
}

/// Parse zero or more occurrences separated by the separator parser; a
/// leading or trailing separator is not consumed
pub fn sep_by<T: 'static, S: 'static>(
    parser: BoxedParser<T>,
    separator: BoxedParser<S>,
) -> BoxedParser<Vec<T>> {
    BoxedParser::new(move |state: &mut ParserState| {
        let mut results = Vec::new();

        let checkpoint = state.save();
        match parser.parse(state) {
            Ok(first) => results.push(first),
            Err(_) => {
                state.restore(checkpoint);
                return Ok(results);
            }
        }

        loop {
            let checkpoint = state.save();
            if separator.parse(state).is_err() {
                state.restore(checkpoint);
                break;
            }
            match parser.parse(state) {
                Ok(item) => results.push(item),
                Err(_) => {
                    state.restore(checkpoint);
                    break;
                }
            }
        }
        Ok(results)
    })
}

/// Like [`sep_by`] but requires at least one element
pub fn sep_by1<T: 'static, S: 'static>(
    parser: BoxedParser<T>,
    separator: BoxedParser<S>,
    message: &'static str,
) -> BoxedParser<Vec<T>> {
    BoxedParser::new(move |state: &mut ParserState| {
        let results = sep_by(parser.clone(), separator.clone()).parse(state)?;
        if results.is_empty() {
            Err(ParseError::new(message))
        } else {
            Ok(results)
        }
    })
}

/// Optional: always succeeds, restoring the original state on inner failure
pub fn optional<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Option<T>> {
    BoxedParser::new(move |state: &mut ParserState| {
        let checkpoint = state.save();
        match parser.parse(state) {
            Ok(item) => Ok(Some(item)),
            Err(_) => {
                state.restore(checkpoint);
                Ok(None)
            }
        }
    })
}

/// Conditional continuation: if the parser succeeds, feed its result to get
/// a further parser and keep going from there; the chain ends (with `None`
/// or the last success) when a step fails. This is how greedy postfix chains
/// are built without consuming state destructively.
pub fn if_so_continue_with<T: Clone + 'static, F: Fn(T) -> BoxedParser<T> + 'static>(
    parser: BoxedParser<T>,
    continuation: F,
) -> BoxedParser<Option<T>> {
    BoxedParser::new(move |state: &mut ParserState| {
        let checkpoint = state.save();
        let mut current = match parser.parse(state) {
            Ok(value) => value,
            Err(_) => {
                state.restore(checkpoint);
                return Ok(None);
            }
        };
        loop {
            let checkpoint = state.save();
            match continuation(current.clone()).parse(state) {
                Ok(next) => current = next,
                Err(_) => {
                    state.restore(checkpoint);
                    return Ok(Some(current));
                }
            }
        }
    })
}

/// Allow an optional leading parser (typically a newline) before the main
/// parser, but only accept the leading consumption when the parsed value
/// satisfies the predicate
pub fn with_opt_leading_if<T: 'static, L: 'static, F: Fn(&T) -> bool + 'static>(
    parser: BoxedParser<T>,
    leading: BoxedParser<L>,
    predicate: F,
) -> BoxedParser<T> {
    BoxedParser::new(move |state: &mut ParserState| {
        let led = optional(leading.clone()).parse(state)?.is_some();
        let value = parser.parse(state)?;
        if led && !predicate(&value) {
            Err(ParseError::new(
                "expression after a leading newline must be a block",
            ))
        } else {
            Ok(value)
        }
    })
}

/// Restore-point helper for hand-written parser bodies: run the closure and
/// rewind the state when it fails.
pub fn attempt<T>(
    state: &mut ParserState,
    body: impl FnOnce(&mut ParserState) -> ParseResult<T>,
) -> ParseResult<T> {
    let checkpoint: Checkpoint = state.save();
    match body(state) {
        Ok(value) => Ok(value),
        Err(err) => {
            state.restore(checkpoint);
            Err(err)
        }
    }
}
