//! Evaluation errors
//!
//! Every variant is fatal to the current evaluate-one-program unit; the REPL
//! driver catches them, reports, and rolls the session scope back. There is
//! no retry anywhere.

use thiserror::Error;

use super::scope::ScopeError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("local binding {0} already exists")]
    Redefinition(String),
    #[error("binding {0} is not mutable")]
    Immutable(String),
    #[error("binding {0} not found")]
    UnresolvedName(String),
    #[error("namespace {0} not found")]
    UnresolvedNamespace(String),
    #[error("{0} is not callable")]
    NotCallable(String),
    #[error("member {member} not found on {target}")]
    MissingMember { target: String, member: String },
    #[error("numeric error: {0}")]
    Numeric(String),
    #[error("failed to parse {kind} literal '{text}'")]
    BadLiteral { kind: &'static str, text: String },
    #[error("type {0} is not comparable")]
    NotComparable(String),
    #[error("expected {expected}, got {got}")]
    WrongArgument {
        expected: &'static str,
        got: String,
    },
    #[error("{0}")]
    Io(String),
}

impl EvalError {
    pub fn numeric(message: impl Into<String>) -> Self {
        EvalError::Numeric(message.into())
    }

    pub fn bad_literal(kind: &'static str, text: impl Into<String>) -> Self {
        EvalError::BadLiteral {
            kind,
            text: text.into(),
        }
    }
}

impl From<ScopeError> for EvalError {
    fn from(err: ScopeError) -> Self {
        match err {
            ScopeError::AlreadyBound(name) => EvalError::Redefinition(name),
            ScopeError::NotFound(name) => EvalError::UnresolvedName(name),
            ScopeError::NotMutable(name) => EvalError::Immutable(name),
            ScopeError::NamespaceNotFound(path) => EvalError::UnresolvedNamespace(path),
        }
    }
}
