//! The crate-level error: any stage of the pipeline can fail, and each
//! stage's error keeps its own shape.

use thiserror::Error;

use crate::interpreter::EvalError;
use crate::lexer::SyntaxError;
use crate::parser::ParseError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrondError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("runtime error: {0}")]
    Eval(#[from] EvalError),
}
