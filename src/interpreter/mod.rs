//! Evaluation: scopes, values, the evaluator, and the interpreter driver
//!
//! The driver owns the process-wide pieces: the lexer configuration, the
//! top-level scope populated from the built-in registry, the persistent
//! parse context, and the resolver's operator scope. A file evaluates as one
//! program; a REPL evaluates line by line against the persisted
//! scope/context pair, rolling the scope back when a line fails.

pub mod builtins;
mod error;
mod eval;
mod number;
mod scope;
mod value;

pub use error::EvalError;
pub use eval::Evaluator;
pub use number::{Complex, Number, Rational};
pub use scope::{Binding, OperatorInfo, Scope, ScopeError};
pub use value::{BuiltInFn, BuiltInValue, CurriedValue, FunctionValue, PairValue, Value};

use std::io::Write;

use tracing::debug;

use crate::ast::Expr;
use crate::error::FrondError;
use crate::lexer::Lexer;
use crate::parser::{parse_with, Context, PrecedenceResolver};

pub struct Interpreter {
    lexer: Lexer,
    evaluator: Evaluator,
    context: Context,
    operator_scope: Scope<OperatorInfo>,
}

impl Interpreter {
    pub fn new() -> Result<Self, FrondError> {
        let lexer = Lexer::with_defaults()?;
        let top_scope = Scope::new();
        builtins::install(&top_scope).map_err(EvalError::from)?;
        inject_io(&top_scope).map_err(EvalError::from)?;

        Ok(Self {
            lexer,
            evaluator: Evaluator::new(&top_scope),
            context: builtins::parse_context(),
            operator_scope: builtins::operator_scope().new_child(),
        })
    }

    pub fn with_tab_width(mut self, width: usize) -> Self {
        self.lexer.set_tab_width(width);
        self
    }

    /// Run one whole program: lex, parse against the persistent context,
    /// resolve precedence, evaluate. The context advances only when the
    /// program parses, so a failed line cannot poison later ones.
    pub fn evaluate_program(&mut self, source: &str) -> Result<Value, FrondError> {
        let tokens = self.lexer.tokenize(source)?;
        debug!(count = tokens.len(), "lexed program");
        let (expr, context) = parse_with(tokens, self.context.clone())?;
        let resolved = PrecedenceResolver::new(self.operator_scope.clone()).resolve(expr)?;
        debug!("parsed and resolved program");
        let value = self.evaluator.eval(&resolved)?;
        self.context = context;
        Ok(value)
    }

    /// Evaluate one REPL line, restoring the session scope to its prior
    /// state when evaluation fails so earlier bindings stay intact.
    pub fn evaluate_line(&mut self, source: &str) -> Result<Value, FrondError> {
        let snapshot = self.evaluator.current_scope().snapshot();
        match self.evaluate_program(source) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.evaluator.current_scope().restore(snapshot);
                Err(err)
            }
        }
    }

    /// Lex, parse, and resolve without evaluating (the `--ast` flag).
    pub fn resolve_only(&self, source: &str) -> Result<Expr, FrondError> {
        let tokens = self.lexer.tokenize(source)?;
        let (expr, _) = parse_with(tokens, self.context.clone())?;
        let resolved = PrecedenceResolver::new(self.operator_scope.new_child()).resolve(expr)?;
        Ok(resolved)
    }
}

/// Install the host-I/O built-ins: `print`, `println`, and `open` (which
/// recursively evaluates another source file).
fn inject_io(top_scope: &Scope<Value>) -> Result<(), ScopeError> {
    top_scope.bind(
        "print",
        builtins::builtin("print", 1, |args| {
            if let Some(value) = args.first() {
                print!("{value}");
                let _ = std::io::stdout().flush();
            }
            Ok(Value::Unit)
        }),
        false,
        None,
    )?;
    top_scope.bind(
        "println",
        builtins::builtin("println", 1, |args| {
            match args.first() {
                Some(value) => println!("{value}"),
                None => println!(),
            }
            Ok(Value::Unit)
        }),
        false,
        None,
    )?;

    // `open` evaluates the named file in a fresh session rooted at the same
    // top scope; the file's value comes back, its bindings do not.
    let scope_handle = top_scope.clone();
    top_scope.bind(
        "open",
        builtins::builtin("open", 1, move |args| {
            let path = match args.first() {
                Some(Value::Str(path)) => path.to_string(),
                Some(other) => {
                    return Err(EvalError::WrongArgument {
                        expected: "string",
                        got: other.type_name().to_string(),
                    })
                }
                None => {
                    return Err(EvalError::WrongArgument {
                        expected: "string",
                        got: "nothing".to_string(),
                    })
                }
            };
            let source = std::fs::read_to_string(&path)
                .map_err(|err| EvalError::Io(format!("open {path}: {err}")))?;
            evaluate_detached(&scope_handle, &source)
                .map_err(|err| EvalError::Io(format!("open {path}: {err}")))
        }),
        false,
        None,
    )
}

/// One-shot pipeline over an existing top scope: a fresh lexer, context,
/// resolver, and evaluator, sharing only the built-ins.
fn evaluate_detached(top_scope: &Scope<Value>, source: &str) -> Result<Value, FrondError> {
    let lexer = Lexer::with_defaults()?;
    let tokens = lexer.tokenize(source)?;
    let (expr, _) = parse_with(tokens, builtins::parse_context())?;
    let resolved = PrecedenceResolver::new(builtins::operator_scope().new_child()).resolve(expr)?;
    let mut evaluator = Evaluator::new(top_scope);
    Ok(evaluator.eval(&resolved)?)
}
