//! # Frond - An Indentation-Sensitive Functional Language
//!
//! Frond is a small interpreted, dynamically-typed functional language with
//! significant whitespace, user-definable infix operators, and curried
//! function application, implemented as a classic front-end-plus-evaluator
//! pipeline.
//!
//! ## Pipeline Flow
//!
//! ```text
//! Source Code (String)
//!     ↓
//! [Lexer] → Token Stream (with synthetic bof/indent/dedent/eof markers)
//!     ↓
//! [Grammar over Combinator Engine] → AST (flat `Line` groups, live
//!     operator/namespace context threaded through the parse)
//!     ↓
//! [Precedence Resolver] → AST (nested applications and operator calls)
//!     ↓
//! [Evaluator] → Runtime Value (or a propagated failure)
//! ```
//!
//! ## Key Design Decisions
//!
//! ### Indentation as Grouping
//! The lexer tracks nested indentation widths as a stack and synthesizes
//! group-open ("indent") and group-close ("dedent") tokens, so the grammar
//! sees indented blocks and parenthesized groups through one production.
//!
//! ### Context-Sensitive Parsing
//! Operators are declared in source (`let operator precedence 9 <+> a b =
//! ...`), so token classification depends on what has been parsed already.
//! The parser threads a persistent [`parser::Context`] of known
//! definitions, operators, and namespaces; checkpoints capture it alongside
//! the cursor, which keeps unlimited backtracking safe.
//!
//! ### Two-Stage Operator Handling
//! The grammar leaves each logical line as a flat sequence of operands and
//! operator occurrences; a separate [`parser::PrecedenceResolver`] pass
//! rewrites those lines into nested trees using declared precedence and
//! associativity.
//!
//! ### Curried Application
//! Every callable applies one argument at a time. A multi-parameter
//! function applied to fewer arguments yields a partial-application value;
//! the body runs exactly once, when the last argument arrives. Closures
//! capture their declaring scope (shared-ownership environment nodes), so
//! scoping is lexical.
//!
//! ## Module Structure
//!
//! - [`lexer`] - Token definitions and the indentation-aware tokenizer
//! - [`parser`] - Parser combinators, parse state/context, grammar, and
//!   precedence resolution
//! - [`ast`] - Expression nodes and the structural transformer
//! - [`interpreter`] - Scopes, values, the numeric tower, built-ins, the
//!   evaluator, and the file/REPL driver
//!
//! ## Getting Started
//!
//! ```no_run
//! use frond::interpreter::Interpreter;
//!
//! let mut interpreter = Interpreter::new().expect("built-in setup cannot fail");
//! let value = interpreter.evaluate_program("let double x = x * 2\ndouble 21");
//! println!("{}", value.unwrap());
//! ```

pub mod ast;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;

pub use error::FrondError;
