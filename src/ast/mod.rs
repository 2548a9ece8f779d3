//! Abstract syntax tree for the Frond language
//!
//! The grammar produces these nodes; the precedence resolver rewrites flat
//! `Line` groups into nested application/operator-call trees; the evaluator
//! walks the result. Nodes are immutable once constructed — passes that
//! change the tree rebuild nodes rather than mutating them (see
//! [`transform::Transformer`]).

pub mod transform;

use std::fmt;

use crate::lexer::{Token, TokenKind};

/// Which bracketing construct an expression group came from.
///
/// `Line` marks an internally synthesized flat sequence of expressions on one
/// logical line, prior to operator/precedence resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupType {
    TopLevel,
    Indented,
    Parenthesized,
    Line,
}

/// Operator associativity. `L` is the default for user definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Association {
    #[default]
    Left,
    Right,
}

impl Association {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "L" => Some(Association::Left),
            "R" => Some(Association::Right),
            _ => None,
        }
    }
}

/// The lexical subtype a numeric literal was written in, preserved so the
/// evaluator can dispatch to the matching parsing grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Decimal,
    Binary,
    Hex,
    Rational,
    Complex,
}

impl NumberKind {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::DecimalNumber => Some(NumberKind::Decimal),
            TokenKind::BinaryNumber => Some(NumberKind::Binary),
            TokenKind::HexNumber => Some(NumberKind::Hex),
            TokenKind::RationalNumber => Some(NumberKind::Rational),
            TokenKind::ComplexNumber => Some(NumberKind::Complex),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
}

/// An identifier qualified by a dotted namespace path, e.g. `math.pi`.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespacedIdentifier {
    pub namespaces: Vec<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
    pub value: String,
    pub kind: NumberKind,
}

/// A string literal carrying its raw lexeme (quotes and escapes included);
/// the evaluator interprets the escapes.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MutableBinding {
    pub name: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberAccess {
    pub target: Expr,
    pub member: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberAssignment {
    pub target: Expr,
    pub member: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub condition: Expr,
    pub then_branch: Expr,
    pub else_branch: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperatorDefinition {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Expr,
    pub precedence: f64,
    pub association: Association,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub parameters: Vec<String>,
    pub body: Expr,
}

/// A single-argument function application; multi-argument calls appear as
/// nested applications after precedence resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    pub function: Expr,
    pub argument: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperatorCall {
    pub name: String,
    pub lhs: Expr,
    pub rhs: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub group_type: GroupType,
    pub expressions: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub expressions: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkedList {
    pub expressions: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    pub namespaces: Vec<String>,
    pub expressions: Vec<Expr>,
    pub group_type: GroupType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Using {
    pub namespaces: Vec<String>,
}

/// An operator in value position, e.g. the `(+)` in `fold (+) 0 xs`, or an
/// infix occurrence inside a not-yet-resolved `Line` group.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorName {
    pub name: String,
}

/// A run of tokens that matched no production, salvaged for diagnostics so
/// the rest of the program can keep parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorNode {
    pub tokens: Vec<Token>,
}

impl fmt::Display for ErrorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let contents: Vec<&str> = self.tokens.iter().map(|t| t.content.as_str()).collect();
        write!(f, "{}", contents.join(" "))
    }
}

/// The closed set of expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(Identifier),
    NamespacedIdentifier(NamespacedIdentifier),
    NumberLiteral(NumberLiteral),
    StringLiteral(StringLiteral),
    Binding(Box<Binding>),
    MutableBinding(Box<MutableBinding>),
    Assignment(Box<Assignment>),
    MemberAccess(Box<MemberAccess>),
    MemberAssignment(Box<MemberAssignment>),
    Conditional(Box<Conditional>),
    FunctionDefinition(Box<FunctionDefinition>),
    OperatorDefinition(Box<OperatorDefinition>),
    Lambda(Box<Lambda>),
    Application(Box<Application>),
    OperatorCall(Box<OperatorCall>),
    Group(Group),
    List(List),
    LinkedList(LinkedList),
    Namespace(Namespace),
    Using(Using),
    Operator(OperatorName),
    Empty,
    Error(ErrorNode),
}

impl Expr {
    pub fn identifier(name: impl Into<String>) -> Self {
        Expr::Identifier(Identifier { name: name.into() })
    }

    pub fn operator(name: impl Into<String>) -> Self {
        Expr::Operator(OperatorName { name: name.into() })
    }

    pub fn application(function: Expr, argument: Expr) -> Self {
        Expr::Application(Box::new(Application { function, argument }))
    }

    pub fn operator_call(name: impl Into<String>, lhs: Expr, rhs: Expr) -> Self {
        Expr::OperatorCall(Box::new(OperatorCall {
            name: name.into(),
            lhs,
            rhs,
        }))
    }

    pub fn line(expressions: Vec<Expr>) -> Self {
        Expr::Group(Group {
            group_type: GroupType::Line,
            expressions,
        })
    }
}
