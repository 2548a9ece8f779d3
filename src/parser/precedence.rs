//! Precedence resolution
//!
//! The grammar leaves each logical line as a flat `Line` group of operands
//! and operator occurrences. This pass walks the tree with a scope stack of
//! [`OperatorInfo`] (seeded from the built-in operator table, extended by
//! user operator definitions as they are encountered) and restructures every
//! line into properly nested application/operator-call trees:
//!
//! 1. runs of adjacent operands fold left-associatively into unary
//!    application chains;
//! 2. the remaining operand/operator alternation splits at the weakest
//!    operator — the rightmost of equal-precedence left-associative
//!    operators, the leftmost of right-associative ones — and both sides
//!    resolve recursively;
//! 3. an operator at the head or tail of a line is a parse error.

use crate::ast::transform::Transformer;
use crate::ast::{
    Association, Expr, FunctionDefinition, Group, GroupType, Lambda, Namespace,
    OperatorDefinition,
};
use crate::interpreter::{OperatorInfo, Scope};

use super::ParseError;

pub struct PrecedenceResolver {
    scopes: Vec<Scope<OperatorInfo>>,
}

enum LineEntry {
    Operand(Expr),
    Op(String, OperatorInfo),
}

impl PrecedenceResolver {
    /// The given scope becomes the resolver's persistent base frame, so
    /// operator definitions at the top level of one program remain visible
    /// to the next (the REPL parses line by line).
    pub fn new(scope: Scope<OperatorInfo>) -> Self {
        Self {
            scopes: vec![scope],
        }
    }

    pub fn resolve(&mut self, expr: Expr) -> Result<Expr, ParseError> {
        self.transform(expr)
    }

    fn current(&self) -> Scope<OperatorInfo> {
        self.scopes.last().cloned().unwrap_or_else(Scope::new)
    }

    fn push(&mut self) {
        self.scopes.push(self.current().new_child());
    }

    fn push_scope(&mut self, scope: Scope<OperatorInfo>) {
        self.scopes.push(scope);
    }

    fn pop(&mut self) {
        self.scopes.pop();
    }

    /// Classify a line item: an identifier bound to operator info in the
    /// current scope is an infix occurrence, anything else an operand.
    fn operator_entry(&self, expr: &Expr) -> Option<(String, OperatorInfo)> {
        match expr {
            Expr::Identifier(id) => self
                .current()
                .get(&id.name)
                .ok()
                .map(|info| (id.name.clone(), info)),
            _ => None,
        }
    }

    fn resolve_line(&mut self, group: Group) -> Result<Expr, ParseError> {
        if group.expressions.is_empty() {
            return Ok(Expr::Group(group));
        }

        let mut entries = Vec::with_capacity(group.expressions.len());
        for expr in group.expressions {
            match self.operator_entry(&expr) {
                Some((name, info)) => entries.push(LineEntry::Op(name, info)),
                None => entries.push(LineEntry::Operand(self.transform(expr)?)),
            }
        }

        let infix_error = || {
            ParseError::new(
                "operator must be in infix position, or be curried with one or no arguments",
            )
        };
        if matches!(entries.first(), Some(LineEntry::Op(..)))
            || matches!(entries.last(), Some(LineEntry::Op(..)))
        {
            return Err(infix_error());
        }

        // Fold adjacent operands into application chains, leaving a strict
        // operand/operator alternation.
        let mut operands: Vec<Expr> = Vec::new();
        let mut operators: Vec<(String, OperatorInfo)> = Vec::new();
        let mut run: Option<Expr> = None;
        for entry in entries {
            match entry {
                LineEntry::Operand(expr) => {
                    run = Some(match run.take() {
                        None => expr,
                        Some(function) => Expr::application(function, expr),
                    });
                }
                LineEntry::Op(name, info) => {
                    match run.take() {
                        Some(expr) => operands.push(expr),
                        None => return Err(infix_error()),
                    }
                    operators.push((name, info));
                }
            }
        }
        if let Some(expr) = run.take() {
            operands.push(expr);
        }

        Ok(resolve_operators(operands, operators))
    }
}

/// Split the alternation at its weakest operator and recurse on both sides.
fn resolve_operators(mut operands: Vec<Expr>, mut operators: Vec<(String, OperatorInfo)>) -> Expr {
    if operators.is_empty() {
        return operands.pop().unwrap_or(Expr::Empty);
    }

    let mut split = 0usize;
    for index in 1..operators.len() {
        let candidate = operators[index].1;
        let best = operators[split].1;
        if candidate.precedence < best.precedence
            || (candidate.precedence == best.precedence
                && candidate.association == Association::Left)
        {
            split = index;
        }
    }

    let rhs_operands = operands.split_off(split + 1);
    let rhs_operators = operators.split_off(split + 1);
    let (name, _) = match operators.pop() {
        Some(op) => op,
        None => return operands.pop().unwrap_or(Expr::Empty),
    };
    let lhs = resolve_operators(operands, operators);
    let rhs = resolve_operators(rhs_operands, rhs_operators);
    Expr::operator_call(name, lhs, rhs)
}

impl Transformer for PrecedenceResolver {
    type Error = ParseError;

    fn transform_group(&mut self, node: Group) -> Result<Expr, Self::Error> {
        match node.group_type {
            GroupType::Line => self.resolve_line(node),
            // The top level shares the resolver's persistent base frame,
            // mirroring the evaluator's scoping.
            GroupType::TopLevel => Ok(Expr::Group(Group {
                group_type: node.group_type,
                expressions: self.transform_all(node.expressions)?,
            })),
            _ => {
                self.push();
                let result = self.transform_all(node.expressions);
                self.pop();
                Ok(Expr::Group(Group {
                    group_type: node.group_type,
                    expressions: result?,
                }))
            }
        }
    }

    fn transform_function_definition(
        &mut self,
        node: FunctionDefinition,
    ) -> Result<Expr, Self::Error> {
        self.push();
        let body = self.transform(node.body);
        self.pop();
        Ok(Expr::FunctionDefinition(Box::new(FunctionDefinition {
            name: node.name,
            parameters: node.parameters,
            body: body?,
        })))
    }

    fn transform_operator_definition(
        &mut self,
        node: OperatorDefinition,
    ) -> Result<Expr, Self::Error> {
        self.current()
            .bind(
                node.name.clone(),
                OperatorInfo::new(node.precedence, node.association),
                false,
                None,
            )
            .map_err(|err| ParseError::new(err.to_string()))?;
        self.push();
        let body = self.transform(node.body);
        self.pop();
        Ok(Expr::OperatorDefinition(Box::new(OperatorDefinition {
            name: node.name,
            parameters: node.parameters,
            body: body?,
            precedence: node.precedence,
            association: node.association,
        })))
    }

    fn transform_lambda(&mut self, node: Lambda) -> Result<Expr, Self::Error> {
        self.push();
        let body = self.transform(node.body);
        self.pop();
        Ok(Expr::Lambda(Box::new(Lambda {
            parameters: node.parameters,
            body: body?,
        })))
    }

    fn transform_namespace(&mut self, node: Namespace) -> Result<Expr, Self::Error> {
        let scope = self.current().new_namespace(&node.namespaces);
        self.push_scope(scope);
        let result = self.transform_all(node.expressions);
        self.pop();
        Ok(Expr::Namespace(Namespace {
            namespaces: node.namespaces,
            expressions: result?,
            group_type: node.group_type,
        }))
    }
}
