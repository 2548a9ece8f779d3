//! The tree-walking evaluator
//!
//! A visitor over the resolved AST threading a stack of scopes. Function
//! application is curried: a multi-parameter callable applied to one
//! argument yields a partial-application value, and the body runs exactly
//! once, when the final argument arrives. Executing a user function pushes
//! its closed-over declaring scope plus one fresh frame for parameters, so
//! closures see their definition site, never the caller.

use std::rc::Rc;

use colored::Colorize;

use crate::ast::{Expr, GroupType, NumberKind};

use super::error::EvalError;
use super::number::Number;
use super::scope::{OperatorInfo, Scope};
use super::value::{BuiltInValue, CurriedValue, FunctionValue, Value};

pub struct Evaluator {
    scopes: Vec<Scope<Value>>,
}

impl Evaluator {
    /// Start evaluating against a fresh child of the given top scope
    /// (built-ins live in the parent and stay immune to redefinition).
    pub fn new(top_scope: &Scope<Value>) -> Self {
        Self {
            scopes: vec![top_scope.new_child()],
        }
    }

    pub fn current_scope(&self) -> Scope<Value> {
        self.scopes.last().cloned().unwrap_or_else(Scope::new)
    }

    fn push_child_scope(&mut self) {
        self.scopes.push(self.current_scope().new_child());
    }

    fn eval_sequence(&mut self, expressions: &[Expr]) -> Result<Value, EvalError> {
        let mut last = Value::Unit;
        for expression in expressions {
            last = self.eval(expression)?;
        }
        Ok(last)
    }

    pub fn eval(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Identifier(node) => Ok(self.current_scope().get(&node.name)?),
            Expr::NamespacedIdentifier(node) => Ok(self
                .current_scope()
                .get_namespaced(&node.name, &node.namespaces)?),
            Expr::NumberLiteral(node) => {
                let number = match node.kind {
                    NumberKind::Decimal => Number::parse_decimal(&node.value)?,
                    NumberKind::Binary => Number::parse_binary(&node.value)?,
                    NumberKind::Hex => Number::parse_hex(&node.value)?,
                    NumberKind::Rational => Number::parse_rational(&node.value)?,
                    NumberKind::Complex => Number::parse_complex(&node.value)?,
                };
                Ok(Value::Number(number))
            }
            Expr::StringLiteral(node) => Ok(parse_string_literal(&node.value)),
            Expr::Binding(node) => {
                let value = self.eval(&node.value)?;
                self.current_scope().bind(node.name.clone(), value, false, None)?;
                Ok(Value::Unit)
            }
            Expr::MutableBinding(node) => {
                let value = self.eval(&node.value)?;
                self.current_scope().bind(node.name.clone(), value, true, None)?;
                Ok(Value::Unit)
            }
            Expr::Assignment(node) => {
                let value = self.eval(&node.value)?;
                self.current_scope().set(&node.name, value)?;
                Ok(Value::Unit)
            }
            Expr::MemberAccess(node) => {
                let target = self.eval(&node.target)?;
                target
                    .get_member(&node.member)
                    .ok_or_else(|| EvalError::MissingMember {
                        target: target.to_string(),
                        member: node.member.clone(),
                    })
            }
            Expr::MemberAssignment(node) => {
                let target = self.eval(&node.target)?;
                let value = self.eval(&node.value)?;
                if !target.set_member(&node.member, value) {
                    return Err(EvalError::MissingMember {
                        target: target.to_string(),
                        member: node.member.clone(),
                    });
                }
                Ok(Value::Unit)
            }
            Expr::Conditional(node) => {
                let condition = self.eval(&node.condition)?;
                if condition.as_bool() {
                    self.eval(&node.then_branch)
                } else {
                    match &node.else_branch {
                        Some(branch) => self.eval(branch),
                        None => Ok(Value::Unit),
                    }
                }
            }
            Expr::FunctionDefinition(node) => {
                let function = Value::Function(Rc::new(FunctionValue {
                    name: node.name.clone(),
                    parameters: node.parameters.clone(),
                    body: node.body.clone(),
                    declaring_scope: self.current_scope(),
                }));
                self.current_scope().bind(node.name.clone(), function, false, None)?;
                Ok(Value::Unit)
            }
            Expr::OperatorDefinition(node) => {
                let function = Value::Function(Rc::new(FunctionValue {
                    name: node.name.clone(),
                    parameters: node.parameters.clone(),
                    body: node.body.clone(),
                    declaring_scope: self.current_scope(),
                }));
                self.current_scope().bind(
                    node.name.clone(),
                    function,
                    false,
                    Some(OperatorInfo::new(node.precedence, node.association)),
                )?;
                Ok(Value::Unit)
            }
            Expr::Lambda(node) => Ok(Value::Function(Rc::new(FunctionValue {
                name: "anonymous".to_string(),
                parameters: node.parameters.clone(),
                body: node.body.clone(),
                declaring_scope: self.current_scope(),
            }))),
            Expr::Application(node) => {
                let callable = self.eval(&node.function)?;
                let argument = self.eval(&node.argument)?;
                self.call(callable, argument)
            }
            Expr::OperatorCall(node) => {
                let operator = self.current_scope().get(&node.name)?;
                let lhs = self.eval(&node.lhs)?;
                let rhs = self.eval(&node.rhs)?;
                let partial = self.call(operator, lhs)?;
                self.call(partial, rhs)
            }
            Expr::Group(node) => {
                if node.group_type == GroupType::TopLevel {
                    // The top level introduces no nesting: REPL bindings
                    // persist in the session scope.
                    self.eval_sequence(&node.expressions)
                } else {
                    self.push_child_scope();
                    let result = self.eval_sequence(&node.expressions);
                    self.scopes.pop();
                    result
                }
            }
            Expr::List(node) => {
                let values = node
                    .expressions
                    .iter()
                    .map(|expression| self.eval(expression))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::list(values))
            }
            Expr::LinkedList(node) => self.eval_linked_list(&node.expressions),
            Expr::Namespace(node) => {
                let namespace_scope = self.current_scope().new_child();
                self.scopes.push(namespace_scope.clone());
                let result = self.eval_sequence(&node.expressions);
                self.scopes.pop();
                self.current_scope()
                    .add_namespace(&node.namespaces, namespace_scope);
                result
            }
            Expr::Using(node) => {
                self.current_scope().use_namespace(&node.namespaces)?;
                Ok(Value::Unit)
            }
            Expr::Operator(node) => Ok(self.current_scope().get(&node.name)?),
            Expr::Empty => Ok(Value::Unit),
            Expr::Error(node) => {
                // Parse-level recovery: a salvaged bad region evaluates to a
                // printed diagnostic, not a failure.
                let diagnostic = format!("parse error: {node}");
                eprintln!("{}", diagnostic.as_str().red());
                Ok(Value::Unit)
            }
        }
    }

    /// A linked-list literal flattens any group-shaped child into a nested
    /// linked list instead of nesting pairs-of-pairs.
    fn eval_linked_list(&mut self, expressions: &[Expr]) -> Result<Value, EvalError> {
        let mut values = Vec::with_capacity(expressions.len());
        for expression in expressions {
            let value = match expression {
                Expr::Group(group) => self.eval_linked_list(&group.expressions)?,
                other => self.eval(other)?,
            };
            values.push(value);
        }
        Ok(Value::linked_list(values))
    }

    /// Apply one argument to a callable, currying as needed.
    fn call(&mut self, callable: Value, argument: Value) -> Result<Value, EvalError> {
        match &callable {
            Value::Function(function) => {
                if function.parameters.len() > 1 {
                    Ok(Value::Curried(Rc::new(
                        CurriedValue::new(callable.clone()).apply(argument),
                    )))
                } else {
                    self.execute_function(Rc::clone(function), &[argument])
                }
            }
            Value::Curried(curried) => self.call_curried(curried, argument),
            Value::BuiltIn(builtin) => {
                if builtin.parameter_count > 1 {
                    Ok(Value::Curried(Rc::new(
                        CurriedValue::new(callable.clone()).apply(argument),
                    )))
                } else {
                    execute_builtin(builtin, &[argument])
                }
            }
            _ => Err(EvalError::NotCallable(callable.to_string())),
        }
    }

    fn call_curried(
        &mut self,
        curried: &Rc<CurriedValue>,
        argument: Value,
    ) -> Result<Value, EvalError> {
        let next = curried.apply(argument);
        match &next.callable {
            Value::Function(function) => {
                if next.applied.len() < function.parameters.len() {
                    Ok(Value::Curried(Rc::new(next)))
                } else {
                    self.execute_function(Rc::clone(function), &next.applied)
                }
            }
            Value::BuiltIn(builtin) => {
                if next.applied.len() < builtin.parameter_count {
                    Ok(Value::Curried(Rc::new(next)))
                } else {
                    execute_builtin(builtin, &next.applied)
                }
            }
            other => Err(EvalError::NotCallable(other.to_string())),
        }
    }

    /// Execute a user function: the closed-over declaring scope goes on the
    /// stack, then one fresh frame holding the parameters, so the body sees
    /// its locals shadowing the closure environment — never the caller.
    fn execute_function(
        &mut self,
        function: Rc<FunctionValue>,
        arguments: &[Value],
    ) -> Result<Value, EvalError> {
        self.scopes.push(function.declaring_scope.clone());
        let frame = function.declaring_scope.new_child();
        self.scopes.push(frame.clone());

        let result = (|| {
            for (parameter, argument) in function.parameters.iter().zip(arguments.iter()) {
                frame.bind(parameter.clone(), argument.clone(), false, None)?;
            }
            self.eval(&function.body)
        })();

        self.scopes.pop();
        self.scopes.pop();
        result
    }
}

/// Invoke a built-in with exactly its declared parameter count of arguments;
/// extra curried arguments are silently ignored.
fn execute_builtin(builtin: &Rc<BuiltInValue>, arguments: &[Value]) -> Result<Value, EvalError> {
    let count = builtin.parameter_count.min(arguments.len());
    (builtin.function)(&arguments[..count])
}

/// Strip the surrounding quotes and interpret the escapes of a raw string
/// lexeme.
fn parse_string_literal(raw: &str) -> Value {
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    let mut text = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => text.push('\n'),
            Some('t') => text.push('\t'),
            Some('"') => text.push('"'),
            Some('\\') => text.push('\\'),
            Some(other) => {
                text.push('\\');
                text.push(other);
            }
            None => text.push('\\'),
        }
    }
    Value::string(text)
}
