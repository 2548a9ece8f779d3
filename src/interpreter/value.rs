//! Run-time values
//!
//! Compound values share structure through `Rc`; the one genuinely mutable
//! cell is the pair, whose `car`/`cdr` members accept `set!`. Every value
//! answers its own truthiness (only an explicit `false` is falsy), member
//! lookup, and display form.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::ast::Expr;

use super::error::EvalError;
use super::number::Number;
use super::scope::Scope;

/// A user function: parameters, a body expression, and the scope it closed
/// over at definition time (closures are lexically scoped).
#[derive(Debug)]
pub struct FunctionValue {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Expr,
    pub declaring_scope: Scope<Value>,
}

/// A partial application: the underlying callable plus the arguments
/// accumulated so far. Applying another argument builds a new value; the
/// accumulated list is never mutated.
#[derive(Debug)]
pub struct CurriedValue {
    pub callable: Value,
    pub applied: Vec<Value>,
}

impl CurriedValue {
    pub fn new(callable: Value) -> Self {
        Self {
            callable,
            applied: Vec::new(),
        }
    }

    pub fn apply(&self, argument: Value) -> CurriedValue {
        let mut applied = self.applied.clone();
        applied.push(argument);
        CurriedValue {
            callable: self.callable.clone(),
            applied,
        }
    }
}

pub type BuiltInFn = Rc<dyn Fn(&[Value]) -> Result<Value, EvalError>>;

/// A native callable characterized by its declared parameter count and an
/// invocable accepting exactly that many values.
pub struct BuiltInValue {
    pub name: String,
    pub parameter_count: usize,
    pub function: BuiltInFn,
}

impl fmt::Debug for BuiltInValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<#builtin {}:{}>", self.name, self.parameter_count)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairValue {
    pub car: Value,
    pub cdr: Value,
}

#[derive(Debug, Clone)]
pub enum Value {
    Unit,
    Boolean(bool),
    Number(Number),
    Str(Rc<String>),
    Char(char),
    List(Rc<Vec<Value>>),
    Pair(Rc<RefCell<PairValue>>),
    Function(Rc<FunctionValue>),
    Curried(Rc<CurriedValue>),
    BuiltIn(Rc<BuiltInValue>),
}

impl Value {
    pub fn string(text: impl Into<String>) -> Value {
        Value::Str(Rc::new(text.into()))
    }

    pub fn list(values: Vec<Value>) -> Value {
        Value::List(Rc::new(values))
    }

    pub fn pair(car: Value, cdr: Value) -> Value {
        Value::Pair(Rc::new(RefCell::new(PairValue { car, cdr })))
    }

    /// Build a proper linked list: right-folded pairs terminated by Unit.
    pub fn linked_list(values: Vec<Value>) -> Value {
        values
            .into_iter()
            .rev()
            .fold(Value::Unit, |tail, head| Value::pair(head, tail))
    }

    /// Every value defines its own truthiness; only an explicit boolean
    /// `false` is falsy.
    pub fn as_bool(&self) -> bool {
        !matches!(self, Value::Boolean(false))
    }

    pub fn is_callable(&self) -> bool {
        match self {
            Value::Function(_) | Value::BuiltIn(_) => true,
            Value::Curried(curried) => curried.callable.is_callable(),
            _ => false,
        }
    }

    /// The kebab-case name of this value's kind, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Char(_) => "char",
            Value::List(_) => "list",
            Value::Pair(_) => "pair",
            Value::Function(_) => "function",
            Value::Curried(_) => "curried-function",
            Value::BuiltIn(_) => "built-in-function",
        }
    }

    /// Member access; `None` when the value has no such member.
    pub fn get_member(&self, name: &str) -> Option<Value> {
        match (self, name) {
            (Value::Pair(pair), "car") => Some(pair.borrow().car.clone()),
            (Value::Pair(pair), "cdr") => Some(pair.borrow().cdr.clone()),
            (Value::List(values), "length") => {
                Some(Value::Number(Number::Int(values.len() as i64)))
            }
            (Value::List(values), "empty?") => Some(Value::Boolean(values.is_empty())),
            (Value::List(values), "copy") => Some(Value::list(values.as_ref().clone())),
            (Value::Str(text), "length") => {
                Some(Value::Number(Number::Int(text.chars().count() as i64)))
            }
            (Value::Str(text), "chars") => {
                Some(Value::list(text.chars().map(Value::Char).collect()))
            }
            _ => None,
        }
    }

    /// Member assignment; `false` when the member is unknown or read-only.
    pub fn set_member(&self, name: &str, value: Value) -> bool {
        match (self, name) {
            (Value::Pair(pair), "car") => {
                pair.borrow_mut().car = value;
                true
            }
            (Value::Pair(pair), "cdr") => {
                pair.borrow_mut().cdr = value;
                true
            }
            _ => false,
        }
    }

    /// Ordering across comparable values; numbers compare under promotion,
    /// strings and chars lexically.
    pub fn compare(&self, other: &Value) -> Result<Ordering, EvalError> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a
                .partial_cmp_number(b)
                .ok_or_else(|| EvalError::NotComparable("complex number".to_string())),
            (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
            (Value::Char(a), Value::Char(b)) => Ok(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a.cmp(b)),
            _ => Err(EvalError::NotComparable(self.type_name().to_string())),
        }
    }

    /// Reference identity for the `is` operator; value types fall back to
    /// equality.
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Pair(a), Value::Pair(b)) => Rc::ptr_eq(a, b),
            (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Curried(a), Value::Curried(b)) => Rc::ptr_eq(a, b),
            (Value::BuiltIn(a), Value::BuiltIn(b)) => Rc::ptr_eq(a, b),
            _ => self == other,
        }
    }

    pub fn is_linked_list(&self) -> bool {
        match self {
            Value::Unit => true,
            Value::Pair(pair) => pair.borrow().cdr.is_linked_list(),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.equals(b),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Pair(a), Value::Pair(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Curried(a), Value::Curried(b)) => Rc::ptr_eq(a, b),
            (Value::BuiltIn(a), Value::BuiltIn(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Number(number) => write!(f, "{number}"),
            Value::Str(text) => write!(f, "{text}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::List(values) => {
                let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join("; "))
            }
            Value::Pair(pair) => {
                if self.is_linked_list() {
                    write!(f, "({})", linked_list_string(&pair.borrow()))
                } else {
                    let pair = pair.borrow();
                    write!(f, "({} . {})", pair.car, pair.cdr)
                }
            }
            Value::Function(function) => {
                write!(f, "<#function {}:{}>", function.name, function.parameters.len())
            }
            Value::Curried(curried) => {
                write!(f, "<#curried {}/{}>", curried.callable, curried.applied.len())
            }
            Value::BuiltIn(builtin) => write!(f, "<#builtin {}>", builtin.name),
        }
    }
}

fn linked_list_string(pair: &PairValue) -> String {
    match &pair.cdr {
        Value::Unit => pair.car.to_string(),
        Value::Pair(rest) => format!("{}; {}", pair.car, linked_list_string(&rest.borrow())),
        other => format!("{}; {}", pair.car, other),
    }
}
