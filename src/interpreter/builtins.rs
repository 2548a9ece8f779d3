//! The built-in registry
//!
//! One explicit table declares every built-in function and value, populated
//! into the top-level scope once at startup. The same table derives the
//! parse-time context seed (so `+` is a known operator before any source is
//! read) and the precedence resolver's operator scope. All built-in
//! operators are precedence 0, left-associative.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::parser::{Context, Definition};

use super::error::EvalError;
use super::number::Number;
use super::scope::{OperatorInfo, Scope, ScopeError};
use super::value::{BuiltInFn, BuiltInValue, Value};

struct Entry {
    name: &'static str,
    namespace: &'static [&'static str],
    value: Value,
    operator: bool,
}

impl Entry {
    fn function(name: &'static str, value: Value) -> Self {
        Self {
            name,
            namespace: &[],
            value,
            operator: false,
        }
    }

    fn operator(name: &'static str, value: Value) -> Self {
        Self {
            name,
            namespace: &[],
            value,
            operator: true,
        }
    }

    fn math(name: &'static str, value: Value) -> Self {
        Self {
            name,
            namespace: &["math"],
            value,
            operator: false,
        }
    }
}

/// Populate the given top-level scope from the registry.
pub fn install(scope: &Scope<Value>) -> Result<(), ScopeError> {
    for entry in entries() {
        let info = entry.operator.then(OperatorInfo::default);
        let path: Vec<String> = entry.namespace.iter().map(ToString::to_string).collect();
        scope.bind_namespaced(entry.name, entry.value, &path, info)?;
    }
    Ok(())
}

/// The parse-time context seeded with every built-in name, operators
/// carrying their info so the grammar classifies them correctly.
pub fn parse_context() -> Context {
    let mut context = Context::new();
    for entry in entries() {
        let definition = if entry.operator {
            Definition::operator(entry.name, OperatorInfo::default())
        } else {
            Definition::name(entry.name)
        };
        let path: Vec<String> = entry.namespace.iter().map(ToString::to_string).collect();
        context = context.add_namespaced_definition(&path, definition);
    }
    context
}

/// The precedence resolver's seed scope: operator names bound to their
/// precedence/associativity.
pub fn operator_scope() -> Scope<OperatorInfo> {
    let scope = Scope::new();
    for entry in entries() {
        if !entry.operator {
            continue;
        }
        let path: Vec<String> = entry.namespace.iter().map(ToString::to_string).collect();
        // The table never declares the same operator twice.
        let _ = scope.bind_namespaced(entry.name, OperatorInfo::default(), &path, None);
    }
    scope
}

/// Wrap a native function as a built-in callable value.
pub fn builtin(
    name: &'static str,
    parameter_count: usize,
    function: impl Fn(&[Value]) -> Result<Value, EvalError> + 'static,
) -> Value {
    Value::BuiltIn(Rc::new(BuiltInValue {
        name: name.to_string(),
        parameter_count,
        function: Rc::new(function) as BuiltInFn,
    }))
}

fn arg(values: &[Value], index: usize) -> Result<&Value, EvalError> {
    values.get(index).ok_or(EvalError::WrongArgument {
        expected: "an argument",
        got: "nothing".to_string(),
    })
}

fn number_arg(values: &[Value], index: usize) -> Result<Number, EvalError> {
    match arg(values, index)? {
        Value::Number(number) => Ok(*number),
        other => Err(EvalError::WrongArgument {
            expected: "number",
            got: other.type_name().to_string(),
        }),
    }
}

fn string_arg(values: &[Value], index: usize) -> Result<Rc<String>, EvalError> {
    match arg(values, index)? {
        Value::Str(text) => Ok(Rc::clone(text)),
        other => Err(EvalError::WrongArgument {
            expected: "string",
            got: other.type_name().to_string(),
        }),
    }
}

fn num2(name: &'static str, f: fn(Number, Number) -> Result<Number, EvalError>) -> Value {
    builtin(name, 2, move |args| {
        let lhs = number_arg(args, 0)?;
        let rhs = number_arg(args, 1)?;
        Ok(Value::Number(f(lhs, rhs)?))
    })
}

fn num1(name: &'static str, f: fn(Number) -> Result<Number, EvalError>) -> Value {
    builtin(name, 1, move |args| {
        Ok(Value::Number(f(number_arg(args, 0)?)?))
    })
}

fn num_pred(name: &'static str, f: fn(&Number) -> bool) -> Value {
    builtin(name, 1, move |args| {
        Ok(Value::Boolean(f(&number_arg(args, 0)?)))
    })
}

fn type_pred(name: &'static str, f: fn(&Value) -> bool) -> Value {
    builtin(name, 1, move |args| Ok(Value::Boolean(f(arg(args, 0)?))))
}

fn comparison(name: &'static str, accept: fn(Ordering) -> bool) -> Value {
    builtin(name, 2, move |args| {
        let ordering = arg(args, 0)?.compare(arg(args, 1)?)?;
        Ok(Value::Boolean(accept(ordering)))
    })
}

/// `string->number` re-sniffs the subtype the way the lexer classifies
/// literals: hex, binary, complex, rational, then decimal.
fn parse_any_number(text: &str) -> Result<Number, EvalError> {
    let text = text.trim();
    if text.starts_with("0x") || text.starts_with("0X") {
        Number::parse_hex(text)
    } else if text.starts_with("0b") || text.starts_with("0B") {
        Number::parse_binary(text)
    } else if text.ends_with('i') {
        Number::parse_complex(text)
    } else if text.contains('/') {
        Number::parse_rational(text)
    } else {
        Number::parse_decimal(text)
    }
}

fn pair_parts(value: &Value) -> Result<(Value, Value), EvalError> {
    match value {
        Value::Pair(pair) => {
            let pair = pair.borrow();
            Ok((pair.car.clone(), pair.cdr.clone()))
        }
        other => Err(EvalError::WrongArgument {
            expected: "pair",
            got: other.type_name().to_string(),
        }),
    }
}

fn entries() -> Vec<Entry> {
    let mut table = vec![
        // Arithmetic operators
        Entry::operator("+", num2("+", Number::add)),
        Entry::operator("-", num2("-", Number::sub)),
        Entry::operator("*", num2("*", Number::mul)),
        Entry::operator("/", num2("/", Number::div)),
        Entry::operator("%", num2("%", Number::rem)),
        Entry::operator("^", num2("^", Number::pow)),
        // Equality and ordering
        Entry::operator(
            "=",
            builtin("=", 2, |args| {
                Ok(Value::Boolean(arg(args, 0)? == arg(args, 1)?))
            }),
        ),
        Entry::operator(
            "!=",
            builtin("!=", 2, |args| {
                Ok(Value::Boolean(arg(args, 0)? != arg(args, 1)?))
            }),
        ),
        Entry::operator(
            "is",
            builtin("is", 2, |args| {
                Ok(Value::Boolean(arg(args, 0)?.is_same(arg(args, 1)?)))
            }),
        ),
        Entry::operator("<", comparison("<", Ordering::is_lt)),
        Entry::operator("<=", comparison("<=", Ordering::is_le)),
        Entry::operator(">", comparison(">", Ordering::is_gt)),
        Entry::operator(">=", comparison(">=", Ordering::is_ge)),
        // Boolean connectives
        Entry::operator(
            "and",
            builtin("and", 2, |args| {
                Ok(Value::Boolean(
                    arg(args, 0)?.as_bool() && arg(args, 1)?.as_bool(),
                ))
            }),
        ),
        Entry::operator(
            "or",
            builtin("or", 2, |args| {
                Ok(Value::Boolean(
                    arg(args, 0)?.as_bool() || arg(args, 1)?.as_bool(),
                ))
            }),
        ),
        Entry::function(
            "not",
            builtin("not", 1, |args| {
                Ok(Value::Boolean(!arg(args, 0)?.as_bool()))
            }),
        ),
        // String concatenation
        Entry::operator(
            "++",
            builtin("++", 2, |args| {
                let lhs = string_arg(args, 0)?;
                let rhs = string_arg(args, 1)?;
                Ok(Value::string(format!("{lhs}{rhs}")))
            }),
        ),
        Entry::function(
            "substring",
            builtin("substring", 3, |args| {
                let text = string_arg(args, 0)?;
                let start = number_arg(args, 1)?
                    .as_i64()
                    .ok_or(EvalError::WrongArgument {
                        expected: "integer",
                        got: "number".to_string(),
                    })?;
                let length = number_arg(args, 2)?
                    .as_i64()
                    .ok_or(EvalError::WrongArgument {
                        expected: "integer",
                        got: "number".to_string(),
                    })?;
                if start < 0 || length < 0 {
                    return Err(EvalError::numeric("substring bounds must be non-negative"));
                }
                let taken: String = text
                    .chars()
                    .skip(start as usize)
                    .take(length as usize)
                    .collect();
                Ok(Value::string(taken))
            }),
        ),
        // Type predicates
        Entry::function(
            "number?",
            type_pred("number?", |v| matches!(v, Value::Number(_))),
        ),
        Entry::function(
            "boolean?",
            type_pred("boolean?", |v| matches!(v, Value::Boolean(_))),
        ),
        Entry::function("string?", type_pred("string?", |v| matches!(v, Value::Str(_)))),
        Entry::function("char?", type_pred("char?", |v| matches!(v, Value::Char(_)))),
        Entry::function("list?", type_pred("list?", |v| matches!(v, Value::List(_)))),
        Entry::function("pair?", type_pred("pair?", |v| matches!(v, Value::Pair(_)))),
        Entry::function(
            "linked-list?",
            type_pred("linked-list?", Value::is_linked_list),
        ),
        Entry::function("unit?", type_pred("unit?", |v| matches!(v, Value::Unit))),
        Entry::function("callable?", type_pred("callable?", Value::is_callable)),
        // Pairs and lists
        Entry::function(
            "cons",
            builtin("cons", 2, |args| {
                Ok(Value::pair(arg(args, 0)?.clone(), arg(args, 1)?.clone()))
            }),
        ),
        Entry::function(
            "car",
            builtin("car", 1, |args| Ok(pair_parts(arg(args, 0)?)?.0)),
        ),
        Entry::function(
            "cdr",
            builtin("cdr", 1, |args| Ok(pair_parts(arg(args, 0)?)?.1)),
        ),
        Entry::function(
            "list->linked-list",
            builtin("list->linked-list", 1, |args| match arg(args, 0)? {
                Value::List(values) => Ok(Value::linked_list(values.as_ref().clone())),
                other => Err(EvalError::WrongArgument {
                    expected: "list",
                    got: other.type_name().to_string(),
                }),
            }),
        ),
        Entry::function(
            "linked-list->list",
            builtin("linked-list->list", 1, |args| {
                let mut values = Vec::new();
                let mut current = arg(args, 0)?.clone();
                loop {
                    match current {
                        Value::Unit => break,
                        Value::Pair(_) => {
                            let (car, cdr) = pair_parts(&current)?;
                            values.push(car);
                            current = cdr;
                        }
                        other => {
                            return Err(EvalError::WrongArgument {
                                expected: "linked list",
                                got: other.type_name().to_string(),
                            })
                        }
                    }
                }
                Ok(Value::list(values))
            }),
        ),
        // Conversions
        Entry::function(
            "string->number",
            builtin("string->number", 1, |args| {
                Ok(Value::Number(parse_any_number(&string_arg(args, 0)?)?))
            }),
        ),
        Entry::function(
            "number->string",
            builtin("number->string", 1, |args| {
                Ok(Value::string(number_arg(args, 0)?.to_string()))
            }),
        ),
        Entry::function(
            "char",
            builtin("char", 1, |args| match arg(args, 0)? {
                Value::Char(c) => Ok(Value::Char(*c)),
                Value::Str(text) => {
                    let mut chars = text.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => Ok(Value::Char(c)),
                        _ => Err(EvalError::WrongArgument {
                            expected: "single-character string",
                            got: "string".to_string(),
                        }),
                    }
                }
                Value::Number(number) => number
                    .as_i64()
                    .and_then(|code| u32::try_from(code).ok())
                    .and_then(char::from_u32)
                    .map(Value::Char)
                    .ok_or(EvalError::WrongArgument {
                        expected: "character code point",
                        got: "number".to_string(),
                    }),
                other => Err(EvalError::WrongArgument {
                    expected: "char, string, or number",
                    got: other.type_name().to_string(),
                }),
            }),
        ),
    ];

    // The math namespace: constants and numeric functions.
    table.extend([
        Entry::math("zero", Value::Number(Number::ZERO)),
        Entry::math("inf", Value::Number(Number::Real(f64::INFINITY))),
        Entry::math("+inf", Value::Number(Number::Real(f64::INFINITY))),
        Entry::math("-inf", Value::Number(Number::Real(f64::NEG_INFINITY))),
        Entry::math("nan", Value::Number(Number::Real(f64::NAN))),
        Entry::math("epsilon", Value::Number(Number::Real(f64::EPSILON))),
        Entry::math("pi", Value::Number(Number::Real(std::f64::consts::PI))),
        Entry::math("e", Value::Number(Number::Real(std::f64::consts::E))),
        Entry::math(
            "i",
            Value::Number(Number::Complex(super::number::Complex::new(0.0, 1.0))),
        ),
        Entry::math(
            "-i",
            Value::Number(Number::Complex(super::number::Complex::new(0.0, -1.0))),
        ),
        Entry::math("exact", num1("exact", |n| Ok(n.exact()))),
        Entry::math("inexact", num1("inexact", |n| Ok(n.inexact()))),
        Entry::math("exact?", num_pred("exact?", Number::is_exact)),
        Entry::math("inexact?", num_pred("inexact?", |n| !n.is_exact())),
        Entry::math("zero?", num_pred("zero?", Number::is_zero)),
        Entry::math(
            "positive?",
            num_pred("positive?", |n| {
                matches!(
                    n.partial_cmp_number(&Number::ZERO),
                    Some(Ordering::Greater)
                )
            }),
        ),
        Entry::math(
            "negative?",
            num_pred("negative?", |n| {
                matches!(n.partial_cmp_number(&Number::ZERO), Some(Ordering::Less))
            }),
        ),
        Entry::math(
            "even?",
            builtin("even?", 1, |args| {
                match number_arg(args, 0)?.as_i64() {
                    Some(value) => Ok(Value::Boolean(value % 2 == 0)),
                    None => Err(EvalError::numeric("even? expects an integer")),
                }
            }),
        ),
        Entry::math(
            "odd?",
            builtin("odd?", 1, |args| match number_arg(args, 0)?.as_i64() {
                Some(value) => Ok(Value::Boolean(value % 2 != 0)),
                None => Err(EvalError::numeric("odd? expects an integer")),
            }),
        ),
        Entry::math("finite?", num_pred("finite?", Number::is_finite)),
        Entry::math(
            "infinite?",
            num_pred("infinite?", |n| !n.is_finite() && !n.is_nan()),
        ),
        Entry::math("nan?", num_pred("nan?", Number::is_nan)),
        Entry::math(
            "max",
            num2("max", |a, b| {
                Ok(match a.partial_cmp_number(&b) {
                    Some(Ordering::Less) => b,
                    Some(_) => a,
                    None => return Err(EvalError::numeric("complex values do not order")),
                })
            }),
        ),
        Entry::math(
            "min",
            num2("min", |a, b| {
                Ok(match a.partial_cmp_number(&b) {
                    Some(Ordering::Greater) => b,
                    Some(_) => a,
                    None => return Err(EvalError::numeric("complex values do not order")),
                })
            }),
        ),
        Entry::math("abs", num1("abs", |n| Ok(n.abs()))),
        Entry::math("negate", num1("negate", |n| Ok(n.negate()))),
        Entry::math("sqrt", num1("sqrt", Number::sqrt)),
        Entry::math("exp", num1("exp", |n| n.real_fn(f64::exp, "exp"))),
        Entry::math("log", num1("log", |n| n.real_fn(f64::ln, "log"))),
        Entry::math("sin", num1("sin", |n| n.real_fn(f64::sin, "sin"))),
        Entry::math("cos", num1("cos", |n| n.real_fn(f64::cos, "cos"))),
        Entry::math("tan", num1("tan", |n| n.real_fn(f64::tan, "tan"))),
        Entry::math("floor", num1("floor", Number::floor)),
        Entry::math("ceiling", num1("ceiling", Number::ceiling)),
        Entry::math("truncate", num1("truncate", Number::truncate)),
        Entry::math("round", num1("round", Number::round)),
        Entry::math("numerator", num1("numerator", Number::numerator)),
        Entry::math("denominator", num1("denominator", Number::denominator)),
        Entry::math("real-part", num1("real-part", |n| Ok(n.real_part()))),
        Entry::math("imag-part", num1("imag-part", |n| Ok(n.imag_part()))),
        Entry::math("magnitude", num1("magnitude", |n| Ok(n.magnitude()))),
        Entry::math("make-rectangular", num2("make-rectangular", Number::make_rectangular)),
    ]);

    table
}
