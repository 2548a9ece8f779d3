use pretty_assertions::assert_eq;

use frond::interpreter::{Complex, Interpreter, Number, Rational, Value};
use frond::FrondError;

fn eval_program(source: &str) -> Value {
    Interpreter::new()
        .expect("interpreter setup succeeds")
        .evaluate_program(source)
        .expect("evaluation succeeds")
}

fn eval_error(source: &str) -> FrondError {
    Interpreter::new()
        .expect("interpreter setup succeeds")
        .evaluate_program(source)
        .expect_err("evaluation fails")
}

fn int(value: i64) -> Value {
    Value::Number(Number::Int(value))
}

// ===== Numeric literal subtype dispatch =====

#[test]
fn binary_literal_reads_bits() {
    assert_eq!(eval_program("0b101"), int(5));
}

#[test]
fn hex_literal() {
    assert_eq!(eval_program("0x1F"), int(31));
}

#[test]
fn rational_literal_stays_exact() {
    assert_eq!(
        eval_program("3/4"),
        Value::Number(Number::Rational(
            Rational::new(3, 4).expect("nonzero denominator")
        ))
    );
}

#[test]
fn complex_literal() {
    assert_eq!(
        eval_program("1+2i"),
        Value::Number(Number::Complex(Complex::new(1.0, 2.0)))
    );
}

#[test]
fn exponent_literal_is_real() {
    assert_eq!(eval_program("3.5e2"), Value::Number(Number::Real(350.0)));
}

#[test]
fn rational_literal_sentinels() {
    assert!(matches!(
        eval_program("0/0"),
        Value::Number(Number::Real(value)) if value.is_nan()
    ));
    assert_eq!(
        eval_program("3/0"),
        Value::Number(Number::Real(f64::INFINITY))
    );
    // An integral rational lowers to an integer.
    assert_eq!(eval_program("6/3"), int(2));
}

// ===== Numeric tower arithmetic =====

#[test]
fn exact_division_produces_rationals() {
    // `1 / 2` lexes as one rational literal (the pattern tolerates spaces);
    // dividing a bound value goes through the `/` operator instead. Both
    // must agree.
    assert_eq!(eval_program("1 / 2"), eval_program("1/2"));
    assert_eq!(eval_program("4 / 2"), int(2));
    assert_eq!(eval_program("let a = 1\na / 2"), eval_program("1/2"));
    assert_eq!(eval_program("let a = 7\na / 7"), int(1));
}

#[test]
fn rational_arithmetic_lowers_when_integral() {
    assert_eq!(eval_program("1/2 + 1/2"), int(1));
    assert_eq!(eval_program("1/2 + 1/4"), eval_program("3/4"));
}

#[test]
fn mixed_arithmetic_promotes() {
    assert_eq!(eval_program("1 + 2.5"), Value::Number(Number::Real(3.5)));
    assert_eq!(
        eval_program("1 + 1+1i"),
        Value::Number(Number::Complex(Complex::new(2.0, 1.0)))
    );
}

#[test]
fn math_namespace_functions() {
    assert_eq!(eval_program("math.abs (math.negate 3)"), int(3));
    assert_eq!(eval_program("math.floor 7/2"), int(3));
    assert_eq!(eval_program("math.numerator 3/4"), int(3));
    assert_eq!(eval_program("math.denominator 3/4"), int(4));
    assert_eq!(eval_program("math.exact? 1/3"), Value::Boolean(true));
    assert_eq!(eval_program("math.real-part 1+2i"), Value::Number(Number::Real(1.0)));
}

// ===== Currying =====

#[test]
fn currying_accumulates_and_executes_once() {
    // The body's side effect must not run before the final argument.
    let source = "let ref count = 0\n\
                  let add3 a b c =\n\
                  \tset! count = count + 1\n\
                  \ta + b + c\n\
                  let step1 = add3 1\n\
                  let step2 = step1 2\n\
                  let before = count\n\
                  let result = step2 3\n\
                  [before; count; result]";
    assert_eq!(eval_program(source), Value::list(vec![int(0), int(1), int(6)]));
}

#[test]
fn partial_applications_are_callable_values() {
    let source = "let add a b = a + b\ncallable? (add 1)";
    assert_eq!(eval_program(source), Value::Boolean(true));
}

#[test]
fn operators_are_curried_two_argument_functions() {
    let source = "let inc = (+) 1\ninc 41";
    assert_eq!(eval_program(source), int(42));
}

#[test]
fn calling_a_non_callable_fails() {
    assert!(matches!(
        eval_error("1 2"),
        FrondError::Eval(frond::interpreter::EvalError::NotCallable(_))
    ));
}

// ===== Scoping =====

#[test]
fn child_scopes_shadow_and_unwind() {
    let source = "let x = 1\n\
                  let f () =\n\
                  \tlet x = 2\n\
                  \tx\n\
                  let inner = f ()\n\
                  [inner; x]";
    assert_eq!(eval_program(source), Value::list(vec![int(2), int(1)]));
}

#[test]
fn closures_capture_their_declaring_scope() {
    let source = "let make_adder n =\n\
                  \tlambda x = x + n\n\
                  let add5 = make_adder 5\n\
                  add5 10";
    assert_eq!(eval_program(source), int(15));
}

#[test]
fn redefinition_in_the_same_scope_fails() {
    assert!(matches!(
        eval_error("let x = 1\nlet x = 2"),
        FrondError::Eval(frond::interpreter::EvalError::Redefinition(name)) if name == "x"
    ));
}

#[test]
fn unresolved_name_fails() {
    assert!(matches!(
        eval_error("nonsuch"),
        FrondError::Eval(frond::interpreter::EvalError::UnresolvedName(name)) if name == "nonsuch"
    ));
}

// ===== Mutability =====

#[test]
fn immutable_bindings_reject_set() {
    assert!(matches!(
        eval_error("let x = 1\nset! x = 2"),
        FrondError::Eval(frond::interpreter::EvalError::Immutable(name)) if name == "x"
    ));
}

#[test]
fn mutable_bindings_accept_set() {
    assert_eq!(eval_program("let ref x = 1\nset! x = 2\nx"), int(2));
}

// ===== Conditionals and truthiness =====

#[test]
fn only_false_is_falsy() {
    assert_eq!(eval_program("if 0 then 1 else 2"), int(1));
    assert_eq!(eval_program("if 1 = 2 then 1 else 2"), int(2));
    assert_eq!(eval_program("if \"\" then 1 else 2"), int(1));
}

#[test]
fn missing_else_yields_unit() {
    assert_eq!(eval_program("if 1 = 2 then 3"), Value::Unit);
}

// ===== Groups, lists, pairs =====

#[test]
fn groups_evaluate_to_their_last_value() {
    assert_eq!(eval_program("(1\n2)"), int(2));
    assert_eq!(eval_program("()"), Value::Unit);
}

#[test]
fn lists_and_linked_lists() {
    assert_eq!(
        eval_program("[1; 2; 3]"),
        Value::list(vec![int(1), int(2), int(3)])
    );
    assert_eq!(
        eval_program("`(1; 2; 3)"),
        Value::linked_list(vec![int(1), int(2), int(3)])
    );
}

#[test]
fn linked_list_flattens_nested_lines() {
    // A group-shaped element becomes a nested linked list, not a pair of
    // pairs.
    let value = eval_program("`(1; (2\n3))");
    assert_eq!(
        value,
        Value::linked_list(vec![int(1), Value::linked_list(vec![int(2), int(3)])])
    );
}

#[test]
fn pair_members_read_and_write() {
    let source = "let p = cons 1 2\nset! p.car = 10\n[p.car; p.cdr]";
    assert_eq!(eval_program(source), Value::list(vec![int(10), int(2)]));
}

#[test]
fn missing_member_fails() {
    assert!(matches!(
        eval_error("let p = cons 1 2\np.nope"),
        FrondError::Eval(frond::interpreter::EvalError::MissingMember { member, .. })
            if member == "nope"
    ));
}

#[test]
fn list_members() {
    assert_eq!(eval_program("[1; 2; 3].length"), int(3));
    assert_eq!(eval_program("[].empty?"), Value::Boolean(true));
}

// ===== Strings =====

#[test]
fn string_concat_and_substring() {
    assert_eq!(
        eval_program("\"foo\" ++ \"bar\""),
        Value::string("foobar")
    );
    assert_eq!(eval_program("substring \"hello\" 1 3"), Value::string("ell"));
    assert_eq!(eval_program("\"hey\".length"), int(3));
}

#[test]
fn string_conversions() {
    assert_eq!(eval_program("string->number \"0x10\""), int(16));
    assert_eq!(eval_program("number->string 3/4"), Value::string("3/4"));
}

// ===== Comparisons =====

#[test]
fn comparisons_promote_numerically() {
    assert_eq!(eval_program("1 < 3/2"), Value::Boolean(true));
    assert_eq!(eval_program("\"a\" < \"b\""), Value::Boolean(true));
    assert_eq!(eval_program("2 = 2.0"), Value::Boolean(true));
}

#[test]
fn complex_values_do_not_order() {
    assert!(matches!(
        eval_error("1+2i < 2+0i"),
        FrondError::Eval(frond::interpreter::EvalError::NotComparable(_))
    ));
}

// ===== Namespaces =====

#[test]
fn namespaces_resolve_by_qualified_path() {
    let source = "namespace geo =\n\
                  \tlet two = 2\n\
                  \tlet double x = x * two\n\
                  geo.double 4";
    assert_eq!(eval_program(source), int(8));
}

#[test]
fn using_enables_unqualified_lookup() {
    let source = "namespace geo =\n\
                  \tlet double x = x * 2\n\
                  using geo\n\
                  double 3";
    assert_eq!(eval_program(source), int(6));
}

#[test]
fn using_is_confined_to_its_block() {
    let visible = "namespace geo =\n\
                   \tlet double x = x * 2\n\
                   let f () =\n\
                   \tusing geo\n\
                   \tdouble 3\n\
                   f ()";
    assert_eq!(eval_program(visible), int(6));

    let escaped = "namespace geo =\n\
                   \tlet double x = x * 2\n\
                   let f () =\n\
                   \tusing geo\n\
                   \tdouble 3\n\
                   let ok = f ()\n\
                   double 3";
    assert!(matches!(
        eval_error(escaped),
        FrondError::Eval(frond::interpreter::EvalError::UnresolvedName(name)) if name == "double"
    ));
}

// ===== User operators =====

#[test]
fn user_operator_with_precedence_left() {
    let source = "let operator precedence 9 ** a b = a ^ b\n2 ** 3 ** 2 + 1";
    assert_eq!(eval_program(source), int(65));
}

#[test]
fn user_operator_with_precedence_right() {
    let source = "let operator precedence 9 associates R ** a b = a ^ b\n2 ** 3 ** 2 + 1";
    assert_eq!(eval_program(source), int(513));
}

// ===== Error recovery and the driver =====

#[test]
fn error_nodes_do_not_abort_the_program() {
    assert_eq!(eval_program("let a = 1\nlet = 9 =\na + 1"), int(2));
}

#[test]
fn trailing_operator_is_rejected_before_evaluation() {
    assert!(matches!(eval_error("2 +"), FrondError::Parse(_)));
}

#[test]
fn repl_lines_share_a_persistent_scope() {
    let mut interpreter = Interpreter::new().expect("interpreter setup succeeds");
    interpreter
        .evaluate_line("let x = 1")
        .expect("binding succeeds");
    assert_eq!(interpreter.evaluate_line("x + 1").expect("x visible"), int(2));
}

#[test]
fn repl_rolls_back_a_failed_line() {
    let mut interpreter = Interpreter::new().expect("interpreter setup succeeds");
    interpreter
        .evaluate_line("let x = 1")
        .expect("binding succeeds");

    // The line binds y, then fails; the binding must not survive.
    assert!(interpreter.evaluate_line("let y = 2\nset! y = 3").is_err());
    assert!(matches!(
        interpreter.evaluate_line("y"),
        Err(FrondError::Eval(frond::interpreter::EvalError::UnresolvedName(_)))
    ));
    assert_eq!(interpreter.evaluate_line("x").expect("x intact"), int(1));
}

#[test]
fn repl_remembers_operator_definitions() {
    let mut interpreter = Interpreter::new().expect("interpreter setup succeeds");
    interpreter
        .evaluate_line("let operator precedence 2 <*> a b = a * b + 1")
        .expect("operator definition succeeds");
    assert_eq!(
        interpreter.evaluate_line("1 + 2 <*> 3").expect("operator visible"),
        int(8)
    );
}

#[test]
fn open_evaluates_another_program() {
    let path = std::env::temp_dir().join("frond_open_test.frond");
    std::fs::write(&path, "40 + 2").expect("write test program");
    let source = format!("open \"{}\"", path.display());
    assert_eq!(eval_program(&source), int(42));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn lambdas_are_first_class_arguments() {
    let source = "let apply f x = f x\napply (lambda y = y + 1) 41";
    assert_eq!(eval_program(source), int(42));
}
