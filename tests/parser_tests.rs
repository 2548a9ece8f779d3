use pretty_assertions::assert_eq;

use frond::ast::{Expr, GroupType, NumberKind};
use frond::interpreter::builtins;
use frond::lexer::{Lexer, Token, TokenKind};
use frond::parser::grammar::terminals::{group_open, id, id_exact, reserved_word};
use frond::parser::{parse_with, Context, Parser, ParserState, PrecedenceResolver};

fn tok(kind: TokenKind, content: &str) -> Token {
    Token::new(kind, content, 1, 0)
}

fn state_of(tokens: Vec<Token>) -> ParserState {
    ParserState::new(tokens, Context::new())
}

fn parse_program(source: &str) -> Expr {
    let lexer = Lexer::with_defaults().expect("default definitions compile");
    let tokens = lexer.tokenize(source).expect("lexing succeeds");
    let (expr, _) = parse_with(tokens, builtins::parse_context()).expect("parsing succeeds");
    expr
}

fn resolve_program(source: &str) -> Expr {
    let parsed = parse_program(source);
    PrecedenceResolver::new(builtins::operator_scope().new_child())
        .resolve(parsed)
        .expect("resolution succeeds")
}

fn top_level_expressions(expr: Expr) -> Vec<Expr> {
    match expr {
        Expr::Group(group) => {
            assert_eq!(group.group_type, GroupType::TopLevel);
            group.expressions
        }
        other => panic!("expected top-level group, got {other:?}"),
    }
}

// ===== Terminal contracts =====

#[test]
fn id_accepts_identifiers_and_rejects_reserved_words() {
    let mut state = state_of(vec![tok(TokenKind::Identifier, "identifier")]);
    assert_eq!(id().parse(&mut state), Ok("identifier".to_string()));

    let mut state = state_of(vec![tok(TokenKind::ReservedWord, "let")]);
    assert!(id().parse(&mut state).is_err());
}

#[test]
fn id_exact_requires_matching_content() {
    let mut state = state_of(vec![tok(TokenKind::Identifier, "hello")]);
    assert_eq!(id_exact("hello").parse(&mut state), Ok("hello".to_string()));

    let mut state = state_of(vec![tok(TokenKind::Identifier, "goodbye")]);
    assert!(id_exact("hello").parse(&mut state).is_err());

    let mut state = state_of(vec![tok(TokenKind::ReservedWord, "hello")]);
    assert!(id_exact("hello").parse(&mut state).is_err());
}

#[test]
fn id_rejects_defined_operators() {
    let tokens = vec![tok(TokenKind::Identifier, "+")];
    let mut state = ParserState::new(tokens, builtins::parse_context());
    assert!(id().parse(&mut state).is_err());
}

#[test]
fn reserved_word_requires_kind_and_content() {
    let mut state = state_of(vec![tok(TokenKind::ReservedWord, "word")]);
    assert!(reserved_word("word").parse(&mut state).is_ok());

    let mut state = state_of(vec![tok(TokenKind::ReservedWord, "otherword")]);
    assert!(reserved_word("word").parse(&mut state).is_err());

    let mut state = state_of(vec![tok(TokenKind::Identifier, "word")]);
    assert!(reserved_word("word").parse(&mut state).is_err());
}

#[test]
fn temp_reserved_words_shift_classification() {
    let mut state = state_of(vec![tok(TokenKind::Identifier, "when")]);
    state.reserve_words(&["when"]);
    assert!(id().parse(&mut state).is_err());
    assert!(reserved_word("when").parse(&mut state).is_ok());

    let mut state = state_of(vec![tok(TokenKind::Identifier, "when")]);
    state.reserve_words(&["when"]);
    state.unreserve_words(&["when"]);
    assert!(id().parse(&mut state).is_ok());
}

#[test]
fn group_opener_classification() {
    let mut state = state_of(vec![tok(TokenKind::OpenGroup, "bof")]);
    assert_eq!(group_open().parse(&mut state), Ok(GroupType::TopLevel));

    let mut state = state_of(vec![tok(TokenKind::OpenGroup, "(")]);
    assert_eq!(group_open().parse(&mut state), Ok(GroupType::Parenthesized));

    let mut state = state_of(vec![tok(TokenKind::OpenGroup, "indent")]);
    assert_eq!(group_open().parse(&mut state), Ok(GroupType::Indented));

    let mut state = state_of(vec![tok(TokenKind::OpenGroup, "")]);
    assert!(group_open().parse(&mut state).is_err());
}

// ===== Grammar =====

#[test]
fn parse_let_binding() {
    let exprs = top_level_expressions(parse_program("let x = 5"));
    assert_eq!(exprs.len(), 1);
    let Expr::Binding(binding) = &exprs[0] else {
        panic!("expected binding, got {:?}", exprs[0]);
    };
    assert_eq!(binding.name, "x");
    let Expr::NumberLiteral(literal) = &binding.value else {
        panic!("expected number literal");
    };
    assert_eq!(literal.value, "5");
    assert_eq!(literal.kind, NumberKind::Decimal);
}

#[test]
fn parse_let_ref_marks_mutable() {
    let exprs = top_level_expressions(parse_program("let ref x = 5"));
    assert!(matches!(&exprs[0], Expr::MutableBinding(binding) if binding.name == "x"));
}

#[test]
fn parse_function_definition_with_parameters() {
    let exprs = top_level_expressions(parse_program("let add a b = a + b"));
    let Expr::FunctionDefinition(def) = &exprs[0] else {
        panic!("expected function definition, got {:?}", exprs[0]);
    };
    assert_eq!(def.name, "add");
    assert_eq!(def.parameters, vec!["a".to_string(), "b".to_string()]);
    assert!(matches!(&def.body, Expr::Group(group) if group.group_type == GroupType::Line));
}

#[test]
fn parse_zero_arity_function() {
    let exprs = top_level_expressions(parse_program("let f () = 1"));
    let Expr::FunctionDefinition(def) = &exprs[0] else {
        panic!("expected function definition");
    };
    assert!(def.parameters.is_empty());
}

#[test]
fn expression_lines_stay_flat_before_resolution() {
    let exprs = top_level_expressions(parse_program("f x + 1"));
    let Expr::Group(line) = &exprs[0] else {
        panic!("expected line group, got {:?}", exprs[0]);
    };
    assert_eq!(line.group_type, GroupType::Line);
    assert_eq!(line.expressions.len(), 4);
}

#[test]
fn member_assignment_round_trip() {
    let exprs = top_level_expressions(parse_program("set! a.e.b.d = c 3"));
    let Expr::MemberAssignment(assignment) = &exprs[0] else {
        panic!("expected member assignment, got {:?}", exprs[0]);
    };
    assert_eq!(assignment.member, "d");

    let Expr::NamespacedIdentifier(target) = &assignment.target else {
        panic!("expected namespaced identifier target, got {:?}", assignment.target);
    };
    assert_eq!(target.namespaces, vec!["a".to_string(), "e".to_string()]);
    assert_eq!(target.name, "b");

    let Expr::Group(value) = &assignment.value else {
        panic!("expected flattened line value, got {:?}", assignment.value);
    };
    assert_eq!(value.group_type, GroupType::Line);
    assert_eq!(value.expressions.len(), 2);
    assert!(matches!(&value.expressions[0], Expr::Identifier(id) if id.name == "c"));
    assert!(matches!(
        &value.expressions[1],
        Expr::NumberLiteral(literal)
            if literal.value == "3" && literal.kind == NumberKind::Decimal
    ));
}

#[test]
fn simple_assignment_uses_the_direct_production() {
    let exprs = top_level_expressions(parse_program("set! x = 5"));
    assert!(matches!(&exprs[0], Expr::Assignment(assignment) if assignment.name == "x"));
}

#[test]
fn operator_definition_registers_operator_for_later_lines() {
    let exprs = top_level_expressions(parse_program(
        "let operator precedence 2 associates R <+> a b = a\n1 <+> 2",
    ));
    let Expr::OperatorDefinition(def) = &exprs[0] else {
        panic!("expected operator definition, got {:?}", exprs[0]);
    };
    assert_eq!(def.name, "<+>");
    assert_eq!(def.precedence, 2.0);
    assert_eq!(def.association, frond::ast::Association::Right);

    // The second line parses `<+>` as an infix occurrence inside the flat
    // line, not as application of three operands.
    let Expr::Group(line) = &exprs[1] else {
        panic!("expected line group");
    };
    assert!(matches!(&line.expressions[1], Expr::Identifier(id) if id.name == "<+>"));
}

#[test]
fn operator_definition_defaults() {
    let exprs = top_level_expressions(parse_program("let operator <*> a b = a"));
    let Expr::OperatorDefinition(def) = &exprs[0] else {
        panic!("expected operator definition");
    };
    assert_eq!(def.precedence, 0.0);
    assert_eq!(def.association, frond::ast::Association::Left);
}

#[test]
fn operator_definitions_in_a_group_do_not_leak() {
    // `<&>` is declared inside the parenthesized group; afterwards it no
    // longer classifies as an operator, so `1 <&> 2` is an application line
    // of three operands.
    let exprs = top_level_expressions(parse_program(
        "(let operator <&> a b = a\n1 <&> 2)\n1 <&> 2",
    ));
    let Expr::Group(line) = &exprs[1] else {
        panic!("expected line group");
    };
    assert_eq!(line.expressions.len(), 3);
    assert!(matches!(&line.expressions[1], Expr::Identifier(id) if id.name == "<&>"));

    // Inside the group it was a proper infix line too; outside, the
    // resolver will treat the identifier as an operand since no operator
    // info is in scope.
    let resolved = resolve_program("(let operator <&> a b = a\n1 <&> 2)\n1 <&> 2");
    let exprs = top_level_expressions(resolved);
    assert!(matches!(&exprs[1], Expr::Application(_)));
}

#[test]
fn parse_conditional_with_optional_newlines() {
    let exprs = top_level_expressions(parse_program("if x\nthen 1\nelse 2"));
    let Expr::Conditional(cond) = &exprs[0] else {
        panic!("expected conditional, got {:?}", exprs[0]);
    };
    assert!(matches!(&cond.condition, Expr::Identifier(id) if id.name == "x"));
    assert!(cond.else_branch.is_some());
}

#[test]
fn parse_conditional_without_else() {
    let exprs = top_level_expressions(parse_program("if x then 1"));
    let Expr::Conditional(cond) = &exprs[0] else {
        panic!("expected conditional");
    };
    assert!(cond.else_branch.is_none());
}

#[test]
fn parse_lambda() {
    let exprs = top_level_expressions(parse_program("lambda x y = x"));
    let Expr::Lambda(lambda) = &exprs[0] else {
        panic!("expected lambda, got {:?}", exprs[0]);
    };
    assert_eq!(lambda.parameters, vec!["x".to_string(), "y".to_string()]);
}

#[test]
fn parse_list_inline() {
    let exprs = top_level_expressions(parse_program("[1; 2; 3]"));
    let Expr::List(list) = &exprs[0] else {
        panic!("expected list, got {:?}", exprs[0]);
    };
    assert_eq!(list.expressions.len(), 3);
}

#[test]
fn parse_linked_list() {
    let exprs = top_level_expressions(parse_program("`(1; 2; 3)"));
    let Expr::LinkedList(list) = &exprs[0] else {
        panic!("expected linked list, got {:?}", exprs[0]);
    };
    assert_eq!(list.expressions.len(), 3);
}

#[test]
fn parse_operator_as_value() {
    let exprs = top_level_expressions(parse_program("(+)"));
    assert!(matches!(&exprs[0], Expr::Operator(op) if op.name == "+"));
}

#[test]
fn parse_namespace_and_qualified_identifier() {
    let exprs = top_level_expressions(parse_program(
        "namespace geo =\n    let two = 2\ngeo.two",
    ));
    let Expr::Namespace(namespace) = &exprs[0] else {
        panic!("expected namespace, got {:?}", exprs[0]);
    };
    assert_eq!(namespace.namespaces, vec!["geo".to_string()]);
    assert_eq!(namespace.expressions.len(), 1);

    let Expr::NamespacedIdentifier(qualified) = &exprs[1] else {
        panic!("expected namespaced identifier, got {:?}", exprs[1]);
    };
    assert_eq!(qualified.namespaces, vec!["geo".to_string()]);
    assert_eq!(qualified.name, "two");
}

#[test]
fn dotted_chain_without_known_namespace_is_member_access() {
    let exprs = top_level_expressions(parse_program("a.b"));
    let Expr::MemberAccess(access) = &exprs[0] else {
        panic!("expected member access, got {:?}", exprs[0]);
    };
    assert_eq!(access.member, "b");
    assert!(matches!(&access.target, Expr::Identifier(id) if id.name == "a"));
}

#[test]
fn parse_using() {
    let exprs = top_level_expressions(parse_program(
        "namespace geo =\n    let two = 2\nusing geo",
    ));
    assert!(matches!(&exprs[1], Expr::Using(using) if using.namespaces == vec!["geo".to_string()]));
}

#[test]
fn unparseable_line_recovers_as_error_node() {
    let exprs = top_level_expressions(parse_program("let a = 1\nlet = 9 =\na"));
    assert_eq!(exprs.len(), 3);
    assert!(matches!(&exprs[0], Expr::Binding(_)));
    let Expr::Error(error) = &exprs[1] else {
        panic!("expected error node, got {:?}", exprs[1]);
    };
    assert_eq!(error.tokens.len(), 4);
    assert!(matches!(&exprs[2], Expr::Identifier(id) if id.name == "a"));
}

// ===== Precedence resolution =====

#[test]
fn application_chains_fold_left() {
    let exprs = top_level_expressions(resolve_program("f x y"));
    let Expr::Application(outer) = &exprs[0] else {
        panic!("expected application, got {:?}", exprs[0]);
    };
    assert!(matches!(&outer.argument, Expr::Identifier(id) if id.name == "y"));
    let Expr::Application(inner) = &outer.function else {
        panic!("expected nested application");
    };
    assert!(matches!(&inner.function, Expr::Identifier(id) if id.name == "f"));
    assert!(matches!(&inner.argument, Expr::Identifier(id) if id.name == "x"));
}

#[test]
fn equal_precedence_operators_group_left() {
    let exprs = top_level_expressions(resolve_program("1 - 2 + 3"));
    let Expr::OperatorCall(outer) = &exprs[0] else {
        panic!("expected operator call, got {:?}", exprs[0]);
    };
    assert_eq!(outer.name, "+");
    let Expr::OperatorCall(inner) = &outer.lhs else {
        panic!("expected nested operator call on the left");
    };
    assert_eq!(inner.name, "-");
}

#[test]
fn higher_precedence_binds_tighter() {
    let source = "let operator precedence 2 <*> a b = a\n1 + 2 <*> 3";
    let exprs = top_level_expressions(resolve_program(source));
    let Expr::OperatorCall(outer) = &exprs[1] else {
        panic!("expected operator call, got {:?}", exprs[1]);
    };
    assert_eq!(outer.name, "+");
    let Expr::OperatorCall(rhs) = &outer.rhs else {
        panic!("expected the higher-precedence call on the right");
    };
    assert_eq!(rhs.name, "<*>");
}

#[test]
fn right_associative_operators_group_right() {
    let source = "let operator precedence 2 associates R <^> a b = a\n1 <^> 2 <^> 3";
    let exprs = top_level_expressions(resolve_program(source));
    let Expr::OperatorCall(outer) = &exprs[1] else {
        panic!("expected operator call");
    };
    assert_eq!(outer.name, "<^>");
    assert!(matches!(&outer.lhs, Expr::NumberLiteral(literal) if literal.value == "1"));
    let Expr::OperatorCall(rhs) = &outer.rhs else {
        panic!("expected nested call on the right");
    };
    assert_eq!(rhs.name, "<^>");
}

#[test]
fn application_binds_tighter_than_operators() {
    let exprs = top_level_expressions(resolve_program("f 1 + g 2"));
    let Expr::OperatorCall(call) = &exprs[0] else {
        panic!("expected operator call, got {:?}", exprs[0]);
    };
    assert!(matches!(&call.lhs, Expr::Application(_)));
    assert!(matches!(&call.rhs, Expr::Application(_)));
}

#[test]
fn trailing_operator_is_a_parse_error() {
    let parsed = parse_program("2 +");
    let result = PrecedenceResolver::new(builtins::operator_scope().new_child()).resolve(parsed);
    assert!(result.is_err());
}

#[test]
fn leading_operator_recovers_as_error_node() {
    // A line starting with an operator matches no production at all, so the
    // grammar salvages it rather than the resolver rejecting it.
    let exprs = top_level_expressions(parse_program("+ 2"));
    assert!(matches!(&exprs[0], Expr::Error(_)));
}

#[test]
fn member_access_attaches_to_the_preceding_operand() {
    let exprs = top_level_expressions(resolve_program("f x.y"));
    let Expr::Application(app) = &exprs[0] else {
        panic!("expected application, got {:?}", exprs[0]);
    };
    assert!(matches!(&app.argument, Expr::MemberAccess(_)));
}
