//! Binding and definition parsers
//!
//! These productions mutate the live parse context: a function definition
//! registers its name before sibling expressions parse, and an operator
//! definition registers name + precedence + associativity, which changes how
//! identifier tokens are classified in the rest of its visibility.

use crate::ast::{
    Assignment, Association, Binding, Expr, FunctionDefinition, Group, GroupType, MemberAccess,
    MemberAssignment, MutableBinding, Namespace, NamespacedIdentifier, OperatorDefinition, Using,
};
use crate::interpreter::OperatorInfo;

use super::super::combinators::{many, many1, optional, with_opt_leading_if, BoxedParser};
use super::super::{Definition, ParseError, Parser, ParserState};
use super::expression::{block_body, expression};
use super::terminals::{empty_group, equals, group_close_of, group_open, id, id_exact,
    id_not_equals, newline, number, period, reserved_word};

/// An expression that may sit on the next line when it is a group or a list
/// (the `let x =` continuation shape)
fn binding_body() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        with_opt_leading_if(expression(), newline(), |body| {
            matches!(body, Expr::Group(_) | Expr::List(_))
        })
        .parse(state)
    })
}

/// let := "let" id "=" binding_body
fn let_binding() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        reserved_word("let").parse(state)?;
        let name = id().parse(state)?;
        equals().parse(state)?;
        let value = binding_body().parse(state)?;
        Ok(Expr::Binding(Box::new(Binding { name, value })))
    })
}

/// let_ref := "let" "ref" id "=" binding_body
fn let_ref() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        reserved_word("let").parse(state)?;
        reserved_word("ref").parse(state)?;
        let name = id().parse(state)?;
        equals().parse(state)?;
        let value = binding_body().parse(state)?;
        Ok(Expr::MutableBinding(Box::new(MutableBinding {
            name,
            value,
        })))
    })
}

/// arg_list := "()" | non-`=` identifier+
pub fn arg_list() -> BoxedParser<Vec<String>> {
    BoxedParser::new(move |state: &mut ParserState| {
        let checkpoint = state.save();
        if empty_group().parse(state).is_ok() {
            return Ok(Vec::new());
        }
        state.restore(checkpoint);
        many1(id_not_equals(), "expected argument list").parse(state)
    })
}

/// function_def := "let" id arg_list "=" block_body
///
/// The name is registered in the live context before parsing continues, so
/// forward-appearing uses in the same block classify correctly.
fn function_def() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        reserved_word("let").parse(state)?;
        let name = id().parse(state)?;
        let parameters = arg_list().parse(state)?;
        equals().parse(state)?;
        state.push_context();
        let body = block_body().parse(state)?;
        state.pop_context();
        state.add_definition(Definition::name(name.clone()));
        Ok(Expr::FunctionDefinition(Box::new(FunctionDefinition {
            name,
            parameters,
            body,
        })))
    })
}

/// operator_def := "let" "operator" ["precedence" number] ["associates" (L|R)]
///                 id arg_list "=" block_body
fn operator_def() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        reserved_word("let").parse(state)?;
        reserved_word("operator").parse(state)?;

        let precedence_clause = BoxedParser::new(move |state: &mut ParserState| {
            id_exact("precedence").parse(state)?;
            let literal = number().parse(state)?;
            literal
                .value
                .parse::<f64>()
                .map_err(|_| ParseError::new("invalid operator precedence"))
        });
        let precedence = optional(precedence_clause).parse(state)?.unwrap_or(0.0);

        let association_clause = BoxedParser::new(move |state: &mut ParserState| {
            id_exact("associates").parse(state)?;
            let side = (id_exact("L") | id_exact("R")).parse(state)?;
            Association::parse(&side).ok_or_else(|| ParseError::new("invalid associativity"))
        });
        let association = optional(association_clause)
            .parse(state)?
            .unwrap_or_default();

        let name = id().parse(state)?;
        let parameters = arg_list().parse(state)?;
        equals().parse(state)?;
        state.push_context();
        let body = block_body().parse(state)?;
        state.pop_context();
        state.add_definition(Definition::operator(
            name.clone(),
            OperatorInfo::new(precedence, association),
        ));
        Ok(Expr::OperatorDefinition(Box::new(OperatorDefinition {
            name,
            parameters,
            body,
            precedence,
            association,
        })))
    })
}

/// using := "using" id ("." id)*
///
/// Marks the namespace as used for the rest of the current lexical block.
fn using() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        reserved_word("using").parse(state)?;
        let namespaces = namespace_path().parse(state)?;
        if !state.use_namespace(&namespaces) {
            return Err(ParseError::new(format!(
                "could not find namespace '{}'",
                namespaces.join(".")
            )));
        }
        Ok(Expr::Using(Using { namespaces }))
    })
}

fn namespace_path() -> BoxedParser<Vec<String>> {
    BoxedParser::new(move |state: &mut ParserState| {
        let mut names = vec![id().parse(state)?];
        loop {
            let checkpoint = state.save();
            if period().parse(state).is_ok() {
                match id().parse(state) {
                    Ok(name) => {
                        names.push(name);
                        continue;
                    }
                    Err(_) => {
                        state.restore(checkpoint);
                        break;
                    }
                }
            }
            state.restore(checkpoint);
            break;
        }
        Ok(names)
    })
}

/// namespace := "namespace" dotted-name "=" group
///
/// The body parses in a fresh context which is then registered under the
/// dotted path, making its definitions reachable by qualified name.
fn namespace() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        reserved_word("namespace").parse(state)?;
        let namespaces = namespace_path().parse(state)?;
        equals().parse(state)?;
        optional(newline()).parse(state)?;
        let group_type = group_open().parse(state)?;
        many(newline()).parse(state)?;
        state.push_context();
        let expressions =
            super::group_elements(group_type != GroupType::Parenthesized).parse(state)?;
        let inner = state.pop_context();
        state.add_namespace(&namespaces, inner);
        many(newline()).parse(state)?;
        group_close_of(group_type).parse(state)?;
        Ok(Expr::Namespace(Namespace {
            namespaces,
            expressions,
            group_type,
        }))
    })
}

/// assignment := "set!" id "=" binding_body
fn assignment_def() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        reserved_word("set!").parse(state)?;
        let name = id().parse(state)?;
        equals().parse(state)?;
        let value = binding_body().parse(state)?;
        Ok(Expr::Assignment(Box::new(Assignment { name, value })))
    })
}

pub fn assignment() -> BoxedParser<Expr> {
    assignment_def()
}

/// member_assignment := "set!" expression, where the parsed expression has
/// the shape `<target>.<member> = <value>`
///
/// The target/member/value are re-derived from the generic parsed line: only
/// equality-shaped lines whose head is a member access qualify, and a purely
/// dotted head reads as a namespaced identifier target.
pub fn member_assignment() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        reserved_word("set!").parse(state)?;
        let expr = expression().parse(state)?;
        derive_member_assignment(expr)
            .ok_or_else(|| ParseError::new("expected member assignment"))
    })
}

fn derive_member_assignment(expr: Expr) -> Option<Expr> {
    let Expr::Group(Group {
        group_type: GroupType::Line,
        expressions: mut items,
    }) = expr
    else {
        return None;
    };
    if items.len() < 3 {
        return None;
    }
    match &items[1] {
        Expr::Identifier(id) if id.name == "=" => {}
        _ => return None,
    }

    let value_items = items.split_off(2);
    items.pop();
    let head = items.pop()?;
    let Expr::MemberAccess(access) = head else {
        return None;
    };
    let MemberAccess { target, member } = *access;

    let value = if value_items.len() == 1 {
        value_items.into_iter().next()?
    } else {
        Expr::line(value_items)
    };
    Some(Expr::MemberAssignment(Box::new(MemberAssignment {
        target: rebase_dotted(target),
        member,
        value,
    })))
}

/// A target that is a pure dotted chain of identifiers reads as a namespaced
/// identifier; any other member-access target is kept as the expression it
/// already is.
fn rebase_dotted(target: Expr) -> Expr {
    fn segments(expr: &Expr, out: &mut Vec<String>) -> bool {
        match expr {
            Expr::Identifier(id) => {
                out.push(id.name.clone());
                true
            }
            Expr::NamespacedIdentifier(nid) => {
                out.extend(nid.namespaces.iter().cloned());
                out.push(nid.name.clone());
                true
            }
            Expr::MemberAccess(access) => {
                if !segments(&access.target, out) {
                    return false;
                }
                out.push(access.member.clone());
                true
            }
            _ => false,
        }
    }

    let mut names = Vec::new();
    if !segments(&target, &mut names) {
        return target;
    }
    match names.pop() {
        None => target,
        Some(name) if names.is_empty() => Expr::identifier(name),
        Some(name) => Expr::NamespacedIdentifier(NamespacedIdentifier {
            namespaces: names,
            name,
        }),
    }
}

/// definition := let | let_ref | function_def | operator_def | using
///             | namespace | assignment | member_assignment
pub fn definition() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        (let_binding()
            | let_ref()
            | function_def()
            | operator_def()
            | using()
            | namespace()
            | assignment()
            | member_assignment())
        .parse(state)
    })
}
