//! Expression parsers for the Frond grammar
//!
//! An expression line is parsed as a flat run of operands and operator
//! occurrences (a `Line` group); nesting by precedence happens afterwards in
//! the resolver pass. Member access binds tightest and is attached here.

use crate::ast::{
    Conditional, Expr, Group, GroupType, Lambda, LinkedList, List, MemberAccess,
    NamespacedIdentifier,
};

use super::super::combinators::{
    if_so_continue_with, many, optional, sep_by, with_opt_leading_if, BoxedParser,
};
use super::super::{ParseError, Parser, ParserState};
use super::definition::{arg_list, assignment, member_assignment};
use super::terminals::{
    backquote, equals, group_close_of, group_open, group_open_of, id, list_close, list_open,
    newline, number, operator, period, reserved_word, string,
};

/// namespaced_id := (id ".")+ id, where the dotted prefix names a namespace
/// known to the live context
fn namespaced_id() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        let segment = id().skip(period());
        let mut namespaces = vec![segment.parse(state)?];
        loop {
            let checkpoint = state.save();
            match segment.parse(state) {
                Ok(name) => namespaces.push(name),
                Err(_) => {
                    state.restore(checkpoint);
                    break;
                }
            }
        }
        if !state.is_defined_namespace(&namespaces) {
            return Err(ParseError::new(format!(
                "unknown namespace '{}'",
                namespaces.join(".")
            )));
        }
        let name = id().parse(state)?;
        Ok(Expr::NamespacedIdentifier(NamespacedIdentifier {
            namespaces,
            name,
        }))
    })
}

/// operator_fn := "(" operator ")", an operator in value position
fn operator_function() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        group_open_of(GroupType::Parenthesized).parse(state)?;
        let name = operator().parse(state)?;
        group_close_of(GroupType::Parenthesized).parse(state)?;
        Ok(Expr::operator(name))
    })
}

/// lambda := "lambda" arg_list "=" expression
fn lambda() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        reserved_word("lambda").parse(state)?;
        let parameters = arg_list().parse(state)?;
        equals().parse(state)?;
        let body = block_body().parse(state)?;
        Ok(Expr::Lambda(Box::new(Lambda { parameters, body })))
    })
}

/// An expression that may sit on the next line when it is a group (the
/// `let f args =` / `lambda ... =` continuation shape)
pub fn block_body() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        with_opt_leading_if(expression(), newline(), |body| {
            matches!(body, Expr::Group(_))
        })
        .parse(state)
    })
}

/// cond := "if" expression [nl] "then" [nl] branch [[nl] "else" [nl] branch]
fn cond() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        reserved_word("if").parse(state)?;
        let condition = expression().parse(state)?;
        optional(newline()).parse(state)?;
        reserved_word("then").parse(state)?;
        optional(newline()).parse(state)?;
        let then_branch = cond_branch().parse(state)?;

        let else_parser = BoxedParser::new(move |state: &mut ParserState| {
            optional(newline()).parse(state)?;
            reserved_word("else").parse(state)?;
            optional(newline()).parse(state)?;
            cond_branch().parse(state)
        });
        let else_branch = optional(else_parser).parse(state)?;

        Ok(Expr::Conditional(Box::new(Conditional {
            condition,
            then_branch,
            else_branch,
        })))
    })
}

/// branch := expression | assignment | member-assignment, so conditionals
/// can have imperative-looking bodies
fn cond_branch() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        (expression() | assignment() | member_assignment()).parse(state)
    })
}

/// group := opener newline* (expression | definition)(newline+ ...)* newline* closer
///
/// The body parses inside a pushed definition context so bindings introduced
/// in the group do not leak to the enclosing parse.
pub fn group() -> BoxedParser<Group> {
    BoxedParser::new(move |state: &mut ParserState| {
        let group_type = group_open().parse(state)?;
        many(newline()).parse(state)?;
        state.push_context();
        let expressions =
            super::group_elements(group_type != GroupType::Parenthesized).parse(state)?;
        state.pop_context();
        many(newline()).parse(state)?;
        group_close_of(group_type).parse(state)?;
        Ok(Group {
            group_type,
            expressions,
        })
    })
}

/// Either an indented block (its expressions are taken wholesale) or an
/// inline newline-separated sequence — the shared body of lists and
/// linked lists
fn sequence_body() -> BoxedParser<Vec<Expr>> {
    let block = BoxedParser::new(move |state: &mut ParserState| {
        newline().parse(state)?;
        let body = group().parse(state)?;
        if body.group_type != GroupType::Indented {
            return Err(ParseError::new("expected an indented block"));
        }
        newline().parse(state)?;
        Ok(body.expressions)
    });
    let inline = BoxedParser::new(move |state: &mut ParserState| {
        sep_by(expression(), newline()).parse(state)
    });
    block | inline
}

/// list := "[" sequence_body "]"
fn list() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        list_open().parse(state)?;
        let expressions = sequence_body().parse(state)?;
        list_close().parse(state)?;
        Ok(Expr::List(List { expressions }))
    })
}

/// linked_list := "`" "(" sequence_body ")"
fn linked_list() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        backquote().parse(state)?;
        group_open_of(GroupType::Parenthesized).parse(state)?;
        let expressions = sequence_body().parse(state)?;
        group_close_of(GroupType::Parenthesized).parse(state)?;
        Ok(Expr::LinkedList(LinkedList { expressions }))
    })
}

/// primary := number | namespaced_id | identifier | cond | group | list
///          | linked_list | string | operator_fn | lambda
fn primary() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        let alternatives: [BoxedParser<Expr>; 10] = [
            number().map(Expr::NumberLiteral),
            namespaced_id(),
            id().map(|name| Expr::identifier(name)),
            cond(),
            group().map(Expr::Group),
            list(),
            linked_list(),
            string().map(Expr::StringLiteral),
            operator_function(),
            lambda(),
        ];
        let mut last: Option<ParseError> = None;
        for alternative in alternatives {
            let checkpoint = state.save();
            match alternative.parse(state) {
                Ok(expr) => return Ok(expr),
                Err(err) => {
                    state.restore(checkpoint);
                    last = Some(err);
                }
            }
        }
        Err(last.unwrap_or_else(|| ParseError::unexpected("expression", state.peek())))
    })
}

/// One `.member` postfix step applied to an already-parsed target
fn member_step(target: Expr) -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        period().parse(state)?;
        let member = id().parse(state)?;
        Ok(Expr::MemberAccess(Box::new(MemberAccess {
            target: target.clone(),
            member,
        })))
    })
}

/// primary with any chain of member accesses attached (tightest binding)
fn postfix_operand() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        let first = primary().parse(state)?;
        match if_so_continue_with(member_step(first.clone()), member_step).parse(state)? {
            Some(chained) => Ok(chained),
            None => Ok(first),
        }
    })
}

/// expression := a flat run of operands and operator occurrences
///
/// A single operand collapses to itself; anything longer becomes a
/// `GroupType::Line` group for the precedence resolver to restructure.
pub fn expression() -> BoxedParser<Expr> {
    BoxedParser::new(move |state: &mut ParserState| {
        let first = postfix_operand().parse(state)?;
        let mut items = vec![first];
        loop {
            // An infix operator occurrence stays an identifier item in the
            // flat line; the resolver classifies it by scope lookup. The
            // distinct `Operator` node is reserved for value position.
            let checkpoint = state.save();
            if let Ok(name) = operator().parse(state) {
                items.push(Expr::identifier(name));
                continue;
            }
            state.restore(checkpoint);

            let checkpoint = state.save();
            match postfix_operand().parse(state) {
                Ok(item) => items.push(item),
                Err(_) => {
                    state.restore(checkpoint);
                    break;
                }
            }
        }
        if items.len() == 1 {
            Ok(items.pop().unwrap_or(Expr::Empty))
        } else {
            Ok(Expr::line(items))
        }
    })
}
