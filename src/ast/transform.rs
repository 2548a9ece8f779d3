//! Structural identity transformer over the expression tree
//!
//! A pass that rewrites some node variants implements [`Transformer`] and
//! overrides only the methods it cares about; every other variant is rebuilt
//! with all children recursively transformed. The tree is consumed and
//! reconstructed, never mutated in place.

use super::{
    Application, Assignment, Binding, Conditional, ErrorNode, Expr, FunctionDefinition, Group,
    Identifier, Lambda, LinkedList, List, MemberAccess, MemberAssignment, MutableBinding,
    Namespace, NamespacedIdentifier, NumberLiteral, OperatorCall, OperatorDefinition,
    OperatorName, StringLiteral, Using,
};

pub trait Transformer {
    type Error;

    fn transform(&mut self, expr: Expr) -> Result<Expr, Self::Error> {
        match expr {
            Expr::Identifier(node) => self.transform_identifier(node),
            Expr::NamespacedIdentifier(node) => self.transform_namespaced_identifier(node),
            Expr::NumberLiteral(node) => self.transform_number_literal(node),
            Expr::StringLiteral(node) => self.transform_string_literal(node),
            Expr::Binding(node) => self.transform_binding(*node),
            Expr::MutableBinding(node) => self.transform_mutable_binding(*node),
            Expr::Assignment(node) => self.transform_assignment(*node),
            Expr::MemberAccess(node) => self.transform_member_access(*node),
            Expr::MemberAssignment(node) => self.transform_member_assignment(*node),
            Expr::Conditional(node) => self.transform_conditional(*node),
            Expr::FunctionDefinition(node) => self.transform_function_definition(*node),
            Expr::OperatorDefinition(node) => self.transform_operator_definition(*node),
            Expr::Lambda(node) => self.transform_lambda(*node),
            Expr::Application(node) => self.transform_application(*node),
            Expr::OperatorCall(node) => self.transform_operator_call(*node),
            Expr::Group(node) => self.transform_group(node),
            Expr::List(node) => self.transform_list(node),
            Expr::LinkedList(node) => self.transform_linked_list(node),
            Expr::Namespace(node) => self.transform_namespace(node),
            Expr::Using(node) => self.transform_using(node),
            Expr::Operator(node) => self.transform_operator(node),
            Expr::Empty => Ok(Expr::Empty),
            Expr::Error(node) => self.transform_error(node),
        }
    }

    fn transform_all(&mut self, expressions: Vec<Expr>) -> Result<Vec<Expr>, Self::Error> {
        expressions
            .into_iter()
            .map(|expr| self.transform(expr))
            .collect()
    }

    fn transform_identifier(&mut self, node: Identifier) -> Result<Expr, Self::Error> {
        Ok(Expr::Identifier(node))
    }

    fn transform_namespaced_identifier(
        &mut self,
        node: NamespacedIdentifier,
    ) -> Result<Expr, Self::Error> {
        Ok(Expr::NamespacedIdentifier(node))
    }

    fn transform_number_literal(&mut self, node: NumberLiteral) -> Result<Expr, Self::Error> {
        Ok(Expr::NumberLiteral(node))
    }

    fn transform_string_literal(&mut self, node: StringLiteral) -> Result<Expr, Self::Error> {
        Ok(Expr::StringLiteral(node))
    }

    fn transform_binding(&mut self, node: Binding) -> Result<Expr, Self::Error> {
        Ok(Expr::Binding(Box::new(Binding {
            name: node.name,
            value: self.transform(node.value)?,
        })))
    }

    fn transform_mutable_binding(&mut self, node: MutableBinding) -> Result<Expr, Self::Error> {
        Ok(Expr::MutableBinding(Box::new(MutableBinding {
            name: node.name,
            value: self.transform(node.value)?,
        })))
    }

    fn transform_assignment(&mut self, node: Assignment) -> Result<Expr, Self::Error> {
        Ok(Expr::Assignment(Box::new(Assignment {
            name: node.name,
            value: self.transform(node.value)?,
        })))
    }

    fn transform_member_access(&mut self, node: MemberAccess) -> Result<Expr, Self::Error> {
        Ok(Expr::MemberAccess(Box::new(MemberAccess {
            target: self.transform(node.target)?,
            member: node.member,
        })))
    }

    fn transform_member_assignment(
        &mut self,
        node: MemberAssignment,
    ) -> Result<Expr, Self::Error> {
        Ok(Expr::MemberAssignment(Box::new(MemberAssignment {
            target: self.transform(node.target)?,
            member: node.member,
            value: self.transform(node.value)?,
        })))
    }

    fn transform_conditional(&mut self, node: Conditional) -> Result<Expr, Self::Error> {
        Ok(Expr::Conditional(Box::new(Conditional {
            condition: self.transform(node.condition)?,
            then_branch: self.transform(node.then_branch)?,
            else_branch: node
                .else_branch
                .map(|branch| self.transform(branch))
                .transpose()?,
        })))
    }

    fn transform_function_definition(
        &mut self,
        node: FunctionDefinition,
    ) -> Result<Expr, Self::Error> {
        Ok(Expr::FunctionDefinition(Box::new(FunctionDefinition {
            name: node.name,
            parameters: node.parameters,
            body: self.transform(node.body)?,
        })))
    }

    fn transform_operator_definition(
        &mut self,
        node: OperatorDefinition,
    ) -> Result<Expr, Self::Error> {
        Ok(Expr::OperatorDefinition(Box::new(OperatorDefinition {
            name: node.name,
            parameters: node.parameters,
            body: self.transform(node.body)?,
            precedence: node.precedence,
            association: node.association,
        })))
    }

    fn transform_lambda(&mut self, node: Lambda) -> Result<Expr, Self::Error> {
        Ok(Expr::Lambda(Box::new(Lambda {
            parameters: node.parameters,
            body: self.transform(node.body)?,
        })))
    }

    fn transform_application(&mut self, node: Application) -> Result<Expr, Self::Error> {
        Ok(Expr::Application(Box::new(Application {
            function: self.transform(node.function)?,
            argument: self.transform(node.argument)?,
        })))
    }

    fn transform_operator_call(&mut self, node: OperatorCall) -> Result<Expr, Self::Error> {
        Ok(Expr::OperatorCall(Box::new(OperatorCall {
            name: node.name,
            lhs: self.transform(node.lhs)?,
            rhs: self.transform(node.rhs)?,
        })))
    }

    fn transform_group(&mut self, node: Group) -> Result<Expr, Self::Error> {
        Ok(Expr::Group(Group {
            group_type: node.group_type,
            expressions: self.transform_all(node.expressions)?,
        }))
    }

    fn transform_list(&mut self, node: List) -> Result<Expr, Self::Error> {
        Ok(Expr::List(List {
            expressions: self.transform_all(node.expressions)?,
        }))
    }

    fn transform_linked_list(&mut self, node: LinkedList) -> Result<Expr, Self::Error> {
        Ok(Expr::LinkedList(LinkedList {
            expressions: self.transform_all(node.expressions)?,
        }))
    }

    fn transform_namespace(&mut self, node: Namespace) -> Result<Expr, Self::Error> {
        Ok(Expr::Namespace(Namespace {
            namespaces: node.namespaces,
            expressions: self.transform_all(node.expressions)?,
            group_type: node.group_type,
        }))
    }

    fn transform_using(&mut self, node: Using) -> Result<Expr, Self::Error> {
        Ok(Expr::Using(node))
    }

    fn transform_operator(&mut self, node: OperatorName) -> Result<Expr, Self::Error> {
        Ok(Expr::Operator(node))
    }

    fn transform_error(&mut self, node: ErrorNode) -> Result<Expr, Self::Error> {
        Ok(Expr::Error(node))
    }
}
