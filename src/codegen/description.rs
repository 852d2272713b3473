//! Human-readable structural description of a compiled class,
//! written alongside its instructions for inspection.

use std::fmt;

use crate::semantics::model::{
    Class, Expression, Receiver, Statement, SubRoutine, SubroutineCall, Term, Variable,
};

use super::vm::Segment;

const INDENT: &str = "  ";

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IntegerConstant(i) => write!(f, "{i}"),
            Self::StringConstant(s) => write!(f, "\"{s}\""),
            Self::KeywordConstant(constant) => write!(f, "{constant}"),
            Self::Variable(variable) => write!(f, "{}", variable.name),
            Self::ArrayElement(array, index) => write!(f, "{}[{index}]", array.name),
            Self::Call(call) => write!(f, "{call}"),
            Self::Parenthesized(inner) => write!(f, "({inner})"),
            Self::Unary(operator, operand) => write!(f, "{operator}{operand}"),
            Self::Unresolved => write!(f, "?"),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;

        for (operator, operand) in &self.rest {
            write!(f, " {operator} {operand}")?;
        }

        Ok(())
    }
}

impl fmt::Display for SubroutineCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.receiver {
            Receiver::This => write!(f, "{}", self.subroutine_name)?,
            Receiver::Object(object) => write!(f, "{}.{}", object.name, self.subroutine_name)?,
            Receiver::Static => write!(f, "{}", self.qualified_name())?,
        }

        let arguments = self
            .arguments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        write!(f, "({arguments})")
    }
}

fn describe_variable(variable: &Variable) -> String {
    format!(
        "{} {} {} ({} {})",
        variable.scope,
        variable.ty,
        variable.name,
        Segment::from(variable.scope),
        variable.index
    )
}

fn describe_statements(statements: &[Statement], depth: usize, output: &mut String) {
    for statement in statements {
        describe_statement(statement, depth, output);
    }
}

fn describe_statement(statement: &Statement, depth: usize, output: &mut String) {
    let indent = INDENT.repeat(depth);

    let line = match statement {
        Statement::Let {
            target,
            index: Some(index),
            value,
        } => format!("let {}[{index}] = {value}", target.name),
        Statement::Let { target, value, .. } => format!("let {} = {value}", target.name),
        Statement::If {
            condition,
            then,
            otherwise,
        } => {
            output.push_str(&format!("{indent}if ({condition})\n"));
            describe_statements(then, depth + 1, output);

            if let Some(otherwise) = otherwise {
                output.push_str(&format!("{indent}else\n"));
                describe_statements(otherwise, depth + 1, output);
            }
            return;
        }
        Statement::While { condition, body } => {
            output.push_str(&format!("{indent}while ({condition})\n"));
            describe_statements(body, depth + 1, output);
            return;
        }
        Statement::Do(call) => format!("do {call}"),
        Statement::Return(Some(value)) => format!("return {value}"),
        Statement::Return(None) => String::from("return"),
        Statement::Unresolved => String::from("?"),
    };

    output.push_str(&format!("{indent}{line}\n"));
}

fn describe_subroutine(subroutine: &SubRoutine, output: &mut String) {
    let return_type = subroutine
        .return_type
        .as_ref()
        .map_or_else(|| String::from("void"), ToString::to_string);

    output.push_str(&format!(
        "{INDENT}{} {return_type} {}\n",
        subroutine.kind, subroutine.name
    ));

    for variable in subroutine.parameters.iter().chain(&subroutine.locals) {
        output.push_str(&format!("{INDENT}{INDENT}{}\n", describe_variable(variable)));
    }

    describe_statements(&subroutine.statements, 2, output);
}

pub fn describe_class(class: &Class) -> String {
    let mut output = format!("class {} ({} fields)\n", class.name, class.field_count());

    for variable in &class.variables {
        output.push_str(&format!("{INDENT}{}\n", describe_variable(variable)));
    }

    for subroutine in &class.subroutines {
        output.push('\n');
        describe_subroutine(subroutine, &mut output);
    }

    output
}

#[cfg(test)]
mod tests {
    use crate::semantics::model::{
        BinaryOperator, KeywordConstant, Primitive, Scope, SubroutineKind, UnaryOperator,
        VariableType,
    };

    use super::*;

    fn variable(name: &str, scope: Scope, index: usize) -> Variable {
        Variable {
            name: name.to_string(),
            scope,
            index,
            ty: VariableType::Primitive(Primitive::Int),
            line: 1,
        }
    }

    #[test]
    fn test_expression_description() {
        let expression = Expression {
            first: Term::ArrayElement(
                variable("a", Scope::Local, 0),
                Box::new(Expression::single(Term::IntegerConstant(1))),
            ),
            rest: vec![
                (
                    BinaryOperator::Add,
                    Term::Parenthesized(Box::new(Expression::single(Term::Unary(
                        UnaryOperator::Negate,
                        Box::new(Term::Variable(variable("b", Scope::Field, 0))),
                    )))),
                ),
                (
                    BinaryOperator::Equal,
                    Term::KeywordConstant(KeywordConstant::True),
                ),
            ],
        };

        assert_eq!(expression.to_string(), "a[1] + (-b) = true");
    }

    #[test]
    fn test_class_description() {
        let class = Class {
            name: String::from("Counter"),
            line: 1,
            variables: vec![variable("count", Scope::Field, 0)],
            subroutines: vec![SubRoutine {
                name: String::from("add"),
                kind: SubroutineKind::Method,
                return_type: None,
                parameters: vec![variable("n", Scope::Parameter, 1)],
                locals: Vec::new(),
                statements: vec![
                    Statement::While {
                        condition: Expression::single(Term::KeywordConstant(
                            KeywordConstant::False,
                        )),
                        body: vec![Statement::Do(SubroutineCall {
                            receiver: Receiver::Static,
                            class_name: String::from("Output"),
                            subroutine_name: String::from("printString"),
                            arguments: vec![Expression::single(Term::StringConstant(
                                String::from("hi"),
                            ))],
                            line: 1,
                        })],
                    },
                    Statement::Return(None),
                ],
                line: 1,
            }],
        };

        let expected = [
            "class Counter (1 fields)",
            "  field int count (this 0)",
            "",
            "  method void add",
            "    parameter int n (argument 1)",
            "    while (false)",
            "      do Output.printString(\"hi\")",
            "    return",
            "",
        ]
        .join("\n");

        assert_eq!(describe_class(&class), expected);
    }
}
