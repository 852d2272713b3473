//! Body pass: resolves the statements of every subroutine against
//! the declarations collected by the earlier passes.

use std::str::FromStr;

use crate::{
    common::phrase::{Phrase, PhraseCategory, TermForm},
    lexer::TokenCategory,
};

use super::{
    context::{Location, Lookup, ProgramContext},
    declarations::DeclaredClass,
    model::{
        BinaryOperator, Class, Expression, KeywordConstant, Receiver, Scope, Statement,
        SubRoutine, SubroutineCall, SubroutineKind, Term, UnaryOperator, Variable, VariableType,
    },
};

/// Largest value an integer constant may have.
const MAX_INTEGER: u32 = 32767;

/// Compile the bodies of all subroutines of a declared class.
pub fn compile(declared: DeclaredClass, context: &mut ProgramContext) -> Class {
    let DeclaredClass { mut class, bodies } = declared;

    for (position, body) in bodies.into_iter().enumerate() {
        let statements = {
            let Some(subroutine) = class.subroutines.get(position) else {
                continue;
            };

            let mut compiler = BodyCompiler {
                context: &mut *context,
                location: Location::class(&class.name).subroutine(&subroutine.name),
                class_name: &class.name,
                class_variables: &class.variables,
                subroutine,
            };

            compiler.statements_of(body)
        };

        if let Some(subroutine) = class.subroutines.get_mut(position) {
            subroutine.statements = statements;
        }
    }

    log::debug!("compiled bodies of class `{}`", class.name);

    class
}

struct BodyCompiler<'a> {
    context: &'a mut ProgramContext,
    location: Location,
    class_name: &'a str,
    class_variables: &'a [Variable],
    subroutine: &'a SubRoutine,
}

impl BodyCompiler<'_> {
    fn report<S: Into<String>>(&mut self, line: usize, message: S) {
        self.context.report(&self.location, line, message);
    }

    // region: Variables

    /// Locals shadow parameters, which shadow class variables;
    /// among equal names the first declared wins.
    fn find_variable(&self, name: &str) -> Option<&Variable> {
        self.subroutine
            .locals
            .iter()
            .chain(&self.subroutine.parameters)
            .chain(self.class_variables)
            .find(|variable| variable.name == name)
    }

    fn check_access(&mut self, variable: &Variable, line: usize) {
        if variable.scope == Scope::Field && self.subroutine.kind == SubroutineKind::Function {
            self.report(
                line,
                format!("field `{}` cannot be used inside a function", variable.name),
            );
        }
    }

    fn resolve_variable(&mut self, name: &str, line: usize) -> Option<Variable> {
        let Some(variable) = self.find_variable(name).cloned() else {
            self.report(line, format!("`{name}` is not declared"));
            return None;
        };

        self.check_access(&variable, line);

        Some(variable)
    }

    // endregion

    // region: Statements

    fn statements_of(&mut self, phrase: Option<&Phrase>) -> Vec<Statement> {
        phrase
            .map(|statements| {
                statements
                    .children()
                    .iter()
                    .map(|statement| self.statement(statement))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn statement(&mut self, phrase: &Phrase) -> Statement {
        let Phrase::Branch {
            category, children, ..
        } = phrase
        else {
            return Statement::Unresolved;
        };

        let mut expressions = phrase.branches(PhraseCategory::Expression);
        let mut blocks = phrase.branches(PhraseCategory::Statements);

        match category {
            PhraseCategory::LetStatement => {
                let (name, line) = match children.get(1) {
                    Some(Phrase::Leaf { value, line, .. }) => (value.as_str(), *line),
                    _ => ("", 0),
                };
                let is_indexed = children.get(2).is_some_and(|child| child.is_symbol('['));

                let index = is_indexed.then(|| self.expression_of(expressions.next()));
                let value = self.expression_of(expressions.next());

                self.resolve_variable(name, line)
                    .map_or(Statement::Unresolved, |target| Statement::Let {
                        target,
                        index,
                        value,
                    })
            }
            PhraseCategory::IfStatement => Statement::If {
                condition: self.expression_of(expressions.next()),
                then: self.statements_of(blocks.next()),
                otherwise: blocks.next().map(|block| self.statements_of(Some(block))),
            },
            PhraseCategory::WhileStatement => Statement::While {
                condition: self.expression_of(expressions.next()),
                body: self.statements_of(blocks.next()),
            },
            PhraseCategory::DoStatement => phrase
                .branches(PhraseCategory::SubroutineCall)
                .next()
                .map_or(Statement::Unresolved, |call| Statement::Do(self.call(call))),
            PhraseCategory::ReturnStatement => {
                let value = expressions.next().map(|value| self.expression(value));
                self.check_return(value.is_some(), phrase.line().unwrap_or_default());

                Statement::Return(value)
            }
            _ => Statement::Unresolved,
        }
    }

    fn check_return(&mut self, has_value: bool, line: usize) {
        let subroutine = self.subroutine;
        let name = &subroutine.name;

        match (&subroutine.return_type, has_value) {
            (None, true) => {
                self.report(line, format!("void subroutine `{name}` cannot return a value"));
            }
            (Some(ty), false) if subroutine.kind != SubroutineKind::Constructor => {
                let message = format!("subroutine `{name}` must return a value of type `{ty}`");
                self.report(line, message);
            }
            _ => {}
        }
    }

    // endregion

    // region: Expressions

    fn expression_of(&mut self, phrase: Option<&Phrase>) -> Expression {
        phrase.map_or_else(
            || Expression::single(Term::Unresolved),
            |expression| self.expression(expression),
        )
    }

    fn expression(&mut self, phrase: &Phrase) -> Expression {
        let Some((first, rest)) = phrase.children().split_first() else {
            return Expression::single(Term::Unresolved);
        };

        let first = self.term(first);
        let rest = rest
            .chunks(2)
            .filter_map(|pair| match pair {
                [operator, term] => {
                    let operator = BinaryOperator::from_str(operator.value()?).ok()?;
                    Some((operator, self.term(term)))
                }
                _ => None,
            })
            .collect();

        Expression { first, rest }
    }

    fn term(&mut self, phrase: &Phrase) -> Term {
        let line = phrase.line().unwrap_or_default();

        match (phrase.form(), phrase.children()) {
            (Some(TermForm::IntegerConstant), [literal]) => {
                let value = literal.value().unwrap_or_default();

                match value.parse::<u32>() {
                    Ok(number) if number <= MAX_INTEGER => u16::try_from(number)
                        .map_or(Term::Unresolved, Term::IntegerConstant),
                    _ => {
                        self.report(line, format!("integer constant `{value}` is out of range"));
                        Term::Unresolved
                    }
                }
            }
            (Some(TermForm::StringConstant), [literal]) => {
                let value = literal.value().unwrap_or_default();

                // every character is pushed as a constant
                match value.chars().find(|c| u32::from(*c) > MAX_INTEGER) {
                    Some(c) => {
                        self.report(
                            line,
                            format!("character `{c}` cannot be used in a string constant"),
                        );
                        Term::Unresolved
                    }
                    None => Term::StringConstant(value.to_string()),
                }
            }
            (Some(TermForm::KeywordConstant), [literal]) => {
                let Some(constant) = literal
                    .value()
                    .and_then(|value| KeywordConstant::from_str(value).ok())
                else {
                    return Term::Unresolved;
                };

                if constant == KeywordConstant::This
                    && self.subroutine.kind == SubroutineKind::Function
                {
                    self.report(line, "`this` cannot be used inside a function");
                }

                Term::KeywordConstant(constant)
            }
            (Some(TermForm::ArrayElement), [name, _, index, _]) => {
                let index = self.expression(index);

                self.resolve_variable(name.value().unwrap_or_default(), line)
                    .map_or(Term::Unresolved, |array| {
                        Term::ArrayElement(array, Box::new(index))
                    })
            }
            (Some(TermForm::SubroutineCall), [call]) => Term::Call(self.call(call)),
            (Some(TermForm::Variable), [name]) => self
                .resolve_variable(name.value().unwrap_or_default(), line)
                .map_or(Term::Unresolved, Term::Variable),
            (Some(TermForm::Parenthesized), [_, expression, _]) => {
                Term::Parenthesized(Box::new(self.expression(expression)))
            }
            (Some(TermForm::Unary), [operator, term]) => {
                let term = self.term(term);

                operator
                    .value()
                    .and_then(|operator| UnaryOperator::from_str(operator).ok())
                    .map_or(Term::Unresolved, |operator| {
                        Term::Unary(operator, Box::new(term))
                    })
            }
            _ => Term::Unresolved,
        }
    }

    // endregion

    // region: Calls

    fn call(&mut self, phrase: &Phrase) -> SubroutineCall {
        let line = phrase.line().unwrap_or_default();

        let names = phrase
            .leaf_values(TokenCategory::Identifier)
            .collect::<Vec<_>>();
        let (owner, subroutine_name) = match names.as_slice() {
            [owner, name] => (Some(*owner), *name),
            [name] => (None, *name),
            _ => (None, ""),
        };

        let arguments = phrase
            .branches(PhraseCategory::ExpressionList)
            .flat_map(|list| list.branches(PhraseCategory::Expression))
            .map(|argument| self.expression(argument))
            .collect::<Vec<_>>();

        let (receiver, class_name) = match owner {
            None => (Receiver::This, self.class_name.to_string()),
            Some(owner) => match self.find_variable(owner).cloned() {
                Some(variable) => {
                    self.check_access(&variable, line);

                    let class_name = variable.ty.to_string();
                    if let VariableType::Primitive(primitive) = variable.ty {
                        self.report(
                            line,
                            format!(
                                "cannot call `{subroutine_name}` on `{owner}` of primitive type `{primitive}`"
                            ),
                        );
                    }

                    (Receiver::Object(variable), class_name)
                }
                None => (Receiver::Static, owner.to_string()),
            },
        };

        let call = SubroutineCall {
            receiver,
            class_name,
            subroutine_name: subroutine_name.to_string(),
            arguments,
            line,
        };

        self.check_call(&call);

        call
    }

    fn check_call(&mut self, call: &SubroutineCall) {
        let qualified_name = call.qualified_name();

        let signature = match self.context.lookup(&call.class_name, &call.subroutine_name) {
            Lookup::Known(signature) => signature,
            Lookup::UnknownSubroutine => {
                self.report(
                    call.line,
                    format!("subroutine `{qualified_name}` is not declared"),
                );
                return;
            }
            Lookup::External => return,
        };

        let is_method = signature.kind == SubroutineKind::Method;

        match &call.receiver {
            Receiver::Static if is_method => self.report(
                call.line,
                format!("method `{qualified_name}` must be called on an object"),
            ),
            Receiver::Object(_) | Receiver::This if !is_method => self.report(
                call.line,
                format!(
                    "{} `{qualified_name}` must be called through its class name",
                    signature.kind
                ),
            ),
            Receiver::This if self.subroutine.kind == SubroutineKind::Function => self.report(
                call.line,
                format!(
                    "method `{qualified_name}` cannot be called without an object inside a function"
                ),
            ),
            _ => {}
        }

        if call.arguments.len() != signature.parameters {
            self.report(
                call.line,
                format!(
                    "`{qualified_name}` expects {} argument(s), found {}",
                    signature.parameters,
                    call.arguments.len()
                ),
            );
        }
    }

    // endregion
}
