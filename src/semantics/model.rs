//! Resolved program model, produced by semantic analysis
//! and consumed by code generation.

use std::fmt;

// region: Variables & types

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Scope {
    Static,
    Field,
    Parameter,
    Local,
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Primitive {
    Int,
    Char,
    Boolean,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum VariableType {
    Primitive(Primitive),
    Class(String),
    /// A type name that is not declared anywhere (already reported).
    Unresolved(String),
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(primitive) => write!(f, "{primitive}"),
            Self::Class(name) | Self::Unresolved(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Variable {
    pub name: String,
    pub scope: Scope,
    /// Zero-based slot within the scope's segment.
    pub index: usize,
    pub ty: VariableType,
    pub line: usize,
}

// endregion

// region: Classes & subroutines

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SubroutineKind {
    Function,
    Constructor,
    Method,
}

/// What a call site needs to know about a subroutine.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Signature {
    pub kind: SubroutineKind,
    /// Declared parameters, not counting the receiver of a method.
    pub parameters: usize,
}

#[derive(Debug, Clone)]
pub struct Class {
    pub name: String,
    pub line: usize,
    /// Static and field variables, in declaration order.
    pub variables: Vec<Variable>,
    pub subroutines: Vec<SubRoutine>,
}

impl Class {
    /// Number of words an instance occupies.
    pub fn field_count(&self) -> usize {
        self.variables
            .iter()
            .filter(|variable| variable.scope == Scope::Field)
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct SubRoutine {
    pub name: String,
    pub kind: SubroutineKind,
    /// `None` for `void`.
    pub return_type: Option<VariableType>,
    pub parameters: Vec<Variable>,
    pub locals: Vec<Variable>,
    pub statements: Vec<Statement>,
    pub line: usize,
}

impl SubRoutine {
    pub fn signature(&self) -> Signature {
        Signature {
            kind: self.kind,
            parameters: self.parameters.len(),
        }
    }
}

// endregion

// region: Statements

#[derive(Debug, Clone)]
pub enum Statement {
    Let {
        target: Variable,
        index: Option<Expression>,
        value: Expression,
    },
    If {
        condition: Expression,
        then: Vec<Statement>,
        otherwise: Option<Vec<Statement>>,
    },
    While {
        condition: Expression,
        body: Vec<Statement>,
    },
    Do(SubroutineCall),
    Return(Option<Expression>),
    /// Placeholder for a statement whose target could not be resolved.
    Unresolved,
}

// endregion

// region: Expressions

#[derive(Debug, Clone)]
pub struct Expression {
    pub first: Term,
    pub rest: Vec<(BinaryOperator, Term)>,
}

impl Expression {
    pub const fn single(term: Term) -> Self {
        Self {
            first: term,
            rest: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Term {
    IntegerConstant(u16),
    StringConstant(String),
    KeywordConstant(KeywordConstant),
    Variable(Variable),
    ArrayElement(Variable, Box<Expression>),
    Call(SubroutineCall),
    Parenthesized(Box<Expression>),
    Unary(UnaryOperator, Box<Term>),
    /// Placeholder for a term that could not be resolved; generates nothing.
    Unresolved,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, strum::Display, strum::EnumString)]
pub enum BinaryOperator {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    #[strum(serialize = "&")]
    And,
    #[strum(serialize = "|")]
    Or,
    #[strum(serialize = "<")]
    LessThan,
    #[strum(serialize = ">")]
    GreaterThan,
    #[strum(serialize = "=")]
    Equal,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, strum::Display, strum::EnumString)]
pub enum UnaryOperator {
    #[strum(serialize = "-")]
    Negate,
    #[strum(serialize = "~")]
    Not,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum KeywordConstant {
    True,
    False,
    Null,
    This,
}

/// Object a subroutine is invoked on.
#[derive(Debug, Clone)]
pub enum Receiver {
    /// Implicit `this`: `draw()`.
    This,
    /// A variable holding an object: `ball.draw()`.
    Object(Variable),
    /// No object, called through the class name: `Math.abs(x)`.
    Static,
}

#[derive(Debug, Clone)]
pub struct SubroutineCall {
    pub receiver: Receiver,
    pub class_name: String,
    pub subroutine_name: String,
    pub arguments: Vec<Expression>,
    pub line: usize,
}

impl SubroutineCall {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.class_name, self.subroutine_name)
    }

    /// Arguments passed on the stack, including a pushed receiver.
    pub fn argument_count(&self) -> usize {
        match self.receiver {
            Receiver::This | Receiver::Object(_) => self.arguments.len() + 1,
            Receiver::Static => self.arguments.len(),
        }
    }
}

// endregion

#[cfg(test)]
mod tests {
    use std::str::FromStr;

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
    fn test_field_count_ignores_statics() {
        let class = Class {
            name: String::from("Ball"),
            line: 1,
            variables: vec![
                variable("x", Scope::Field, 0),
                variable("count", Scope::Static, 0),
                variable("y", Scope::Field, 1),
            ],
            subroutines: Vec::new(),
        };

        assert_eq!(class.field_count(), 2);
    }

    #[test]
    fn test_argument_count_includes_receiver() {
        let call = |receiver| SubroutineCall {
            receiver,
            class_name: String::from("Ball"),
            subroutine_name: String::from("move"),
            arguments: vec![Expression::single(Term::IntegerConstant(1))],
            line: 1,
        };

        assert_eq!(call(Receiver::This).argument_count(), 2);
        assert_eq!(
            call(Receiver::Object(variable("b", Scope::Local, 0))).argument_count(),
            2
        );
        assert_eq!(call(Receiver::Static).argument_count(), 1);
        assert_eq!(call(Receiver::Static).qualified_name(), "Ball.move");
    }

    #[test]
    fn test_operators_from_symbols() {
        assert_eq!(BinaryOperator::from_str("*"), Ok(BinaryOperator::Multiply));
        assert_eq!(BinaryOperator::from_str("="), Ok(BinaryOperator::Equal));
        assert_eq!(UnaryOperator::from_str("~"), Ok(UnaryOperator::Not));
        assert!(BinaryOperator::from_str("~").is_err());
        assert_eq!(KeywordConstant::from_str("null"), Ok(KeywordConstant::Null));
        assert_eq!(Scope::Parameter.to_string(), "parameter");
    }
}
