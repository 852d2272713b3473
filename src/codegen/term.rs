use crate::semantics::model::{
    Expression, KeywordConstant, Receiver, SubroutineCall, Term, UnaryOperator, Variable,
};

use super::{expression, vm};

/// Instructions leaving the value of the term on top of the stack.
pub fn construct(term: &Term) -> Vec<vm::VMInstruction> {
    match term {
        Term::IntegerConstant(i) => vec![vm::push(vm::Segment::Constant, usize::from(*i))],
        Term::StringConstant(s) => construct_string(s),
        Term::KeywordConstant(constant) => construct_keyword_constant(*constant),
        Term::Variable(variable) => vec![push_variable(variable)],
        Term::ArrayElement(array, index) => [
            construct_element_address(array, index),
            vec![
                vm::pop(vm::Segment::Pointer, 1),
                vm::push(vm::Segment::That, 0),
            ],
        ]
        .concat(),
        Term::Call(call) => construct_call(call),
        Term::Parenthesized(inner) => expression::construct(inner),
        Term::Unary(operator, operand) => {
            let command = match operator {
                UnaryOperator::Negate => vm::VMCommand::Neg,
                UnaryOperator::Not => vm::VMCommand::Not,
            };

            [construct(operand), vec![vm::command(command)]].concat()
        }
        Term::Unresolved => Vec::new(),
    }
}

pub fn push_variable(variable: &Variable) -> vm::VMInstruction {
    vm::push(variable.scope.into(), variable.index)
}

pub fn pop_variable(variable: &Variable) -> vm::VMInstruction {
    vm::pop(variable.scope.into(), variable.index)
}

/// Leave `array + index` on top of the stack.
pub fn construct_element_address(
    array: &Variable,
    index: &Expression,
) -> Vec<vm::VMInstruction> {
    [
        expression::construct(index),
        vec![push_variable(array), vm::command(vm::VMCommand::Add)],
    ]
    .concat()
}

fn construct_string(s: &str) -> Vec<vm::VMInstruction> {
    let string_init = vec![
        vm::push(vm::Segment::Constant, s.chars().count()),
        vm::call("String.new", 1),
    ];

    let string_population = s
        .chars()
        .flat_map(|c| {
            [
                vm::push(vm::Segment::Constant, to_char_code(c)),
                vm::call("String.appendChar", 2),
            ]
        })
        .collect();

    [string_init, string_population].concat()
}

fn construct_keyword_constant(constant: KeywordConstant) -> Vec<vm::VMInstruction> {
    match constant {
        // all bits set
        KeywordConstant::True => vec![
            vm::push(vm::Segment::Constant, 0),
            vm::command(vm::VMCommand::Not),
        ],
        KeywordConstant::False | KeywordConstant::Null => {
            vec![vm::push(vm::Segment::Constant, 0)]
        }
        KeywordConstant::This => vec![vm::push(vm::Segment::Pointer, 0)],
    }
}

/// Push the receiver (if any) and the arguments, then call.
pub fn construct_call(call: &SubroutineCall) -> Vec<vm::VMInstruction> {
    let receiver = match &call.receiver {
        Receiver::This => vec![vm::push(vm::Segment::Pointer, 0)],
        Receiver::Object(object) => vec![push_variable(object)],
        Receiver::Static => Vec::new(),
    };

    let arguments = call
        .arguments
        .iter()
        .flat_map(expression::construct)
        .collect();

    [
        receiver,
        arguments,
        vec![vm::call(call.qualified_name(), call.argument_count())],
    ]
    .concat()
}

fn to_char_code(c: char) -> usize {
    u32::from(c) as usize
}
