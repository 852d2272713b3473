use crate::semantics::model::{BinaryOperator, Expression};

use super::{term, vm};

/// Operands are evaluated strictly left to right; Jack has no operator precedence.
pub fn construct(expression: &Expression) -> Vec<vm::VMInstruction> {
    let rest = expression.rest.iter().flat_map(|(operator, operand)| {
        [term::construct(operand), vec![construct_operator(*operator)]].concat()
    });

    term::construct(&expression.first)
        .into_iter()
        .chain(rest)
        .collect()
}

fn construct_operator(operator: BinaryOperator) -> vm::VMInstruction {
    match operator {
        BinaryOperator::Add => vm::command(vm::VMCommand::Add),
        BinaryOperator::Subtract => vm::command(vm::VMCommand::Sub),
        BinaryOperator::Multiply => vm::call("Math.multiply", 2),
        BinaryOperator::Divide => vm::call("Math.divide", 2),
        BinaryOperator::And => vm::command(vm::VMCommand::And),
        BinaryOperator::Or => vm::command(vm::VMCommand::Or),
        BinaryOperator::LessThan => vm::command(vm::VMCommand::Lt),
        BinaryOperator::GreaterThan => vm::command(vm::VMCommand::Gt),
        BinaryOperator::Equal => vm::command(vm::VMCommand::Eq),
    }
}
