use crate::semantics::model::{Expression, Statement, SubroutineKind, Variable};

use super::{context::SubroutineContext, expression, term, vm};

pub fn construct(statement: &Statement, context: &mut SubroutineContext) -> Vec<vm::VMInstruction> {
    match statement {
        Statement::Let {
            target,
            index: None,
            value,
        } => [expression::construct(value), vec![term::pop_variable(target)]].concat(),
        Statement::Let {
            target,
            index: Some(index),
            value,
        } => construct_element_assignment(target, index, value),
        Statement::If {
            condition,
            then,
            otherwise,
        } => construct_if(condition, then, otherwise.as_deref(), context),
        Statement::While { condition, body } => construct_while(condition, body, context),
        Statement::Do(call) => [
            term::construct_call(call),
            // discard the returned value
            vec![vm::pop(vm::Segment::Temp, 0)],
        ]
        .concat(),
        Statement::Return(value) => construct_return(value.as_ref(), context),
        Statement::Unresolved => Vec::new(),
    }
}

pub fn construct_all(
    statements: &[Statement],
    context: &mut SubroutineContext,
) -> Vec<vm::VMInstruction> {
    statements
        .iter()
        .flat_map(|statement| construct(statement, context))
        .collect()
}

/// The target address is computed before the value, since evaluating the value
/// may itself go through `pointer 1`; the address waits on the stack meanwhile.
fn construct_element_assignment(
    array: &Variable,
    index: &Expression,
    value: &Expression,
) -> Vec<vm::VMInstruction> {
    [
        term::construct_element_address(array, index),
        expression::construct(value),
        vec![
            vm::pop(vm::Segment::Temp, 0),
            vm::pop(vm::Segment::Pointer, 1),
            vm::push(vm::Segment::Temp, 0),
            vm::pop(vm::Segment::That, 0),
        ],
    ]
    .concat()
}

fn construct_if(
    condition: &Expression,
    then: &[Statement],
    otherwise: Option<&[Statement]>,
    context: &mut SubroutineContext,
) -> Vec<vm::VMInstruction> {
    let label_index = context.create_label_index();
    let false_label = format!("IF_FALSE{label_index}");

    let jump = [
        expression::construct(condition),
        vec![
            vm::command(vm::VMCommand::Not),
            vm::if_goto(false_label.clone()),
        ],
    ]
    .concat();
    let then = construct_all(then, context);

    match otherwise {
        None => [jump, then, vec![vm::label(false_label)]].concat(),
        Some(otherwise) => {
            let end_label = format!("IF_END{label_index}");
            let otherwise = construct_all(otherwise, context);

            [
                jump,
                then,
                vec![vm::goto(end_label.clone()), vm::label(false_label)],
                otherwise,
                vec![vm::label(end_label)],
            ]
            .concat()
        }
    }
}

fn construct_while(
    condition: &Expression,
    body: &[Statement],
    context: &mut SubroutineContext,
) -> Vec<vm::VMInstruction> {
    let label_index = context.create_label_index();
    let start_label = format!("WHILE_START{label_index}");
    let end_label = format!("WHILE_END{label_index}");

    [
        vec![vm::label(start_label.clone())],
        expression::construct(condition),
        vec![
            vm::command(vm::VMCommand::Not),
            vm::if_goto(end_label.clone()),
        ],
        construct_all(body, context),
        vec![vm::goto(start_label), vm::label(end_label)],
    ]
    .concat()
}

fn construct_return(
    value: Option<&Expression>,
    context: &SubroutineContext,
) -> Vec<vm::VMInstruction> {
    let value = match value {
        Some(value) => expression::construct(value),
        // constructors always hand back the new object
        None if context.kind == SubroutineKind::Constructor => {
            vec![vm::push(vm::Segment::Pointer, 0)]
        }
        None => vec![vm::push(vm::Segment::Constant, 0)],
    };

    [value, vec![vm::vm_return()]].concat()
}
