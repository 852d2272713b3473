//! Hack VM instructions, their textual form and validation.

use crate::semantics::model::Scope;

/// Largest value `push constant` can produce.
const MAX_CONSTANT: usize = 32767;
const POINTER_SEGMENT_SIZE: usize = 2;
const TEMP_SEGMENT_SIZE: usize = 8;

// region: VMModule

/// Instructions of one class, one block per subroutine.
#[derive(Debug, Default)]
pub struct VMModule {
    blocks: Vec<VMInstructionBlock>,
}

impl VMModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_block(&mut self, block: VMInstructionBlock) {
        self.blocks.push(block);
    }

    /// Check every instruction of the module, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), InvalidInstruction> {
        self.blocks
            .iter()
            .flat_map(|block| &block.instructions)
            .try_for_each(VMInstruction::validate)
    }

    pub fn compile(self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for VMModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.blocks
                .iter()
                .map(VMInstructionBlock::compile)
                .collect::<Vec<_>>()
                .join("\n")
        )
    }
}

// endregion

// region: VMInstructionBlock

#[derive(Debug)]
pub struct VMInstructionBlock {
    instructions: Vec<VMInstruction>,
}

impl VMInstructionBlock {
    pub fn compile(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for VMInstructionBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.instructions
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")
        )
    }
}

impl From<Vec<VMInstruction>> for VMInstructionBlock {
    fn from(instructions: Vec<VMInstruction>) -> Self {
        Self { instructions }
    }
}

// endregion

// region: VMInstruction

// region: VMInstruction utility functions

/// Utility function for the `push` VM instruction.
pub const fn push(segment: Segment, i: usize) -> VMInstruction {
    VMInstruction::Push(segment, i)
}

/// Utility function for the `pop` VM instruction.
pub const fn pop(segment: Segment, i: usize) -> VMInstruction {
    VMInstruction::Pop(segment, i)
}

/// Utility function for arithmetic and logical VM instructions.
pub const fn command(command: VMCommand) -> VMInstruction {
    VMInstruction::Command(command)
}

/// Utility function for the `return` VM instruction.
pub const fn vm_return() -> VMInstruction {
    VMInstruction::Return
}

/// Utility function for the `label` VM instruction.
pub fn label<S: Into<String>>(label: S) -> VMInstruction {
    VMInstruction::Label(LabelAction::Label, label.into())
}

/// Utility function for the `goto` VM instruction.
pub fn goto<S: Into<String>>(label: S) -> VMInstruction {
    VMInstruction::Label(LabelAction::Goto, label.into())
}

/// Utility function for the `if-goto` VM instruction.
pub fn if_goto<S: Into<String>>(label: S) -> VMInstruction {
    VMInstruction::Label(LabelAction::IfGoto, label.into())
}

/// Utility function for the `function` VM instruction.
pub fn function<S: Into<String>>(function_name: S, local_count: usize) -> VMInstruction {
    VMInstruction::Function(function_name.into(), local_count)
}

/// Utility function for the `call` VM instruction.
pub fn call<S: Into<String>>(function_name: S, argument_count: usize) -> VMInstruction {
    VMInstruction::Call(function_name.into(), argument_count)
}

// endregion

type Index = usize;
type Label = String;
type Count = usize;
type FunctionName = String;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum VMInstruction {
    Push(Segment, Index),
    Pop(Segment, Index),
    Command(VMCommand),
    Label(LabelAction, Label),
    Function(FunctionName, Count),
    Call(FunctionName, Count),
    Return,
}

impl VMInstruction {
    fn as_instruction(&self) -> String {
        match self {
            Self::Push(segment, i) => format!("push {segment} {i}"),
            Self::Pop(segment, i) => format!("pop {segment} {i}"),
            Self::Command(command) => command.to_string(),
            Self::Label(label_action, label) => format!("{label_action} {label}"),
            Self::Function(function_name, local_count) => {
                format!("function {function_name} {local_count}")
            }
            Self::Call(function_name, argument_count) => {
                format!("call {function_name} {argument_count}")
            }
            Self::Return => String::from("return"),
        }
    }

    pub fn validate(&self) -> Result<(), InvalidInstruction> {
        let invalid = |reason| {
            Err(InvalidInstruction {
                instruction: self.as_instruction(),
                reason,
            })
        };

        match self {
            Self::Pop(Segment::Constant, _) => invalid(InvalidReason::PopConstant),
            Self::Push(segment, i) | Self::Pop(segment, i) if !segment.accepts(*i) => {
                invalid(InvalidReason::IndexOutOfRange)
            }
            Self::Function(name, _) | Self::Call(name, _) if !is_qualified_name(name) => {
                invalid(InvalidReason::UnqualifiedName)
            }
            Self::Label(_, label) if label.is_empty() => invalid(InvalidReason::EmptyLabel),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for VMInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_instruction())
    }
}

/// `Class.subroutine`, both parts being identifiers.
fn is_qualified_name(name: &str) -> bool {
    let is_identifier = |part: &str| {
        part.chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    };

    name.split_once('.')
        .is_some_and(|(class, subroutine)| is_identifier(class) && is_identifier(subroutine))
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum VMCommand {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum LabelAction {
    Label,
    Goto,
    IfGoto,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Segment {
    Local,
    Argument,
    Static,
    Constant,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    const fn accepts(self, i: usize) -> bool {
        match self {
            Self::Constant => i <= MAX_CONSTANT,
            Self::Pointer => i < POINTER_SEGMENT_SIZE,
            Self::Temp => i < TEMP_SEGMENT_SIZE,
            _ => true,
        }
    }
}

impl From<Scope> for Segment {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Static => Self::Static,
            Scope::Field => Self::This,
            Scope::Parameter => Self::Argument,
            Scope::Local => Self::Local,
        }
    }
}

// endregion

// region: InvalidInstruction

#[derive(Debug, PartialEq, Eq, Clone, Copy, strum::Display)]
pub enum InvalidReason {
    #[strum(serialize = "index out of range")]
    IndexOutOfRange,
    #[strum(serialize = "cannot pop into the constant segment")]
    PopConstant,
    #[strum(serialize = "name must have the form `Class.subroutine`")]
    UnqualifiedName,
    #[strum(serialize = "empty label")]
    EmptyLabel,
}

#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
#[error("invalid instruction `{instruction}`: {reason}")]
pub struct InvalidInstruction {
    pub instruction: String,
    pub reason: InvalidReason,
}

// endregion

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_text() {
        let block = VMInstructionBlock::from(vec![
            function("Main.main", 2),
            push(Segment::Constant, 7),
            pop(Segment::from(Scope::Field), 1),
            command(VMCommand::Not),
            if_goto("WHILE_END0"),
            call("Math.multiply", 2),
            vm_return(),
        ]);

        let expected = [
            "function Main.main 2",
            "push constant 7",
            "pop this 1",
            "not",
            "if-goto WHILE_END0",
            "call Math.multiply 2",
            "return",
        ]
        .join("\n");

        assert_eq!(block.compile(), expected);
    }

    #[test]
    fn test_validation() {
        assert!(push(Segment::Constant, 32767).validate().is_ok());
        assert!(push(Segment::Pointer, 1).validate().is_ok());
        assert!(pop(Segment::Temp, 7).validate().is_ok());
        assert!(call("Output.printInt", 1).validate().is_ok());

        assert_eq!(
            push(Segment::Constant, 32768).validate().map_err(|error| error.reason),
            Err(InvalidReason::IndexOutOfRange)
        );
        assert_eq!(
            pop(Segment::Pointer, 2).validate().map_err(|error| error.reason),
            Err(InvalidReason::IndexOutOfRange)
        );
        assert_eq!(
            pop(Segment::Temp, 8).validate().map_err(|error| error.reason),
            Err(InvalidReason::IndexOutOfRange)
        );
        assert_eq!(
            pop(Segment::Constant, 0).validate().map_err(|error| error.reason),
            Err(InvalidReason::PopConstant)
        );
        assert!(function("main", 0).validate().is_err());
        assert!(call("Main.", 0).validate().is_err());
        assert!(call("Main.main.now", 0).validate().is_err());
        assert!(goto("").validate().is_err());
    }

    #[test]
    fn test_module_validation_reports_first_error() {
        let mut module = VMModule::new();
        module.add_block(VMInstructionBlock::from(vec![
            function("A.f", 0),
            pop(Segment::Temp, 9),
            pop(Segment::Constant, 0),
        ]));

        let error = module.validate().expect_err("should be invalid");

        assert_eq!(error.instruction, "pop temp 9");
        assert_eq!(
            error.to_string(),
            "invalid instruction `pop temp 9`: index out of range"
        );
    }
}
