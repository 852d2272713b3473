use crate::semantics::model::{Class, SubRoutine, SubroutineKind};

/// Generator state for one subroutine. Created afresh for every subroutine,
/// so label numbering restarts at zero each time.
#[derive(Debug)]
pub struct SubroutineContext<'c> {
    pub class_name: &'c str,
    pub field_count: usize,
    pub kind: SubroutineKind,
    next_label: usize,
}

impl<'c> SubroutineContext<'c> {
    pub fn new(class: &'c Class, subroutine: &SubRoutine) -> Self {
        Self {
            class_name: &class.name,
            field_count: class.field_count(),
            kind: subroutine.kind,
            next_label: 0,
        }
    }

    /// Reserve a number for the labels of one `if` or `while` statement.
    pub fn create_label_index(&mut self) -> usize {
        let index = self.next_label;
        self.next_label += 1;
        index
    }
}
