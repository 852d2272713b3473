//! Logic for converting resolved classes
//! to Hack VM instructions.

use context::SubroutineContext;

use crate::semantics::model::{Class, SubRoutine, SubroutineKind};

mod context;
mod description;
mod expression;
mod statement;
mod term;
pub mod vm;

pub use description::describe_class;

/// Generate the instructions of a whole class, one block per subroutine.
pub fn construct_class(class: &Class) -> Result<String, vm::InvalidInstruction> {
    let mut module = vm::VMModule::new();

    for subroutine in &class.subroutines {
        module.add_block(construct_subroutine(class, subroutine).into());
    }

    module.validate()?;

    log::debug!(
        "generated {} subroutines of class `{}`",
        class.subroutines.len(),
        class.name
    );

    Ok(module.compile())
}

fn construct_subroutine(class: &Class, subroutine: &SubRoutine) -> Vec<vm::VMInstruction> {
    let mut context = SubroutineContext::new(class, subroutine);

    let declaration = vm::function(
        format!("{}.{}", context.class_name, subroutine.name),
        subroutine.locals.len(),
    );

    [
        vec![declaration],
        construct_prologue(&context),
        statement::construct_all(&subroutine.statements, &mut context),
    ]
    .concat()
}

/// Bind the object pointer before user code runs.
fn construct_prologue(context: &SubroutineContext) -> Vec<vm::VMInstruction> {
    match context.kind {
        SubroutineKind::Constructor => vec![
            vm::push(vm::Segment::Constant, context.field_count),
            vm::call("Memory.alloc", 1),
            vm::pop(vm::Segment::Pointer, 0),
        ],
        SubroutineKind::Method => vec![
            vm::push(vm::Segment::Argument, 0),
            vm::pop(vm::Segment::Pointer, 0),
        ],
        SubroutineKind::Function => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        lexer::Lexer,
        parser::Grammar,
        semantics::{analyze, Analysis},
    };

    use super::*;

    fn analyze_source(lines: &[&str]) -> Analysis {
        let tokens = Lexer::jack().tokenize(lines);
        let phrases = Grammar::jack()
            .parse_class(&tokens)
            .expect("should parse")
            .phrases;

        analyze(&phrases)
    }

    fn compile_source(lines: &[&str]) -> String {
        let analysis = analyze_source(lines);
        assert!(analysis.is_successful(), "{:?}", analysis.errors);

        construct_class(&analysis.classes[0]).expect("instructions should be valid")
    }

    #[test]
    fn test_method_returning_constant() {
        let source = [
            "class Answer {",
            "  method int get() {",
            "    return 42;",
            "  }",
            "}",
        ];

        let expected = [
            "function Answer.get 0",
            "push argument 0",
            "pop pointer 0",
            "push constant 42",
            "return",
        ]
        .join("\n");

        assert_eq!(compile_source(&source), expected);
    }

    #[test]
    fn test_constructor_allocates_fields() {
        let source = [
            "class Point {",
            "  field int x, y;",
            "  constructor Point new(int ax) {",
            "    var int tmp;",
            "    let x = ax;",
            "    return this;",
            "  }",
            "  function void noop() {",
            "    return;",
            "  }",
            "}",
        ];

        let expected = [
            "function Point.new 1",
            "push constant 2",
            "call Memory.alloc 1",
            "pop pointer 0",
            "push argument 0",
            "pop this 0",
            "push pointer 0",
            "return",
            "function Point.noop 0",
            "push constant 0",
            "return",
        ]
        .join("\n");

        assert_eq!(compile_source(&source), expected);
    }

    #[test]
    fn test_labels_restart_per_subroutine() {
        let source = [
            "class Loop {",
            "  function void a() {",
            "    while (true) { }",
            "    return;",
            "  }",
            "  function void b() {",
            "    while (false) { }",
            "    return;",
            "  }",
            "}",
        ];

        let compiled = compile_source(&source);

        assert_eq!(compiled.matches("label WHILE_START0").count(), 2);
        assert!(!compiled.contains("WHILE_START1"));
    }
}
