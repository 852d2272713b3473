//! Semantic analysis: builds the resolved program model out of
//! the `class` phrases of all successfully parsed compilation units.
//!
//! Runs in three passes over the whole program, so that any class
//! may refer to any other regardless of the order they are given in:
//! 1. registration of class names (making them usable as types),
//! 2. declaration of class variables and subroutine signatures,
//! 3. compilation of subroutine bodies.

mod bodies;
mod context;
mod declarations;
pub mod error;
pub mod model;
mod os;

use crate::common::phrase::Phrase;

pub use error::CompilerError;

#[derive(Debug)]
pub struct Analysis {
    pub classes: Vec<model::Class>,
    pub errors: Vec<CompilerError>,
}

impl Analysis {
    pub fn is_successful(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn analyze(phrases: &[Phrase]) -> Analysis {
    let mut context = context::ProgramContext::new();

    log::info!("registering {} classes", phrases.len());
    let linked = declarations::register(phrases, &mut context);

    log::info!("declaring class members");
    let declared = phrases
        .iter()
        .zip(linked)
        .map(|(phrase, linked)| declarations::declare(phrase, linked, &mut context))
        .collect::<Vec<_>>();

    log::info!("compiling subroutine bodies");
    let classes = declared
        .into_iter()
        .map(|declared| bodies::compile(declared, &mut context))
        .collect();

    Analysis {
        classes,
        errors: context.errors,
    }
}

#[cfg(test)]
mod tests {
    use crate::{lexer::Lexer, parser::Grammar};

    use super::*;

    fn parse_all(units: &[&[&str]]) -> Vec<Phrase> {
        let lexer = Lexer::jack();
        let grammar = Grammar::jack();

        units
            .iter()
            .flat_map(|&lines| {
                grammar
                    .parse_class(&lexer.tokenize(lines))
                    .expect("should parse")
                    .phrases
            })
            .collect()
    }

    #[test]
    fn test_classes_may_reference_later_classes() {
        let phrases = parse_all(&[
            &[
                "class Main {",
                "  function void main() {",
                "    var Game game;",
                "    let game = Game.new();",
                "    do game.run();",
                "    return;",
                "  }",
                "}",
            ],
            &[
                "class Game {",
                "  constructor Game new() { return this; }",
                "  method void run() { return; }",
                "}",
            ],
        ]);

        let analysis = analyze(&phrases);

        assert!(analysis.is_successful(), "{:?}", analysis.errors);
        assert_eq!(analysis.classes.len(), 2);
    }

    #[test]
    fn test_duplicate_class_resolves_to_first() {
        let phrases = parse_all(&[
            &["class A { function void f() { return; } }"],
            &["class A { function void g() { return; } }"],
            &["class B { function void h() { do A.f(); do A.g(); return; } }"],
        ]);

        let analysis = analyze(&phrases);

        let messages = analysis
            .errors
            .iter()
            .map(|error| error.message.as_str())
            .collect::<Vec<_>>();

        assert_eq!(
            messages,
            vec![
                "class `A` is already declared",
                "subroutine `A.g` is not declared"
            ]
        );
        // the duplicate is still analyzed
        assert_eq!(analysis.classes.len(), 3);
    }
}
