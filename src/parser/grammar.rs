//! The fixed Jack grammar, expressed with the combinators.

use std::collections::HashMap;

use strum::VariantArray;

use crate::{
    common::phrase::{PhraseCategory, TermForm},
    lexer::{Keyword, Token},
};

#[allow(clippy::wildcard_imports)]
use super::combinators::*;
use super::{
    cursor::Cursor,
    trace::{Outcome, SyntaxTrace},
};

/// Named productions of the grammar. Most of them produce a branch phrase
/// of the same name; `statement`, the operators and `keywordConstant`
/// only select between alternatives and splice their result into the parent.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, strum::Display, strum::VariantArray)]
#[strum(serialize_all = "camelCase")]
pub enum Production {
    Class,
    ClassVarDec,
    SubroutineDec,
    ParameterList,
    Parameter,
    SubroutineBody,
    VarDec,
    Statements,
    Statement,
    LetStatement,
    IfStatement,
    WhileStatement,
    DoStatement,
    ReturnStatement,
    Expression,
    Term,
    ExpressionList,
    SubroutineCall,
    Type,
    BinaryOp,
    UnaryOp,
    KeywordConstant,
}

pub struct Grammar {
    rules: HashMap<Production, Rule<Production>>,
}

impl Productions for Grammar {
    type Name = Production;

    fn rule(&self, name: Production) -> &Rule<Production> {
        &self.rules[&name]
    }
}

impl Grammar {
    pub fn jack() -> Self {
        Self {
            rules: Production::VARIANTS
                .iter()
                .map(|production| (*production, definition(*production)))
                .collect(),
        }
    }

    /// Parse one compilation unit, which must consist of exactly one class.
    pub fn parse_class(&self, tokens: &[Token]) -> SyntaxResult {
        let mut cursor = Cursor::new(tokens);
        let matched = production(Production::Class).attempt(&mut cursor, self)?;

        if cursor.is_exhausted() {
            return Ok(matched);
        }

        let leftover = SyntaxTrace::terminal(
            "end of input",
            Outcome::Failed,
            cursor.position(),
            cursor.peek(),
        );

        Err(SyntaxTrace::node(
            "compilation unit",
            Outcome::Failed,
            0,
            vec![matched.trace, leftover],
        ))
    }
}

/// Comma separated continuation of a list: `(',' rule)*`.
fn more(rule: Rule<Production>) -> Rule<Production> {
    nought_many(sequence([symbol(','), rule]))
}

fn symbols(characters: &str) -> Rule<Production> {
    any(characters.chars().map(symbol))
}

fn keywords<I: IntoIterator<Item = Keyword>>(alternatives: I) -> Rule<Production> {
    any(alternatives.into_iter().map(keyword))
}

#[allow(clippy::too_many_lines)]
fn definition(name: Production) -> Rule<Production> {
    use Production as P;

    match name {
        P::Class => named(
            PhraseCategory::Class,
            sequence([
                keyword(Keyword::Class),
                identifier(),
                symbol('{'),
                nought_many(production(P::ClassVarDec)),
                nought_many(production(P::SubroutineDec)),
                symbol('}'),
            ]),
        ),
        P::ClassVarDec => named(
            PhraseCategory::ClassVarDec,
            sequence([
                keywords([Keyword::Static, Keyword::Field]),
                production(P::Type),
                identifier(),
                more(identifier()),
                symbol(';'),
            ]),
        ),
        P::SubroutineDec => named(
            PhraseCategory::SubroutineDec,
            sequence([
                keywords([Keyword::Constructor, Keyword::Function, Keyword::Method]),
                any([keyword(Keyword::Void), production(P::Type)]),
                identifier(),
                symbol('('),
                production(P::ParameterList),
                symbol(')'),
                production(P::SubroutineBody),
            ]),
        ),
        P::ParameterList => named(
            PhraseCategory::ParameterList,
            nought_one(sequence([
                production(P::Parameter),
                more(production(P::Parameter)),
            ])),
        ),
        P::Parameter => named(
            PhraseCategory::Parameter,
            sequence([production(P::Type), identifier()]),
        ),
        P::SubroutineBody => named(
            PhraseCategory::SubroutineBody,
            sequence([
                symbol('{'),
                nought_many(production(P::VarDec)),
                production(P::Statements),
                symbol('}'),
            ]),
        ),
        P::VarDec => named(
            PhraseCategory::VarDec,
            sequence([
                keyword(Keyword::Var),
                production(P::Type),
                identifier(),
                more(identifier()),
                symbol(';'),
            ]),
        ),
        P::Statements => named(
            PhraseCategory::Statements,
            nought_many(production(P::Statement)),
        ),
        P::Statement => any([
            production(P::LetStatement),
            production(P::IfStatement),
            production(P::WhileStatement),
            production(P::DoStatement),
            production(P::ReturnStatement),
        ]),
        P::LetStatement => named(
            PhraseCategory::LetStatement,
            sequence([
                keyword(Keyword::Let),
                identifier(),
                nought_one(sequence([
                    symbol('['),
                    production(P::Expression),
                    symbol(']'),
                ])),
                symbol('='),
                production(P::Expression),
                symbol(';'),
            ]),
        ),
        P::IfStatement => named(
            PhraseCategory::IfStatement,
            sequence([
                keyword(Keyword::If),
                symbol('('),
                production(P::Expression),
                symbol(')'),
                symbol('{'),
                production(P::Statements),
                symbol('}'),
                nought_one(sequence([
                    keyword(Keyword::Else),
                    symbol('{'),
                    production(P::Statements),
                    symbol('}'),
                ])),
            ]),
        ),
        P::WhileStatement => named(
            PhraseCategory::WhileStatement,
            sequence([
                keyword(Keyword::While),
                symbol('('),
                production(P::Expression),
                symbol(')'),
                symbol('{'),
                production(P::Statements),
                symbol('}'),
            ]),
        ),
        P::DoStatement => named(
            PhraseCategory::DoStatement,
            sequence([
                keyword(Keyword::Do),
                production(P::SubroutineCall),
                symbol(';'),
            ]),
        ),
        P::ReturnStatement => named(
            PhraseCategory::ReturnStatement,
            sequence([
                keyword(Keyword::Return),
                nought_one(production(P::Expression)),
                symbol(';'),
            ]),
        ),
        P::Expression => named(
            PhraseCategory::Expression,
            sequence([
                production(P::Term),
                nought_many(sequence([production(P::BinaryOp), production(P::Term)])),
            ]),
        ),
        // order matters: `a[i]` and `a.f()` both start like the plain variable `a`
        P::Term => named(
            PhraseCategory::Term,
            any([
                tagged(TermForm::IntegerConstant, integer_constant()),
                tagged(TermForm::StringConstant, string_constant()),
                tagged(TermForm::KeywordConstant, production(P::KeywordConstant)),
                tagged(
                    TermForm::ArrayElement,
                    sequence([
                        identifier(),
                        symbol('['),
                        production(P::Expression),
                        symbol(']'),
                    ]),
                ),
                tagged(TermForm::SubroutineCall, production(P::SubroutineCall)),
                tagged(TermForm::Variable, identifier()),
                tagged(
                    TermForm::Parenthesized,
                    sequence([symbol('('), production(P::Expression), symbol(')')]),
                ),
                tagged(
                    TermForm::Unary,
                    sequence([production(P::UnaryOp), production(P::Term)]),
                ),
            ]),
        ),
        P::ExpressionList => named(
            PhraseCategory::ExpressionList,
            nought_one(sequence([
                production(P::Expression),
                more(production(P::Expression)),
            ])),
        ),
        P::SubroutineCall => named(
            PhraseCategory::SubroutineCall,
            sequence([
                nought_one(sequence([identifier(), symbol('.')])),
                identifier(),
                symbol('('),
                production(P::ExpressionList),
                symbol(')'),
            ]),
        ),
        P::Type => named(
            PhraseCategory::Type,
            any([
                keyword(Keyword::Int),
                keyword(Keyword::Char),
                keyword(Keyword::Boolean),
                identifier(),
            ]),
        ),
        P::BinaryOp => symbols("+-*/&|<>="),
        P::UnaryOp => symbols("-~"),
        P::KeywordConstant => keywords([
            Keyword::True,
            Keyword::False,
            Keyword::Null,
            Keyword::This,
        ]),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        common::phrase::Phrase,
        lexer::{Lexer, TokenCategory},
    };

    use super::*;

    fn parse(lines: &[&str]) -> SyntaxResult {
        let tokens = Lexer::jack().tokenize(lines);
        Grammar::jack().parse_class(&tokens)
    }

    /// Depth-first search for all branches of a category.
    fn find<'p>(phrase: &'p Phrase, category: PhraseCategory, found: &mut Vec<&'p Phrase>) {
        if phrase.is_branch(category) {
            found.push(phrase);
        }
        for child in phrase.children() {
            find(child, category, found);
        }
    }

    fn terms(phrase: &Phrase) -> Vec<Option<TermForm>> {
        let mut found = Vec::new();
        find(phrase, PhraseCategory::Term, &mut found);
        found.into_iter().map(Phrase::form).collect()
    }

    #[test]
    fn test_empty_class() {
        let matched = parse(&["class Main {}"]).expect("should parse");

        assert_eq!(matched.phrases.len(), 1);
        assert_eq!(
            matched.phrases[0].to_tagged_tree(),
            [
                "<class>",
                "  <keyword> class </keyword>",
                "  <identifier> Main </identifier>",
                "  <symbol> { </symbol>",
                "  <symbol> } </symbol>",
                "</class>",
                "",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_full_class() {
        let lines = [
            "class Point {",
            "  field int x, y;",
            "  static Point origin;",
            "  constructor Point new(int ax, int ay) {",
            "    let x = ax; let y = ay;",
            "    return this;",
            "  }",
            "  method void move(int dx) {",
            "    var int i;",
            "    while (i < dx) { let x = x + 1; let i = i + 1; }",
            "    if (~(x = 0)) { do Output.printInt(x); } else { return; }",
            "    return;",
            "  }",
            "}",
        ];

        let matched = parse(&lines).expect("should parse");
        let class = &matched.phrases[0];

        assert_eq!(class.branches(PhraseCategory::ClassVarDec).count(), 2);
        assert_eq!(class.branches(PhraseCategory::SubroutineDec).count(), 2);

        let mut parameters = Vec::new();
        find(class, PhraseCategory::Parameter, &mut parameters);
        assert_eq!(parameters.len(), 3);

        let mut statements = Vec::new();
        find(class, PhraseCategory::WhileStatement, &mut statements);
        find(class, PhraseCategory::IfStatement, &mut statements);
        find(class, PhraseCategory::DoStatement, &mut statements);
        assert_eq!(statements.len(), 3);
    }

    #[test]
    fn test_term_forms_are_tagged() {
        let matched = parse(&[
            "class A { function int f() {",
            "  return a[1] + g.h(2, \"s\") + b + (-c) + true + k();",
            "} }",
        ])
        .expect("should parse");

        assert_eq!(
            terms(&matched.phrases[0]),
            vec![
                Some(TermForm::ArrayElement),
                Some(TermForm::IntegerConstant),
                Some(TermForm::SubroutineCall),
                Some(TermForm::IntegerConstant),
                Some(TermForm::StringConstant),
                Some(TermForm::Variable),
                Some(TermForm::Parenthesized),
                Some(TermForm::Unary),
                Some(TermForm::Variable),
                Some(TermForm::KeywordConstant),
                Some(TermForm::SubroutineCall),
            ]
        );
    }

    #[test]
    fn test_void_is_not_a_type_phrase() {
        let matched = parse(&["class A { function void f() { return; } }"]).expect("should parse");
        let subroutine = matched.phrases[0]
            .branches(PhraseCategory::SubroutineDec)
            .next()
            .expect("should have a subroutine");

        assert_eq!(subroutine.children()[1].value_of(TokenCategory::Keyword), Some("void"));
        assert_eq!(subroutine.branches(PhraseCategory::Type).count(), 0);
    }

    #[test]
    fn test_syntax_failure_reports_deepest_expectation() {
        let trace = parse(&["class A {", "  function void f() {", "    let x = ;", "  }", "}"])
            .expect_err("should fail");

        let summary = trace.deepest_failure().expect("should locate the failure");

        assert_eq!(summary.found.as_ref().map(|token| token.line), Some(3));
        assert!(summary.found.is_some_and(|token| token.value == ";"));
        assert!(summary.expected.contains(&String::from("integerConstant")));
        assert!(summary.expected.contains(&String::from("`(`")));
        assert!(!trace.is_matched());
    }

    #[test]
    fn test_trailing_tokens_fail() {
        let trace = parse(&["class A {} class B {}"]).expect_err("should fail");

        let summary = trace.deepest_failure().expect("should locate the failure");

        assert_eq!(summary.position, 4);
        assert_eq!(summary.expected, vec!["end of input"]);
    }

    #[test]
    fn test_every_production_is_defined() {
        let grammar = Grammar::jack();

        assert_eq!(grammar.rules.len(), Production::VARIANTS.len());
    }
}
