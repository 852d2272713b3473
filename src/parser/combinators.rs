//! Composable matchers over a backtrackable [`Cursor`].
//!
//! A [`Rule`] is a tree of combinators; references to other productions
//! are resolved lazily through [`Productions`], which is what allows the
//! grammar to be recursive.

use crate::{
    common::phrase::{Phrase, PhraseCategory, TermForm},
    lexer::{Keyword, Token, TokenCategory},
};

use super::{
    cursor::Cursor,
    trace::{Outcome, SyntaxTrace},
};

/// Phrases produced by a successful match.
#[derive(Debug, Clone)]
pub struct Matched {
    pub phrases: Vec<Phrase>,
    /// Set by [`Rule::Tagged`], consumed by the enclosing [`Rule::Named`].
    pub form: Option<TermForm>,
    pub trace: SyntaxTrace,
}

pub type SyntaxResult = Result<Matched, SyntaxTrace>;

/// Lookup of named productions referenced with [`Rule::Production`].
pub trait Productions {
    type Name: Copy + std::fmt::Display;

    fn rule(&self, name: Self::Name) -> &Rule<Self::Name>;
}

#[derive(Debug, Clone)]
pub enum Rule<P> {
    Keyword(Keyword),
    Symbol(char),
    Category(TokenCategory),
    Sequence(Vec<Rule<P>>),
    Any(Vec<Rule<P>>),
    NoughtOne(Box<Rule<P>>),
    NoughtMany(Box<Rule<P>>),
    Named(PhraseCategory, Box<Rule<P>>),
    Tagged(TermForm, Box<Rule<P>>),
    Production(P),
}

// region: constructors

pub const fn keyword<P>(keyword: Keyword) -> Rule<P> {
    Rule::Keyword(keyword)
}

pub const fn symbol<P>(symbol: char) -> Rule<P> {
    Rule::Symbol(symbol)
}

pub const fn identifier<P>() -> Rule<P> {
    Rule::Category(TokenCategory::Identifier)
}

pub const fn integer_constant<P>() -> Rule<P> {
    Rule::Category(TokenCategory::IntegerConstant)
}

pub const fn string_constant<P>() -> Rule<P> {
    Rule::Category(TokenCategory::StringConstant)
}

pub fn sequence<P, I: IntoIterator<Item = Rule<P>>>(rules: I) -> Rule<P> {
    Rule::Sequence(rules.into_iter().collect())
}

pub fn any<P, I: IntoIterator<Item = Rule<P>>>(rules: I) -> Rule<P> {
    Rule::Any(rules.into_iter().collect())
}

pub fn nought_one<P>(rule: Rule<P>) -> Rule<P> {
    Rule::NoughtOne(Box::new(rule))
}

pub fn nought_many<P>(rule: Rule<P>) -> Rule<P> {
    Rule::NoughtMany(Box::new(rule))
}

pub fn named<P>(category: PhraseCategory, rule: Rule<P>) -> Rule<P> {
    Rule::Named(category, Box::new(rule))
}

pub fn tagged<P>(form: TermForm, rule: Rule<P>) -> Rule<P> {
    Rule::Tagged(form, Box::new(rule))
}

pub const fn production<P>(name: P) -> Rule<P> {
    Rule::Production(name)
}

// endregion

impl<P: Copy + std::fmt::Display> Rule<P> {
    /// Try to match the rule at the cursor's position.
    ///
    /// On failure the cursor is left where it was before the attempt.
    pub fn attempt<G>(&self, cursor: &mut Cursor, productions: &G) -> SyntaxResult
    where
        G: Productions<Name = P>,
    {
        match self {
            Self::Keyword(keyword) => {
                terminal(cursor, &format!("`{keyword}`"), |t| t.is_keyword(*keyword))
            }
            Self::Symbol(symbol) => {
                terminal(cursor, &format!("`{symbol}`"), |t| t.is_symbol(*symbol))
            }
            Self::Category(category) => {
                terminal(cursor, &category.to_string(), |t| t.category == *category)
            }
            Self::Sequence(rules) => attempt_sequence(rules, cursor, productions),
            Self::Any(rules) => attempt_any(rules, cursor, productions),
            Self::NoughtOne(rule) => attempt_nought_one(rule, cursor, productions),
            Self::NoughtMany(rule) => attempt_nought_many(rule, cursor, productions),
            Self::Named(category, rule) => attempt_named(*category, rule, cursor, productions),
            Self::Tagged(form, rule) => rule.attempt(cursor, productions).map(|matched| Matched {
                form: Some(*form),
                ..matched
            }),
            Self::Production(name) => {
                let rule = productions.rule(*name);

                // named rules already label their trace
                if matches!(rule, Self::Named(..)) {
                    return rule.attempt(cursor, productions);
                }

                let position = cursor.position();

                match rule.attempt(cursor, productions) {
                    Ok(matched) => Ok(Matched {
                        trace: wrap(name.to_string(), Outcome::Matched, position, matched.trace),
                        ..matched
                    }),
                    Err(trace) => Err(wrap(name.to_string(), Outcome::Failed, position, trace)),
                }
            }
        }
    }
}

fn wrap(label: String, outcome: Outcome, position: usize, trace: SyntaxTrace) -> SyntaxTrace {
    SyntaxTrace::node(label, outcome, position, vec![trace])
}

fn terminal<F>(cursor: &mut Cursor, label: &str, accepts: F) -> SyntaxResult
where
    F: Fn(&Token) -> bool,
{
    let position = cursor.position();

    match cursor.peek() {
        Some(token) if accepts(token) => {
            cursor.advance();

            Ok(Matched {
                phrases: vec![Phrase::leaf(token)],
                form: None,
                trace: SyntaxTrace::terminal(
                    format!("{label} `{token}`"),
                    Outcome::Matched,
                    position,
                    None,
                ),
            })
        }
        found => Err(SyntaxTrace::terminal(label, Outcome::Failed, position, found)),
    }
}

fn attempt_sequence<P, G>(rules: &[Rule<P>], cursor: &mut Cursor, productions: &G) -> SyntaxResult
where
    P: Copy + std::fmt::Display,
    G: Productions<Name = P>,
{
    let position = cursor.position();
    let mut bookmark = cursor.bookmark();
    let mut phrases = Vec::new();
    let mut traces = Vec::with_capacity(rules.len());

    for rule in rules {
        match rule.attempt(&mut bookmark, productions) {
            Ok(matched) => {
                phrases.extend(matched.phrases);
                traces.push(matched.trace);
            }
            Err(trace) => {
                traces.push(trace);
                bookmark.revert();

                return Err(SyntaxTrace::node(
                    "sequence",
                    Outcome::Failed,
                    position,
                    traces,
                ));
            }
        }
    }

    bookmark.commit();

    Ok(Matched {
        phrases,
        form: None,
        trace: SyntaxTrace::node("sequence", Outcome::Matched, position, traces),
    })
}

fn attempt_any<P, G>(rules: &[Rule<P>], cursor: &mut Cursor, productions: &G) -> SyntaxResult
where
    P: Copy + std::fmt::Display,
    G: Productions<Name = P>,
{
    let position = cursor.position();
    let mut failures = Vec::new();

    for rule in rules {
        let mut bookmark = cursor.bookmark();

        match rule.attempt(&mut bookmark, productions) {
            Ok(matched) => {
                bookmark.commit();
                failures.push(matched.trace);

                return Ok(Matched {
                    phrases: matched.phrases,
                    form: matched.form,
                    trace: SyntaxTrace::node("any", Outcome::Matched, position, failures),
                });
            }
            Err(trace) => {
                bookmark.revert();
                failures.push(trace);
            }
        }
    }

    Err(SyntaxTrace::node("any", Outcome::Failed, position, failures))
}

fn attempt_nought_one<P, G>(rule: &Rule<P>, cursor: &mut Cursor, productions: &G) -> SyntaxResult
where
    P: Copy + std::fmt::Display,
    G: Productions<Name = P>,
{
    let position = cursor.position();
    let mut bookmark = cursor.bookmark();

    match rule.attempt(&mut bookmark, productions) {
        Ok(matched) => {
            bookmark.commit();

            Ok(Matched {
                trace: wrap(String::from("nought-one"), Outcome::Matched, position, matched.trace),
                ..matched
            })
        }
        Err(trace) => {
            bookmark.revert();

            Ok(Matched {
                phrases: Vec::new(),
                form: None,
                trace: wrap(String::from("nought-one"), Outcome::Matched, position, trace),
            })
        }
    }
}

fn attempt_nought_many<P, G>(rule: &Rule<P>, cursor: &mut Cursor, productions: &G) -> SyntaxResult
where
    P: Copy + std::fmt::Display,
    G: Productions<Name = P>,
{
    let position = cursor.position();
    let mut phrases = Vec::new();
    let mut traces = Vec::new();

    loop {
        let start = cursor.position();
        let mut bookmark = cursor.bookmark();

        match rule.attempt(&mut bookmark, productions) {
            // a match that consumed nothing would repeat forever
            Ok(matched) if bookmark.position() > start => {
                bookmark.commit();
                phrases.extend(matched.phrases);
                traces.push(matched.trace);
            }
            Ok(matched) => {
                bookmark.commit();
                phrases.extend(matched.phrases);
                traces.push(matched.trace);
                break;
            }
            Err(trace) => {
                bookmark.revert();
                // the terminating failure is kept, it often explains a later error
                traces.push(trace);
                break;
            }
        }
    }

    Ok(Matched {
        phrases,
        form: None,
        trace: SyntaxTrace::node("nought-many", Outcome::Matched, position, traces),
    })
}

fn attempt_named<P, G>(
    category: PhraseCategory,
    rule: &Rule<P>,
    cursor: &mut Cursor,
    productions: &G,
) -> SyntaxResult
where
    P: Copy + std::fmt::Display,
    G: Productions<Name = P>,
{
    let position = cursor.position();

    match rule.attempt(cursor, productions) {
        Ok(matched) => Ok(Matched {
            phrases: vec![Phrase::Branch {
                category,
                form: matched.form,
                children: matched.phrases,
            }],
            form: None,
            trace: wrap(category.to_string(), Outcome::Matched, position, matched.trace),
        }),
        Err(trace) => Err(wrap(category.to_string(), Outcome::Failed, position, trace)),
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::Lexer;

    use super::*;

    /// A grammar without productions, for testing combinators in isolation.
    struct NoProductions;

    impl Productions for NoProductions {
        type Name = &'static str;

        fn rule(&self, name: &'static str) -> &Rule<&'static str> {
            unreachable!("no production named `{name}`")
        }
    }

    fn attempt(rule: &Rule<&'static str>, source: &str) -> (SyntaxResult, usize) {
        let tokens = Lexer::jack().tokenize(&[source]);
        let mut cursor = Cursor::new(&tokens);
        let result = rule.attempt(&mut cursor, &NoProductions);

        assert_eq!(cursor.depth(), 1, "every bookmark should be settled");

        (result, cursor.position())
    }

    #[test]
    fn test_sequence_reverts_on_failure() {
        // OK, OK, FAIL
        let rule = sequence([keyword(Keyword::Let), identifier(), symbol('[')]);

        let (result, position) = attempt(&rule, "let x = 5;");

        assert!(result.is_err());
        assert_eq!(position, 0);
    }

    #[test]
    fn test_sequence_concatenates_phrases() {
        let rule = sequence([keyword(Keyword::Let), identifier(), symbol('=')]);

        let (result, position) = attempt(&rule, "let x = 5;");

        let matched = result.expect("sequence should match");
        assert_eq!(matched.phrases.len(), 3);
        assert_eq!(position, 3);
    }

    #[test]
    fn test_any_picks_first_success_and_never_leaks_position() {
        let rule = any([
            sequence([identifier(), symbol('[')]),
            sequence([identifier(), symbol('.')]),
            identifier(),
        ]);

        let (result, position) = attempt(&rule, "a.b");
        let matched = result.expect("second alternative should match");
        assert_eq!(matched.phrases.len(), 2);
        assert_eq!(position, 2);

        let rule = any([sequence([identifier(), symbol('[')]), symbol('(')]);
        let (result, position) = attempt(&rule, "a.b");
        let trace = result.expect_err("no alternative matches");
        assert_eq!(trace.children.len(), 2);
        assert_eq!(position, 0);
    }

    #[test]
    fn test_nought_one_never_fails() {
        let rule = nought_one(sequence([symbol('['), identifier()]));

        let (result, position) = attempt(&rule, "[ 1 ]");

        assert!(result.is_ok_and(|matched| matched.phrases.is_empty()));
        assert_eq!(position, 0);
    }

    #[test]
    fn test_nought_many_gathers_all_repetitions() {
        let rule = nought_many(sequence([symbol(','), identifier()]));

        let (result, position) = attempt(&rule, ", a, b, c ;");

        assert!(result.is_ok_and(|matched| matched.phrases.len() == 6));
        assert_eq!(position, 6);

        let (result, position) = attempt(&rule, ";");
        assert!(result.is_ok_and(|matched| matched.phrases.is_empty()));
        assert_eq!(position, 0);
    }

    #[test]
    fn test_named_wraps_children_in_a_branch() {
        let rule = named(
            PhraseCategory::Term,
            tagged(TermForm::Variable, identifier()),
        );

        let (result, _) = attempt(&rule, "x");
        let matched = result.expect("term should match");

        assert_eq!(matched.phrases.len(), 1);
        assert!(matched.phrases[0].is_branch(PhraseCategory::Term));
        assert_eq!(matched.phrases[0].form(), Some(TermForm::Variable));
        assert_eq!(matched.phrases[0].children().len(), 1);
        assert_eq!(matched.trace.label, "term");

        let (result, _) = attempt(&rule, "5");
        assert!(result.is_err_and(|trace| trace.label == "term" && !trace.is_matched()));
    }
}
