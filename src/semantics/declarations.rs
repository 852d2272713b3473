//! Registration and declaration passes: class names, then class variables
//! and subroutine signatures, before any subroutine body is looked at.

use std::str::FromStr;

use crate::{
    common::phrase::{Phrase, PhraseCategory},
    lexer::TokenCategory,
};

use super::{
    context::{Location, ProgramContext, ScopeChain},
    model::{Class, Scope, SubRoutine, SubroutineKind, Variable, VariableType},
};

/// A class with all of its declarations resolved,
/// waiting for its subroutine bodies to be compiled.
#[derive(Debug)]
pub struct DeclaredClass<'p> {
    pub class: Class,
    /// `statements` phrase of each subroutine, in the same order as `class.subroutines`.
    pub bodies: Vec<Option<&'p Phrase>>,
}

/// Identifier leaves among the direct children of a phrase, with their lines.
fn identifiers(phrase: &Phrase) -> impl Iterator<Item = (&str, usize)> {
    phrase.children().iter().filter_map(|child| match child {
        Phrase::Leaf {
            category: TokenCategory::Identifier,
            value,
            line,
        } => Some((value.as_str(), *line)),
        _ => None,
    })
}

fn class_name(phrase: &Phrase) -> (&str, usize) {
    identifiers(phrase).next().unwrap_or(("", 0))
}

/// Register every class name, so types can be used before their class is declared.
///
/// Returns, per class, whether it was linked (it is not, if its name was taken).
pub fn register(phrases: &[Phrase], context: &mut ProgramContext) -> Vec<bool> {
    phrases
        .iter()
        .map(|phrase| {
            let (name, line) = class_name(phrase);
            log::debug!("registering class `{name}`");

            context.register_class(name, line)
        })
        .collect()
}

struct Declarer<'c> {
    context: &'c mut ProgramContext,
    chain: ScopeChain,
}

impl Declarer<'_> {
    fn resolve_type(&mut self, phrase: Option<&Phrase>, location: &Location) -> VariableType {
        let Some((name, line)) = phrase
            .and_then(|phrase| phrase.children().first())
            .and_then(|child| Some((child.value()?, child.line()?)))
        else {
            return VariableType::Unresolved(String::new());
        };

        self.context.resolve_type(name).unwrap_or_else(|| {
            self.context
                .report(location, line, format!("type `{name}` is not declared"));
            VariableType::Unresolved(name.to_string())
        })
    }

    fn declare_name(&mut self, name: &str, line: usize, location: &Location) {
        if !self.chain.declare(name) || self.context.is_class(name) {
            self.context
                .report(location, line, format!("`{name}` is already declared"));
        }
    }

    /// Declare the variables of one `classVarDec`, `varDec` or `parameter` phrase,
    /// numbering them from `counter` onwards.
    fn declare_variables(
        &mut self,
        phrase: &Phrase,
        scope: Scope,
        counter: &mut usize,
        location: &Location,
    ) -> Vec<Variable> {
        let ty = self.resolve_type(phrase.branches(PhraseCategory::Type).next(), location);

        identifiers(phrase)
            .map(|(name, line)| {
                // a duplicate still takes its own slot
                self.declare_name(name, line, location);

                let variable = Variable {
                    name: name.to_string(),
                    scope,
                    index: *counter,
                    ty: ty.clone(),
                    line,
                };
                *counter += 1;

                variable
            })
            .collect()
    }

    fn declare_subroutine<'p>(
        &mut self,
        phrase: &'p Phrase,
        location: &Location,
    ) -> (SubRoutine, Option<&'p Phrase>) {
        let (name, line) = identifiers(phrase).next().unwrap_or(("", 0));
        let location = location.subroutine(name);

        let kind = phrase
            .children()
            .first()
            .and_then(Phrase::value)
            .and_then(|kind| SubroutineKind::from_str(kind).ok())
            .unwrap_or(SubroutineKind::Function);

        // `void` is a keyword leaf, any other return type is a `type` phrase
        let return_type = phrase
            .branches(PhraseCategory::Type)
            .next()
            .map(|ty| self.resolve_type(Some(ty), &location));

        self.chain.enter();

        let mut parameter_counter = usize::from(kind == SubroutineKind::Method);
        let parameters = phrase
            .branches(PhraseCategory::ParameterList)
            .flat_map(|list| list.branches(PhraseCategory::Parameter))
            .flat_map(|parameter| {
                self.declare_variables(
                    parameter,
                    Scope::Parameter,
                    &mut parameter_counter,
                    &location,
                )
            })
            .collect::<Vec<_>>();

        let body = phrase.branches(PhraseCategory::SubroutineBody).next();

        let mut local_counter = 0;
        let locals = body
            .into_iter()
            .flat_map(|body| body.branches(PhraseCategory::VarDec))
            .flat_map(|declaration| {
                self.declare_variables(declaration, Scope::Local, &mut local_counter, &location)
            })
            .collect::<Vec<_>>();

        self.chain.leave();

        let subroutine = SubRoutine {
            name: name.to_string(),
            kind,
            return_type,
            parameters,
            locals,
            statements: Vec::new(),
            line,
        };

        (
            subroutine,
            body.and_then(|body| body.branches(PhraseCategory::Statements).next()),
        )
    }
}

/// Declare the variables and subroutines of one class.
pub fn declare<'p>(
    phrase: &'p Phrase,
    linked: bool,
    context: &mut ProgramContext,
) -> DeclaredClass<'p> {
    let (name, line) = class_name(phrase);
    let location = Location::class(name);

    let mut declarer = Declarer {
        context,
        chain: ScopeChain::default(),
    };
    declarer.chain.enter();

    let mut static_counter = 0;
    let mut field_counter = 0;
    let mut variables = Vec::new();

    for declaration in phrase.branches(PhraseCategory::ClassVarDec) {
        let scope = declaration
            .children()
            .first()
            .and_then(Phrase::value)
            .and_then(|scope| Scope::from_str(scope).ok())
            .unwrap_or(Scope::Field);

        let counter = match scope {
            Scope::Static => &mut static_counter,
            _ => &mut field_counter,
        };

        variables.extend(declarer.declare_variables(declaration, scope, counter, &location));
    }

    let mut subroutines = Vec::new();
    let mut bodies = Vec::new();

    for declaration in phrase.branches(PhraseCategory::SubroutineDec) {
        if let Some((subroutine_name, subroutine_line)) = identifiers(declaration).next() {
            declarer.declare_name(subroutine_name, subroutine_line, &location);
        }

        let (subroutine, body) = declarer.declare_subroutine(declaration, &location);

        if linked {
            declarer
                .context
                .add_signature(name, &subroutine.name, subroutine.signature());
        }

        subroutines.push(subroutine);
        bodies.push(body);
    }

    log::debug!(
        "declared class `{name}`: {} variables, {} subroutines",
        variables.len(),
        subroutines.len()
    );

    DeclaredClass {
        class: Class {
            name: name.to_string(),
            line,
            variables,
            subroutines,
        },
        bodies,
    }
}

#[cfg(test)]
mod tests {
    use crate::{lexer::Lexer, parser::Grammar, semantics::context::Lookup};

    use super::*;

    fn parse(source: &str) -> Phrase {
        let tokens = Lexer::jack().tokenize(&[source]);
        let mut matched = Grammar::jack().parse_class(&tokens).expect("should parse");
        matched.phrases.remove(0)
    }

    fn indices(variables: &[Variable]) -> Vec<(&str, Scope, usize)> {
        variables
            .iter()
            .map(|variable| (variable.name.as_str(), variable.scope, variable.index))
            .collect()
    }

    fn declare_one(source: &str) -> (Class, ProgramContext) {
        let phrase = parse(source);
        let mut context = ProgramContext::new();
        let linked = register(std::slice::from_ref(&phrase), &mut context);
        let declared = declare(&phrase, linked[0], &mut context);

        (declared.class, context)
    }

    #[test]
    fn test_duplicate_field_gets_its_own_index() {
        let (class, context) = declare_one("class A { field int x; field int x; }");

        assert_eq!(context.errors.len(), 1);
        assert!(context.errors[0].message.contains("`x`"));
        assert_eq!(
            indices(&class.variables),
            vec![("x", Scope::Field, 0), ("x", Scope::Field, 1)]
        );
    }

    #[test]
    fn test_static_and_field_counters_are_independent() {
        let (class, context) =
            declare_one("class A { static int a, b; field boolean c; static A d; field char e; }");

        assert!(context.errors.is_empty());
        assert_eq!(
            indices(&class.variables),
            vec![
                ("a", Scope::Static, 0),
                ("b", Scope::Static, 1),
                ("c", Scope::Field, 0),
                ("d", Scope::Static, 2),
                ("e", Scope::Field, 1),
            ]
        );
        assert_eq!(class.field_count(), 2);
    }

    #[test]
    fn test_method_parameters_start_at_one() {
        let (class, context) = declare_one(
            "class A { \
               method void foo(int a, int b) { var int c, d; return; } \
               function void bar(int a, int b) { var int c; return; } \
             }",
        );

        assert!(context.errors.is_empty());

        let method = &class.subroutines[0];
        assert_eq!(method.kind, SubroutineKind::Method);
        assert_eq!(
            indices(&method.parameters),
            vec![("a", Scope::Parameter, 1), ("b", Scope::Parameter, 2)]
        );
        assert_eq!(
            indices(&method.locals),
            vec![("c", Scope::Local, 0), ("d", Scope::Local, 1)]
        );

        let function = &class.subroutines[1];
        assert_eq!(
            indices(&function.parameters),
            vec![("a", Scope::Parameter, 0), ("b", Scope::Parameter, 1)]
        );
    }

    #[test]
    fn test_unresolved_type_is_reported() {
        let (class, context) = declare_one("class A { field Sprite s; field Array a; }");

        assert_eq!(context.errors.len(), 1);
        assert!(context.errors[0].message.contains("`Sprite`"));
        assert_eq!(
            class.variables[0].ty,
            VariableType::Unresolved(String::from("Sprite"))
        );
        assert_eq!(class.variables[1].ty, VariableType::Class(String::from("Array")));
    }

    #[test]
    fn test_collisions_across_the_scope_chain() {
        let (_, context) = declare_one(
            "class A { \
               field int x; \
               method void x() { return; } \
               function void f(int x, int y) { var int y, A; return; } \
             }",
        );

        let lines = context
            .errors
            .iter()
            .map(|error| (error.subroutine_name.clone(), error.message.clone()))
            .collect::<Vec<_>>();

        assert_eq!(
            lines,
            vec![
                (None, String::from("`x` is already declared")),
                (Some(String::from("f")), String::from("`x` is already declared")),
                (Some(String::from("f")), String::from("`y` is already declared")),
                (Some(String::from("f")), String::from("`A` is already declared")),
            ]
        );
    }

    #[test]
    fn test_signatures_are_registered() {
        let (class, context) = declare_one(
            "class A { constructor A new(int a) { return this; } method int get() { return 1; } }",
        );

        assert_eq!(
            class.subroutines[0].return_type,
            Some(VariableType::Class(String::from("A")))
        );
        assert!(matches!(
            context.lookup("A", "new"),
            Lookup::Known(signature) if signature.kind == SubroutineKind::Constructor
                && signature.parameters == 1
        ));
        assert!(matches!(context.lookup("A", "get"), Lookup::Known(_)));
    }
}
