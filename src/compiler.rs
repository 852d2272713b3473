//! Whole-program compilation: lexing and parsing of every unit,
//! semantic analysis of all parsed classes together, then generation.
//!
//! Only invalid tokens abort the compilation. Syntax failures and
//! semantic errors are expected outcomes, reported through artifacts.

use crate::{
    codegen,
    common::phrase,
    error::{Error, InvalidToken},
    fileio::output::{ArtifactKind, OutputFile},
    lexer::{Lexer, Token},
    parser::{FailureSummary, Grammar},
    semantics::{self, error as semantic_error},
};

/// Name shared by the program-wide artifacts.
const PROGRAM_NAME: &str = "Program";

/// The source of one file.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub name: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Produce class descriptions and the whole-program parse tree.
    pub diagnostics: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { diagnostics: true }
    }
}

#[derive(Debug)]
pub struct SyntaxFailure {
    pub unit: String,
    pub summary: Option<FailureSummary>,
}

#[derive(Debug)]
pub struct Compilation {
    pub artifacts: Vec<OutputFile>,
    pub syntax_failures: Vec<SyntaxFailure>,
    pub semantic_errors: usize,
}

impl Compilation {
    pub fn is_successful(&self) -> bool {
        self.syntax_failures.is_empty() && self.semantic_errors == 0
    }
}

pub fn compile_program(
    units: &[CompilationUnit],
    options: Options,
) -> Result<Compilation, Error> {
    log::info!("tokenizing {} units", units.len());
    let tokenized = tokenize_all(units)?;

    let mut artifacts = Vec::new();
    let mut syntax_failures = Vec::new();
    let mut phrases = Vec::new();

    log::info!("parsing");
    let grammar = Grammar::jack();
    for (unit, tokens) in units.iter().zip(&tokenized) {
        match grammar.parse_class(tokens) {
            Ok(matched) => {
                log::debug!("parsed unit `{}`", unit.name);
                phrases.extend(matched.phrases);
            }
            Err(trace) => {
                log::debug!("unit `{}` failed to parse", unit.name);
                artifacts.push(OutputFile::new(
                    unit.name.clone(),
                    ArtifactKind::Syntax,
                    trace.report(),
                ));
                syntax_failures.push(SyntaxFailure {
                    unit: unit.name.clone(),
                    summary: trace.deepest_failure(),
                });
            }
        }
    }

    if options.diagnostics {
        artifacts.push(OutputFile::new(
            String::from(PROGRAM_NAME),
            ArtifactKind::Xml,
            phrase::render_program(&phrases),
        ));
    }

    let analysis = semantics::analyze(&phrases);
    let semantic_errors = analysis.errors.len();

    if analysis.is_successful() {
        log::info!("generating {} classes", analysis.classes.len());
        artifacts.extend(generate(&analysis.classes, options)?);
    } else {
        log::info!("found {semantic_errors} semantic errors, skipping generation");
        artifacts.push(OutputFile::new(
            String::from(PROGRAM_NAME),
            ArtifactKind::Err,
            format!("{}\n", semantic_error::report(&analysis.errors)),
        ));
    }

    Ok(Compilation {
        artifacts,
        syntax_failures,
        semantic_errors,
    })
}

/// Tokenize every unit, failing with all invalid tokens of the whole program.
fn tokenize_all(units: &[CompilationUnit]) -> Result<Vec<Vec<Token>>, Error> {
    let lexer = Lexer::jack();

    let tokenized = units
        .iter()
        .map(|unit| lexer.tokenize(&unit.lines))
        .collect::<Vec<_>>();

    let invalid_tokens = units
        .iter()
        .zip(&tokenized)
        .flat_map(|(unit, tokens)| {
            tokens
                .iter()
                .filter(|token| !token.is_valid())
                .map(|token| InvalidToken {
                    unit: unit.name.clone(),
                    text: token.value.clone(),
                    line: token.line,
                    offset: token.offset,
                })
        })
        .collect::<Vec<_>>();

    if invalid_tokens.is_empty() {
        Ok(tokenized)
    } else {
        Err(Error::InvalidTokens(invalid_tokens))
    }
}

fn generate(
    classes: &[semantics::model::Class],
    options: Options,
) -> Result<Vec<OutputFile>, Error> {
    let mut artifacts = Vec::new();

    for class in classes {
        let instructions = codegen::construct_class(class)?;
        artifacts.push(OutputFile::new(
            class.name.clone(),
            ArtifactKind::Vm,
            format!("{instructions}\n"),
        ));

        if options.diagnostics {
            artifacts.push(OutputFile::new(
                class.name.clone(),
                ArtifactKind::Desc,
                codegen::describe_class(class),
            ));
        }
    }

    Ok(artifacts)
}
