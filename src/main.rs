use std::{io, path::PathBuf, process::ExitCode};

use clap::Parser;
use fileio::{input, output::OutputGenerator};

mod codegen;
mod common;
mod compiler;
mod error;
mod fileio;
mod lexer;
mod parser;
mod semantics;

/// Compile Jack sources to Hack VM code.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// A `.jack` file, or a directory searched recursively for `.jack` files
    path: PathBuf,

    /// Directory to write artifacts to [default: `bin` inside the input directory]
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Skip class descriptions and the whole-program parse tree
    #[arg(long)]
    minimal: bool,
}

/// Invalid tokens, or the sources could not be read or written.
const EXIT_ABORTED: u8 = 1;
/// Syntax failures or semantic errors were reported.
const EXIT_COMPLETED_WITH_ERRORS: u8 = 2;

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(exit_code) => exit_code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(EXIT_ABORTED)
        }
    }
}

fn run(cli: &Cli) -> io::Result<ExitCode> {
    let sources = input::discover(&cli.path)?;
    let units = sources
        .iter()
        .map(|source| source.unit.clone())
        .collect::<Vec<_>>();
    let options = compiler::Options {
        diagnostics: !cli.minimal,
    };

    let compilation = match compiler::compile_program(&units, options) {
        Ok(compilation) => compilation,
        Err(error) => {
            if let error::Error::InvalidTokens(tokens) = &error {
                for token in tokens {
                    error_report::invalid_token(&sources, token)?;
                }
            }
            eprintln!("compilation aborted: {error}");
            return Ok(ExitCode::from(EXIT_ABORTED));
        }
    };

    let out_path = match &cli.out {
        Some(out_path) => out_path.clone(),
        None => fileio::default_output_dir(&cli.path)?,
    };
    let output_generator = OutputGenerator::setup(&out_path)?;

    for artifact in &compilation.artifacts {
        output_generator.generate(artifact)?;
    }

    for failure in &compilation.syntax_failures {
        error_report::syntax_failure(&sources, failure)?;
    }

    if compilation.semantic_errors > 0 {
        eprintln!(
            "{} semantic error(s), see `{}`",
            compilation.semantic_errors,
            out_path.join("Program.err").display()
        );
    }

    log::info!(
        "wrote {} artifacts to `{}`",
        compilation.artifacts.len(),
        out_path.display()
    );

    Ok(if compilation.is_successful() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_COMPLETED_WITH_ERRORS)
    })
}

mod error_report {
    use std::{io, ops::Range};

    use ariadne::{Label, Report, ReportKind, Source};

    use crate::{compiler::SyntaxFailure, error::InvalidToken, fileio::input::SourceFile};

    pub fn invalid_token(sources: &[SourceFile], token: &InvalidToken) -> io::Result<()> {
        let Some(source) = find(sources, &token.unit) else {
            return Ok(());
        };

        let span = token.offset..token.offset + token.text.chars().count();
        display(source, span, "Invalid token", "no token starts with this text")
    }

    pub fn syntax_failure(sources: &[SourceFile], failure: &SyntaxFailure) -> io::Result<()> {
        let Some(source) = find(sources, &failure.unit) else {
            return Ok(());
        };
        let Some(summary) = &failure.summary else {
            return Ok(());
        };

        let span = match &summary.found {
            Some(token) => token.offset..token.offset + token.source_length(),
            None => {
                let end = content(source).chars().count();
                end..end
            }
        };
        let label = format!("expected {}", summary.expected.join(" or "));

        display(source, span, "Syntax error", &label)
    }

    fn find<'s>(sources: &'s [SourceFile], unit: &str) -> Option<&'s SourceFile> {
        sources.iter().find(|source| source.unit.name == unit)
    }

    fn content(source: &SourceFile) -> String {
        source.unit.lines.join("\n")
    }

    fn display(source: &SourceFile, span: Range<usize>, message: &str, label: &str) -> io::Result<()> {
        let path = source.path.to_string_lossy();
        let file_path = path.as_ref();
        let file_content = content(source);

        Report::build(ReportKind::Error, file_path, span.start)
            .with_message(message)
            .with_label(Label::new((file_path, span)).with_message(label))
            .finish()
            .eprint((file_path, Source::from(file_content.as_str())))
    }
}
