//! Syntactic analysis: turns the tokens of one compilation unit
//! into a `class` phrase, or a trace explaining why it could not.

mod combinators;
mod cursor;
mod grammar;
mod trace;

pub use combinators::{Matched, SyntaxResult};
pub use grammar::Grammar;
pub use trace::{FailureSummary, SyntaxTrace};

impl SyntaxTrace {
    /// Text of the syntax-failure artifact: the deepest failure, then the full trace.
    pub fn report(&self) -> String {
        let summary = self
            .deepest_failure()
            .map_or_else(|| String::from("syntax error"), |summary| summary.to_string());

        format!("{summary}\n\n{}", self.render())
    }
}
