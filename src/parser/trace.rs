//! Diagnostic trace of a parse: which grammar alternatives were attempted
//! and whether they matched. Used for reports only, never for control flow.

use crate::lexer::Token;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Outcome {
    Matched,
    Failed,
}

#[derive(Debug, Clone)]
pub struct SyntaxTrace {
    pub label: String,
    pub outcome: Outcome,
    /// Token index at which the attempt started.
    pub position: usize,
    /// Token a failed terminal was looking at (`None` at end of input).
    pub found: Option<Token>,
    pub is_terminal: bool,
    pub children: Vec<SyntaxTrace>,
}

/// The furthest point any terminal failed at, and everything expected there.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct FailureSummary {
    pub position: usize,
    pub expected: Vec<String>,
    pub found: Option<Token>,
}

impl SyntaxTrace {
    pub fn node<S: Into<String>>(
        label: S,
        outcome: Outcome,
        position: usize,
        children: Vec<Self>,
    ) -> Self {
        Self {
            label: label.into(),
            outcome,
            position,
            found: None,
            is_terminal: false,
            children,
        }
    }

    pub fn terminal<S: Into<String>>(
        label: S,
        outcome: Outcome,
        position: usize,
        found: Option<&Token>,
    ) -> Self {
        Self {
            label: label.into(),
            outcome,
            position,
            found: found.cloned(),
            is_terminal: true,
            children: Vec::new(),
        }
    }

    pub fn is_matched(&self) -> bool {
        self.outcome == Outcome::Matched
    }

    /// Summarize the deepest failed terminal in the trace.
    pub fn deepest_failure(&self) -> Option<FailureSummary> {
        let mut failures = Vec::new();
        self.collect_failed_terminals(&mut failures);

        let position = failures.iter().map(|failure| failure.position).max()?;

        let mut expected = Vec::new();
        let mut found = None;
        for failure in failures.into_iter().filter(|f| f.position == position) {
            if !expected.contains(&failure.label) {
                expected.push(failure.label.clone());
            }
            found = found.or_else(|| failure.found.clone());
        }

        Some(FailureSummary {
            position,
            expected,
            found,
        })
    }

    fn collect_failed_terminals<'a>(&'a self, failures: &mut Vec<&'a Self>) {
        if self.is_terminal {
            if !self.is_matched() {
                failures.push(self);
            }
            return;
        }

        for child in &self.children {
            child.collect_failed_terminals(failures);
        }
    }

    fn write(&self, depth: usize, output: &mut String) {
        let marker = match self.outcome {
            Outcome::Matched => '+',
            Outcome::Failed => '-',
        };

        output.push_str(&"  ".repeat(depth));
        output.push(marker);
        output.push(' ');
        output.push_str(&self.label);

        if self.is_terminal && !self.is_matched() {
            output.push_str(&format!(", found {}", describe_found(self.found.as_ref())));
        }
        output.push('\n');

        for child in &self.children {
            child.write(depth + 1, output);
        }
    }

    /// Render as an indented tree; `+` marks matched attempts, `-` failed ones.
    pub fn render(&self) -> String {
        let mut output = String::new();
        self.write(0, &mut output);
        output
    }
}

impl std::fmt::Display for FailureSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(token) = &self.found {
            write!(f, "line {}: ", token.line)?;
        }

        write!(
            f,
            "expected {}, found {}",
            self.expected.join(" or "),
            describe_found(self.found.as_ref())
        )
    }
}

fn describe_found(found: Option<&Token>) -> String {
    found.map_or_else(
        || String::from("end of input"),
        |token| format!("`{token}`"),
    )
}
