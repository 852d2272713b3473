//! Conditions that abort the whole compilation.

use crate::codegen::vm::InvalidInstruction;

/// A run of source text no token definition matched.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct InvalidToken {
    pub unit: String,
    pub text: String,
    pub line: usize,
    /// Character offset within the unit's source.
    pub offset: usize,
}

impl std::fmt::Display for InvalidToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(line {}): `{}`", self.unit, self.line, self.text)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid tokens found:\n{}", describe_all(.0))]
    InvalidTokens(Vec<InvalidToken>),
    #[error(transparent)]
    InvalidInstruction(#[from] InvalidInstruction),
}

fn describe_all(tokens: &[InvalidToken]) -> String {
    tokens
        .iter()
        .map(|token| format!("    {token}"))
        .collect::<Vec<_>>()
        .join("\n")
}
