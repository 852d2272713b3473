use std::fmt;

/// A non-fatal semantic error. Collected during analysis and reported
/// together once the whole program has been analyzed.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CompilerError {
    pub class_name: String,
    pub subroutine_name: Option<String>,
    pub line: usize,
    pub message: String,
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subroutine_name {
            Some(subroutine_name) => write!(f, "{}.{subroutine_name}", self.class_name)?,
            None => write!(f, "{}", self.class_name)?,
        }

        write!(f, "({})\n    {}", self.line, self.message)
    }
}

/// Combined report of all errors, in the order they were found.
pub fn report(errors: &[CompilerError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report() {
        let errors = [
            CompilerError {
                class_name: String::from("Main"),
                subroutine_name: Some(String::from("main")),
                line: 7,
                message: String::from("`z` is not declared"),
            },
            CompilerError {
                class_name: String::from("Main"),
                subroutine_name: None,
                line: 2,
                message: String::from("`x` is already declared"),
            },
        ];

        let expected = [
            "Main.main(7)",
            "    `z` is not declared",
            "Main(2)",
            "    `x` is already declared",
        ]
        .join("\n");

        assert_eq!(report(&errors), expected);
    }
}
