//! Parse tree produced by the syntactic analyzer.
//!
//! A phrase is either a leaf (a single token) or a branch grouping
//! the phrases matched by one named grammar rule.

use crate::lexer::{Token, TokenCategory};

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "camelCase")]
pub enum PhraseCategory {
    Class,
    ClassVarDec,
    SubroutineDec,
    ParameterList,
    Parameter,
    SubroutineBody,
    VarDec,
    Statements,
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
}

/// Which alternative of the `term` rule produced a term phrase.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, strum::Display)]
#[strum(serialize_all = "camelCase")]
pub enum TermForm {
    IntegerConstant,
    StringConstant,
    KeywordConstant,
    ArrayElement,
    SubroutineCall,
    Variable,
    Parenthesized,
    Unary,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Phrase {
    Leaf {
        category: TokenCategory,
        value: String,
        line: usize,
    },
    Branch {
        category: PhraseCategory,
        form: Option<TermForm>,
        children: Vec<Phrase>,
    },
}

impl Phrase {
    pub fn leaf(token: &Token) -> Self {
        Self::Leaf {
            category: token.category,
            value: token.value.clone(),
            line: token.line,
        }
    }

    /// Tag used for the phrase in the rendered tree.
    pub fn category_name(&self) -> &'static str {
        match self {
            Self::Leaf { category, .. } => (*category).into(),
            Self::Branch { category, .. } => (*category).into(),
        }
    }

    pub fn is_branch(&self, expected: PhraseCategory) -> bool {
        matches!(self, Self::Branch { category, .. } if *category == expected)
    }

    /// Literal value of a leaf.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Leaf { value, .. } => Some(value),
            Self::Branch { .. } => None,
        }
    }

    /// Literal value of a leaf of the given category.
    pub fn value_of(&self, expected: TokenCategory) -> Option<&str> {
        match self {
            Self::Leaf {
                category, value, ..
            } if *category == expected => Some(value),
            _ => None,
        }
    }

    pub fn is_symbol(&self, symbol: char) -> bool {
        self.value_of(TokenCategory::Symbol)
            .is_some_and(|value| value.chars().eq(std::iter::once(symbol)))
    }

    pub fn children(&self) -> &[Self] {
        match self {
            Self::Leaf { .. } => &[],
            Self::Branch { children, .. } => children,
        }
    }

    pub const fn form(&self) -> Option<TermForm> {
        match self {
            Self::Leaf { .. } => None,
            Self::Branch { form, .. } => *form,
        }
    }

    /// Direct children that are branches of the given category.
    pub fn branches(&self, category: PhraseCategory) -> impl Iterator<Item = &Self> {
        self.children()
            .iter()
            .filter(move |child| child.is_branch(category))
    }

    /// Values of the direct children that are leaves of the given category.
    pub fn leaf_values(&self, category: TokenCategory) -> impl Iterator<Item = &str> {
        self.children()
            .iter()
            .filter_map(move |child| child.value_of(category))
    }

    /// Line of the first token covered by the phrase.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Leaf { line, .. } => Some(*line),
            Self::Branch { children, .. } => children.iter().find_map(Self::line),
        }
    }

    fn write_tagged(&self, depth: usize, output: &mut String) {
        let indent = "  ".repeat(depth);
        let tag = self.category_name();

        match self {
            Self::Leaf { value, .. } => {
                output.push_str(&format!("{indent}<{tag}> {} </{tag}>\n", escape(value)));
            }
            Self::Branch { children, .. } => {
                output.push_str(&format!("{indent}<{tag}>\n"));
                for child in children {
                    child.write_tagged(depth + 1, output);
                }
                output.push_str(&format!("{indent}</{tag}>\n"));
            }
        }
    }

    /// Render as a nested tagged tree.
    pub fn to_tagged_tree(&self) -> String {
        let mut output = String::new();
        self.write_tagged(0, &mut output);
        output
    }
}

/// Render all top-level phrases of a program as one tagged tree,
/// wrapping them in a `program` root unless there is exactly one.
pub fn render_program(phrases: &[Phrase]) -> String {
    if let [phrase] = phrases {
        return phrase.to_tagged_tree();
    }

    let mut output = String::from("<program>\n");
    for phrase in phrases {
        phrase.write_tagged(1, &mut output);
    }
    output.push_str("</program>\n");

    output
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
