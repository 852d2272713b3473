//! Lexical tokens produced by the [`Lexer`](super::Lexer).

/// Coarse classification of a token, as used by the grammar.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "camelCase")]
pub enum TokenCategory {
    Keyword,
    Symbol,
    Identifier,
    IntegerConstant,
    StringConstant,
    /// A run of text no token definition could match.
    Invalid,
}

#[derive(
    Debug,
    PartialEq,
    Eq,
    Hash,
    Clone,
    Copy,
    strum::Display,
    strum::EnumString,
    strum::VariantArray,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

/// Every single-character symbol of the language.
pub const SYMBOLS: &str = "{}()[].,;+-*/&|<>=~";

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub category: TokenCategory,
    pub value: String,
    /// 1-based line of the first character.
    pub line: usize,
    /// Character offset of the first character within the compilation unit.
    pub offset: usize,
}

impl Token {
    pub fn new<S: Into<String>>(
        category: TokenCategory,
        value: S,
        line: usize,
        offset: usize,
    ) -> Self {
        Self {
            category,
            value: value.into(),
            line,
            offset,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.category != TokenCategory::Invalid
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.category == TokenCategory::Keyword && self.value == <&str>::from(keyword)
    }

    pub fn is_symbol(&self, symbol: char) -> bool {
        self.category == TokenCategory::Symbol && self.value.chars().eq(std::iter::once(symbol))
    }

    /// Number of characters the token spans in the source
    /// (string constants are stored without their quotes).
    pub fn source_length(&self) -> usize {
        let length = self.value.chars().count();

        if self.category == TokenCategory::StringConstant {
            length + 2
        } else {
            length
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.category {
            TokenCategory::StringConstant => write!(f, "\"{}\"", self.value),
            _ => write!(f, "{}", self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_predicates() {
        let keyword = Token::new(TokenCategory::Keyword, "while", 3, 10);
        let symbol = Token::new(TokenCategory::Symbol, "{", 3, 16);

        assert!(keyword.is_keyword(Keyword::While));
        assert!(!keyword.is_keyword(Keyword::Do));
        assert!(symbol.is_symbol('{'));
        assert!(!symbol.is_symbol('}'));
        assert!(!Token::new(TokenCategory::Invalid, "#", 1, 0).is_valid());
    }

    #[test]
    fn test_source_length() {
        let string = Token::new(TokenCategory::StringConstant, "hi", 1, 0);

        assert_eq!(string.source_length(), 4);
        assert_eq!(string.to_string(), "\"hi\"");
    }
}
