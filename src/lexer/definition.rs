//! Token-kind definitions tried by the lexer at every input position.

use chumsky::{prelude::*, Stream};
use strum::VariantArray;

use super::token::{Keyword, TokenCategory, SYMBOLS};

type LexerError = Simple<char>;

/// What a flexible or ignored definition recognized at the current position.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Lexeme {
    pub value: String,
    /// Number of characters consumed.
    pub length: usize,
}

pub type Matcher = BoxedParser<'static, char, Lexeme, LexerError>;

pub enum Definition {
    /// Exact literal (keywords and symbols).
    Fixed {
        category: TokenCategory,
        literal: &'static str,
    },
    /// Class of lexemes (identifiers, literals).
    Flexible {
        category: TokenCategory,
        matcher: Matcher,
        /// Must not directly follow another word character.
        word_bounded: bool,
    },
    /// Matched but never emitted (whitespace, comments).
    Ignored { matcher: Matcher },
}

impl Definition {
    /// Length (in characters) and value of the match at the start of `rest`, if any.
    ///
    /// `previous` is the character right before `rest`, used for word boundaries.
    pub fn attempt(&self, rest: &str, previous: Option<char>) -> Option<Lexeme> {
        match self {
            Self::Fixed { literal, .. } => rest.starts_with(literal).then(|| Lexeme {
                value: (*literal).to_string(),
                length: literal.chars().count(),
            }),
            Self::Flexible {
                matcher,
                word_bounded,
                ..
            } => {
                if *word_bounded && previous.is_some_and(is_word_char) {
                    return None;
                }

                run(matcher, rest)
            }
            Self::Ignored { matcher } => run(matcher, rest),
        }
    }

    /// Category of the emitted token, or `None` for ignored definitions.
    pub const fn category(&self) -> Option<TokenCategory> {
        match self {
            Self::Fixed { category, .. } | Self::Flexible { category, .. } => Some(*category),
            Self::Ignored { .. } => None,
        }
    }
}

/// Characters are pulled only as far as the matcher looks; the `&str`
/// conversion would count the whole remaining text on every attempt.
fn run(matcher: &Matcher, rest: &str) -> Option<Lexeme> {
    let stream = Stream::from_iter(
        0..0,
        rest.chars().enumerate().map(|(i, c)| (c, i..i + 1)),
    );

    matcher.parse(stream).ok().filter(|lexeme| lexeme.length > 0)
}

pub const fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// All Jack token definitions, fixed literals first so they win ties
/// against flexible classes of the same length.
pub fn jack() -> Vec<Definition> {
    let keywords = Keyword::VARIANTS.iter().map(|keyword| Definition::Fixed {
        category: TokenCategory::Keyword,
        literal: (*keyword).into(),
    });

    let symbols = SYMBOLS
        .char_indices()
        .map(|(i, _)| Definition::Fixed {
            category: TokenCategory::Symbol,
            literal: &SYMBOLS[i..=i],
        });

    let flexible = [
        Definition::Flexible {
            category: TokenCategory::IntegerConstant,
            matcher: integer_constant(),
            word_bounded: true,
        },
        Definition::Flexible {
            category: TokenCategory::StringConstant,
            matcher: string_constant(),
            word_bounded: false,
        },
        Definition::Flexible {
            category: TokenCategory::Identifier,
            matcher: identifier(),
            word_bounded: false,
        },
    ];

    let ignored = [whitespace(), line_comment(), block_comment()]
        .into_iter()
        .map(|matcher| Definition::Ignored { matcher });

    keywords
        .chain(symbols)
        .chain(flexible)
        .chain(ignored)
        .collect()
}

// region: matchers

fn word_boundary() -> impl Parser<char, (), Error = LexerError> + Clone {
    filter(|c: &char| !is_word_char(*c))
        .ignored()
        .or(end())
        .rewind()
}

fn integer_constant() -> Matcher {
    filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1)
        .at_most(5)
        .collect::<String>()
        .then_ignore(word_boundary())
        .map(|digits| Lexeme {
            length: digits.chars().count(),
            value: digits,
        })
        .boxed()
}

fn string_constant() -> Matcher {
    just('"')
        .ignore_then(filter(|c: &char| *c != '"' && *c != '\n').repeated())
        .then_ignore(just('"'))
        .collect::<String>()
        .map(|content| Lexeme {
            // surrounding quotes are consumed, but not part of the value
            length: content.chars().count() + 2,
            value: content,
        })
        .boxed()
}

fn identifier() -> Matcher {
    filter(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .chain(filter(|c: &char| is_word_char(*c)).repeated())
        .collect::<String>()
        .map(|name| Lexeme {
            length: name.chars().count(),
            value: name,
        })
        .boxed()
}

fn whitespace() -> Matcher {
    filter(|c: &char| c.is_whitespace())
        .repeated()
        .at_least(1)
        .collect::<String>()
        .map(|blank| Lexeme {
            length: blank.chars().count(),
            value: blank,
        })
        .boxed()
}

fn line_comment() -> Matcher {
    just("//")
        .ignore_then(filter(|c: &char| *c != '\n').repeated())
        .collect::<String>()
        .map(|text| Lexeme {
            length: text.chars().count() + 2,
            value: text,
        })
        .boxed()
}

fn block_comment() -> Matcher {
    just("/*")
        .ignore_then(take_until(just("*/")))
        .map(|(text, _)| text.into_iter().collect::<String>())
        .map(|text| Lexeme {
            length: text.chars().count() + 4,
            value: text,
        })
        .boxed()
}

// endregion
