//! Conversion of raw source lines into a flat sequence of [`Token`]s.
//!
//! At every position each [`Definition`] is tried and the longest match wins;
//! ties go to the definition listed first, which is why fixed literals
//! (keywords, symbols) are listed before the flexible classes.
//! Text no definition matches is collected into a single invalid token.

mod definition;
pub mod token;

pub use token::{Keyword, Token, TokenCategory};

use definition::{Definition, Lexeme};

pub struct Lexer {
    definitions: Vec<Definition>,
}

impl Lexer {
    pub fn jack() -> Self {
        Self {
            definitions: definition::jack(),
        }
    }

    /// Tokenize the lines of a single compilation unit.
    pub fn tokenize<S: AsRef<str>>(&self, lines: &[S]) -> Vec<Token> {
        let text = lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n");
        let line_starts = line_starts(lines);

        let chars = text.char_indices().collect::<Vec<_>>();
        let mut tokens = Vec::new();
        let mut invalid = InvalidRun::default();
        let mut position = 0;

        while let Some(&(byte_offset, _)) = chars.get(position) {
            let previous = position
                .checked_sub(1)
                .and_then(|i| chars.get(i))
                .map(|(_, c)| *c);

            match self.longest_match(&text[byte_offset..], previous) {
                Some((definition, lexeme)) => {
                    invalid.flush(&mut tokens, &line_starts);

                    if let Some(category) = definition.category() {
                        tokens.push(Token::new(
                            category,
                            lexeme.value,
                            line_of(&line_starts, position),
                            position,
                        ));
                    }

                    position += lexeme.length;
                }
                None => {
                    invalid.push(position, chars[position].1);
                    position += 1;
                }
            }
        }

        invalid.flush(&mut tokens, &line_starts);

        log::trace!("tokenized {} lines into {} tokens", lines.len(), tokens.len());

        tokens
    }

    fn longest_match(&self, rest: &str, previous: Option<char>) -> Option<(&Definition, Lexeme)> {
        self.definitions
            .iter()
            .filter_map(|definition| {
                definition
                    .attempt(rest, previous)
                    .map(|lexeme| (definition, lexeme))
            })
            // keep the earliest definition on equal lengths
            .fold(None, |best: Option<(&Definition, Lexeme)>, candidate| match best {
                Some(best) if best.1.length >= candidate.1.length => Some(best),
                _ => Some(candidate),
            })
    }
}

/// Character offsets at which each line begins (line breaks count as one character).
fn line_starts<S: AsRef<str>>(lines: &[S]) -> Vec<usize> {
    lines
        .iter()
        .scan(0, |start, line| {
            let line_start = *start;
            *start += line.as_ref().chars().count() + 1;
            Some(line_start)
        })
        .collect()
}

/// 1-based line containing the character at `position`.
fn line_of(line_starts: &[usize], position: usize) -> usize {
    line_starts
        .partition_point(|start| *start <= position)
        .max(1)
}

#[derive(Default)]
struct InvalidRun {
    start: Option<usize>,
    text: String,
}

impl InvalidRun {
    fn push(&mut self, position: usize, c: char) {
        self.start.get_or_insert(position);
        self.text.push(c);
    }

    fn flush(&mut self, tokens: &mut Vec<Token>, line_starts: &[usize]) {
        if let Some(start) = self.start.take() {
            tokens.push(Token::new(
                TokenCategory::Invalid,
                std::mem::take(&mut self.text),
                line_of(line_starts, start),
                start,
            ));
        }
    }
}
