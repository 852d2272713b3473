//! Backtrackable position into a token sequence.
//!
//! Every speculative match runs under a [`Bookmark`], which is either
//! committed (the advanced position is kept) or reverted (the saved
//! position is restored). Dropping an unsettled bookmark reverts it,
//! so early returns can never leave the cursor advanced by accident.

use std::ops::{Deref, DerefMut};

use crate::lexer::Token;

#[derive(Debug)]
pub struct Cursor<'t> {
    tokens: &'t [Token],
    position: usize,
    /// Saved positions; the bottom entry (start of input) is never popped.
    bookmarks: Vec<usize>,
}

impl<'t> Cursor<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            position: 0,
            bookmarks: vec![0],
        }
    }

    pub const fn position(&self) -> usize {
        self.position
    }

    pub fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.position)
    }

    pub fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.tokens.len()
    }

    /// Number of bookmarks currently held, including the base one.
    #[cfg(test)]
    pub fn depth(&self) -> usize {
        self.bookmarks.len()
    }

    /// Save the current position before a speculative match.
    pub fn bookmark(&mut self) -> Bookmark<'_, 't> {
        self.bookmarks.push(self.position);
        let depth = self.bookmarks.len();

        Bookmark {
            cursor: self,
            depth,
            settled: false,
        }
    }

    fn release(&mut self, depth: usize, restore: bool) {
        debug_assert_eq!(
            self.bookmarks.len(),
            depth,
            "bookmarks must be settled in reverse order"
        );

        if let Some(saved) = self.bookmarks.pop() {
            if restore {
                self.position = saved;
            }
        }
    }
}

/// Scoped bookmark over a [`Cursor`]; reverts on drop unless committed.
pub struct Bookmark<'c, 't> {
    cursor: &'c mut Cursor<'t>,
    depth: usize,
    settled: bool,
}

impl Bookmark<'_, '_> {
    /// Discard the saved position, keeping everything matched since.
    pub fn commit(mut self) {
        self.settled = true;
        self.cursor.release(self.depth, false);
    }

    /// Restore the saved position.
    pub fn revert(mut self) {
        self.settled = true;
        self.cursor.release(self.depth, true);
    }
}

impl<'t> Deref for Bookmark<'_, 't> {
    type Target = Cursor<'t>;

    fn deref(&self) -> &Self::Target {
        self.cursor
    }
}

impl DerefMut for Bookmark<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.cursor
    }
}

impl Drop for Bookmark<'_, '_> {
    fn drop(&mut self) {
        if !self.settled {
            self.cursor.release(self.depth, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::Lexer;

    use super::*;

    #[test]
    fn test_commit_keeps_position() {
        let tokens = Lexer::jack().tokenize(&["let x = 1;"]);
        let mut cursor = Cursor::new(&tokens);

        let mut bookmark = cursor.bookmark();
        bookmark.advance();
        bookmark.advance();
        bookmark.commit();

        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.depth(), 1);
    }

    #[test]
    fn test_revert_and_drop_restore_position() {
        let tokens = Lexer::jack().tokenize(&["let x = 1;"]);
        let mut cursor = Cursor::new(&tokens);
        cursor.advance();

        let mut bookmark = cursor.bookmark();
        bookmark.advance();
        bookmark.revert();
        assert_eq!(cursor.position(), 1);

        {
            let mut outer = cursor.bookmark();
            outer.advance();
            let mut inner = outer.bookmark();
            inner.advance();
            inner.commit();
            assert_eq!(outer.position(), 3);
        }

        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.depth(), 1);
    }

    #[test]
    fn test_exhaustion() {
        let tokens = Lexer::jack().tokenize(&["x"]);
        let mut cursor = Cursor::new(&tokens);

        assert_eq!(cursor.peek().map(|token| token.value.as_str()), Some("x"));
        assert!(cursor.advance().is_some());
        assert!(cursor.is_exhausted());
        assert!(cursor.advance().is_none());
        assert_eq!(cursor.position(), 1);
    }
}
