//! The input cursor (spec.md §4.1).

use std::cell::Cell;

/// The fixed input text and a mutable current offset, adapted from the
/// teacher's `Lexer`/`ParserState` fork-and-advance style, but over raw
/// byte offsets into `&str` rather than a pre-tokenized stream -- this
/// engine matches literals and regexes directly against the text.
pub struct Cursor<'a> {
    text: &'a str,
    pos: Cell<usize>,
}

impl<'a> Cursor<'a> {
    /// Leading/trailing ASCII whitespace is trimmed once, up front,
    /// matching the original's `text.strip()`.
    pub fn new(text: &'a str) -> Self {
        Cursor {
            text: text.trim(),
            pos: Cell::new(0),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn pos(&self) -> usize {
        self.pos.get()
    }

    /// Used by backtracking to restore a saved position.
    pub fn set_pos(&self, pos: usize) {
        debug_assert!(pos <= self.text.len());
        self.pos.set(pos);
    }

    pub fn remaining(&self) -> &'a str {
        &self.text[self.pos.get()..]
    }

    /// Advance past a run of ASCII whitespace (including newlines).
    /// Idempotent and safe to redo on retry (spec.md §4.2 tie-break).
    pub fn skip_whitespace(&self) {
        let rest = self.remaining();
        let skip = rest.len() - rest.trim_start().len();
        if skip > 0 {
            self.pos.set(self.pos.get() + skip);
        }
    }

    /// 1-indexed `(line, column)` for the given offset, for diagnostics.
    pub fn line_col(&self, at: usize) -> (usize, usize) {
        let before = &self.text[..at.min(self.text.len())];
        let line = before.bytes().filter(|&b| b == b'\n').count() + 1;
        let col = match before.rfind('\n') {
            Some(nl) => at - nl,
            None => at + 1,
        };
        (line, col)
    }

    pub fn strpos(&self, at: usize) -> String {
        let (line, col) = self.line_col(at);
        format!("line {line} col {col}")
    }
}
