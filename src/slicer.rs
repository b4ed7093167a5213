//! Splits sheet text into fragments without losing a single character.
//!
//! Fragment kinds:
//! - a header marker (`*` or `:`) at the start of a word, on its own
//! - a run of non-whitespace characters
//! - a single `\n`
//! - a run of other whitespace (spaces, tabs, `\r`)

use crate::notes::HEADER_CHARS;

/// Slicer over a borrowed document
pub struct Slicer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Slicer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// Advance while `pred` holds and return the consumed slice.
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.position;
        let rest = &self.input[start..];
        let len = rest
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.position += len;
        &self.input[start..self.position]
    }

    fn next_fragment(&mut self) -> Option<&'a str> {
        let c = self.peek()?;
        let start = self.position;

        let fragment = if c == '\n' || HEADER_CHARS.contains(&c) {
            self.position += c.len_utf8();
            &self.input[start..self.position]
        } else if c.is_whitespace() {
            self.take_while(|c| c.is_whitespace() && c != '\n')
        } else {
            self.take_while(|c| !c.is_whitespace())
        };
        Some(fragment)
    }

    pub fn slice(&mut self) -> Vec<&'a str> {
        let mut fragments = Vec::new();
        while let Some(fragment) = self.next_fragment() {
            fragments.push(fragment);
        }
        fragments
    }
}

/// Slice `text` into fragments.
pub fn slice(text: &str) -> Vec<&str> {
    Slicer::new(text).slice()
}
