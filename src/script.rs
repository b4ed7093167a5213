//! # Tagged Token Stream
//!
//! A [`Script`] is the ordered list of [`Token`]s that every consumer of a song
//! works from: the display colours tokens by [`Tag`], storage saves them as
//! `(position, tag, text)` triples, and [`Script::to_text`] puts the document
//! back together.
//!
//! ## Invariants
//! - Concatenating every token's `text` in order reproduces the source text.
//! - Positions are `(line, column)`, line from 1, column from 0, counted in
//!   characters.
//! - Scripts handed out by the public API never carry [`Tag::Ambiguous`] or
//!   [`Tag::Typo`]; those only exist inside the resolver.

use crate::notes::Key;
use crate::pattern::match_shape;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Key,
    Chord,
    SlashChord,
    Header,
    Bar,
    Whitespace,
    Newline,
    Lyric,
    /// Shape alone can't decide; resolved from the rest of the line.
    Ambiguous,
    /// Piece of a malformed transposable shape; resolved from the rest of the line.
    Typo,
}

impl Tag {
    /// Key, chord or slash chord: the tags the transposer rewrites.
    pub fn is_transposable(&self) -> bool {
        matches!(self, Tag::Key | Tag::Chord | Tag::SlashChord)
    }

    /// Tags that must not leave the resolver.
    pub fn is_transient(&self) -> bool {
        matches!(self, Tag::Ambiguous | Tag::Typo)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Key => "key",
            Tag::Chord => "chord",
            Tag::SlashChord => "slashchord",
            Tag::Header => "header",
            Tag::Bar => "bar",
            Tag::Whitespace => "whitespace",
            Tag::Newline => "newline",
            Tag::Lyric => "lyric",
            Tag::Ambiguous => "ambiguous",
            Tag::Typo => "typo",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Start of a token in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 0 }
    }
}

/// Formats as `line.column`, the coordinate form text widgets address by.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.line, self.column)
    }
}

/// Tracks the position of the next token while walking text.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Cursor {
    position: Position,
}

impl Cursor {
    pub(crate) fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn advance(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.position.line += 1;
                self.position.column = 0;
            } else {
                self.position.column += 1;
            }
        }
    }
}

/// A classified, positioned fragment of a song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub position: Position,
    pub tag: Tag,
    pub text: String,
}

impl Token {
    pub fn new(position: Position, tag: Tag, text: impl Into<String>) -> Self {
        Self {
            position,
            tag,
            text: text.into(),
        }
    }

    /// Same position and text under a different tag.
    pub fn retagged(&self, tag: Tag) -> Self {
        Self {
            position: self.position,
            tag,
            text: self.text.clone(),
        }
    }
}

/// Ordered token stream for one song.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    tokens: Vec<Token>,
}

impl Script {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tags(&self) -> Vec<Tag> {
        self.tokens.iter().map(|t| t.tag).collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// Reassemble the document.
    pub fn to_text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// Only the sung words: lyric tokens plus the whitespace and newlines
    /// between them. Lines that carry no lyric are dropped.
    pub fn lyrics(&self) -> String {
        let mut out = String::new();
        for line in self.lines() {
            if !line.iter().any(|t| t.tag == Tag::Lyric) {
                continue;
            }
            let text: String = line
                .iter()
                .filter(|t| matches!(t.tag, Tag::Lyric | Tag::Whitespace))
                .map(|t| t.text.as_str())
                .collect();
            out.push_str(text.trim());
            out.push('\n');
        }
        out
    }

    /// Tokens grouped by line. Each group ends with its newline token, except
    /// possibly the last.
    pub fn lines(&self) -> Vec<&[Token]> {
        let mut lines = Vec::new();
        let mut start = 0;
        for (i, token) in self.tokens.iter().enumerate() {
            if token.tag == Tag::Newline {
                lines.push(&self.tokens[start..=i]);
                start = i + 1;
            }
        }
        if start < self.tokens.len() {
            lines.push(&self.tokens[start..]);
        }
        lines
    }

    /// The key written by the first key token, if any. Read from the token's
    /// shape, so trailing punctuation (`(F):`) doesn't hide it.
    pub fn first_key(&self) -> Option<Key> {
        self.tokens
            .iter()
            .find(|t| t.tag == Tag::Key)
            .and_then(|t| match_shape(&t.text).and_then(|s| s.key()))
    }

    /// Recompute positions from the token texts. Used after a stage changes
    /// text lengths.
    pub fn reposition(&self) -> Script {
        let mut cursor = Cursor::default();
        let tokens = self
            .tokens
            .iter()
            .map(|t| {
                let token = Token::new(cursor.position(), t.tag, t.text.clone());
                cursor.advance(&t.text);
                token
            })
            .collect();
        Script { tokens }
    }

    /// True if an ambiguous or typo token is present.
    pub fn has_transient(&self) -> bool {
        self.tokens.iter().any(|t| t.tag.is_transient())
    }
}

impl From<Vec<Token>> for Script {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}

impl FromIterator<Token> for Script {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Script {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl IntoIterator for Script {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Script {
        Script::new(vec![
            Token::new(Position::new(1, 0), Tag::Chord, "G"),
            Token::new(Position::new(1, 1), Tag::Newline, "\n"),
            Token::new(Position::new(2, 0), Tag::Lyric, "hello"),
            Token::new(Position::new(2, 5), Tag::Whitespace, " "),
            Token::new(Position::new(2, 6), Tag::Lyric, "world"),
        ])
    }

    #[test]
    fn test_to_text_and_lines() {
        let script = sample();
        assert_eq!(script.to_text(), "G\nhello world");
        let lines = script.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 2);
        assert_eq!(lines[1].len(), 3);
    }

    #[test]
    fn test_lyrics_skip_chord_lines() {
        assert_eq!(sample().lyrics(), "hello world\n");
    }

    #[test]
    fn test_reposition_after_length_change() {
        let mut tokens = sample().into_tokens();
        tokens[0].text = "G#".to_string();
        let script = Script::new(tokens).reposition();
        assert_eq!(script.tokens()[1].position, Position::new(1, 2));
        assert_eq!(script.tokens()[2].position, Position::new(2, 0));
        assert_eq!(script.tokens()[4].position, Position::new(2, 6));
    }

    #[test]
    fn test_first_key_with_trailing_punctuation() {
        let script = Script::new(vec![
            Token::new(Position::new(1, 0), Tag::Key, "(Bbm),"),
            Token::new(Position::new(1, 6), Tag::Newline, "\n"),
            Token::new(Position::new(2, 0), Tag::Key, "(C)"),
        ]);
        assert_eq!(script.first_key(), Key::parse("Bbm"));
        assert_eq!(sample().first_key(), None);
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(3, 14).to_string(), "3.14");
        assert_eq!(Tag::SlashChord.to_string(), "slashchord");
    }
}
