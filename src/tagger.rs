//! # Tagger
//!
//! Turns raw sheet text into a [`Script`]: slice, match, classify, then hand
//! each finished line to the resolver.

use crate::classify::classify;
use crate::notes::is_atypical;
use crate::pattern::{match_shape, Shape};
use crate::resolve::resolve_line;
use crate::script::{Cursor, Position, Script, Tag, Token};
use crate::slicer::Slicer;
use tracing::{trace, warn};

/// Tagger over a borrowed document
pub struct Tagger<'a> {
    slicer: Slicer<'a>,
    cursor: Cursor,
    line: Vec<Token>,
    tokens: Vec<Token>,
}

impl<'a> Tagger<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            slicer: Slicer::new(input),
            cursor: Cursor::default(),
            line: Vec::new(),
            tokens: Vec::new(),
        }
    }

    /// Flush the pending line through the resolver.
    fn finish_line(&mut self) {
        if self.line.is_empty() {
            return;
        }
        trace!(line = self.cursor.position().line, tokens = self.line.len(), "resolving line");
        let resolved = resolve_line(&self.line);
        self.tokens.extend(resolved);
        self.line.clear();
    }

    fn push(&mut self, fragment: &str) {
        let shape = match_shape(fragment);
        let tag = classify(fragment, shape.as_ref());
        let position = self.cursor.position();

        if let Some(shape) = shape.as_ref().filter(|_| tag.is_transposable()) {
            warn_atypical(shape, fragment, position);
        }

        self.line.push(Token::new(position, tag, fragment));
        self.cursor.advance(fragment);

        if tag == Tag::Newline {
            self.finish_line();
        }
    }

    pub fn tag(mut self) -> Script {
        for fragment in self.slicer.slice() {
            self.push(fragment);
        }
        // last line may have no newline
        self.finish_line();
        Script::new(self.tokens)
    }
}

fn warn_atypical(shape: &Shape<'_>, fragment: &str, position: Position) {
    let notes = std::iter::once(shape.root).chain(shape.bass);
    for note in notes.filter(|n| is_atypical(n)) {
        warn!(%position, note, fragment, "atypical enharmonic spelling, output will use a standard name");
    }
}

/// Tag a whole document.
///
/// # Examples
/// ```
/// use leadsheet::{tag, Tag};
///
/// let script = tag("(C)\nAm F G\n");
/// assert_eq!(
///     script.tags(),
///     vec![
///         Tag::Key, Tag::Newline,
///         Tag::Chord, Tag::Whitespace, Tag::Chord, Tag::Whitespace, Tag::Chord, Tag::Newline,
///     ]
/// );
/// assert_eq!(script.to_text(), "(C)\nAm F G\n");
/// ```
pub fn tag(text: &str) -> Script {
    Tagger::new(text).tag()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_and_chord_lines() {
        let script = tag("(C)\nAm F G\n");
        assert_eq!(script.texts(), vec!["(C)", "\n", "Am", " ", "F", " ", "G", "\n"]);
        assert_eq!(script.tokens()[2].position, Position::new(2, 0));
        assert_eq!(script.tokens()[6].position, Position::new(2, 5));
    }

    #[test]
    fn test_single_header() {
        let script = tag("VERSE");
        assert_eq!(script.len(), 1);
        assert_eq!(script.tokens()[0].tag, Tag::Header);
    }

    #[test]
    fn test_unterminated_last_line_is_resolved() {
        let script = tag("G D\nA");
        assert!(!script.has_transient());
        assert_eq!(script.tokens().last().map(|t| t.tag), Some(Tag::Lyric));
    }

    #[test]
    fn test_broken_key_is_repaired() {
        let script = tag("(Cm");
        assert_eq!(script.texts(), vec!["(", "Cm"]);
        assert_eq!(script.tokens()[1].tag, Tag::Chord);
        assert_eq!(script.tokens()[1].position, Position::new(1, 1));
    }

    #[test]
    fn test_atypical_spellings_are_still_chords() {
        let script = tag("Cb E#m7 D/Fb\n");
        assert_eq!(
            script.tags(),
            vec![
                Tag::Chord,
                Tag::Whitespace,
                Tag::Chord,
                Tag::Whitespace,
                Tag::SlashChord,
                Tag::Newline
            ]
        );
    }

    #[test]
    fn test_lossless_on_mixed_sheet() {
        let text = "*INTRO:\n| G  D/F# | Em7  C |\n\nAmazing grace, how (Sweet\n(Eb)  the sound I\n";
        let script = tag(text);
        assert_eq!(script.to_text(), text);
        assert!(!script.has_transient());
    }

    #[test]
    fn test_empty_input() {
        assert!(tag("").is_empty());
    }
}
