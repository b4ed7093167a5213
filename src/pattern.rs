//! # Transposable Shape Matcher
//!
//! Recognizes fragments shaped like a key or chord:
//!
//! ```text
//! ( Root Quality ) / Bass  Remainder
//! ^ optional     ^ ^ optional
//! ```
//!
//! - `Root` / `Bass`: a letter `A`-`G`, optionally followed by `b` or `#`
//! - `Quality`: a run of ASCII alphanumerics or `' . - + ° Δ`
//! - `Remainder`: whatever is left of the fragment after the shape
//!
//! Matching is a prefix match, like the chord-symbol scanner it grew from:
//! `"Dm,"` has root `D`, quality `m` and remainder `,`. The matcher only reports
//! the shape. The `is_*` helpers say what that shape could be, and
//! [`crate::classify`] decides the tag.

use crate::notes::{self, is_valid_quality, Key, Mode, DIATONICS};

/// Structural pieces of a fragment that starts like a key or chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape<'a> {
    pub open: bool,
    /// Root and quality together, as written.
    pub head: &'a str,
    pub root: &'a str,
    pub quality: &'a str,
    pub close: bool,
    pub slash: bool,
    pub bass: Option<&'a str>,
    pub remainder: &'a str,
}

/// Ways a shape can be broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Typos {
    /// Exactly one of `(` / `)` present.
    pub bracket: bool,
    /// A `/` with no bass note after it.
    pub slash: bool,
}

impl Typos {
    pub fn any(&self) -> bool {
        self.bracket || self.slash
    }
}

/// One piece of a broken shape, as split back out by typo repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'a> {
    Bracket(&'a str),
    Slash(&'a str),
    /// Root plus quality, or a bass note: may be a chord on its own.
    Note(&'a str),
    Rest(&'a str),
}

impl<'a> Piece<'a> {
    pub fn text(&self) -> &'a str {
        match *self {
            Piece::Bracket(s) | Piece::Slash(s) | Piece::Note(s) | Piece::Rest(s) => s,
        }
    }
}

/// Scan a note name (`C`, `Bb`, `F#`) at the start of `s`.
fn scan_note(s: &str) -> Option<&str> {
    let mut chars = s.chars();
    let letter = chars.next()?;
    if !DIATONICS.contains(&letter) {
        return None;
    }
    match chars.next() {
        Some('b') | Some('#') => Some(&s[..2]),
        _ => Some(&s[..1]),
    }
}

fn is_quality_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '\'' | '.' | '-' | '+' | '°' | 'Δ')
}

/// Punctuation a chord may carry after it and still be a chord (`Dm,` / `G!`).
fn is_trailing_mark(c: char) -> bool {
    c.is_ascii_punctuation() && !matches!(c, '(' | ')' | '/')
}

fn is_trailing_punctuation(s: &str) -> bool {
    s.chars().all(is_trailing_mark)
}

/// `word` without the punctuation a chord may trail (`"A,"` -> `"A"`). A `#`
/// is kept, as it belongs to the note before it.
///
/// ```
/// use leadsheet::pattern::strip_trailing_punctuation;
///
/// assert_eq!(strip_trailing_punctuation("Am.!"), "Am");
/// assert_eq!(strip_trailing_punctuation("A#,"), "A#");
/// assert_eq!(strip_trailing_punctuation("(C)"), "(C)");
/// ```
pub fn strip_trailing_punctuation(word: &str) -> &str {
    word.trim_end_matches(|c: char| is_trailing_mark(c) && c != '#')
}

/// Match the transposable shape at the start of `fragment`.
///
/// Returns `None` when the fragment doesn't start with an optional `(` and a
/// note name.
///
/// # Examples
/// ```
/// use leadsheet::pattern::match_shape;
///
/// let shape = match_shape("(Am)").unwrap();
/// assert!(shape.open && shape.close);
/// assert_eq!(shape.root, "A");
/// assert_eq!(shape.quality, "m");
/// assert!(shape.is_key());
///
/// let shape = match_shape("D/F#").unwrap();
/// assert_eq!(shape.bass, Some("F#"));
/// assert!(shape.is_slash_chord());
///
/// assert!(match_shape("hello").is_none());
/// ```
pub fn match_shape(fragment: &str) -> Option<Shape<'_>> {
    let mut rest = fragment;

    let open = rest.starts_with('(');
    if open {
        rest = &rest[1..];
    }

    let head_start = rest;
    let root = scan_note(rest)?;
    rest = &rest[root.len()..];

    let quality_len = rest
        .char_indices()
        .find(|&(_, c)| !is_quality_char(c))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    let quality = &rest[..quality_len];
    let head = &head_start[..root.len() + quality_len];
    rest = &rest[quality_len..];

    let close = rest.starts_with(')');
    if close {
        rest = &rest[1..];
    }

    let slash = rest.starts_with('/');
    let mut bass = None;
    if slash {
        rest = &rest[1..];
        bass = scan_note(rest);
        if let Some(b) = bass {
            rest = &rest[b.len()..];
        }
    }

    Some(Shape {
        open,
        head,
        root,
        quality,
        close,
        slash,
        bass,
        remainder: rest,
    })
}

impl<'a> Shape<'a> {
    pub fn typos(&self) -> Typos {
        Typos {
            bracket: self.open != self.close,
            slash: self.slash && self.bass.is_none(),
        }
    }

    fn clean_tail(&self) -> bool {
        is_trailing_punctuation(self.remainder)
    }

    /// Both brackets, a root, no quality beyond a minor mark, no slash.
    pub fn is_key(&self) -> bool {
        self.open
            && self.close
            && !self.slash
            && matches!(self.quality, "" | "m" | "-")
            && notes::note_index(self.root).is_some()
            && self.clean_tail()
    }

    /// Unbracketed `top/bass` with a valid top quality.
    pub fn is_slash_chord(&self) -> bool {
        !self.open
            && !self.close
            && self.bass.is_some()
            && is_valid_quality(self.quality)
            && self.clean_tail()
    }

    /// Unbracketed, no slash, quality built from the vocabulary.
    pub fn is_chord(&self) -> bool {
        !self.open && !self.close && !self.slash && is_valid_quality(self.quality) && self.clean_tail()
    }

    pub fn root_index(&self) -> Option<u8> {
        notes::note_index(self.root)
    }

    pub fn bass_index(&self) -> Option<u8> {
        self.bass.and_then(notes::note_index)
    }

    /// The key this shape names, read as a key token.
    pub fn key(&self) -> Option<Key> {
        let mode = if self.quality.is_empty() {
            Mode::Major
        } else {
            Mode::Minor
        };
        self.root_index().map(|note| Key::new(note, mode))
    }

    /// The fragment split at its structural seams, in source order.
    pub fn pieces(&self) -> Vec<Piece<'a>> {
        let mut pieces = Vec::new();
        if self.open {
            pieces.push(Piece::Bracket("("));
        }
        pieces.push(Piece::Note(self.head));
        if self.close {
            pieces.push(Piece::Bracket(")"));
        }
        if self.slash {
            pieces.push(Piece::Slash("/"));
        }
        if let Some(bass) = self.bass {
            pieces.push(Piece::Note(bass));
        }
        if !self.remainder.is_empty() {
            pieces.push(Piece::Rest(self.remainder));
        }
        pieces
    }
}

/// Returns true if `text` is a chord on its own.
pub fn is_chord(text: &str) -> bool {
    match_shape(text).is_some_and(|s| s.is_chord())
}
