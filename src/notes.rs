//! # Note and Key Tables
//!
//! Read-only lookup data shared by the tagger and the transposer.
//!
//! Pitch classes are semitone indices from C:
//! 0=C, 1=C#/Db, 2=D, 3=D#/Eb, 4=E, 5=F, 6=F#/Gb, 7=G, 8=G#/Ab, 9=A, 10=A#/Bb, 11=B
//!
//! Input spellings include the atypical enharmonics `B#`, `Cb`, `E#` and `Fb`.
//! Output spellings only ever use the twelve standard names above.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diatonic letters that can start a root.
pub const DIATONICS: [char; 7] = ['C', 'D', 'E', 'F', 'G', 'A', 'B'];

/// Major keys on these pitch classes are spelled with flats (C, Db, Eb, F, Ab, Bb).
pub const FLAT_MAJOR: [u8; 6] = [0, 1, 3, 5, 8, 10];

/// Minor keys on these pitch classes are spelled with flats (Cm, Dm, Fm, Gm, Am, Bbm).
pub const FLAT_MINOR: [u8; 6] = [0, 2, 5, 7, 9, 10];

/// Building blocks of a chord quality. Order matters: `Maj`/`maj` must be tried
/// before `m`.
pub const QUALITIES: [&str; 24] = [
    "add", "aug", "dim", "Maj", "maj", "m", "sus", "0", "1", "2", "3", "4", "5", "6", "7", "8",
    "9", "-", "+", "°", "Δ", "(", ")", ".",
];

/// Header markers, always tagged `header`.
pub const HEADER_CHARS: [char; 2] = ['*', ':'];

// Nashville degree tables, indexed by semitones above the key.
pub const NASH_MAJOR_FLATS: [&str; 12] =
    ["1", "b2", "2", "b3", "3", "4", "b5", "5", "b6", "6", "b7", "7"];
pub const NASH_MAJOR_SHARPS: [&str; 12] =
    ["1", "#1", "2", "#2", "3", "4", "#4", "5", "#5", "6", "#6", "7"];
// The minor table uses #6 over b7 and #7 over b1.
pub const NASH_MINOR_SHARPS: [&str; 12] =
    ["1", "b2", "2", "3", "#3", "4", "#4", "5", "6", "#6", "7", "#7"];

/// Note name to semitone offset from C.
///
/// Accepts a letter with at most one `#` or `b`. Returns `None` for anything
/// else, including lowercase letters.
pub fn note_index(name: &str) -> Option<u8> {
    let mut chars = name.chars();
    let base: i8 = match chars.next()? {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let acc: i8 = match chars.next() {
        None => 0,
        Some('#') => 1,
        Some('b') => -1,
        Some(_) => return None,
    };
    if chars.next().is_some() {
        return None;
    }
    Some((base + acc).rem_euclid(12) as u8)
}

/// Semitone index to note name, choosing flat or sharp spelling for black keys.
pub fn spell(index: u8, prefer_flat: bool) -> &'static str {
    match index % 12 {
        0 => "C",
        1 => if prefer_flat { "Db" } else { "C#" },
        2 => "D",
        3 => if prefer_flat { "Eb" } else { "D#" },
        4 => "E",
        5 => "F",
        6 => if prefer_flat { "Gb" } else { "F#" },
        7 => "G",
        8 => if prefer_flat { "Ab" } else { "G#" },
        9 => "A",
        10 => if prefer_flat { "Bb" } else { "A#" },
        _ => "B",
    }
}

/// Whether a key on `index` in `mode` is written with flats.
pub fn prefers_flat(index: u8, mode: Mode) -> bool {
    let table: &[u8] = match mode {
        Mode::Major => &FLAT_MAJOR,
        Mode::Minor => &FLAT_MINOR,
    };
    table.contains(&(index % 12))
}

/// Spellings that name a real pitch class but are rarely written in practice.
pub fn is_atypical(name: &str) -> bool {
    matches!(name, "B#" | "Cb" | "E#" | "Fb")
}

/// Returns true if `quality` is made entirely of vocabulary tokens.
///
/// Strips one known quality off the front at a time until nothing is left.
/// The empty quality is valid (a plain major chord).
pub fn is_valid_quality(quality: &str) -> bool {
    let mut rest = quality;
    while !rest.is_empty() {
        match QUALITIES.iter().find_map(|q| rest.strip_prefix(*q)) {
            Some(next) => rest = next,
            None => return false,
        }
    }
    true
}

/// Semitone distance from `from` up to `to`, in `0..12`.
pub fn interval(from: u8, to: u8) -> u8 {
    (to as i16 - from as i16).rem_euclid(12) as u8
}

/// Mode of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Major,
    Minor,
}

/// A musical key: pitch class plus mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub note: u8,
    pub mode: Mode,
}

impl Key {
    pub fn new(note: u8, mode: Mode) -> Self {
        Self { note: note % 12, mode }
    }

    /// Parse a key written as `C`, `Bb`, `F#m`, `C-`, or bracketed `(Am)`.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix('(').unwrap_or(trimmed);
        let trimmed = trimmed.strip_suffix(')').unwrap_or(trimmed);

        let (name, mode) = match trimmed.strip_suffix(|c: char| c == 'm' || c == '-') {
            Some(name) if !name.is_empty() => (name, Mode::Minor),
            _ => (trimmed, Mode::Major),
        };
        note_index(name).map(|note| Self { note, mode })
    }

    pub fn prefers_flat(&self) -> bool {
        prefers_flat(self.note, self.mode)
    }

    /// Move the key up by `semitones`, keeping the mode.
    pub fn shifted(&self, semitones: u8) -> Self {
        Self::new((self.note + semitones % 12) % 12, self.mode)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.mode {
            Mode::Major => "",
            Mode::Minor => "m",
        };
        write!(f, "{}{}", spell(self.note, self.prefers_flat()), suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_index_covers_enharmonics() {
        assert_eq!(note_index("C"), Some(0));
        assert_eq!(note_index("C#"), Some(1));
        assert_eq!(note_index("Db"), Some(1));
        assert_eq!(note_index("B#"), Some(0));
        assert_eq!(note_index("Cb"), Some(11));
        assert_eq!(note_index("E#"), Some(5));
        assert_eq!(note_index("Fb"), Some(4));
        assert_eq!(note_index("H"), None);
        assert_eq!(note_index("C##"), None);
        assert_eq!(note_index(""), None);
    }

    #[test]
    fn test_spell_respects_preference() {
        assert_eq!(spell(1, false), "C#");
        assert_eq!(spell(1, true), "Db");
        assert_eq!(spell(10, true), "Bb");
        assert_eq!(spell(4, true), "E");
    }

    #[test]
    fn test_flat_tables() {
        assert!(prefers_flat(5, Mode::Major)); // F
        assert!(!prefers_flat(2, Mode::Major)); // D
        assert!(prefers_flat(9, Mode::Minor)); // Am
        assert!(!prefers_flat(4, Mode::Minor)); // Em
    }

    #[test]
    fn test_quality_vocabulary() {
        assert!(is_valid_quality(""));
        assert!(is_valid_quality("m7"));
        assert!(is_valid_quality("maj7"));
        assert!(is_valid_quality("sus4"));
        assert!(!is_valid_quality("m7(b5)"));
        assert!(is_valid_quality("add9"));
        assert!(is_valid_quality("°7"));
        assert!(!is_valid_quality("ood"));
        assert!(!is_valid_quality("min"));
    }

    #[test]
    fn test_key_parse() {
        assert_eq!(Key::parse("(Am)"), Some(Key::new(9, Mode::Minor)));
        assert_eq!(Key::parse("Bb"), Some(Key::new(10, Mode::Major)));
        assert_eq!(Key::parse("C-"), Some(Key::new(0, Mode::Minor)));
        assert_eq!(Key::parse("(D)"), Some(Key::new(2, Mode::Major)));
        assert_eq!(Key::parse("m"), None);
        assert_eq!(Key::parse("verse"), None);
    }

    #[test]
    fn test_key_display_and_shift() {
        let c = Key::new(0, Mode::Major);
        assert_eq!(c.shifted(3).to_string(), "Eb");
        assert_eq!(c.shifted(2).to_string(), "D");
        assert_eq!(Key::new(4, Mode::Minor).shifted(2).to_string(), "F#m");
        assert_eq!(interval(9, 4), 7);
    }
}
