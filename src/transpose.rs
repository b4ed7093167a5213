//! # Transposition
//!
//! Shifts keys, chords and slash chords by a semitone offset and picks the
//! spelling from the key in force at each point of the song.
//!
//! ## Offsets
//! Callers ask for a transposition with a [`TranspositionRequest`]. A raw
//! [`TranspositionRequest::Offset`] must already be in `0..=11`. A
//! [`TranspositionRequest::Target`] is read relative to the song's keys:
//!
//! | target            | offset                          |
//! |-------------------|---------------------------------|
//! | `"+3"`, `"-2"`    | `n + default - initial`         |
//! | `"Eb"`, `"(F#m)"` | `target - initial` (or default) |
//! | anything else     | `default - initial` (reset)     |
//!
//! all taken mod 12. A song with no key at all always resolves to 0.
//!
//! ## Spelling
//! A key token is spelled from its own new key (`Bb` major, `F#` major). A
//! chord is spelled from the key in force when it is reached: the last key
//! token before it, or the song's default key. With no key in force chords
//! use sharps.

use crate::error::SheetError;
use crate::notes::{interval, spell, Key};
use crate::pattern::{match_shape, Shape};
use crate::script::{Script, Tag, Token};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// How far to move a song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranspositionRequest {
    /// Semitones up, `0..=11`.
    Offset(i32),
    /// A key (`"D"`, `"(Bbm)"`), a relative number (`"+2"`, `"-5"`), or
    /// anything else to go back to the default key.
    Target(String),
}

impl TranspositionRequest {
    pub fn target(text: impl Into<String>) -> Self {
        TranspositionRequest::Target(text.into())
    }
}

/// The three keys a song keeps track of.
///
/// `default` falls back to `initial`, and `current` starts at `default`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyState {
    /// The first key token in the song.
    pub initial: Option<Key>,
    /// The key the caller wants the song shown in by default.
    pub default: Option<Key>,
    /// The key in force, updated as key tokens are transposed.
    pub current: Option<Key>,
}

impl KeyState {
    pub fn new(initial: Option<Key>, default: Option<Key>) -> Self {
        let default = default.or(initial);
        Self {
            initial,
            default,
            current: default,
        }
    }

    /// Keys for a tagged script, with an optional caller default.
    pub fn for_script(script: &Script, default: Option<Key>) -> Self {
        Self::new(script.first_key(), default)
    }

    /// Whether chords in the current key are spelled with flats. Sharps when
    /// there is no key.
    pub fn current_prefers_flat(&self) -> bool {
        self.current.is_some_and(|k| k.prefers_flat())
    }

    /// The same keys after moving the whole song up `offset` semitones.
    pub fn shifted(&self, offset: u8) -> Self {
        Self {
            initial: self.initial.map(|k| k.shifted(offset)),
            default: self.default.map(|k| k.shifted(offset)),
            current: self.current.map(|k| k.shifted(offset)),
        }
    }

    /// Turn a request into a semitone offset in `0..12`.
    ///
    /// # Examples
    /// ```
    /// use leadsheet::{Key, KeyState, Mode, TranspositionRequest};
    ///
    /// let keys = KeyState::new(Some(Key::new(0, Mode::Major)), None);
    /// assert_eq!(keys.offset_for(&TranspositionRequest::target("D")).unwrap(), 2);
    /// assert_eq!(keys.offset_for(&TranspositionRequest::target("-1")).unwrap(), 11);
    /// assert!(keys.offset_for(&TranspositionRequest::Offset(12)).is_err());
    /// ```
    pub fn offset_for(&self, request: &TranspositionRequest) -> Result<u8, SheetError> {
        let offset = match request {
            TranspositionRequest::Offset(n) => {
                if !(0..12).contains(n) {
                    return Err(SheetError::InvalidOffset { offset: *n });
                }
                *n as u8
            }
            TranspositionRequest::Target(text) => self.offset_for_target(text.trim()),
        };
        debug!(?request, offset, "resolved transposition offset");
        Ok(offset)
    }

    fn offset_for_target(&self, target: &str) -> u8 {
        let (initial, default) = match (self.initial.or(self.default), self.default.or(self.initial)) {
            (Some(initial), Some(default)) => (initial, default),
            _ => {
                debug!(target, "song has no key, not transposing");
                return 0;
            }
        };

        if let Some(n) = parse_relative(target) {
            let shift = n + default.note as i64 - initial.note as i64;
            return shift.rem_euclid(12) as u8;
        }

        match match_shape(target).filter(is_target_shape).and_then(|s| s.root_index()) {
            Some(note) => match self.initial {
                Some(initial) => interval(initial.note, note),
                None => interval(default.note, note),
            },
            None => interval(initial.note, default.note),
        }
    }
}

/// `"3"`, `"+3"` or `"-3"`.
fn parse_relative(target: &str) -> Option<i64> {
    let digits = target.strip_prefix(['+', '-']).unwrap_or(target);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    // reduce before parsing so long digit strings can't overflow
    let n = digits
        .bytes()
        .fold(0i64, |acc, b| (acc * 10 + (b - b'0') as i64) % 12);
    Some(if target.starts_with('-') { -n } else { n })
}

fn is_target_shape(shape: &Shape<'_>) -> bool {
    shape.is_key() || shape.is_chord()
}

/// Result of transposing a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transposed {
    pub script: Script,
    /// Keys after the run, with `current` left at the last key reached.
    pub keys: KeyState,
}

/// Spell `note` moved up `offset` semitones.
fn shift_note(note: u8, offset: u8, prefer_flat: bool) -> &'static str {
    spell((note + offset) % 12, prefer_flat)
}

fn transpose_key(text: &str, offset: u8) -> Option<(String, Key)> {
    let shape = match_shape(text)?;
    let key = shape.key()?.shifted(offset);
    let note = spell(key.note, key.prefers_flat());
    Some((format!("({}{}){}", note, shape.quality, shape.remainder), key))
}

fn transpose_chord(text: &str, offset: u8, prefer_flat: bool) -> Option<String> {
    let shape = match_shape(text)?;
    let root = shift_note(shape.root_index()?, offset, prefer_flat);
    let mut out = format!("{}{}", root, shape.quality);
    if shape.bass.is_some() {
        out.push('/');
        out.push_str(shift_note(shape.bass_index()?, offset, prefer_flat));
    }
    out.push_str(shape.remainder);
    Some(out)
}

/// Transpose a script up `offset` semitones.
///
/// Tokens are visited in order, so a key change part way through a song
/// changes the spelling of every chord after it. An offset of 0 returns the
/// script as it was.
pub fn transpose(script: &Script, offset: u8, keys: &KeyState, align: bool) -> Transposed {
    let offset = offset % 12;
    if offset == 0 {
        return Transposed {
            script: script.clone(),
            keys: *keys,
        };
    }

    info!(offset, tokens = script.len(), "transposing");

    let mut state = KeyState {
        current: keys.default,
        ..*keys
    };
    let mut tokens = Vec::with_capacity(script.len());

    for token in script {
        let text = match token.tag {
            Tag::Key => transpose_key(&token.text, offset).map(|(text, key)| {
                debug!(position = %token.position, from = ?state.current, to = %key, "key change");
                state.current = Some(key);
                text
            }),
            Tag::Chord | Tag::SlashChord => {
                transpose_chord(&token.text, offset, state.current_prefers_flat())
            }
            _ => None,
        };
        tokens.push(match text {
            Some(text) => Token::new(token.position, token.tag, text),
            None => token.clone(),
        });
    }

    let tokens = if align {
        realign(script.tokens(), tokens)
    } else {
        tokens
    };

    Transposed {
        script: Script::new(tokens).reposition(),
        keys: state,
    }
}

/// Resize whitespace so that the token after it starts at the column it had
/// in `original`, keeping at least one space.
///
/// `rewritten` must be token-for-token parallel to `original`.
pub(crate) fn realign(original: &[Token], rewritten: Vec<Token>) -> Vec<Token> {
    let mut column = 0usize;
    let mut out = Vec::with_capacity(rewritten.len());

    for (before, mut token) in original.iter().zip(rewritten) {
        let drift = before.position.column as isize - column as isize;
        if token.tag == Tag::Whitespace && column > 0 && drift != 0 {
            let width = token.text.chars().count() as isize;
            token.text = " ".repeat((width + drift).max(1) as usize);
        }

        if token.tag == Tag::Newline {
            column = 0;
        } else {
            column += token.text.chars().count();
        }
        out.push(token);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::Mode;
    use crate::tagger::tag;

    fn key(text: &str) -> Key {
        Key::parse(text).unwrap()
    }

    fn run(text: &str, offset: u8) -> Script {
        let script = tag(text);
        let keys = KeyState::for_script(&script, None);
        transpose(&script, offset, &keys, false).script
    }

    #[test]
    fn test_up_a_whole_step() {
        let script = run("(C)\nAm F G\n", 2);
        assert_eq!(script.texts(), vec!["(D)", "\n", "Bm", " ", "G", " ", "A", "\n"]);
    }

    #[test]
    fn test_key_change_sets_spelling() {
        let script = run("(C)\nG\n", 2);
        assert_eq!(script.texts(), vec!["(D)", "\n", "A", "\n"]);

        // Db major spells with flats, so the chord after it does too
        let script = run("(D)\nE\n(Bb)\nF\n", 3);
        assert_eq!(script.texts(), vec!["(F)", "\n", "G", "\n", "(Db)", "\n", "Ab", "\n"]);
    }

    #[test]
    fn test_minor_key_uses_minor_table() {
        let script = run("(Em)\nEm C\n", 5);
        // Am prefers flats
        assert_eq!(script.texts()[0], "(Am)");
        assert_eq!(script.texts()[2], "Am");
        assert_eq!(script.texts()[4], "F");

        let script = run("(F#-) D", 1);
        assert_eq!(script.texts()[0], "(G-)");
        assert_eq!(script.texts()[2], "Eb");
    }

    #[test]
    fn test_no_key_uses_sharps() {
        let script = run("C F\n", 1);
        assert_eq!(script.texts(), vec!["C#", " ", "F#", "\n"]);
    }

    #[test]
    fn test_slash_chords_and_punctuation() {
        let script = run("(G)\nD/F# Em7, C\n", 5);
        assert_eq!(script.texts()[2], "G/B");
        assert_eq!(script.texts()[4], "Am7,");
        assert_eq!(script.texts()[6], "F");
    }

    #[test]
    fn test_zero_offset_is_identity() {
        let script = tag("(Bb)\nGm7 Eb/G\n");
        let keys = KeyState::for_script(&script, None);
        assert_eq!(transpose(&script, 0, &keys, true).script, script);
        assert_eq!(transpose(&script, 12, &keys, true).script, script);
    }

    #[test]
    fn test_round_trip_restores_text() {
        let text = "(Bb)\nGm7 Eb/G F\n(D)\nBm G D/F#\n";
        let script = tag(text);
        let keys = KeyState::for_script(&script, None);
        for n in 1..12u8 {
            let up = transpose(&script, n, &keys, false);
            let back_keys = KeyState::for_script(&up.script, None);
            let back = transpose(&up.script, (12 - n) % 12, &back_keys, false);
            assert_eq!(back.script.to_text(), text, "offset {n}");
        }
    }

    #[test]
    fn test_current_key_tracks_last_key_token() {
        let script = tag("(C)\nG\n(A)\nE\n");
        let keys = KeyState::for_script(&script, None);
        let out = transpose(&script, 2, &keys, false);
        assert_eq!(out.keys.current, Some(key("B")));
        assert_eq!(out.keys.initial, Some(key("C")));
    }

    #[test]
    fn test_positions_follow_new_lengths() {
        let script = run("C G\nla\n", 1);
        assert_eq!(script.texts(), vec!["C#", " ", "G#", "\n", "la", "\n"]);
        assert_eq!(script.tokens()[2].position.column, 3);
        assert_eq!(script.tokens()[4].position.line, 2);
    }

    #[test]
    fn test_align_keeps_columns() {
        let script = tag("C    G\nla   la\n");
        let keys = KeyState::for_script(&script, None);
        let out = transpose(&script, 1, &keys, true).script;
        assert_eq!(out.to_text(), "C#   G#\nla   la\n");

        // never shrinks below one space
        let script = tag("C G\n");
        let out = transpose(&script, 1, &keys, true).script;
        assert_eq!(out.to_text(), "C# G#\n");
    }

    #[test]
    fn test_offset_requests() {
        let keys = KeyState::new(Some(key("C")), None);
        assert_eq!(keys.offset_for(&TranspositionRequest::Offset(0)).unwrap(), 0);
        assert_eq!(keys.offset_for(&TranspositionRequest::Offset(11)).unwrap(), 11);
        assert!(matches!(
            keys.offset_for(&TranspositionRequest::Offset(-1)),
            Err(SheetError::InvalidOffset { offset: -1 })
        ));
    }

    #[test]
    fn test_target_requests() {
        let keys = KeyState::new(Some(key("C")), Some(key("D")));
        let offset = |t: &str| keys.offset_for(&TranspositionRequest::target(t)).unwrap();
        assert_eq!(offset("Eb"), 3);
        assert_eq!(offset("(Am)"), 9);
        assert_eq!(offset("+1"), 3);
        assert_eq!(offset("-3"), 11);
        assert_eq!(offset("25"), 3);
        // unreadable targets reset to the default key
        assert_eq!(offset("Hm"), 2);
        assert_eq!(offset(""), 2);
    }

    #[test]
    fn test_target_without_initial_key() {
        let keys = KeyState::new(None, Some(Key::new(7, Mode::Major)));
        let offset = |t: &str| keys.offset_for(&TranspositionRequest::target(t)).unwrap();
        assert_eq!(offset("A"), 2);
        assert_eq!(offset("4"), 4);
        assert_eq!(offset("reset"), 0);
    }

    #[test]
    fn test_shifted_moves_every_key() {
        let keys = KeyState::new(Some(key("C")), Some(key("Am"))).shifted(3);
        assert_eq!(keys.initial, Some(key("Eb")));
        assert_eq!(keys.default, Some(key("Cm")));
        assert_eq!(keys.current, Some(key("Cm")));
        assert_eq!(KeyState::default().shifted(5), KeyState::default());
    }

    #[test]
    fn test_target_without_any_key() {
        let keys = KeyState::default();
        let request = TranspositionRequest::target("F#");
        assert_eq!(keys.offset_for(&request).unwrap(), 0);
    }
}
