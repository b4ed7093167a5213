//! # Nashville Numbers
//!
//! Rewrites chords as scale degrees of the key in force: in C, `Em` becomes
//! `3-` and `G7` becomes `5^7`. Key tokens become `(1)` or `(1-)` and move
//! the reference for everything after them.

use crate::error::SheetError;
use crate::notes::{interval, Key, Mode, NASH_MAJOR_FLATS, NASH_MAJOR_SHARPS, NASH_MINOR_SHARPS};
use crate::pattern::match_shape;
use crate::script::{Script, Tag, Token};
use crate::transpose::realign;
use std::borrow::Cow;
use tracing::debug;

/// Degree table for a key.
fn degrees(key: Key) -> &'static [&'static str; 12] {
    match key.mode {
        Mode::Major if key.prefers_flat() => &NASH_MAJOR_FLATS,
        Mode::Major => &NASH_MAJOR_SHARPS,
        Mode::Minor => &NASH_MINOR_SHARPS,
    }
}

/// Nashville shorthand for a chord quality.
///
/// ```
/// use leadsheet::nashville::quality_symbol;
///
/// assert_eq!(quality_symbol("maj7"), "Δ");
/// assert_eq!(quality_symbol("m7"), "-7");
/// assert_eq!(quality_symbol("sus4"), "sus4");
/// ```
pub fn quality_symbol(quality: &str) -> Cow<'_, str> {
    let symbol = match quality {
        "m" | "-" => "-",
        "maj7" | "Maj7" => "Δ",
        "7" => "^7",
        "dim" => "°",
        "dim7" => "°7",
        "augmin7" => "+^7",
        q if q.eq_ignore_ascii_case("augmaj7") => "+Δ",
        q => {
            return match q.strip_prefix('m') {
                Some(rest) if !q.starts_with("maj") => Cow::Owned(format!("-{rest}")),
                _ => Cow::Borrowed(q),
            }
        }
    };
    Cow::Borrowed(symbol)
}

fn degree(note: u8, key: Key) -> &'static str {
    degrees(key)[interval(key.note, note) as usize]
}

fn number_chord(text: &str, key: Key) -> Option<String> {
    let shape = match_shape(text)?;
    let mut out = format!("{}{}", degree(shape.root_index()?, key), quality_symbol(shape.quality));
    if shape.bass.is_some() {
        out.push('/');
        out.push_str(degree(shape.bass_index()?, key));
    }
    out.push_str(shape.remainder);
    Some(out)
}

fn number_key(text: &str) -> Option<(String, Key)> {
    let shape = match_shape(text)?;
    let key = shape.key()?;
    let one = match key.mode {
        Mode::Major => "1",
        Mode::Minor => "1-",
    };
    Some((format!("({one}){}", shape.remainder), key))
}

/// Convert a script to Nashville numbers.
///
/// The reference key is the first key token in the script, or `default` if
/// the script has none.
///
/// # Errors
/// [`SheetError::MissingKey`] if there is no key to count from.
///
/// # Examples
/// ```
/// use leadsheet::{nashville::to_nashville, tag};
///
/// let script = to_nashville(&tag("(C)\nEm Am7 G7\n"), None, false).unwrap();
/// assert_eq!(script.to_text(), "(1)\n3- 6-7 5^7\n");
/// ```
pub fn to_nashville(script: &Script, default: Option<Key>, align: bool) -> Result<Script, SheetError> {
    let mut key = script.first_key().or(default).ok_or(SheetError::MissingKey)?;
    debug!(%key, "converting to Nashville numbers");

    let mut tokens = Vec::with_capacity(script.len());
    for token in script {
        let text = match token.tag {
            Tag::Key => number_key(&token.text).map(|(text, new_key)| {
                key = new_key;
                text
            }),
            Tag::Chord | Tag::SlashChord => number_chord(&token.text, key),
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
    Ok(Script::new(tokens).reposition())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::tag;

    fn numbers(text: &str) -> String {
        to_nashville(&tag(text), None, false).unwrap().to_text()
    }

    #[test]
    fn test_minor_chord_in_major_key() {
        assert_eq!(numbers("(C)\nEm\n"), "(1)\n3-\n");
    }

    #[test]
    fn test_quality_substitutions() {
        assert_eq!(quality_symbol("m"), "-");
        assert_eq!(quality_symbol("-"), "-");
        assert_eq!(quality_symbol("Maj7"), "Δ");
        assert_eq!(quality_symbol("7"), "^7");
        assert_eq!(quality_symbol("dim"), "°");
        assert_eq!(quality_symbol("dim7"), "°7");
        assert_eq!(quality_symbol("augmin7"), "+^7");
        assert_eq!(quality_symbol("AugMaj7"), "+Δ");
        assert_eq!(quality_symbol("m7"), "-7");
        assert_eq!(quality_symbol("maj9"), "maj9");
        assert_eq!(quality_symbol(""), "");
    }

    #[test]
    fn test_flat_and_sharp_degrees() {
        // F major prefers flats
        assert_eq!(numbers("(F)\nBb Db\n"), "(1)\n4 b6\n");
        // D major prefers sharps
        assert_eq!(numbers("(D)\nG# F#m\n"), "(1)\n#4 3-\n");
    }

    #[test]
    fn test_minor_key_table() {
        assert_eq!(numbers("(Am)\nAm G F E7\n"), "(1-)\n1- #6 6 5^7\n");
    }

    #[test]
    fn test_slash_chords() {
        assert_eq!(numbers("(G)\nC/G D/F#\n"), "(1)\n4/1 5/7\n");
    }

    #[test]
    fn test_key_change_moves_reference() {
        assert_eq!(numbers("(C)\nG\n(G)\nG\n"), "(1)\n5\n(1)\n1\n");
    }

    #[test]
    fn test_default_key_and_missing_key() {
        let script = tag("D G\n");
        let out = to_nashville(&script, Key::parse("D"), false).unwrap();
        assert_eq!(out.to_text(), "1 4\n");
        assert!(matches!(
            to_nashville(&script, None, false),
            Err(SheetError::MissingKey)
        ));
    }

    #[test]
    fn test_align_keeps_lyrics_under_chords() {
        let script = tag("(C)\nCmaj7  G\nhello  you\n");
        let out = to_nashville(&script, None, true).unwrap();
        assert_eq!(out.to_text(), "(1)\n1Δ     5\nhello  you\n");
        assert_eq!(out.tokens()[4].position.column, 7);
        assert!(!out.has_transient());
    }
}
