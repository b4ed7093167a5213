//! Assigns a first-pass tag to each fragment.
//!
//! Rules are tried in order and the first that fires wins. Words whose tag
//! depends on the rest of the line (`A`, `Am`, `I`, bare numbers) are tagged
//! [`Tag::Ambiguous`] before any shape rule gets to them, so the resolver can
//! decide from context.

use crate::notes::HEADER_CHARS;
use crate::pattern::{match_shape, strip_trailing_punctuation, Shape};
use crate::script::Tag;

/// Words that are a chord, a header or a lyric depending on context.
pub const AMBIGUOUS_WORDS: [&str; 3] = ["A", "Am", "I"];

/// The single upper-case word that is a lyric, not a header.
const PRONOUN: &str = "I";

struct Rule {
    tag: Tag,
    test: fn(&str, Option<&Shape<'_>>) -> bool,
}

const RULES: &[Rule] = &[
    Rule { tag: Tag::Ambiguous, test: |w, _| is_ambiguous(w) },
    Rule { tag: Tag::Key, test: |_, s| s.is_some_and(|s| s.is_key()) },
    Rule { tag: Tag::SlashChord, test: |_, s| s.is_some_and(|s| s.is_slash_chord()) },
    Rule { tag: Tag::Chord, test: |_, s| s.is_some_and(|s| s.is_chord()) },
    Rule { tag: Tag::Header, test: |w, _| is_header(w) },
    Rule { tag: Tag::Whitespace, test: |w, _| is_whitespace(w) },
    Rule { tag: Tag::Newline, test: |w, _| w == "\n" },
    Rule { tag: Tag::Bar, test: |w, _| w == "/" || w == "|" },
];

/// Tag a fragment given its shape match (if any).
///
/// Falls back to [`Tag::Lyric`].
pub fn classify(fragment: &str, shape: Option<&Shape<'_>>) -> Tag {
    RULES
        .iter()
        .find(|rule| (rule.test)(fragment, shape))
        .map(|rule| rule.tag)
        .unwrap_or(Tag::Lyric)
}

/// Match and tag in one step.
pub fn classify_fragment(fragment: &str) -> Tag {
    let shape = match_shape(fragment);
    classify(fragment, shape.as_ref())
}

/// Ambiguous once any trailing punctuation is set aside, so `A,` and `Am.`
/// are decided from context like `A` and `Am`.
pub fn is_ambiguous(word: &str) -> bool {
    let word = strip_trailing_punctuation(word);
    AMBIGUOUS_WORDS.contains(&word) || is_digits(word)
}

pub fn is_digits(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_ascii_digit())
}

/// Has cased characters and none of them lower-case.
fn is_upper(word: &str) -> bool {
    let mut cased = false;
    for c in word.chars() {
        if c.is_lowercase() {
            return false;
        }
        cased |= c.is_uppercase();
    }
    cased
}

pub fn is_header(word: &str) -> bool {
    (is_upper(word) && word != PRONOUN)
        || is_digits(word)
        || (word.chars().count() == 1 && word.starts_with(|c: char| HEADER_CHARS.contains(&c)))
}

fn is_whitespace(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_whitespace() && c != '\n')
}

/// Whether `text` can carry `tag`.
///
/// Tags the transposer rewrites need the matching shape, and structural tags
/// need their literal characters. Headers and lyrics fit any text; transient
/// tags fit none.
pub fn admits(tag: Tag, text: &str) -> bool {
    let shape = match_shape(text);
    match tag {
        Tag::Key => shape.is_some_and(|s| s.is_key()),
        Tag::SlashChord => shape.is_some_and(|s| s.is_slash_chord()),
        Tag::Chord => shape.is_some_and(|s| s.is_chord()),
        Tag::Whitespace => is_whitespace(text),
        Tag::Newline => text == "\n",
        Tag::Bar => text == "/" || text == "|",
        Tag::Header | Tag::Lyric => true,
        Tag::Ambiguous | Tag::Typo => false,
    }
}

/// Tag a word from its own text, without shape rules or context. Last resort
/// for pieces nothing on the line could place.
pub fn classify_word(word: &str) -> Tag {
    if is_header(word) {
        Tag::Header
    } else if word == "/" || word == "|" {
        Tag::Bar
    } else {
        Tag::Lyric
    }
}
