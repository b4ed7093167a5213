//! # Line Resolver
//!
//! Second pass over the tagger's output, one line at a time. A line is every
//! token up to and including a newline (the last line of a document may have
//! no newline).
//!
//! ## Stages
//! 1. **Typo repair**: a fragment shaped like a broken key or chord (`(Cm`,
//!    `G7/`) is split at its seams. Brackets and slashes become typo pieces,
//!    note pieces that stand alone as chords become chords. This runs first so
//!    that broken shapes don't skew the line statistics below.
//! 2. **Ambiguity resolution**: `A`/`Am`, bare numbers and `I` take a tag from
//!    the rest of the line.
//! 3. **Reassignment**: headers, lyrics and leftover typo pieces are brought
//!    in line with a header-led line or a clear line majority.
//!
//! ## Majority
//! The majority tag is the most frequent tag on the line, ignoring whitespace,
//! keys, bars, newlines, chords and transient tags. Ties go to the tag seen
//! first. It only overrides an existing tag when it occurs more than
//! [`MAJORITY_THRESHOLD`] times.
//!
//! Every branch has a fallback, and the fallback of last resort is
//! [`Tag::Lyric`]. Nothing here fails, and no [`Tag::Ambiguous`] or
//! [`Tag::Typo`] token leaves [`resolve_line`].

use crate::classify::{admits, classify_word, is_ambiguous, is_digits};
use crate::pattern::{is_chord, match_shape, strip_trailing_punctuation, Piece};
use crate::script::{Position, Tag, Token};
use tracing::debug;

/// A line's majority must occur more than this many times to override a tag
/// that disagrees with it.
pub const MAJORITY_THRESHOLD: usize = 2;

/// Neighbour tags that mark `A`/`Am` as a chord.
const CHORDY_NEIGHBOURS: [Tag; 3] = [Tag::Chord, Tag::SlashChord, Tag::Bar];

/// Tags left out of the majority count.
const MAJORITY_IGNORED: [Tag; 5] = [Tag::Whitespace, Tag::Key, Tag::Bar, Tag::Newline, Tag::Chord];

/// Most frequent counted tag on a line, with its count.
pub fn majority(line: &[Token]) -> Option<(Tag, usize)> {
    let mut counts: Vec<(Tag, usize)> = Vec::new();
    for token in line {
        if MAJORITY_IGNORED.contains(&token.tag) || token.tag.is_transient() {
            continue;
        }
        match counts.iter_mut().find(|(tag, _)| *tag == token.tag) {
            Some((_, count)) => *count += 1,
            None => counts.push((token.tag, 1)),
        }
    }

    // first-seen wins ties
    let mut best: Option<(Tag, usize)> = None;
    for (tag, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((tag, count));
        }
    }
    best
}

/// Split broken transposable shapes into pieces.
///
/// Only lyric and header tokens can be broken shapes: a complete key or chord
/// was already tagged as one.
pub fn repair_typos(line: &[Token]) -> Vec<Token> {
    let mut fixed = Vec::with_capacity(line.len());

    for token in line {
        if !matches!(token.tag, Tag::Lyric | Tag::Header) {
            fixed.push(token.clone());
            continue;
        }
        let shape = match match_shape(&token.text) {
            Some(shape) if shape.typos().any() => shape,
            _ => {
                fixed.push(token.clone());
                continue;
            }
        };

        debug!(position = %token.position, text = %token.text, "splitting malformed chord shape");

        let mut column = token.position.column;
        for piece in shape.pieces() {
            let text = piece.text();
            let tag = match piece {
                Piece::Note(note) if is_ambiguous(note) => Tag::Ambiguous,
                Piece::Note(note) if is_chord(note) => Tag::Chord,
                _ => Tag::Typo,
            };
            fixed.push(Token::new(Position::new(token.position.line, column), tag, text));
            column += text.chars().count();
        }
    }

    fixed
}

/// `A` or `Am`: a chord next to chords or bars, a header among headers,
/// otherwise a lyric. Trailing punctuation (`A,`) doesn't change the word.
fn ambiguous_a_am(line: &[Token], i: usize) -> Option<Tag> {
    let word = strip_trailing_punctuation(&line[i].text);
    if word != "A" && word != "Am" {
        return None;
    }

    let neighbours = || line.iter().enumerate().filter(move |(j, _)| *j != i).map(|(_, t)| t.tag);
    if neighbours().any(|tag| CHORDY_NEIGHBOURS.contains(&tag)) {
        Some(Tag::Chord)
    } else if neighbours().any(|tag| tag == Tag::Header) {
        Some(Tag::Header)
    } else {
        Some(Tag::Lyric)
    }
}

/// A bare number follows the token two places back (`VERSE 2`).
fn ambiguous_digit(line: &[Token], i: usize) -> Option<Tag> {
    let token = &line[i];
    if !is_digits(strip_trailing_punctuation(&token.text)) {
        return None;
    }
    match i.checked_sub(2).map(|j| &line[j]) {
        None => Some(Tag::Lyric),
        Some(earlier) if admits(earlier.tag, &token.text) => Some(earlier.tag),
        // an earlier ambiguous or structural token says nothing; try the line
        Some(_) => None,
    }
}

/// Fall in with the line majority.
fn ambiguous_to_majority(line: &[Token], i: usize, most: Option<(Tag, usize)>) -> Option<Tag> {
    most.map(|(tag, _)| tag).filter(|tag| admits(*tag, &line[i].text))
}

fn resolve_ambiguous(line: &[Token], i: usize, most: Option<(Tag, usize)>) -> Tag {
    ambiguous_a_am(line, i)
        .or_else(|| ambiguous_digit(line, i))
        .or_else(|| ambiguous_to_majority(line, i, most))
        .unwrap_or(Tag::Lyric)
}

/// A line whose second token is a header is a header line.
fn reassign_header_precedence(line: &[Token]) -> Option<Tag> {
    line.get(1)
        .filter(|second| second.tag == Tag::Header)
        .map(|_| Tag::Header)
}

/// A strong majority overrides stray tags.
fn reassign_most_precedence(line: &[Token], i: usize, most: Option<(Tag, usize)>) -> Option<Tag> {
    let (tag, count) = most?;
    let token = &line[i];
    (token.tag != tag && count > MAJORITY_THRESHOLD && admits(tag, &token.text)).then_some(tag)
}

fn reassign(line: &[Token], i: usize, most: Option<(Tag, usize)>) -> Tag {
    let tag = reassign_header_precedence(line)
        .or_else(|| reassign_most_precedence(line, i, most))
        .unwrap_or(line[i].tag);

    if tag == Tag::Typo {
        classify_word(&line[i].text)
    } else {
        tag
    }
}

/// Repair and resolve one line.
pub fn resolve_line(line: &[Token]) -> Vec<Token> {
    let line = repair_typos(line);
    let most = majority(&line);

    line.iter()
        .enumerate()
        .map(|(i, token)| {
            let tag = match token.tag {
                Tag::Whitespace | Tag::Key | Tag::Bar | Tag::Newline | Tag::Chord | Tag::SlashChord => {
                    token.tag
                }
                Tag::Ambiguous => {
                    let tag = resolve_ambiguous(&line, i, most);
                    debug!(position = %token.position, text = %token.text, %tag, "resolved ambiguous word");
                    tag
                }
                Tag::Header | Tag::Lyric | Tag::Typo => reassign(&line, i, most),
            };
            token.retagged(tag)
        })
        .collect()
}
