//! # Songs
//!
//! A [`Song`] owns a tagged [`Script`] together with what was peeled off the
//! text before tagging and the keys it was written in.
//!
//! ## Import
//! Two conventions from hand-kept sheet files are stripped before tagging:
//!
//! - Everything after the last `---` is a comments block. Any `-` left at the
//!   end of the body is trimmed too.
//! - Leading `*` characters mark how unsure the writer was of the chart:
//!   confidence is `10` minus their count, with no lower bound.
//!
//! The title is the caller's name, else the first line of the body (up to
//! 20 characters), else `Untitled`.

use crate::error::SheetError;
use crate::nashville::to_nashville;
use crate::notes::Key;
use crate::script::Script;
use crate::settings::Settings;
use crate::tagger::tag;
use crate::transpose::{transpose, KeyState, Transposed, TranspositionRequest};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Blank lines between songs in a multi-song export.
pub const LINES_BETWEEN_SONGS: usize = 5;

const COMMENTS_DELIMITER: &str = "---";
const CONFIDENCE_MARK: char = '*';
const FULL_CONFIDENCE: i32 = 10;
const TITLE_LENGTH: usize = 20;
const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub comments: Option<String>,
    pub confidence: i32,
    pub script: Script,
    pub keys: KeyState,
}

/// Split off the trailing comments block.
fn strip_comments(text: &str) -> (&str, Option<&str>) {
    match text.rsplit_once(COMMENTS_DELIMITER) {
        Some((body, comments)) => {
            let trimmed = body.trim_end_matches('-');
            // a body of only dashes keeps its first one
            let body = if trimmed.is_empty() && !body.is_empty() {
                &body[..1]
            } else {
                trimmed
            };
            (body, Some(comments))
        }
        None => (text, None),
    }
}

/// Strip leading confidence marks, returning the rest and the confidence.
fn strip_confidence(text: &str) -> (&str, i32) {
    let body = text.trim_start_matches(CONFIDENCE_MARK);
    let marks = text.len() - body.len();
    (body, FULL_CONFIDENCE - marks as i32)
}

fn derive_title(body: &str) -> String {
    let first = body.lines().next().map(str::trim).unwrap_or_default();
    if first.is_empty() {
        UNTITLED.to_string()
    } else {
        first.chars().take(TITLE_LENGTH).collect()
    }
}

impl Song {
    /// Import a song from sheet text.
    ///
    /// # Examples
    /// ```
    /// use leadsheet::Song;
    ///
    /// let song = Song::from_text("**Amazing Grace\n(G)\nG C G\n---\ncapo 2", None);
    /// assert_eq!(song.title, "Amazing Grace");
    /// assert_eq!(song.confidence, 8);
    /// assert_eq!(song.comments.as_deref(), Some("\ncapo 2"));
    /// assert_eq!(song.script.to_text(), "Amazing Grace\n(G)\nG C G\n");
    /// ```
    pub fn from_text(text: &str, name: Option<&str>) -> Self {
        let (body, comments) = strip_comments(text);
        let (body, confidence) = strip_confidence(body);

        let title = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => derive_title(body),
        };
        debug!(%title, confidence, has_comments = comments.is_some(), "importing song");

        let script = tag(body);
        let keys = KeyState::for_script(&script, None);
        Self {
            title,
            comments: comments.map(str::to_string),
            confidence,
            script,
            keys,
        }
    }

    /// Rebuild a song from an already tagged script.
    pub fn from_parts(title: impl Into<String>, script: Script, default: Option<Key>) -> Self {
        let keys = KeyState::for_script(&script, default);
        Self {
            title: title.into(),
            comments: None,
            confidence: FULL_CONFIDENCE,
            script,
            keys,
        }
    }

    /// Set the key the song is shown in by default.
    pub fn with_default_key(mut self, default: Option<Key>) -> Self {
        self.keys = KeyState::new(self.keys.initial, default);
        self
    }

    fn run(&self, request: &TranspositionRequest, align: bool) -> Result<Transposed, SheetError> {
        let offset = self.keys.offset_for(request)?;
        Ok(transpose(&self.script, offset, &self.keys, align))
    }

    /// Transposed copy of the script. The song itself is left as is.
    pub fn transpose(&self, request: &TranspositionRequest) -> Result<Script, SheetError> {
        self.run(request, false).map(|t| t.script)
    }

    /// Nashville numbers for the song as written.
    pub fn nashville(&self) -> Result<Script, SheetError> {
        to_nashville(&self.script, self.keys.default, false)
    }

    /// The script as the settings ask for it: transposed if enabled, then
    /// converted to Nashville numbers if requested.
    pub fn render(&self, settings: &Settings) -> Result<Script, SheetError> {
        self.render_request(settings.request().as_ref(), settings)
    }

    /// Like [`Song::render`], with the transposition given explicitly instead
    /// of read from the settings.
    pub fn render_request(
        &self,
        request: Option<&TranspositionRequest>,
        settings: &Settings,
    ) -> Result<Script, SheetError> {
        let song = match settings.default_key()? {
            Some(default) => self.clone().with_default_key(Some(default)),
            None => self.clone(),
        };

        let (script, default) = match request {
            Some(request) => {
                let offset = song.keys.offset_for(request)?;
                let transposed = transpose(&song.script, offset, &song.keys, settings.align);
                (transposed.script, song.keys.shifted(offset).default)
            }
            None => (song.script, song.keys.default),
        };

        if settings.nashville {
            to_nashville(&script, default, settings.align)
        } else {
            Ok(script)
        }
    }
}

/// Join several songs as plain text, separated by blank lines.
pub fn export_many(songs: &[Song]) -> String {
    let mut out = String::new();
    for song in songs {
        out.push_str(&song.script.to_text());
        out.push_str(&"\n".repeat(LINES_BETWEEN_SONGS));
    }
    out
}
