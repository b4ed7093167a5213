//! # Error Types
//!
//! The tagging and transposition pipeline never fails on malformed sheet text:
//! broken brackets, stray slashes and ambiguous words all have a fallback tag.
//! The variants below are reserved for callers that break the contract of an
//! operation (an out-of-range offset, Nashville output without any key) and for
//! the settings/file surface around the core.
//!
//! ## Usage
//! ```rust
//! use leadsheet::{Song, SheetError, TranspositionRequest};
//!
//! let song = Song::from_text("(C)\nAm F G\n", None);
//! match song.transpose(&TranspositionRequest::Offset(14)) {
//!     Err(SheetError::InvalidOffset { offset }) => assert_eq!(offset, 14),
//!     _ => unreachable!(),
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetError {
    /// A raw semitone offset outside `0..=11`.
    ///
    /// # Example
    /// ```
    /// # use leadsheet::SheetError;
    /// let err = SheetError::InvalidOffset { offset: 12 };
    /// assert_eq!(err.to_string(), "Invalid transposition offset 12: expected 0-11 semitones");
    /// ```
    #[error("Invalid transposition offset {offset}: expected 0-11 semitones")]
    InvalidOffset { offset: i32 },

    /// Nashville numbers were requested for a song with no key token and no
    /// default key, so there is nothing to count scale degrees from.
    #[error("Nashville conversion requires a key, but the song has none")]
    MissingKey,

    /// The YAML settings document could not be read.
    ///
    /// # Example
    /// ```
    /// # use leadsheet::SheetError;
    /// let err = SheetError::InvalidSettings("expected a mapping".to_string());
    /// assert_eq!(err.to_string(), "Invalid settings: expected a mapping");
    /// ```
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// A script could not be written out as YAML.
    #[error("Could not serialize token stream: {0}")]
    Output(String),

    /// Reading or writing a file on behalf of the command line tool failed.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
