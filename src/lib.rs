pub mod classify;
pub mod error;
pub mod nashville;
pub mod notes;
pub mod pattern;
pub mod resolve;
pub mod script;
pub mod settings;
pub mod slicer;
pub mod song;
pub mod tagger;
pub mod transpose;

pub use error::*;
pub use nashville::to_nashville;
pub use notes::{Key, Mode};
pub use script::{Position, Script, Tag, Token};
pub use settings::Settings;
pub use song::{export_many, Song};
pub use tagger::tag;
pub use transpose::{KeyState, Transposed, TranspositionRequest};

/// Tag a sheet and render it with the given settings.
/// This is the main entry point for the library.
///
/// ```
/// use leadsheet::{render, Settings};
///
/// let settings = Settings { key: Some("D".to_string()), ..Settings::default() };
/// let script = render("(C)\nAm F G\n", &settings).unwrap();
/// assert_eq!(script.to_text(), "(D)\nBm G A\n");
/// ```
pub fn render(text: &str, settings: &Settings) -> Result<Script, SheetError> {
    Song::from_text(text, None).render(settings)
}
