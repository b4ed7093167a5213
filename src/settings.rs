//! # Render Settings
//!
//! Caller preferences for showing a song, loaded from YAML:
//!
//! ```yaml
//! enabled: true
//! key: "+2"
//! default-key: G
//! nashville: false
//! align: true
//! ```
//!
//! Every field is optional.

use crate::error::SheetError;
use crate::notes::Key;
use crate::transpose::TranspositionRequest;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// Transpose at all. Nashville output does not depend on this.
    pub enabled: bool,
    /// Show chords as Nashville numbers.
    pub nashville: bool,
    /// Transposition target: a key, a relative number, or anything else to
    /// show the default key.
    pub key: Option<String>,
    /// Key the song is shown in when no target is given.
    pub default_key: Option<String>,
    /// Resize whitespace after rewritten chords to keep later tokens in place.
    pub align: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            nashville: false,
            key: None,
            default_key: None,
            align: false,
        }
    }
}

impl Settings {
    /// Parse settings from a YAML document. An empty document gives the
    /// defaults.
    pub fn from_yaml(content: &str) -> Result<Self, SheetError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| SheetError::InvalidSettings(e.to_string()))
    }

    /// The default key, if one is set.
    pub fn default_key(&self) -> Result<Option<Key>, SheetError> {
        match self.default_key.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => Key::parse(text)
                .map(Some)
                .ok_or_else(|| SheetError::InvalidSettings(format!("Invalid default key: {}", text))),
        }
    }

    /// The transposition these settings ask for, if any.
    pub fn request(&self) -> Option<TranspositionRequest> {
        if !self.enabled {
            return None;
        }
        self.key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(TranspositionRequest::target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::Mode;

    #[test]
    fn test_parse_full() {
        let settings = Settings::from_yaml(
            "enabled: true\nnashville: true\nkey: \"+2\"\ndefault-key: Bb\nalign: true\n",
        )
        .unwrap();
        assert!(settings.nashville);
        assert!(settings.align);
        assert_eq!(settings.request(), Some(TranspositionRequest::target("+2")));
        assert_eq!(settings.default_key().unwrap(), Some(Key::new(10, Mode::Major)));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings = Settings::from_yaml("key: D\n").unwrap();
        assert!(settings.enabled);
        assert!(!settings.nashville);
        assert_eq!(settings.default_key().unwrap(), None);
        assert_eq!(Settings::from_yaml("").unwrap(), Settings::default());
    }

    #[test]
    fn test_disabled_or_blank_key_means_no_request() {
        let settings = Settings::from_yaml("enabled: false\nkey: D\n").unwrap();
        assert_eq!(settings.request(), None);

        let settings = Settings::from_yaml("key: '  '\n").unwrap();
        assert_eq!(settings.request(), None);
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            Settings::from_yaml("enabled: [1, 2"),
            Err(SheetError::InvalidSettings(_))
        ));
        assert!(matches!(
            Settings::from_yaml("nashville: maybe\n"),
            Err(SheetError::InvalidSettings(_))
        ));

        let settings = Settings::from_yaml("default-key: H\n").unwrap();
        assert!(matches!(settings.default_key(), Err(SheetError::InvalidSettings(_))));
    }
}
