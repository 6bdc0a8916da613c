//! Project-wide language settings, loaded once from `settings.json` and
//! passed by reference to whatever needs fonts or language files.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageEntry {
    /// Display name, as it appears in the file label.
    pub name: String,
    #[serde(default)]
    pub culture: String,
    /// Language file, relative to the settings file.
    pub file: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Font names addressed by the `Font:` index of entity records.
    pub fonts: Vec<String>,
    pub languages: Vec<LanguageEntry>,
    pub default_language: Option<String>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut settings = Self::from_json(&fs::read_to_string(path)?)?;
        settings.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        tracing::debug!(
            "Loaded {} fonts and {} languages from {}",
            settings.fonts.len(),
            settings.languages.len(),
            path.display()
        );
        Ok(settings)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn font_name(&self, index: i32) -> Option<&str> {
        let index = usize::try_from(index).ok()?;
        self.fonts.get(index).map(String::as_str)
    }

    pub fn language(&self, name: &str) -> Option<&LanguageEntry> {
        self.languages
            .iter()
            .find(|lang| lang.name.eq_ignore_ascii_case(name))
    }

    pub fn language_path(&self, entry: &LanguageEntry) -> PathBuf {
        self.base_dir.join(&entry.file)
    }

    /// File of the selected language if it exists, otherwise the default
    /// language's file if that exists.
    pub fn resolve_language_file(&self, selected: &str) -> Option<PathBuf> {
        let existing = |name: &str| {
            self.language(name)
                .map(|entry| self.language_path(entry))
                .filter(|path| path.is_file())
        };

        if let Some(path) = existing(selected) {
            return Some(path);
        }
        let fallback = self.default_language.as_deref()?;
        tracing::warn!(
            "No language file for {:?}; falling back to {:?}",
            selected,
            fallback
        );
        existing(fallback)
    }
}
