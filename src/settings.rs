//! Last-used settings of the command line tool.
//!
//! The settings file is a small JSON document. Loading merges whatever it
//! holds over the defaults; saving rewrites only the keys known here, so
//! anything else a user put into the file survives.

use crate::error::Result;

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One set of user choices. Pattern lists are kept comma-separated, as typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub url: String,
    pub output_dir: String,
    pub token: String,
    pub include_patterns: String,
    pub exclude_patterns: String,
    pub max_workers: usize,
    pub progress_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: String::new(),
            output_dir: Self::DEFAULT_OUTPUT_DIR.into(),
            token: String::new(),
            include_patterns: String::new(),
            exclude_patterns: String::new(),
            max_workers: 3,
            progress_file: "download_progress.json".into(),
        }
    }
}

impl Settings {
    pub const DEFAULT_OUTPUT_DIR: &'static str = "./downloads";

    /// Human readable summary of the non-default values. The token is cut to
    /// its first 8 characters.
    pub fn display_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.url.is_empty() {
            lines.push(format!("Last URL: {}", self.url));
        }
        if !self.token.is_empty() {
            lines.push(format!("Last token: {}", token_preview(&self.token)));
        }
        if self.output_dir != Self::DEFAULT_OUTPUT_DIR {
            lines.push(format!("Last directory: {}", self.output_dir));
        }
        if !self.include_patterns.is_empty() {
            lines.push(format!("Last include: {}", self.include_patterns));
        }
        if !self.exclude_patterns.is_empty() {
            lines.push(format!("Last exclude: {}", self.exclude_patterns));
        }
        lines
    }
}

fn token_preview(token: &str) -> String {
    match token.char_indices().nth(8) {
        Some((end, _)) => format!("{}...", &token[..end]),
        None => token.to_string(),
    }
}

/// Reads and writes [`Settings`] at a fixed path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub const DEFAULT_FILE: &'static str = "last_settings.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored settings merged over the defaults. A missing or unreadable
    /// file yields the defaults.
    pub fn load(&self) -> Settings {
        match self.read_document() {
            Ok(Some(doc)) => match serde_json::from_value::<Settings>(Value::Object(doc)) {
                Ok(settings) => {
                    info!("Loaded last settings from {:?}", self.path);
                    settings
                }
                Err(e) => {
                    warn!("Settings file {:?} is not usable ({}), using defaults", self.path, e);
                    Settings::default()
                }
            },
            Ok(None) => {
                debug!("No settings file at {:?}", self.path);
                Settings::default()
            }
            Err(e) => {
                warn!("Cannot read settings file {:?} ({}), using defaults", self.path, e);
                Settings::default()
            }
        }
    }

    /// Writes `settings` into the document, stamping `last_saved`. Keys this
    /// version does not know about are kept.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        let mut doc = match self.read_document() {
            Ok(Some(doc)) => doc,
            _ => Map::new(),
        };
        if let Value::Object(known) = serde_json::to_value(settings)? {
            doc.extend(known);
        }
        doc.insert(
            "last_saved".into(),
            Value::String(Local::now().to_rfc3339()),
        );

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&Value::Object(doc))?)?;
        info!("Settings saved to {:?}", self.path);
        Ok(())
    }

    fn read_document(&self) -> Result<Option<Map<String, Value>>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<Value>(&text)? {
            Value::Object(doc) => Ok(Some(doc)),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> SettingsStore {
        SettingsStore::new(dir.path().join("last_settings.json"))
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = store(&dir).load();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.output_dir, "./downloads");
        assert_eq!(settings.max_workers, 3);
        assert_eq!(settings.progress_file, "download_progress.json");
    }

    #[test]
    fn test_partial_file_is_merged_over_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::write(store.path(), r#"{"url": "org/model", "max_workers": 8}"#).unwrap();
        let settings = store.load();
        assert_eq!(settings.url, "org/model");
        assert_eq!(settings.max_workers, 8);
        assert_eq!(settings.output_dir, "./downloads");
    }

    #[test]
    fn test_garbage_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn test_save_keeps_unknown_keys_and_stamps_time() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::write(store.path(), r#"{"theme": "dark", "url": "old/repo"}"#).unwrap();

        let settings = Settings {
            url: "new/repo".into(),
            include_patterns: "*.json".into(),
            ..Settings::default()
        };
        store.save(&settings).unwrap();

        let doc: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(doc["theme"], "dark");
        assert_eq!(doc["url"], "new/repo");
        assert_eq!(doc["include_patterns"], "*.json");
        assert!(doc["last_saved"].is_string());
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn test_display_lines_preview_token() {
        let settings = Settings {
            url: "org/model".into(),
            token: "hf_abcdefghijkl".into(),
            ..Settings::default()
        };
        let lines = settings.display_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "Last token: hf_abcde...");
        assert!(Settings::default().display_lines().is_empty());
    }

    #[test]
    fn test_short_token_is_shown_whole() {
        assert_eq!(token_preview("hf_1234"), "hf_1234");
        assert_eq!(token_preview("12345678"), "12345678");
    }
}
