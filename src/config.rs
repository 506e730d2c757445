//! Runtime configuration.
//!
//! Values come from defaults, then a JSON file or the environment:
//!
//! | Variable | Field |
//! |---|---|
//! | `VIETPHRASE_BUNDLED_DIR` | `bundled_dir` |
//! | `VIETPHRASE_OVERRIDE_DIR` | `override_dir` |
//! | `VIETPHRASE_LANG` | `language` |
//! | `VIETPHRASE_DEBOUNCE_MS` | `debounce_ms` |

use crate::error::{Error, Result};
use crate::language::Language;
use crate::source::DirSource;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Read-only dictionaries shipped with the application
    pub bundled_dir: PathBuf,
    /// Writable directory whose files shadow bundled ones; downloads land here
    pub override_dir: Option<PathBuf>,
    /// Language loaded at startup
    pub language: Language,
    /// Quiet period before a typed input is translated
    pub debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bundled_dir: PathBuf::from("dictionaries"),
            override_dir: None,
            language: Language::English,
            debounce_ms: 300,
        }
    }
}

impl Config {
    /// Defaults overridden by `VIETPHRASE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();
        if let Some(dir) = lookup("VIETPHRASE_BUNDLED_DIR") {
            config.bundled_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("VIETPHRASE_OVERRIDE_DIR").filter(|d| !d.trim().is_empty()) {
            config.override_dir = Some(PathBuf::from(dir));
        }
        if let Some(code) = lookup("VIETPHRASE_LANG") {
            config.language = code.parse()?;
        }
        if let Some(ms) = lookup("VIETPHRASE_DEBOUNCE_MS") {
            config.debounce_ms = ms.trim().parse().map_err(|_| {
                Error::Config(format!("VIETPHRASE_DEBOUNCE_MS is not a number: {}", ms))
            })?;
        }
        Ok(config)
    }

    /// Load a JSON config file; missing fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse '{}': {}", path.display(), e))
        })
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Line source over the configured directories
    pub fn source(&self) -> DirSource {
        let source = DirSource::new(&self.bundled_dir);
        match &self.override_dir {
            Some(dir) => source.with_overrides(dir),
            None => source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_environment_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("VIETPHRASE_BUNDLED_DIR", "/opt/dict"),
            ("VIETPHRASE_OVERRIDE_DIR", "/var/dict"),
            ("VIETPHRASE_LANG", "zh-Hans"),
            ("VIETPHRASE_DEBOUNCE_MS", "50"),
        ]))
        .unwrap();
        assert_eq!(config.bundled_dir, PathBuf::from("/opt/dict"));
        assert_eq!(config.override_dir, Some(PathBuf::from("/var/dict")));
        assert_eq!(config.language, Language::Chinese);
        assert_eq!(config.debounce_ms, 50);
    }

    #[test]
    fn test_invalid_environment_values() {
        let bad_lang = Config::from_lookup(lookup(&[("VIETPHRASE_LANG", "fr")]));
        assert!(matches!(bad_lang, Err(Error::UnknownLanguage(_))));
        let bad_ms = Config::from_lookup(lookup(&[("VIETPHRASE_DEBOUNCE_MS", "soon")]));
        assert!(matches!(bad_ms, Err(Error::Config(_))));
    }

    #[test]
    fn test_json_file_with_partial_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "language": "zh", "override_dir": "/tmp/o" }"#).unwrap();

        let config = Config::from_json_file(&path).unwrap();
        assert_eq!(config.language, Language::Chinese);
        assert_eq!(config.override_dir, Some(PathBuf::from("/tmp/o")));
        assert_eq!(config.bundled_dir, PathBuf::from("dictionaries"));
    }

    #[test]
    fn test_json_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(Config::from_json_file(&path), Err(Error::Config(_))));
        assert!(matches!(
            Config::from_json_file(&dir.path().join("missing.json")),
            Err(Error::Io(_))
        ));
    }
}
