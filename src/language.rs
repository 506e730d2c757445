//! Source languages the translator can load.
//!
//! Language codes arrive from callers in many shapes (`zh`, `zh-Hans`,
//! `EN-US`); they are normalized to the base ISO 639-1 code before matching.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A source language with its own dictionary pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "zh")]
    Chinese,
}

impl Language {
    /// Directory prefix used for this language's dictionary files
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Chinese => "zh",
        }
    }

    /// Whether single-syllable Sino-Vietnamese particles are dropped from output.
    ///
    /// Only Chinese dictionaries produce these as literal meanings for
    /// function words.
    pub fn suppresses_particles(&self) -> bool {
        matches!(self, Language::Chinese)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        validate_code(s)?;
        match normalize_code(s).as_str() {
            "en" => Ok(Language::English),
            "zh" => Ok(Language::Chinese),
            _ => Err(Error::UnknownLanguage(s.to_string())),
        }
    }
}

/// Normalize a language code by stripping region or script information
///
/// - `en-US` → `en`
/// - `zh-Hans` → `zh`
/// - `zh_TW` → `zh`
pub fn normalize_code(code: &str) -> String {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or(code)
        .to_lowercase()
}

/// Check that a code contains only ASCII alphanumerics, hyphens and underscores
fn validate_code(code: &str) -> Result<()> {
    let code = code.trim();
    if code.is_empty() {
        return Err(Error::UnknownLanguage("(empty)".to_string()));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::UnknownLanguage(code.to_string()));
    }
    Ok(())
}
