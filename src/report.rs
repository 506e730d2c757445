//! Per-file diagnostics collected while a language loads.

use crate::language::Language;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOutcome {
    /// Every line was read
    Loaded,
    /// Neither the override nor the bundled location has the file
    Missing,
    /// Reading stopped early; lines applied before the error stay
    Aborted,
}

/// What happened to one line, for counting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tally {
    Applied,
    Skipped,
    Consumed,
    Malformed,
    /// Entry for a key already in the ignore set
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: String,
    pub outcome: FileOutcome,
    pub lines: usize,
    pub applied: usize,
    pub skipped: usize,
    pub malformed: usize,
    pub blocked: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn new(path: &str) -> Self {
        FileReport {
            path: path.to_string(),
            outcome: FileOutcome::Loaded,
            lines: 0,
            applied: 0,
            skipped: 0,
            malformed: 0,
            blocked: 0,
            error: None,
        }
    }

    pub fn missing(path: &str) -> Self {
        FileReport {
            outcome: FileOutcome::Missing,
            ..Self::new(path)
        }
    }

    pub fn record(&mut self, tally: Tally) {
        self.lines += 1;
        match tally {
            Tally::Applied => self.applied += 1,
            Tally::Skipped => self.skipped += 1,
            Tally::Malformed => self.malformed += 1,
            Tally::Blocked => self.blocked += 1,
            Tally::Consumed => {}
        }
    }

    pub fn abort(&mut self, error: &dyn std::error::Error) {
        self.outcome = FileOutcome::Aborted;
        self.error = Some(error.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub language: Language,
    pub files: Vec<FileReport>,
    /// Function words ignored unconditionally at the end of the load
    pub forced_ignores: usize,
    /// Distinct words in the finished trie
    pub words: usize,
    pub elapsed_ms: u64,
}

impl LoadReport {
    pub fn new(language: Language) -> Self {
        LoadReport {
            language,
            files: Vec::new(),
            forced_ignores: 0,
            words: 0,
            elapsed_ms: 0,
        }
    }

    pub fn file(&self, path: &str) -> Option<&FileReport> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn applied(&self) -> usize {
        self.files.iter().map(|f| f.applied).sum()
    }

    pub fn malformed(&self) -> usize {
        self.files.iter().map(|f| f.malformed).sum()
    }

    pub fn blocked(&self) -> usize {
        self.files.iter().map(|f| f.blocked).sum()
    }

    pub fn count(&self, outcome: FileOutcome) -> usize {
        self.files.iter().filter(|f| f.outcome == outcome).count()
    }
}
