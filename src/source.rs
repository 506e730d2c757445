//! Where dictionary lines come from.
//!
//! A [`LineSource`] resolves language-scoped relative paths such as
//! `zh/Names.txt`. [`DirSource`] reads from a writable override directory
//! first and a bundled read-only directory second; [`MemorySource`] serves
//! files from memory for tests and embedding.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Lines of one file; an `Err` item ends the file early
pub type Lines = Box<dyn Iterator<Item = io::Result<String>> + Send>;

pub trait LineSource: Send + Sync {
    /// Open `path`, returning `Ok(None)` when no location has it
    fn open(&self, path: &str) -> io::Result<Option<Lines>>;

    /// File names directly under `dir`, sorted, across all locations
    fn list(&self, dir: &str) -> Vec<String>;
}

/// Line iterator that decodes invalid UTF-8 as U+FFFD instead of failing.
///
/// Strips the line terminator (`\n` or `\r\n`) and a byte order mark on the
/// first line. Only real read errors surface as `Err`.
struct LossyLines<R> {
    reader: R,
    first: bool,
    buf: Vec<u8>,
}

impl<R: BufRead> LossyLines<R> {
    fn new(reader: R) -> Self {
        LossyLines {
            reader,
            first: true,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                let mut bytes = self.buf.as_slice();
                if std::mem::take(&mut self.first) {
                    bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                }
                Some(Ok(String::from_utf8_lossy(bytes).into_owned()))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

/// Filesystem source with an optional override layer
#[derive(Debug, Clone)]
pub struct DirSource {
    bundled: PathBuf,
    overrides: Option<PathBuf>,
}

impl DirSource {
    pub fn new(bundled: impl Into<PathBuf>) -> Self {
        DirSource {
            bundled: bundled.into(),
            overrides: None,
        }
    }

    pub fn with_overrides(mut self, dir: impl Into<PathBuf>) -> Self {
        self.overrides = Some(dir.into());
        self
    }

    /// Search order: overrides, then bundled
    fn roots(&self) -> impl Iterator<Item = &Path> {
        self.overrides
            .as_deref()
            .into_iter()
            .chain(std::iter::once(self.bundled.as_path()))
    }
}

impl LineSource for DirSource {
    fn open(&self, path: &str) -> io::Result<Option<Lines>> {
        for root in self.roots() {
            let full = root.join(path);
            match File::open(&full) {
                Ok(file) => {
                    tracing::debug!("Reading {}", full.display());
                    let lines = LossyLines::new(BufReader::new(file));
                    return Ok(Some(Box::new(lines)));
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(None)
    }

    fn list(&self, dir: &str) -> Vec<String> {
        let mut names = BTreeSet::new();
        for root in self.roots() {
            let Ok(entries) = fs::read_dir(root.join(dir)) else {
                continue;
            };
            for entry in entries.flatten() {
                if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                    if let Some(name) = entry.file_name().to_str() {
                        names.insert(name.to_string());
                    }
                }
            }
        }
        names.into_iter().collect()
    }
}

#[derive(Debug, Clone)]
enum MemoryFile {
    Text(String),
    Broken { text: String, error: String },
}

/// In-memory source keyed by relative path
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<String, MemoryFile>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files
            .insert(path.to_string(), MemoryFile::Text(content.to_string()));
        self
    }

    /// A file whose lines are followed by a read error
    pub fn with_broken_file(mut self, path: &str, content: &str, error: &str) -> Self {
        self.files.insert(
            path.to_string(),
            MemoryFile::Broken {
                text: content.to_string(),
                error: error.to_string(),
            },
        );
        self
    }
}

fn owned_lines(text: &str) -> Vec<io::Result<String>> {
    text.lines().map(|l| Ok(l.to_string())).collect()
}

impl LineSource for MemorySource {
    fn open(&self, path: &str) -> io::Result<Option<Lines>> {
        let lines = match self.files.get(path) {
            None => return Ok(None),
            Some(MemoryFile::Text(text)) => owned_lines(text),
            Some(MemoryFile::Broken { text, error }) => {
                let mut lines = owned_lines(text);
                lines.push(Err(io::Error::new(io::ErrorKind::InvalidData, error.clone())));
                lines
            }
        };
        Ok(Some(Box::new(lines.into_iter())))
    }

    fn list(&self, dir: &str) -> Vec<String> {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        self.files
            .keys()
            .filter_map(|path| path.strip_prefix(&prefix))
            .filter(|name| !name.contains('/'))
            .map(str::to_string)
            .collect()
    }
}
