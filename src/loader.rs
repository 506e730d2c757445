//! Dictionary loading.
//!
//! Each language has a fixed pipeline of [`Step`]s. Files later in the
//! pipeline take precedence over earlier ones for the same key. Loading never
//! fails: missing files, bad lines and read errors end up in the
//! [`LoadReport`] and the load moves on to the next step.

use crate::formats::{
    HeadwordReader, Line, parse_ignore, parse_key_value, parse_normalization,
    parse_punctuation, parse_structure,
};
use crate::language::Language;
use crate::lexicon::{Lexicon, LexiconBuilder};
use crate::report::{FileOutcome, FileReport, LoadReport, Tally};
use crate::source::LineSource;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Phrase lists are every `VietPhrase*.txt` in the language directory
pub const PHRASE_PREFIX: &str = "VietPhrase";
pub const PHRASE_SUFFIX: &str = ".txt";
const DEFAULT_PHRASE_FILE: &str = "VietPhrase.txt";

/// Chinese function words that never produce output, whatever the
/// dictionaries say
pub const FORCED_IGNORES: [&str; 6] = ["的", "了", "之", "着", "地", "得"];

/// One step of a language pipeline. File names are relative to the
/// language directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Headwords(&'static str),
    KeyValue(&'static str),
    /// Auto-discovered phrase lists, loaded as key=value
    PhraseLists,
    Normalization(&'static str),
    Punctuation(&'static str),
    IgnoreList(&'static str),
    Structure(&'static str),
    ForceIgnore,
}

/// The load order for `language`
pub fn pipeline(language: Language) -> Vec<Step> {
    match language {
        Language::English => vec![
            Step::Headwords("English.txt"),
            Step::PhraseLists,
            Step::KeyValue("Names.txt"),
            Step::Structure("Structure.txt"),
        ],
        Language::Chinese => vec![
            Step::Normalization("ChinesePhonToGian.txt"),
            Step::Punctuation("Mark.txt"),
            Step::IgnoreList("IgnoredChinesePhrases.txt"),
            Step::KeyValue("ChinesePhienAmWords.txt"),
            Step::KeyValue("ThieuChuu.txt"),
            Step::KeyValue("LacViet.txt"),
            Step::PhraseLists,
            Step::KeyValue("Pronouns.txt"),
            Step::KeyValue("LuatNhancu.txt"),
            Step::KeyValue("LuatNhan.txt"),
            Step::KeyValue("Names.txt"),
            Step::KeyValue("Names2.txt"),
            Step::ForceIgnore,
        ],
    }
}

pub struct Loader<'a> {
    source: &'a dyn LineSource,
}

impl<'a> Loader<'a> {
    pub fn new(source: &'a dyn LineSource) -> Self {
        Loader { source }
    }

    /// Build a fresh lexicon for `language`
    pub fn load(&self, language: Language) -> (Lexicon, LoadReport) {
        let mut builder = LexiconBuilder::new(language);
        let report = self.load_into(&mut builder);
        (builder.build(), report)
    }

    /// Clear `builder` and run its language's pipeline into it
    pub fn load_into(&self, builder: &mut LexiconBuilder) -> LoadReport {
        let started = Instant::now();
        let language = builder.language();
        builder.clear();

        info!("Loading dictionaries for '{}'", language);
        let mut report = LoadReport::new(language);
        for step in pipeline(language) {
            self.run_step(step, builder, &mut report);
        }

        report.words = builder.word_count();
        report.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            "Loaded '{}' in {}ms: {} words, {} files ({} missing, {} aborted), {} malformed lines",
            language,
            report.elapsed_ms,
            report.words,
            report.files.len(),
            report.count(FileOutcome::Missing),
            report.count(FileOutcome::Aborted),
            report.malformed(),
        );
        report
    }

    fn run_step(&self, step: Step, builder: &mut LexiconBuilder, report: &mut LoadReport) {
        let code = builder.language().code();
        let path = |name: &str| format!("{}/{}", code, name);

        match step {
            Step::Headwords(name) => {
                let mut reader = HeadwordReader::new();
                report.files.push(self.read_file(&path(name), |line| {
                    tally(reader.feed(line), |(word, meaning)| {
                        builder.insert(&word, &meaning);
                        Tally::Applied
                    })
                }));
            }
            Step::KeyValue(name) => {
                report.files.push(self.load_key_values(&path(name), builder));
            }
            Step::PhraseLists => {
                for name in self.phrase_lists(code) {
                    report.files.push(self.load_key_values(&path(&name), builder));
                }
            }
            Step::Normalization(name) => {
                report.files.push(self.read_file(&path(name), |line| {
                    tally(parse_normalization(line), |(from, to)| {
                        builder.normalize(from, to);
                        Tally::Applied
                    })
                }));
            }
            Step::Punctuation(name) => {
                report.files.push(self.read_file(&path(name), |line| {
                    tally(parse_punctuation(line), |(source, replacement)| {
                        builder.map_punctuation(source, replacement);
                        Tally::Applied
                    })
                }));
            }
            Step::IgnoreList(name) => {
                report.files.push(self.read_file(&path(name), |line| {
                    tally(parse_ignore(line), |phrase| {
                        builder.ignore(phrase);
                        Tally::Applied
                    })
                }));
            }
            Step::Structure(name) => {
                report.files.push(self.read_file(&path(name), |line| {
                    tally(parse_structure(line), |(pattern, replacement)| {
                        if builder.add_rule(pattern, replacement) {
                            Tally::Applied
                        } else {
                            Tally::Malformed
                        }
                    })
                }));
            }
            Step::ForceIgnore => {
                for word in FORCED_IGNORES {
                    builder.ignore(word);
                }
                report.forced_ignores = FORCED_IGNORES.len();
            }
        }
    }

    fn load_key_values(&self, path: &str, builder: &mut LexiconBuilder) -> FileReport {
        self.read_file(path, |line| {
            tally(parse_key_value(line), |(key, value)| {
                if builder.is_ignored(key) {
                    Tally::Blocked
                } else {
                    builder.insert(key, &value);
                    Tally::Applied
                }
            })
        })
    }

    /// Sorted `VietPhrase*.txt` names, or the default file when there are none
    fn phrase_lists(&self, code: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .source
            .list(code)
            .into_iter()
            .filter(|name| name.starts_with(PHRASE_PREFIX) && name.ends_with(PHRASE_SUFFIX))
            .collect();
        names.sort();
        names.dedup();
        if names.is_empty() {
            names.push(DEFAULT_PHRASE_FILE.to_string());
        }
        names
    }

    fn read_file(&self, path: &str, mut each_line: impl FnMut(&str) -> Tally) -> FileReport {
        let lines = match self.source.open(path) {
            Ok(Some(lines)) => lines,
            Ok(None) => {
                debug!("Skipping {}: not found", path);
                return FileReport::missing(path);
            }
            Err(err) => {
                warn!("Could not open {}: {}", path, err);
                let mut file = FileReport::new(path);
                file.abort(&err);
                return file;
            }
        };

        let mut file = FileReport::new(path);
        for line in lines {
            match line {
                Ok(line) => file.record(each_line(&line)),
                Err(err) => {
                    warn!(
                        "Stopped reading {} after {} lines: {}",
                        path, file.lines, err
                    );
                    file.abort(&err);
                    return file;
                }
            }
        }

        debug!(
            "Read {}: {} lines, {} applied, {} malformed, {} blocked",
            path, file.lines, file.applied, file.malformed, file.blocked
        );
        file
    }
}

fn tally<T>(line: Line<T>, apply: impl FnOnce(T) -> Tally) -> Tally {
    match line {
        Line::Entry(entry) => apply(entry),
        Line::Skipped => Tally::Skipped,
        Line::Consumed => Tally::Consumed,
        Line::Malformed => Tally::Malformed,
    }
}
