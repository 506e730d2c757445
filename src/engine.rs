//! Translation engine: longest-match substitution over a lexicon snapshot.
//!
//! The pipeline for one input string:
//!
//! 1. fold script variants through the normalization table
//! 2. apply the structural rewrite rules
//! 3. scan left to right, replacing the longest dictionary word at each
//!    position and mapping punctuation elsewhere
//! 4. sentence-case the result

use crate::format::sentence_case;
use crate::lexicon::{IGNORE_MARKER, Lexicon};
use std::borrow::Cow;
use std::sync::Arc;

/// Sino-Vietnamese readings of Chinese particles that carry no meaning in
/// Vietnamese output
const PARTICLES: [&str; 11] = [
    "đích", "liễu", "chi", "giả", "hồ", "nha", "nhé", "của", "rồi", "mà", "thì",
];

/// CJK Unified Ideographs block
fn is_cjk(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

/// A match ending at `end` is a whole word unless a Latin-style letter
/// follows it directly.
fn is_word_boundary(text: &[char], end: usize) -> bool {
    match text.get(end) {
        None => true,
        Some(&next) => is_cjk(next) || !next.is_alphabetic(),
    }
}

#[derive(Debug, Clone)]
pub struct Translator {
    lexicon: Arc<Lexicon>,
}

impl Translator {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Translator { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Translate `text`. Never fails; with an empty lexicon the text only
    /// gets sentence-cased.
    pub fn translate(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let normalized = self.normalize(text.trim());
        let rewritten = self.lexicon.rules().apply(&normalized);
        let chars: Vec<char> = rewritten.chars().collect();
        let segmented = self.substitute(&chars);

        sentence_case(segmented.trim())
    }

    fn normalize<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let table = self.lexicon.normalization();
        if table.is_empty() {
            return Cow::Borrowed(text);
        }
        Cow::Owned(
            text.chars()
                .map(|c| table.get(&c).copied().unwrap_or(c))
                .collect(),
        )
    }

    fn substitute(&self, text: &[char]) -> String {
        let trie = self.lexicon.trie();
        let suppress_particles = self.lexicon.language().suppresses_particles();
        let mut out = String::with_capacity(text.len() * 3);
        let mut i = 0;

        while i < text.len() {
            let current = text[i];
            if current == '\n' {
                out.push(current);
                i += 1;
                continue;
            }

            let Some(found) = trie.search_longest_match(text, i) else {
                match self.lexicon.punctuation(current) {
                    Some(mark) => out.push_str(mark),
                    None => out.push(current),
                }
                i += 1;
                continue;
            };

            let end = i + found.len;
            if found.meaning == IGNORE_MARKER || self.is_ignored(&text[i..end]) {
                i = end;
                continue;
            }

            if !is_cjk(current) && !is_word_boundary(text, end) {
                out.push(current);
                i += 1;
                continue;
            }

            let meaning = found.meaning.trim();
            if suppress_particles && PARTICLES.contains(&meaning.to_lowercase().as_str()) {
                i = end;
                continue;
            }

            if let Some(last) = out.chars().next_back() {
                if !last.is_whitespace() && last != '(' && last != '"' {
                    out.push(' ');
                }
            }
            out.push_str(meaning);
            i = end;
        }

        out
    }

    fn is_ignored(&self, word: &[char]) -> bool {
        self.lexicon.ignored_count() > 0
            && self.lexicon.is_ignored(&word.iter().collect::<String>())
    }
}
