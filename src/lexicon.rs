//! The lexicon: trie plus the side tables the engine consults.
//!
//! A [`LexiconBuilder`] has exclusive write access while a language loads;
//! [`LexiconBuilder::build`] freezes it into an immutable [`Lexicon`] that is
//! shared read-only between translations.

use crate::language::Language;
use crate::rules::StructuralRules;
use crate::trie::Trie;
use std::collections::{HashMap, HashSet};

/// Reserved meaning for phrases that are consumed but never emitted
pub const IGNORE_MARKER: &str = "[[IGNORE]]";

#[derive(Debug, Clone)]
pub struct Lexicon {
    language: Language,
    trie: Trie,
    rules: StructuralRules,
    ignored: HashSet<String>,
    punctuation: HashMap<char, String>,
    normalization: HashMap<char, char>,
}

impl Lexicon {
    /// An empty lexicon; translating with it only applies sentence case
    pub fn empty(language: Language) -> Self {
        LexiconBuilder::new(language).build()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn trie(&self) -> &Trie {
        &self.trie
    }

    pub fn rules(&self) -> &StructuralRules {
        &self.rules
    }

    pub fn is_ignored(&self, phrase: &str) -> bool {
        self.ignored.contains(phrase)
    }

    pub fn punctuation(&self, c: char) -> Option<&str> {
        self.punctuation.get(&c).map(String::as_str)
    }

    /// Script-folding table; empty when the language needs none
    pub fn normalization(&self) -> &HashMap<char, char> {
        &self.normalization
    }

    pub fn ignored_count(&self) -> usize {
        self.ignored.len()
    }

    pub fn punctuation_count(&self) -> usize {
        self.punctuation.len()
    }
}

#[derive(Debug, Clone)]
pub struct LexiconBuilder {
    language: Language,
    trie: Trie,
    rules: StructuralRules,
    ignored: HashSet<String>,
    punctuation: HashMap<char, String>,
    normalization: HashMap<char, char>,
}

impl LexiconBuilder {
    pub fn new(language: Language) -> Self {
        LexiconBuilder {
            language,
            trie: Trie::new(),
            rules: StructuralRules::new(),
            ignored: HashSet::new(),
            punctuation: HashMap::new(),
            normalization: HashMap::new(),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Reset every collection to empty
    pub fn clear(&mut self) {
        self.trie.clear();
        self.rules.clear();
        self.ignored.clear();
        self.punctuation.clear();
        self.normalization.clear();
    }

    pub fn insert(&mut self, word: &str, meaning: &str) -> &mut Self {
        self.trie.insert(word, meaning);
        self
    }

    /// Mark `phrase` as ignored and map it to [`IGNORE_MARKER`]
    pub fn ignore(&mut self, phrase: &str) -> &mut Self {
        self.ignored.insert(phrase.to_string());
        self.trie.insert(phrase, IGNORE_MARKER);
        self
    }

    pub fn is_ignored(&self, phrase: &str) -> bool {
        self.ignored.contains(phrase)
    }

    /// Register a structural rule; see [`StructuralRules::add`]
    pub fn add_rule(&mut self, pattern: &str, replacement: &str) -> bool {
        self.rules.add(pattern, replacement)
    }

    pub fn map_punctuation(&mut self, source: char, replacement: &str) -> &mut Self {
        self.punctuation.insert(source, replacement.to_string());
        self
    }

    pub fn normalize(&mut self, from: char, to: char) -> &mut Self {
        self.normalization.insert(from, to);
        self
    }

    pub fn word_count(&self) -> usize {
        self.trie.len()
    }

    pub fn build(self) -> Lexicon {
        Lexicon {
            language: self.language,
            trie: self.trie,
            rules: self.rules,
            ignored: self.ignored,
            punctuation: self.punctuation,
            normalization: self.normalization,
        }
    }
}
