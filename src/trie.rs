//! Character trie for case-insensitive longest-match lookup.
//!
//! Nodes live in a single flat arena and refer to their children by index.
//! Each node keeps a small `(char, index)` list sorted by character; leaves
//! never allocate one. A node is a word end exactly when it carries a meaning.

/// Fold a character to the form the trie indexes.
///
/// Characters whose lowercase form is a single character fold to it; the
/// rare characters that lowercase to several (e.g. `İ`) are kept as-is so
/// that text offsets stay one-to-one with trie depth.
pub fn fold(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    children: Vec<(char, u32)>,
    meaning: Option<Box<str>>,
}

impl Node {
    fn child(&self, c: char) -> Option<u32> {
        self.children
            .binary_search_by_key(&c, |&(k, _)| k)
            .ok()
            .map(|pos| self.children[pos].1)
    }

    fn is_end_of_word(&self) -> bool {
        self.meaning.is_some()
    }
}

/// The longest trie word found at a position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    /// Length of the match in characters
    pub len: usize,
    /// Meaning stored for the matched word
    pub meaning: &'a str,
}

#[derive(Debug, Clone)]
pub struct Trie {
    nodes: Vec<Node>,
    words: usize,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    const ROOT: usize = 0;

    pub fn new() -> Self {
        Trie {
            nodes: vec![Node::default()],
            words: 0,
        }
    }

    /// Number of distinct words stored
    pub fn len(&self) -> usize {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Store `meaning` for `word`, replacing any previous meaning.
    ///
    /// Blank words are ignored.
    pub fn insert(&mut self, word: &str, meaning: &str) {
        if word.trim().is_empty() {
            return;
        }

        let mut node = Self::ROOT;
        for c in word.chars().map(fold) {
            node = match self.nodes[node]
                .children
                .binary_search_by_key(&c, |&(k, _)| k)
            {
                Ok(pos) => self.nodes[node].children[pos].1 as usize,
                Err(pos) => {
                    let child = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[node].children.insert(pos, (c, child as u32));
                    child
                }
            };
        }

        let terminal = &mut self.nodes[node];
        if !terminal.is_end_of_word() {
            self.words += 1;
        }
        terminal.meaning = Some(meaning.into());
    }

    /// Exact lookup of a whole word
    pub fn get(&self, word: &str) -> Option<&str> {
        let mut node = Self::ROOT;
        for c in word.chars().map(fold) {
            node = self.nodes[node].child(c)? as usize;
        }
        self.nodes[node].meaning.as_deref()
    }

    /// Find the longest stored word that starts at `start` in `text`.
    ///
    /// Traversal continues past every word end looking for a longer one and
    /// stops at the first character with no child. A deeper path that never
    /// reaches another word end does not count.
    pub fn search_longest_match(&self, text: &[char], start: usize) -> Option<Match<'_>> {
        let mut node = Self::ROOT;
        let mut best = None;

        for (offset, &c) in text.iter().enumerate().skip(start) {
            let Some(next) = self.nodes[node].child(fold(c)) else {
                break;
            };
            node = next as usize;
            if let Some(meaning) = self.nodes[node].meaning.as_deref() {
                best = Some(Match {
                    len: offset - start + 1,
                    meaning,
                });
            }
        }

        best
    }

    /// Drop every word, keeping a fresh root
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::default());
        self.words = 0;
    }
}
