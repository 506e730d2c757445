//! Line parsers for the dictionary file formats.
//!
//! Every parser looks at a single line and reports what it found; applying
//! the result to a lexicon is the loader's job. None of them fail: a line
//! that cannot be used is reported as [`Line::Malformed`] and skipped.

/// Decorative marker some phrase lists put inside meanings
pub const DECORATION: char = '✚';

/// Outcome of parsing one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<T> {
    /// A usable entry
    Entry(T),
    /// Blank or comment line
    Skipped,
    /// Line only updated parser state, or is data the format deliberately drops
    Consumed,
    /// Line that does not follow the format
    Malformed,
}

/// Reduce a raw meaning to its first sense.
///
/// Leading `/`, `;` and `,` are stripped, then the text is cut at the first
/// `/`, `,`, `;` and `[` (in that order, each only if it is not the first
/// character), and decoration markers are removed.
pub fn clean_meaning(raw: &str) -> String {
    let mut value = raw.trim();
    while let Some(rest) = value.strip_prefix(['/', ';', ',']) {
        value = rest.trim();
    }

    for separator in ['/', ',', ';', '['] {
        if let Some(idx) = value.find(separator) {
            if idx > 0 {
                value = value[..idx].trim();
            }
        }
    }

    value.replace(DECORATION, "").trim().to_string()
}

/// `key=value` with the value cleaned by [`clean_meaning`]
pub fn parse_key_value(line: &str) -> Line<(&str, String)> {
    if line.trim().is_empty() || line.starts_with('#') {
        return Line::Skipped;
    }

    let Some(eq) = line.find('=').filter(|&eq| eq > 0) else {
        return Line::Malformed;
    };

    let key = line[..eq].trim();
    let value = clean_meaning(&line[eq + 1..]);
    if key.is_empty() || value.is_empty() {
        return Line::Malformed;
    }
    Line::Entry((key, value))
}

/// Reader for headword blocks:
///
/// ```text
/// @apple /'æpl/
/// * danh từ
/// - quả táo
/// - cây táo
/// ```
///
/// Only the first `-` meaning of each headword is kept. Plain `key=value`
/// lines are accepted too, so the same file may mix both styles.
#[derive(Debug, Default)]
pub struct HeadwordReader {
    current: Option<String>,
}

impl HeadwordReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, line: &str) -> Line<(String, String)> {
        let line = line.trim();
        if line.is_empty() {
            return Line::Skipped;
        }

        if let Some(rest) = line.strip_prefix('@') {
            let word = rest.split('/').next().unwrap_or_default().trim();
            self.current = (!word.is_empty()).then(|| word.to_string());
            return Line::Consumed;
        }

        if let Some(rest) = line
            .strip_prefix('-')
            .filter(|_| self.current.is_some())
        {
            let mut meaning = rest.trim();
            for separator in [';', ','] {
                if let Some(idx) = meaning.find(separator) {
                    meaning = &meaning[..idx];
                }
            }
            let meaning = meaning.trim();
            if meaning.is_empty() {
                return Line::Malformed;
            }
            return match self.current.take() {
                Some(word) => Line::Entry((word, meaning.to_string())),
                None => Line::Consumed,
            };
        }

        if let Some((key, value)) = line.split_once('=') {
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                return Line::Malformed;
            }
            return Line::Entry((key.to_string(), value.to_string()));
        }

        Line::Consumed
    }
}

/// `萬=万`: first character of each side
pub fn parse_normalization(line: &str) -> Line<(char, char)> {
    if line.trim().is_empty() {
        return Line::Skipped;
    }

    let mut parts = line.split('=');
    let from = parts.next().and_then(|s| s.chars().next());
    let to = parts.next().and_then(|s| s.chars().next());
    match (from, to) {
        (Some(from), Some(to)) => Line::Entry((from, to)),
        _ => Line::Malformed,
    }
}

/// `。=.`: a single source character and its replacement
pub fn parse_punctuation(line: &str) -> Line<(char, &str)> {
    if line.trim().is_empty() {
        return Line::Skipped;
    }

    let Some((source, replacement)) = line.split_once('=') else {
        return Line::Malformed;
    };

    let mut chars = source.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Line::Entry((c, replacement.trim())),
        _ => Line::Malformed,
    }
}

/// One ignored phrase per line
pub fn parse_ignore(line: &str) -> Line<&str> {
    let phrase = line.trim();
    if phrase.is_empty() || phrase.starts_with('#') {
        return Line::Skipped;
    }
    Line::Entry(phrase)
}

/// `pattern=replacement`
pub fn parse_structure(line: &str) -> Line<(&str, &str)> {
    if line.trim().is_empty() {
        return Line::Skipped;
    }

    match line.find('=') {
        Some(eq) if eq > 0 => Line::Entry((line[..eq].trim(), line[eq + 1..].trim())),
        _ => Line::Malformed,
    }
}
