//! Whole-text rewrite rules applied before segmentation.

use regex::{Regex, RegexBuilder};
use std::borrow::Cow;

/// Ordered list of case-insensitive regex rewrites.
///
/// Every rule replaces all of its matches, and its output is the next rule's
/// input. In replacements `$N` takes as many digits as still name an
/// existing group (so `$1s` is group 1 then `s`), `${name}` is a named group
/// and a backslash escapes the next character.
#[derive(Debug, Clone, Default)]
pub struct StructuralRules {
    rules: Vec<(Regex, String)>,
}

impl StructuralRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule. A pattern that does not compile is dropped and
    /// `false` is returned.
    pub fn add(&mut self, pattern: &str, replacement: &str) -> bool {
        match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(regex) => {
                let groups = regex.captures_len() - 1;
                let replacement = expansion_template(replacement, groups);
                self.rules.push((regex, replacement));
                true
            }
            Err(err) => {
                tracing::debug!("Discarding structural rule '{}': {}", pattern, err);
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// Apply every rule in insertion order
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let mut current = Cow::Borrowed(text);
        for (regex, replacement) in &self.rules {
            let rewritten = match regex.replace_all(&current, replacement.as_str()) {
                Cow::Owned(s) => Some(s),
                Cow::Borrowed(_) => None,
            };
            if let Some(s) = rewritten {
                current = Cow::Owned(s);
            }
        }
        current
    }
}

/// Rewrite a dictionary replacement string into `regex` crate expansion
/// syntax, where group references are always braced and `$$` is a literal `$`.
fn expansion_template(replacement: &str, groups: usize) -> String {
    let mut out = String::with_capacity(replacement.len() + 8);
    let mut chars = replacement.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('$') => out.push_str("$$"),
                Some(escaped) => out.push(escaped),
                None => out.push('\\'),
            },
            '$' => {
                if let Some(first) = chars.peek().and_then(|d| d.to_digit(10)) {
                    chars.next();
                    let mut group = first as usize;
                    while let Some(next) = chars.peek().and_then(|n| n.to_digit(10)) {
                        let widened = group * 10 + next as usize;
                        if widened > groups {
                            break;
                        }
                        group = widened;
                        chars.next();
                    }
                    out.push_str(&format!("${{{}}}", group));
                } else if chars.next_if_eq(&'{').is_some() {
                    out.push_str("${");
                    for n in chars.by_ref() {
                        out.push(n);
                        if n == '}' {
                            break;
                        }
                    }
                } else {
                    out.push_str("$$");
                }
            }
            _ => out.push(c),
        }
    }
    out
}
