use std::collections::HashSet;

/// Replacement for a banned word.
pub const MASK: &str = "****";

/// Masks banned words in chirp bodies.
///
/// Matching is whole-token and case-insensitive. Tokens are split on
/// whitespace and re-joined with single spaces; a banned word with
/// punctuation attached is a different token and is left alone.
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    banned: HashSet<String>,
}

impl ContentFilter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let banned = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { banned }
    }

    pub fn apply(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|word| {
                if self.banned.contains(&word.to_lowercase()) {
                    MASK
                } else {
                    word
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.banned.is_empty()
    }
}

pub fn filter(text: &str, banned_words: &[&str]) -> String {
    ContentFilter::new(banned_words).apply(text)
}
