//! Keyword matching over document text
//!
//! Compiles the known vocabulary into a single multi-pattern matcher.
//! Keywords only count when they appear as isolated words, and when two
//! keywords could start at the same position the longer one wins - a
//! deliberate greedy longest-match policy, not first-listed-wins.

use crate::error::{KwindexError, Result};
use regex::Regex;

/// Compiled matcher over a fixed keyword vocabulary
#[derive(Debug)]
pub struct Matcher {
    pattern: Regex,
}

impl Matcher {
    /// Compile a set of keywords into a matcher.
    ///
    /// Keywords are sorted by descending length before being joined into a
    /// boundary-anchored alternation, so that "q12" is preferred over "q1"
    /// at any position where both could match. An empty vocabulary is
    /// rejected: a matcher over nothing can only ever fail.
    pub fn compile<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keys: Vec<String> = keywords
            .into_iter()
            .map(|key| key.as_ref().to_string())
            .collect();

        if keys.is_empty() {
            return Err(KwindexError::Config(
                "cannot compile a matcher over an empty keyword set".to_string(),
            ));
        }

        // Longest first; ties broken lexicographically so equal keys end up
        // adjacent for dedup.
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        keys.dedup();

        let alternation = keys
            .iter()
            .map(|key| regex::escape(key))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = Regex::new(&format!(r"\b(?:{alternation})\b"))
            .map_err(|e| KwindexError::Config(format!("invalid keyword pattern: {e}")))?;

        Ok(Self { pattern })
    }

    /// Scan a document and return every keyword occurrence in document
    /// order, duplicates preserved, exactly as written in the source text
    /// (synonym resolution is the caller's business).
    pub fn scan(&self, text: &str) -> Vec<String> {
        self.pattern
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}
