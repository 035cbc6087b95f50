//! Citation extraction for typeset notes
//!
//! Finds `\cite{...}` references in a document, in document order. The
//! reference key is an alphabetic character followed by alphanumerics,
//! dots, dashes or underscores.

use crate::error::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

static CITE_RE: OnceLock<Regex> = OnceLock::new();

fn cite_pattern() -> &'static Regex {
    CITE_RE.get_or_init(|| {
        Regex::new(r"\\cite\{([A-Za-z][A-Za-z0-9._-]*)\}").expect("citation pattern is valid")
    })
}

/// Find citation references in a file, in document order.
pub fn find_citations(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(citations_in(&text))
}

/// Find citation references in already-loaded text.
pub fn citations_in(text: &str) -> Vec<String> {
    cite_pattern()
        .captures_iter(text)
        .map(|captures| captures[1].to_string())
        .collect()
}
