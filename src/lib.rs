//! # kwindex - incremental keyword indexing
//!
//! Maintains a persisted index relating free-text documents to a
//! controlled vocabulary of keywords, plus a synonym index resolving any
//! known name to its canonical form.
//!
//! ## Features
//!
//! - **Checksum-gated rescans**: only documents whose content digest
//!   changed are re-parsed; touching a file's mtime does nothing
//! - **Longest-match-first extraction**: keywords only match as isolated
//!   words, and overlapping candidates prefer the longer one
//! - **Synonym resolution**: every occurrence is resolved to its canonical
//!   keyword before being stored
//! - **Human-editable storage**: both indices persist as flat YAML
//!   mappings, written atomically
//!
//! ## Example
//!
//! ```no_run
//! use kwindex::{KeywordIndex, RelationIndex};
//!
//! fn main() -> anyhow::Result<()> {
//!     let keywords = KeywordIndex::open("data/metadata/quantities.yml")?;
//!     let mut relations = RelationIndex::open("data/metadata/models.yml", keywords)?;
//!
//!     if relations.rescan()? {
//!         println!("index updated");
//!     }
//!
//!     if let Some(entry) = relations.entry("m1") {
//!         println!("m1 references: {:?}", entry.keywords);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod citation;
pub mod config;
pub mod error;
pub mod grammar;
pub mod keyword;
pub mod relation;
pub mod store;
pub mod walker;

// Re-export commonly used types
pub use checksum::{bytes_checksum, file_checksum};
pub use citation::{citations_in, find_citations};
pub use config::Config;
pub use error::{KwindexError, Result};
pub use grammar::Matcher;
pub use keyword::{Entry, KeywordIndex};
pub use relation::{RelationEntry, RelationIndex};
pub use walker::DocWalker;
