//! Relation index: which documents reference which keywords
//!
//! The incremental engine. Each document under the data directory is
//! checksummed; only new or changed documents are re-parsed, their raw
//! keyword occurrences resolved through the keyword index, deduplicated
//! into a canonical set and stored together with the new digest. Documents
//! that disappear from disk keep their stale entries - pruning is an
//! explicit non-goal.

use crate::checksum::file_checksum;
use crate::error::{KwindexError, Result};
use crate::grammar::Matcher;
use crate::keyword::KeywordIndex;
use crate::store;
use crate::walker::{default_data_dir, file_stem, DocWalker};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Persisted association between one document and the keywords it
/// references
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationEntry {
    /// Digest of the exact bytes last scanned
    pub checksum: String,
    /// Canonical keyword names found in the document
    pub keywords: BTreeSet<String>,
}

/// Persisted mapping from document identity to its relation entry
pub struct RelationIndex {
    path: PathBuf,
    data_dir: PathBuf,
    extension: String,
    keywords: KeywordIndex,
    entries: IndexMap<String, RelationEntry>,
}

impl RelationIndex {
    /// Open a relation index over an exclusively owned keyword index, with
    /// conventional defaults: data directory named after the index file,
    /// sibling to its parent, documents filtered to `.tex`.
    pub fn open(path: impl Into<PathBuf>, keywords: KeywordIndex) -> Result<Self> {
        Self::with_options(path, keywords, None, ".tex")
    }

    /// Open with an explicit data directory and document extension filter.
    pub fn with_options(
        path: impl Into<PathBuf>,
        keywords: KeywordIndex,
        data_dir: Option<PathBuf>,
        extension: &str,
    ) -> Result<Self> {
        let path = path.into();
        let entries = store::load(&path)?;
        let data_dir = data_dir.unwrap_or_else(|| default_data_dir(&path));

        Ok(Self {
            path,
            data_dir,
            extension: extension.to_string(),
            keywords,
            entries,
        })
    }

    /// Bring the index up to date with the documents on disk.
    ///
    /// The keyword vocabulary is rescanned first so extraction always runs
    /// against current synonyms, then one matcher is compiled over that
    /// snapshot for the whole pass. Unchanged documents (same checksum)
    /// are skipped without re-parsing. Returns whether any document entry
    /// changed; the index file is only rewritten when one did.
    pub fn rescan(&mut self) -> Result<bool> {
        self.keywords.rescan()?;

        // Checksum gate first: only documents that actually changed pay for
        // extraction, and a pass with nothing to re-parse never compiles a
        // matcher at all (a freshly initialized root has an empty
        // vocabulary and must still report "unchanged").
        let walker = DocWalker::new(self.data_dir.clone(), self.extension.clone());
        let mut pending: Vec<(String, String, PathBuf)> = Vec::new();

        for path in walker.iter()? {
            let path = path?;
            let doc_id = file_stem(&path);
            let digest = file_checksum(&path)?;

            if self
                .entries
                .get(&doc_id)
                .is_some_and(|entry| entry.checksum == digest)
            {
                debug!("unchanged, skipping {:?}", path);
                continue;
            }

            pending.push((doc_id, digest, path));
        }

        if pending.is_empty() {
            return Ok(false);
        }

        let matcher = Matcher::compile(self.keywords.known_keys())?;
        for (doc_id, digest, path) in pending {
            let keywords = self.extract(&path, &matcher)?;
            info!("re-indexed {}: {} keywords", doc_id, keywords.len());
            self.entries.insert(
                doc_id,
                RelationEntry {
                    checksum: digest,
                    keywords,
                },
            );
        }

        self.save()?;
        info!("relation index updated: {:?}", self.path);

        Ok(true)
    }

    /// Pure extraction without persistence: the raw keyword occurrences in
    /// one document, in document order, duplicates preserved. Callers
    /// needing canonical names resolve explicitly.
    pub fn find_keyword_references(&self, path: &Path) -> Result<Vec<String>> {
        let matcher = Matcher::compile(self.keywords.known_keys())?;
        let text = read_document(path)?;
        let raw = matcher.scan(&text);
        if raw.is_empty() {
            return Err(KwindexError::NoKeywordsFound {
                path: path.to_path_buf(),
            });
        }
        Ok(raw)
    }

    /// Scan one document and resolve its occurrences into a canonical set.
    fn extract(&self, path: &Path, matcher: &Matcher) -> Result<BTreeSet<String>> {
        let text = read_document(path)?;
        let raw = matcher.scan(&text);
        if raw.is_empty() {
            // A document with no recognizable vocabulary is treated as
            // mis-annotated, not as validly empty.
            return Err(KwindexError::NoKeywordsFound {
                path: path.to_path_buf(),
            });
        }

        let mut keywords = BTreeSet::new();
        for token in raw {
            // The matcher only knows index keys, so a miss here is an
            // internal-consistency fault, not bad user input.
            keywords.insert(self.keywords.resolve(&token)?.to_string());
        }
        Ok(keywords)
    }

    /// Write the document mapping back to the index file.
    pub fn save(&self) -> Result<()> {
        store::save(&self.path, &self.entries)
    }

    /// Stored entry for a document, if it has ever been indexed
    pub fn entry(&self, doc_id: &str) -> Option<&RelationEntry> {
        self.entries.get(doc_id)
    }

    /// Identities of all indexed documents, in insertion order
    pub fn doc_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of indexed documents
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no documents have been indexed yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Origin file of this index
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory of documents this index covers
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The keyword index this relation index resolves through
    pub fn keywords(&self) -> &KeywordIndex {
        &self.keywords
    }

    /// Mutable access for explicit registration and standalone keyword
    /// rescans
    pub fn keywords_mut(&mut self) -> &mut KeywordIndex {
        &mut self.keywords
    }
}

/// Read a document as text; markup files are scanned as-is, invalid UTF-8
/// is replaced rather than fatal.
fn read_document(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::bytes_checksum;

    struct Fixture {
        _dir: tempfile::TempDir,
        root: PathBuf,
    }

    /// Conventional data tree: metadata/{quantities,models}.yml,
    /// quantities/ descriptors, models/ documents.
    fn fixture(keywords: &[(&str, &[&str])], documents: &[(&str, &str)]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();

        let quantities = root.join("quantities");
        fs::create_dir_all(&quantities).unwrap();
        for (name, synonyms) in keywords {
            let mut body = String::from("synonyms:\n");
            for synonym in *synonyms {
                body.push_str(&format!("  - {synonym}\n"));
            }
            if synonyms.is_empty() {
                body = "synonyms: []\n".to_string();
            }
            fs::write(quantities.join(format!("{name}.yml")), body).unwrap();
        }

        let models = root.join("models");
        fs::create_dir_all(&models).unwrap();
        for (name, text) in documents {
            fs::write(models.join(format!("{name}.tex")), text).unwrap();
        }

        Fixture { _dir: dir, root }
    }

    fn open_index(fixture: &Fixture) -> RelationIndex {
        let keywords =
            KeywordIndex::open(fixture.root.join("metadata").join("quantities.yml")).unwrap();
        RelationIndex::open(fixture.root.join("metadata").join("models.yml"), keywords)
            .unwrap()
    }

    #[test]
    fn test_end_to_end_rescan() {
        let fx = fixture(
            &[("q1", &["q_1"]), ("q2", &[])],
            &[("m1", r"model of \cite{q1} coupled to q2 dynamics")],
        );
        let mut index = open_index(&fx);

        assert!(index.rescan().unwrap());

        let entry = index.entry("m1").unwrap();
        let expected: BTreeSet<String> =
            ["q1", "q2"].iter().map(|s| s.to_string()).collect();
        assert_eq!(entry.keywords, expected);

        let bytes = fs::read(fx.root.join("models").join("m1.tex")).unwrap();
        assert_eq!(entry.checksum, bytes_checksum(&bytes));
    }

    #[test]
    fn test_rescan_is_idempotent() {
        let fx = fixture(&[("q1", &[])], &[("m1", "all about q1")]);
        let mut index = open_index(&fx);

        assert!(index.rescan().unwrap());
        let index_file = fx.root.join("metadata").join("models.yml");
        let first = fs::read(&index_file).unwrap();

        assert!(!index.rescan().unwrap());
        assert_eq!(fs::read(&index_file).unwrap(), first);
    }

    #[test]
    fn test_touch_without_change_does_not_reindex() {
        let fx = fixture(&[("q1", &[])], &[("m1", "all about q1")]);
        let mut index = open_index(&fx);
        assert!(index.rescan().unwrap());

        // Rewriting identical bytes bumps the mtime but not the digest.
        let doc = fx.root.join("models").join("m1.tex");
        fs::write(&doc, "all about q1").unwrap();
        assert!(!index.rescan().unwrap());
    }

    #[test]
    fn test_changed_document_replaces_entry() {
        let fx = fixture(
            &[("q1", &[]), ("q2", &[])],
            &[("m1", "only q1 here")],
        );
        let mut index = open_index(&fx);
        assert!(index.rescan().unwrap());

        let doc = fx.root.join("models").join("m1.tex");
        fs::write(&doc, "now only q2").unwrap();
        assert!(index.rescan().unwrap());

        // Replaced, not merged: q1 is gone.
        let expected: BTreeSet<String> = ["q2".to_string()].into_iter().collect();
        assert_eq!(index.entry("m1").unwrap().keywords, expected);
    }

    #[test]
    fn test_synonyms_resolve_to_canonical() {
        let fx = fixture(&[("q1", &["q_1"])], &[("m1", "uses q_1 throughout")]);
        let mut index = open_index(&fx);
        assert!(index.rescan().unwrap());

        let expected: BTreeSet<String> = ["q1".to_string()].into_iter().collect();
        assert_eq!(index.entry("m1").unwrap().keywords, expected);
    }

    #[test]
    fn test_zero_matches_is_an_error() {
        let fx = fixture(&[("q1", &[])], &[("m1", "nothing recognizable")]);
        let mut index = open_index(&fx);

        assert!(matches!(
            index.rescan(),
            Err(KwindexError::NoKeywordsFound { .. })
        ));
    }

    #[test]
    fn test_rescan_on_fresh_empty_root() {
        // No descriptors, no documents, no vocabulary: a valid no-op, not
        // a matcher compilation failure.
        let fx = fixture(&[], &[]);
        let mut index = open_index(&fx);

        assert!(!index.rescan().unwrap());
        assert!(index.is_empty());
        assert!(!fx.root.join("metadata").join("models.yml").exists());
    }

    #[test]
    fn test_empty_vocabulary_with_changed_document_is_an_error() {
        // A document awaiting extraction with nothing to match against
        // cannot be indexed; only the nothing-pending case is a no-op.
        let fx = fixture(&[], &[("m1", "some prose")]);
        let mut index = open_index(&fx);

        assert!(matches!(index.rescan(), Err(KwindexError::Config(_))));
    }

    #[test]
    fn test_deleted_document_keeps_stale_entry() {
        let fx = fixture(&[("q1", &[])], &[("m1", "about q1")]);
        let mut index = open_index(&fx);
        assert!(index.rescan().unwrap());

        fs::remove_file(fx.root.join("models").join("m1.tex")).unwrap();
        assert!(!index.rescan().unwrap());
        assert!(index.entry("m1").is_some());
    }

    #[test]
    fn test_find_keyword_references_raw_order() {
        let fx = fixture(
            &[("q1", &["q_1"]), ("q2", &[])],
            &[("m1", "q2 then q_1 then q2 again")],
        );
        let index = {
            let mut index = open_index(&fx);
            index.keywords_mut().rescan().unwrap();
            index
        };

        let doc = fx.root.join("models").join("m1.tex");
        let raw = index.find_keyword_references(&doc).unwrap();
        assert_eq!(raw, vec!["q2", "q_1", "q2"]);
    }

    #[test]
    fn test_find_keyword_references_zero_matches() {
        let fx = fixture(&[("q1", &[])], &[("m1", "unrelated prose")]);
        let mut index = open_index(&fx);
        index.keywords_mut().rescan().unwrap();

        let doc = fx.root.join("models").join("m1.tex");
        assert!(matches!(
            index.find_keyword_references(&doc),
            Err(KwindexError::NoKeywordsFound { .. })
        ));
    }

    #[test]
    fn test_missing_data_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("quantities")).unwrap();
        fs::write(root.join("quantities").join("q1.yml"), "synonyms: []\n").unwrap();

        let keywords =
            KeywordIndex::open(root.join("metadata").join("quantities.yml")).unwrap();
        let mut index =
            RelationIndex::open(root.join("metadata").join("models.yml"), keywords).unwrap();

        assert!(matches!(
            index.rescan(),
            Err(KwindexError::NotFound(_))
        ));
    }
}
