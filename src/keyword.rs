//! Keyword index: canonical names and their synonyms
//!
//! Every known name maps to its canonical form. The persisted shape is the
//! flat `{name: canonical_name}` mapping (canonical entries satisfy
//! name == canonical_name); in memory each entry carries an explicit tag so
//! the canonical/alias distinction is a type-level invariant rather than a
//! key-equals-value convention.

use crate::checksum::file_checksum;
use crate::error::{KwindexError, Result};
use crate::store;
use crate::walker::{default_data_dir, file_stem, DocWalker};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One entry in the keyword index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// The authoritative form of a concept
    Canonical,
    /// An alias pointing at a canonical keyword
    Synonym {
        /// The canonical name this alias resolves to
        canonical: String,
    },
}

/// Descriptor file contents: one file per canonical keyword under the data
/// directory, named after the keyword.
#[derive(Debug, Deserialize, Default)]
struct KeywordDescriptor {
    #[serde(default)]
    synonyms: Vec<String>,
}

/// Persisted mapping from every known name to its canonical form
pub struct KeywordIndex {
    path: PathBuf,
    data_dir: PathBuf,
    extension: String,
    entries: IndexMap<String, Entry>,
    /// Descriptor digests from earlier rescans in this process. The
    /// persisted mapping has no checksum slot, so gating state lives here.
    descriptor_checksums: HashMap<String, String>,
}

impl KeywordIndex {
    /// Open an index file with conventional defaults: data directory named
    /// after the index, sibling to the index file's parent, descriptors
    /// filtered to `.yml`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_options(path, None, ".yml")
    }

    /// Open an index file with an explicit data directory and descriptor
    /// extension filter.
    pub fn with_options(
        path: impl Into<PathBuf>,
        data_dir: Option<PathBuf>,
        extension: &str,
    ) -> Result<Self> {
        let path = path.into();
        let raw: IndexMap<String, String> = store::load(&path)?;
        let entries = tag_entries(raw)?;
        let data_dir = data_dir.unwrap_or_else(|| default_data_dir(&path));

        Ok(Self {
            path,
            data_dir,
            extension: extension.to_string(),
            entries,
            descriptor_checksums: HashMap::new(),
        })
    }

    /// All canonical keys, in insertion order of the backing mapping.
    pub fn unique_keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, entry)| matches!(entry, Entry::Canonical))
            .map(|(key, _)| key.as_str())
    }

    /// Every known name, canonical or synonym, in insertion order. This is
    /// the vocabulary the grammar engine compiles over.
    pub fn known_keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Map each canonical key to the ordered list of aliases resolving to
    /// it, self excluded.
    pub fn synonyms(&self) -> IndexMap<String, Vec<String>> {
        let mut out: IndexMap<String, Vec<String>> = self
            .unique_keys()
            .map(|key| (key.to_string(), Vec::new()))
            .collect();

        for (name, entry) in &self.entries {
            if let Entry::Synonym { canonical } = entry {
                if let Some(aliases) = out.get_mut(canonical) {
                    aliases.push(name.clone());
                }
            }
        }

        out
    }

    /// Resolve any known name to its canonical form.
    pub fn resolve<'a>(&'a self, raw: &str) -> Result<&'a str> {
        match self.entries.get_key_value(raw) {
            Some((key, Entry::Canonical)) => Ok(key.as_str()),
            Some((_, Entry::Synonym { canonical })) => Ok(canonical.as_str()),
            None => Err(KwindexError::UnknownKeyword {
                keyword: raw.to_string(),
            }),
        }
    }

    /// Insert or refresh one canonical keyword together with its aliases.
    /// Returns whether anything actually changed. Existing entries are
    /// updated in place, never deleted.
    ///
    /// An alias that is currently a canonical key is rejected before any
    /// mutation: demoting it would leave its own aliases dangling and the
    /// persisted mapping unloadable.
    pub fn register(&mut self, canonical: &str, synonyms: &[String]) -> Result<bool> {
        for alias in synonyms {
            if alias != canonical {
                self.reject_demotion(alias, canonical)?;
            }
        }

        let previous = self
            .entries
            .insert(canonical.to_string(), Entry::Canonical);
        let mut changed = previous != Some(Entry::Canonical);

        for alias in synonyms {
            if alias == canonical {
                continue;
            }
            let entry = Entry::Synonym {
                canonical: canonical.to_string(),
            };
            let previous = self.entries.insert(alias.clone(), entry.clone());
            changed |= previous.as_ref() != Some(&entry);
        }

        Ok(changed)
    }

    /// Explicit synonym registration (editor surface / CLI). The target
    /// must already exist as a canonical key, and the alias must not be a
    /// canonical key itself.
    pub fn register_synonym(&mut self, canonical: &str, synonym: &str) -> Result<bool> {
        if !matches!(self.entries.get(canonical), Some(Entry::Canonical)) {
            return Err(KwindexError::UnknownKeyword {
                keyword: canonical.to_string(),
            });
        }
        if synonym == canonical {
            return Ok(false);
        }
        self.reject_demotion(synonym, canonical)?;

        let entry = Entry::Synonym {
            canonical: canonical.to_string(),
        };
        let previous = self.entries.insert(synonym.to_string(), entry.clone());
        Ok(previous.as_ref() != Some(&entry))
    }

    fn reject_demotion(&self, alias: &str, canonical: &str) -> Result<()> {
        if matches!(self.entries.get(alias), Some(Entry::Canonical)) {
            return Err(KwindexError::Config(format!(
                "cannot register {alias} as a synonym of {canonical}: \
                 {alias} is itself a canonical keyword"
            )));
        }
        Ok(())
    }

    /// Incremental update from descriptor files under the data directory.
    ///
    /// Each descriptor is checksummed; only new or changed descriptors are
    /// re-read and registered. Saves the index file only when a mutation
    /// occurred, so an unchanged rescan is a no-op returning false and the
    /// persisted file stays byte-identical.
    pub fn rescan(&mut self) -> Result<bool> {
        let walker = DocWalker::new(self.data_dir.clone(), self.extension.clone());
        let mut changed = false;

        for path in walker.iter()? {
            let path = path?;
            let name = file_stem(&path);
            let digest = file_checksum(&path)?;

            let known = matches!(self.entries.get(&name), Some(Entry::Canonical));
            if known && self.descriptor_checksums.get(&name) == Some(&digest) {
                debug!("descriptor unchanged, skipping {:?}", path);
                continue;
            }

            let descriptor = read_descriptor(&path)?;
            debug!(
                "registering keyword {} with {} synonyms",
                name,
                descriptor.synonyms.len()
            );
            changed |= self.register(&name, &descriptor.synonyms)?;
            self.descriptor_checksums.insert(name, digest);
        }

        if changed {
            self.save()?;
            info!("keyword index updated: {:?}", self.path);
        }

        Ok(changed)
    }

    /// Write the flat `{name: canonical_name}` mapping back to the index
    /// file.
    pub fn save(&self) -> Result<()> {
        let mapping: IndexMap<String, String> = self
            .entries
            .iter()
            .map(|(name, entry)| {
                let canonical = match entry {
                    Entry::Canonical => name.clone(),
                    Entry::Synonym { canonical } => canonical.clone(),
                };
                (name.clone(), canonical)
            })
            .collect();
        store::save(&self.path, &mapping)
    }

    /// Total number of known names, canonical and synonym alike
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no names are known at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Origin file of this index
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory of keyword descriptor files
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Tag a raw key-value mapping into explicit entries. A value that does
/// not itself exist as a canonical key is a dangling synonym and rejected.
fn tag_entries(raw: IndexMap<String, String>) -> Result<IndexMap<String, Entry>> {
    let mut entries = IndexMap::with_capacity(raw.len());

    for (name, canonical) in &raw {
        if name == canonical {
            entries.insert(name.clone(), Entry::Canonical);
        } else {
            if raw.get(canonical) != Some(canonical) {
                return Err(KwindexError::UnknownKeyword {
                    keyword: canonical.clone(),
                });
            }
            entries.insert(
                name.clone(),
                Entry::Synonym {
                    canonical: canonical.clone(),
                },
            );
        }
    }

    Ok(entries)
}

fn read_descriptor(path: &Path) -> Result<KeywordDescriptor> {
    let text = std::fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(KeywordDescriptor::default());
    }
    Ok(serde_yaml::from_str(&text)?)
}
