//! Configuration for an indexed data root
//!
//! Describes where the index files, keyword descriptors and documents live
//! under one data root, with the conventional layout as default.

use crate::error::{KwindexError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the per-root config file
const CONFIG_FILE: &str = ".kwindex.json";

/// Layout of one indexed data root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data root holding metadata and document directories
    pub root: PathBuf,
    /// Keyword index file
    pub keyword_index: PathBuf,
    /// Relation index file
    pub relation_index: PathBuf,
    /// Directory of keyword descriptor files
    pub keyword_dir: PathBuf,
    /// Directory of documents to index
    pub relation_dir: PathBuf,
    /// Extension filter for keyword descriptors
    pub keyword_ext: String,
    /// Extension filter for documents
    pub document_ext: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(PathBuf::from("."))
    }
}

impl Config {
    /// Conventional layout under a data root: `metadata/quantities.yml`,
    /// `metadata/models.yml`, descriptors under `quantities/`, documents
    /// under `models/`.
    pub fn new(root: PathBuf) -> Self {
        Self {
            keyword_index: root.join("metadata").join("quantities.yml"),
            relation_index: root.join("metadata").join("models.yml"),
            keyword_dir: root.join("quantities"),
            relation_dir: root.join("models"),
            keyword_ext: ".yml".to_string(),
            document_ext: ".tex".to_string(),
            root,
        }
    }

    /// Set the document extension filter
    pub fn with_document_ext(mut self, ext: &str) -> Self {
        self.document_ext = ext.to_string();
        self
    }

    /// Set the keyword descriptor extension filter
    pub fn with_keyword_ext(mut self, ext: &str) -> Self {
        self.keyword_ext = ext.to_string();
        self
    }

    /// Path of the config file under this root
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Write the layout to the root's config file
    pub fn save(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(self.config_path(), json)?;
        Ok(())
    }

    /// Load the layout stored under a root, or fall back to the
    /// conventional one. A malformed config file is an error, not a
    /// fallback.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::new(root.to_path_buf()));
        }
        let json = std::fs::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&json).map_err(|e| {
            KwindexError::Config(format!("invalid config at {}: {e}", path.display()))
        })?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conventional_layout() {
        let config = Config::new(PathBuf::from("data"));
        assert_eq!(config.keyword_index, PathBuf::from("data/metadata/quantities.yml"));
        assert_eq!(config.relation_index, PathBuf::from("data/metadata/models.yml"));
        assert_eq!(config.keyword_dir, PathBuf::from("data/quantities"));
        assert_eq!(config.relation_dir, PathBuf::from("data/models"));
        assert_eq!(config.document_ext, ".tex");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path().to_path_buf()).with_document_ext(".md");
        config.save().unwrap();

        let loaded = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(loaded.document_ext, ".md");
        assert_eq!(loaded.relation_dir, config.relation_dir);
    }

    #[test]
    fn test_missing_config_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(config.root, dir.path());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "not json").unwrap();
        assert!(matches!(
            Config::load_or_default(dir.path()),
            Err(KwindexError::Config(_))
        ));
    }
}
