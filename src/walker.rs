//! File discovery and index path conventions
//!
//! Walks a data directory recursively, filtering by file extension.
//! Enumeration order is whatever the filesystem yields - deterministic per
//! run, but callers must only rely on set membership.

use crate::error::{KwindexError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursive, extension-filtered walk over one data directory
#[derive(Debug, Clone)]
pub struct DocWalker {
    root: PathBuf,
    extension: String,
}

impl DocWalker {
    /// Create a walker over `root`, keeping only paths ending in
    /// `extension` (empty string keeps everything).
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    /// Lazily yield every matching file under the root.
    ///
    /// A missing root is fatal to the whole scan, so it surfaces here
    /// rather than as an empty sequence. Walk failures deeper in the tree
    /// (an unreadable subdirectory, say) yield as errors instead of being
    /// dropped, so documents never silently vanish from a scan. Symlink
    /// loops are out of scope; the tree is assumed to be a tree.
    pub fn iter(&self) -> Result<impl Iterator<Item = Result<PathBuf>>> {
        if !self.root.is_dir() {
            return Err(KwindexError::NotFound(self.root.clone()));
        }

        let extension = self.extension.clone();
        Ok(WalkDir::new(&self.root)
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        return None;
                    }
                    let path = entry.into_path();
                    if extension.is_empty() || path.to_string_lossy().ends_with(&extension) {
                        Some(Ok(path))
                    } else {
                        None
                    }
                }
                Err(err) => Some(Err(KwindexError::Io(err.into()))),
            }))
    }

    /// Root directory this walker scans
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Identity of an indexed entity: the file name without its extension.
pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Default data directory for an index file: a directory named after the
/// index, sibling to the index file's parent. `data/metadata/models.yml`
/// maps to `data/models`.
pub(crate) fn default_data_dir(index_path: &Path) -> PathBuf {
    let stem: OsString = index_path
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();

    match index_path.parent().and_then(Path::parent) {
        Some(grandparent) => grandparent.join(stem),
        None => PathBuf::from(stem),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_recursive_extension_filter() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("m1.tex"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("sub/deep/m2.tex"));

        let walker = DocWalker::new(dir.path(), ".tex");
        let found: HashSet<PathBuf> = walker
            .iter()
            .unwrap()
            .map(|path| path.unwrap())
            .collect();

        assert_eq!(found.len(), 2);
        assert!(found.contains(&dir.path().join("m1.tex")));
        assert!(found.contains(&dir.path().join("sub/deep/m2.tex")));
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.tex"));
        touch(&dir.path().join("b.yml"));

        let walker = DocWalker::new(dir.path(), "");
        assert_eq!(walker.iter().unwrap().count(), 2);
    }

    #[test]
    #[cfg(unix)]
    fn test_unreadable_subdirectory_propagates() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("m1.tex"));
        let locked = dir.path().join("locked");
        touch(&locked.join("m2.tex"));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        if fs::read_dir(&locked).is_ok() {
            // Privileged user: permission bits have no effect, nothing to test.
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let walker = DocWalker::new(dir.path(), ".tex");
        let result: Result<Vec<PathBuf>> = walker.iter().unwrap().collect();
        assert!(matches!(result, Err(KwindexError::Io(_))));

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_missing_root_is_not_found() {
        let walker = DocWalker::new("/nonexistent/never/here", ".tex");
        assert!(matches!(
            walker.iter().err(),
            Some(KwindexError::NotFound(_))
        ));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem(Path::new("data/models/m1.tex")), "m1");
        assert_eq!(file_stem(Path::new("q1.yml")), "q1");
    }

    #[test]
    fn test_default_data_dir() {
        assert_eq!(
            default_data_dir(Path::new("data/metadata/models.yml")),
            PathBuf::from("data/models")
        );
        assert_eq!(
            default_data_dir(Path::new("data/metadata/quantities.yml")),
            PathBuf::from("data/quantities")
        );
    }
}
