use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::error::TaskError;

/// Schema source files found by one directory walk, in walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaFileSet {
    files: Vec<PathBuf>,
}

impl SchemaFileSet {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.files.iter()
    }

    pub fn as_paths(&self) -> &[PathBuf] {
        &self.files
    }
}

impl<'a> IntoIterator for &'a SchemaFileSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// Finds schema files by extension under a fixed directory.
#[derive(Debug, Clone)]
pub struct SchemaDiscoverer {
    root: PathBuf,
    extension: String,
}

impl SchemaDiscoverer {
    /// `extension` is matched against the final extension of each file name,
    /// without the leading dot.
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walks the root recursively and returns every regular file with the schema
    /// extension. A symlink is listed when it resolves to a regular file; the walk
    /// never descends through one.
    ///
    /// Entries are visited in file-name order within each directory, so the result is
    /// stable for a given tree. An empty result is not an error; a missing or unreadable
    /// directory is.
    pub fn discover(&self) -> Result<SchemaFileSet, TaskError> {
        info!(root = %self.root.display(), extension = %self.extension, "Discovering schema files");

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    error!(error = %e, root = %self.root.display(), "Schema directory walk failed");
                    return Err(TaskError::Discovery {
                        root: self.root.clone(),
                        source: e,
                    });
                }
            };
            if Self::is_file(&entry) && self.matches(entry.path()) {
                debug!(path = %entry.path().display(), "Found schema file");
                files.push(entry.into_path());
            }
        }

        info!(count = files.len(), "Schema discovery complete");
        Ok(SchemaFileSet { files })
    }

    fn is_file(entry: &walkdir::DirEntry) -> bool {
        entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension() == Some(OsStr::new(&self.extension))
    }
}
