//! Mock loader implementation for testing.
//!
//! Provides [`MockLoader`] for unit testing without filesystem access.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::document::{BinaryFile, DocumentLoader, LoaderError, LocalDocument};
use crate::mime::guess_content_type;

/// In-memory loader for tests.
///
/// Binaries are keyed by the name used to reference them; the referencing
/// document path is ignored.
///
/// # Example
///
/// ```ignore
/// use pagesync_loader::{DocumentLoader, MockLoader};
///
/// let loader = MockLoader::new()
///     .with_document("/vault/Pages/Guide.md", "# Guide\n\n![](diagram.png)")
///     .with_binary("diagram.png", "Pages/diagram.png", b"\x89PNG");
///
/// let docs = loader.list_publishable_documents().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockLoader {
    documents: Vec<LocalDocument>,
    binaries: HashMap<String, BinaryFile>,
    failing: HashSet<String>,
}

impl MockLoader {
    /// Create a new empty mock loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a publishable document with raw content (front-matter allowed).
    #[must_use]
    pub fn with_document(mut self, path: impl Into<PathBuf>, raw: &str) -> Self {
        let path: PathBuf = path.into();
        self.documents.push(LocalDocument::from_raw(&path, raw));
        self
    }

    /// Add a binary resolvable by `name`, stored at vault-relative `file_path`.
    #[must_use]
    pub fn with_binary(mut self, name: &str, file_path: &str, contents: &[u8]) -> Self {
        let file_name = file_path.rsplit('/').next().unwrap_or(file_path).to_owned();
        self.binaries.insert(
            name.to_owned(),
            BinaryFile {
                contents: contents.to_vec(),
                file_path: file_path.to_owned(),
                mime_type: guess_content_type(&file_name),
                file_name,
            },
        );
        self
    }

    /// Make reads of `name` fail with an I/O error.
    #[must_use]
    pub fn with_failing_binary(mut self, name: &str) -> Self {
        self.failing.insert(name.to_owned());
        self
    }
}

impl DocumentLoader for MockLoader {
    fn list_publishable_documents(&self) -> Result<Vec<LocalDocument>, LoaderError> {
        Ok(self.documents.clone())
    }

    fn read_binary_near(
        &self,
        name: &str,
        _referencing_path: &Path,
    ) -> Result<Option<BinaryFile>, LoaderError> {
        if self.failing.contains(name) {
            return Err(LoaderError::io(
                name,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "mock failure"),
            ));
        }
        Ok(self.binaries.get(name).cloned())
    }
}
