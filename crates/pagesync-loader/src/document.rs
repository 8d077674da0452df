//! Loader trait and document types.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

/// Front-matter key that forces a document in (`true`) or out (`false`)
/// of publishing.
pub const PUBLISH_KEY: &str = "connie-publish";

/// A local markdown document ready to publish.
///
/// Immutable for the duration of one publish pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalDocument {
    /// Name of the directory containing the file.
    pub folder_name: String,
    /// Path to the file.
    pub absolute_file_path: PathBuf,
    /// File name including extension.
    pub file_name: String,
    /// File name without extension; the join key to the remote page.
    pub page_title: String,
    /// Markdown body with front-matter removed.
    pub contents: String,
    /// Parsed front-matter (empty when absent).
    pub frontmatter: Mapping,
}

impl LocalDocument {
    /// Build a document from its path and raw file content.
    #[must_use]
    pub fn from_raw(path: &Path, raw: &str) -> Self {
        let (frontmatter, contents) = crate::frontmatter::split_frontmatter(raw);
        let name = |p: Option<&std::ffi::OsStr>| {
            p.map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };

        Self {
            folder_name: name(path.parent().and_then(Path::file_name)),
            absolute_file_path: path.to_path_buf(),
            file_name: name(path.file_name()),
            page_title: name(path.file_stem()),
            contents: contents.to_owned(),
            frontmatter,
        }
    }

    /// Explicit publish flag from front-matter, if set to a boolean.
    #[must_use]
    pub fn publish_flag(&self) -> Option<bool> {
        match self.frontmatter.get(PUBLISH_KEY) {
            Some(Value::Bool(flag)) => Some(*flag),
            _ => None,
        }
    }

    /// Whether this document should be published.
    ///
    /// Documents under `folder` are published unless front-matter opts out;
    /// documents elsewhere only when front-matter opts in.
    #[must_use]
    pub fn is_publishable(&self, folder: &Path) -> bool {
        match self.publish_flag() {
            Some(flag) => flag,
            None => self.absolute_file_path.starts_with(folder),
        }
    }
}

/// Binary file referenced from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryFile {
    /// File content.
    pub contents: Vec<u8>,
    /// Path relative to the vault root, `/`-separated.
    pub file_path: String,
    /// File name including extension.
    pub file_name: String,
    /// MIME type guessed from the extension.
    pub mime_type: String,
}

/// Document loader error.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// Vault root does not exist or is not a directory.
    #[error("source directory not found: {}", .0.display())]
    SourceDirNotFound(PathBuf),
    /// Reading a file or directory failed.
    #[error("failed to read {}", path.display())]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl LoaderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Source of local documents and the binaries they reference.
pub trait DocumentLoader: Send + Sync {
    /// List all documents eligible for publishing.
    fn list_publishable_documents(&self) -> Result<Vec<LocalDocument>, LoaderError>;

    /// Find and read the binary `name` closest to `referencing_path`.
    ///
    /// Returns `Ok(None)` when no matching file exists.
    fn read_binary_near(
        &self,
        name: &str,
        referencing_path: &Path,
    ) -> Result<Option<BinaryFile>, LoaderError>;
}
