//! Filesystem document loader.

use std::collections::VecDeque;
use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::document::{BinaryFile, DocumentLoader, LoaderError, LocalDocument};
use crate::mime::guess_content_type;

/// Loads documents from a vault directory on disk.
///
/// `source_dir` is the vault root: binary lookups never search above it.
/// Documents under `source_dir/folder` are published by default.
#[derive(Debug, Clone)]
pub struct FsLoader {
    source_dir: PathBuf,
    folder: PathBuf,
}

impl FsLoader {
    /// Create a loader for the given vault root and publish folder.
    #[must_use]
    pub fn new(source_dir: PathBuf, folder: &str) -> Self {
        let folder = source_dir.join(folder);
        Self { source_dir, folder }
    }

    /// Vault root directory.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Collect all markdown files below `dir`, depth-first in name order.
    fn collect_markdown(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), LoaderError> {
        for (path, is_dir) in read_dir_sorted(dir)? {
            if is_dir {
                self.collect_markdown(&path, files)?;
            } else if path.extension().is_some_and(|e| e == "md") {
                files.push(path);
            }
        }
        Ok(())
    }

    /// Find the file closest to `start_dir`.
    ///
    /// Searches `start_dir` and everything below it breadth-first, then
    /// repeats from each ancestor directory up to the vault root.
    fn find_closest_file(&self, name: &str, start_dir: &Path) -> Result<Option<PathBuf>, LoaderError> {
        if is_plain_relative(name) {
            let direct = start_dir.join(name);
            if direct.is_file() {
                return Ok(Some(direct));
            }
        }

        let Some(file_name) = Path::new(name).file_name().map(|n| n.to_string_lossy()) else {
            return Ok(None);
        };

        let mut dir = start_dir.to_path_buf();
        loop {
            if !dir.starts_with(&self.source_dir) {
                return Ok(None);
            }
            if let Some(found) = self.search_below(&file_name, &dir)? {
                return Ok(Some(found));
            }
            if dir == self.source_dir || !dir.pop() {
                return Ok(None);
            }
        }
    }

    /// Breadth-first search for a file named `file_name` (case-insensitive).
    fn search_below(&self, file_name: &str, dir: &Path) -> Result<Option<PathBuf>, LoaderError> {
        let wanted = file_name.to_lowercase();
        let mut queue = VecDeque::from([dir.to_path_buf()]);

        while let Some(current) = queue.pop_front() {
            let mut subdirs = Vec::new();
            for (path, is_dir) in read_dir_sorted(&current)? {
                if is_dir {
                    if path.starts_with(&self.source_dir) {
                        subdirs.push(path);
                    }
                } else if path
                    .file_name()
                    .is_some_and(|n| n.to_string_lossy().to_lowercase() == wanted)
                {
                    return Ok(Some(path));
                }
            }
            queue.extend(subdirs);
        }
        Ok(None)
    }

    /// Path relative to the vault root, `/`-separated.
    fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.source_dir)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl DocumentLoader for FsLoader {
    fn list_publishable_documents(&self) -> Result<Vec<LocalDocument>, LoaderError> {
        if !self.source_dir.is_dir() {
            return Err(LoaderError::SourceDirNotFound(self.source_dir.clone()));
        }

        let mut files = Vec::new();
        self.collect_markdown(&self.source_dir, &mut files)?;

        let mut documents = Vec::new();
        for path in files {
            let raw = fs::read_to_string(&path).map_err(|e| LoaderError::io(&path, e))?;
            let doc = LocalDocument::from_raw(&path, &raw);
            if doc.is_publishable(&self.folder) {
                documents.push(doc);
            } else {
                debug!("Skipping {} (not publishable)", path.display());
            }
        }
        Ok(documents)
    }

    fn read_binary_near(
        &self,
        name: &str,
        referencing_path: &Path,
    ) -> Result<Option<BinaryFile>, LoaderError> {
        let start_dir = referencing_path.parent().unwrap_or(&self.source_dir);
        let Some(path) = self.find_closest_file(name, start_dir)? else {
            return Ok(None);
        };

        let contents = fs::read(&path).map_err(|e| LoaderError::io(&path, e))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        debug!("Resolved '{}' to {}", name, path.display());
        Ok(Some(BinaryFile {
            contents,
            file_path: self.relative_path(&path),
            mime_type: guess_content_type(&file_name),
            file_name,
        }))
    }
}

/// Directory entries as (path, `is_dir`) pairs, sorted by name.
///
/// Hidden entries (`.obsidian`, `.git`, ...) are skipped.
fn read_dir_sorted(dir: &Path) -> Result<Vec<(PathBuf, bool)>, LoaderError> {
    let entries = fs::read_dir(dir).map_err(|e| LoaderError::io(dir, e))?;
    let mut result: Vec<(PathBuf, bool)> = entries
        .filter_map(Result::ok)
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .map(|e| {
            let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
            (e.path(), is_dir)
        })
        .collect();
    result.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(result)
}

/// True for relative paths made only of normal components (no `..`, no root).
fn is_plain_relative(name: &str) -> bool {
    let path = Path::new(name);
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn vault() -> (TempDir, FsLoader) {
        let dir = TempDir::new().unwrap();
        let loader = FsLoader::new(dir.path().to_path_buf(), "Confluence Pages");
        (dir, loader)
    }

    #[test]
    fn test_list_applies_publish_filter() {
        let (dir, loader) = vault();
        let root = dir.path();
        write(root, "Confluence Pages/Alpha.md", b"# Alpha");
        write(root, "Confluence Pages/Sub/Beta.md", b"# Beta");
        write(
            root,
            "Confluence Pages/Hidden.md",
            b"---\nconnie-publish: false\n---\nx",
        );
        write(root, "Journal/Private.md", b"x");
        write(root, "Journal/Shared.md", b"---\nconnie-publish: true\n---\nx");
        write(root, "Confluence Pages/image.png", b"png");

        let titles: Vec<String> = loader
            .list_publishable_documents()
            .unwrap()
            .into_iter()
            .map(|d| d.page_title)
            .collect();
        assert_eq!(titles, vec!["Alpha", "Beta", "Shared"]);
    }

    #[test]
    fn test_list_skips_hidden_directories() {
        let (dir, loader) = vault();
        write(dir.path(), ".obsidian/Confluence Pages/x.md", b"x");
        write(dir.path(), "Confluence Pages/.trash/y.md", b"y");
        assert!(loader.list_publishable_documents().unwrap().is_empty());
    }

    #[test]
    fn test_list_missing_source_dir() {
        let loader = FsLoader::new(PathBuf::from("/nonexistent/vault"), "Pages");
        let err = loader.list_publishable_documents().unwrap_err();
        assert!(matches!(err, LoaderError::SourceDirNotFound(_)));
    }

    #[test]
    fn test_read_binary_adjacent() {
        let (dir, loader) = vault();
        let doc = write(dir.path(), "Confluence Pages/Doc.md", b"x");
        write(dir.path(), "Confluence Pages/diagram.png", b"\x89PNG");

        let binary = loader.read_binary_near("diagram.png", &doc).unwrap().unwrap();
        assert_eq!(
            binary,
            BinaryFile {
                contents: b"\x89PNG".to_vec(),
                file_path: "Confluence Pages/diagram.png".to_owned(),
                file_name: "diagram.png".to_owned(),
                mime_type: "image/png".to_owned(),
            }
        );
    }

    #[test]
    fn test_read_binary_relative_path() {
        let (dir, loader) = vault();
        let doc = write(dir.path(), "Pages/Doc.md", b"x");
        write(dir.path(), "Pages/images/a.png", b"nested");
        write(dir.path(), "Pages/a.png", b"adjacent");

        let binary = loader.read_binary_near("images/a.png", &doc).unwrap().unwrap();
        assert_eq!(binary.contents, b"nested");
    }

    #[test]
    fn test_read_binary_searches_subdirectories_breadth_first() {
        let (dir, loader) = vault();
        let doc = write(dir.path(), "Pages/Doc.md", b"x");
        write(dir.path(), "Pages/a/deep/pic.png", b"deep");
        write(dir.path(), "Pages/b/pic.png", b"shallow");

        let binary = loader.read_binary_near("pic.png", &doc).unwrap().unwrap();
        assert_eq!(binary.file_path, "Pages/b/pic.png");
    }

    #[test]
    fn test_read_binary_searches_ancestors() {
        let (dir, loader) = vault();
        let doc = write(dir.path(), "Pages/Team/Doc.md", b"x");
        write(dir.path(), "attachments/logo.png", b"logo");

        let binary = loader.read_binary_near("logo.png", &doc).unwrap().unwrap();
        assert_eq!(binary.file_path, "attachments/logo.png");
    }

    #[test]
    fn test_read_binary_case_insensitive() {
        let (dir, loader) = vault();
        let doc = write(dir.path(), "Pages/Doc.md", b"x");
        write(dir.path(), "Pages/Logo.PNG", b"logo");

        let binary = loader.read_binary_near("logo.png", &doc).unwrap().unwrap();
        assert_eq!(binary.file_name, "Logo.PNG");
    }

    #[test]
    fn test_read_binary_never_leaves_vault() {
        let outer = TempDir::new().unwrap();
        write(outer.path(), "secret.png", b"outside");
        let root = outer.path().join("vault");
        let doc = write(&root, "Pages/Doc.md", b"x");
        let loader = FsLoader::new(root, "Pages");

        assert!(loader.read_binary_near("secret.png", &doc).unwrap().is_none());
        assert!(loader.read_binary_near("../../secret.png", &doc).unwrap().is_none());
    }

    #[test]
    fn test_read_binary_missing() {
        let (dir, loader) = vault();
        let doc = write(dir.path(), "Pages/Doc.md", b"x");
        assert!(loader.read_binary_near("nope.png", &doc).unwrap().is_none());
    }
}
