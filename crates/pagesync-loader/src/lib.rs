//! Document loading for pagesync.
//!
//! This crate provides a [`DocumentLoader`] trait that abstracts where local
//! documents and the binaries they reference come from:
//!
//! - [`FsLoader`]: walks a vault directory, parses YAML front-matter and
//!   applies the publish filter
//! - [`MockLoader`]: in-memory loader for tests (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use pagesync_loader::{DocumentLoader, FsLoader};
//!
//! let loader = FsLoader::new(PathBuf::from("/vault"), "Confluence Pages");
//! for doc in loader.list_publishable_documents()? {
//!     println!("{}: {}", doc.page_title, doc.absolute_file_path.display());
//! }
//! ```

mod document;
mod frontmatter;
mod fs;
mod mime;
#[cfg(feature = "mock")]
mod mock;

pub use document::{BinaryFile, DocumentLoader, LoaderError, LocalDocument, PUBLISH_KEY};
pub use frontmatter::split_frontmatter;
pub use fs::FsLoader;
pub use mime::guess_content_type;
#[cfg(feature = "mock")]
pub use mock::MockLoader;
