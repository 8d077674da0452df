//! Publisher for a set of local documents.
//!
//! [`Publisher`] runs the whole publish pass:
//!
//! 1. Resolve the parent page and its space
//! 2. List publishable documents from the loader
//! 3. For each document, on a bounded worker pool:
//!    find or create the page by title, upload referenced media,
//!    rewrite the tree, and commit a new version only if the body changed
//!
//! A failing document is recorded in its [`DocumentOutcome`] and never
//! stops the other documents.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::PathBuf;
//! use pagesync_confluence::{ConfluenceClient, Publisher, PublisherConfig};
//! use pagesync_loader::FsLoader;
//!
//! let client = ConfluenceClient::new("https://example.atlassian.net", "me@example.com", "token");
//! let loader = FsLoader::new(PathBuf::from("/vault"), "Confluence Pages");
//! let config = PublisherConfig {
//!     parent_id: "123456".to_owned(),
//!     concurrency: 4,
//! };
//!
//! let summary = Publisher::new(&client, &loader, config).publish()?;
//! println!("{} succeeded, {} failed", summary.successes(), summary.failures());
//! # Ok(())
//! # }
//! ```

mod attachments;
mod error;
#[cfg(test)]
mod fake;
mod outcome;
mod page;
mod rewrite;

pub use attachments::UploadedImageData;
pub use error::PublishError;
pub use outcome::{DocumentOutcome, MediaWarning, PublishStatus, PublishSummary};
pub use page::PLACEHOLDER_TEXT;
pub use rewrite::{links_to_inline_cards, resolve_media};

use std::error::Error;

use pagesync_loader::DocumentLoader;
use rayon::prelude::*;
use tracing::info;

use crate::api::ConfluenceApi;
use page::{PageContext, publish_document};

/// Settings for a publish run.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Page under which new pages are created; also determines the space.
    pub parent_id: String,
    /// Number of documents processed in parallel (at least 1).
    pub concurrency: usize,
}

/// Publishes local documents as child pages of a parent page.
pub struct Publisher<'a> {
    api: &'a dyn ConfluenceApi,
    loader: &'a dyn DocumentLoader,
    config: PublisherConfig,
}

impl<'a> Publisher<'a> {
    /// Create a new publisher.
    #[must_use]
    pub fn new(
        api: &'a dyn ConfluenceApi,
        loader: &'a dyn DocumentLoader,
        config: PublisherConfig,
    ) -> Self {
        Self {
            api,
            loader,
            config,
        }
    }

    /// Publish every document the loader lists.
    ///
    /// # Errors
    ///
    /// Returns an error only when the run cannot start: the parent page or
    /// its space cannot be resolved, documents cannot be listed, or the
    /// worker pool cannot be created. Document failures are reported in the
    /// returned summary.
    pub fn publish(&self) -> Result<PublishSummary, PublishError> {
        let parent_id = &self.config.parent_id;
        let parent = self
            .api
            .get_page(parent_id, &["space"])
            .map_err(|source| PublishError::ParentPage {
                parent_id: parent_id.clone(),
                source,
            })?;
        let space_key = parent
            .space
            .map(|s| s.key)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| PublishError::MissingSpace(parent_id.clone()))?;

        let documents = self.loader.list_publishable_documents()?;
        info!(
            "Publishing {} documents to space {} under page {}",
            documents.len(),
            space_key,
            parent.id
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.concurrency.max(1))
            .build()?;

        let ctx = PageContext {
            api: self.api,
            loader: self.loader,
            space_key: &space_key,
            parent_id: &parent.id,
        };
        let outcomes = pool.install(|| {
            documents
                .par_iter()
                .map(|document| publish_document(&ctx, document))
                .collect()
        });

        Ok(PublishSummary { outcomes })
    }
}

/// Render an error and its sources as `outer: inner: ...`.
pub(crate) fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
