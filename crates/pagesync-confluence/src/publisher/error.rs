//! Error types for publish runs.

use pagesync_loader::LoaderError;

use crate::error::ConfluenceError;

/// Error that prevents a publish run from starting.
///
/// Per-document failures never surface here; they are reported as
/// [`PublishStatus::Failed`](super::PublishStatus::Failed) outcomes.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Parent page could not be fetched.
    #[error("failed to resolve parent page {parent_id}")]
    ParentPage {
        /// Configured parent page id.
        parent_id: String,
        /// Underlying API error.
        #[source]
        source: ConfluenceError,
    },

    /// Parent page response did not include a space.
    #[error("parent page {0} has no space")]
    MissingSpace(String),

    /// Listing local documents failed.
    #[error("failed to list documents")]
    Loader(#[from] LoaderError),

    /// Worker pool could not be created.
    #[error("failed to start worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
