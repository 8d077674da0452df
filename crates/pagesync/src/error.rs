//! CLI error types.

use pagesync_config::ConfigError;
use pagesync_confluence::PublishError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("{0} of {1} documents failed to publish")]
    DocumentsFailed(usize, usize),
}
