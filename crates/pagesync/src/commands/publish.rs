//! `pagesync publish` command implementation.

use std::path::PathBuf;

use clap::Args;
use pagesync_config::{CliSettings, Config};
use pagesync_confluence::{
    ConfluenceClient, DocumentOutcome, PublishStatus, PublishSummary, Publisher, PublisherConfig,
};
use pagesync_loader::FsLoader;
use tracing::debug;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the publish command.
#[derive(Args)]
pub(crate) struct PublishArgs {
    /// Path to configuration file (default: auto-discover pagesync.toml).
    #[arg(short, long, env = "PAGESYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Confluence Cloud site URL (overrides config).
    #[arg(long)]
    base_url: Option<String>,

    /// ID of the page new pages are created under (overrides config).
    #[arg(long)]
    parent_id: Option<String>,

    /// Atlassian account e-mail (overrides config).
    #[arg(long)]
    user_name: Option<String>,

    /// Atlassian API token (overrides config).
    #[arg(long)]
    api_token: Option<String>,

    /// Folder whose notes are published, relative to the source directory.
    #[arg(long)]
    folder: Option<String>,

    /// Vault root directory (overrides config).
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Number of documents published in parallel.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl PublishArgs {
    /// Execute the publish command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid, the run cannot start,
    /// or any document failed to publish.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            base_url: self.base_url,
            parent_id: self.parent_id,
            user_name: self.user_name,
            api_token: self.api_token,
            folder: self.folder,
            source_dir: self.source_dir,
            concurrency: self.concurrency,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let confluence = config.require_confluence()?;
        let publish = &config.publish_resolved;
        debug!(
            config_path = ?config.config_path,
            base_url = %confluence.base_url,
            parent_id = %confluence.parent_id,
            user_name = %confluence.user_name,
            source_dir = %publish.source_dir.display(),
            folder = %publish.folder,
            concurrency = publish.concurrency,
            "Resolved configuration"
        );

        let client = ConfluenceClient::new(
            &confluence.base_url,
            &confluence.user_name,
            &confluence.api_token,
        );
        let loader = FsLoader::new(publish.source_dir.clone(), &publish.folder);
        let publisher_config = PublisherConfig {
            parent_id: confluence.parent_id,
            concurrency: publish.concurrency,
        };

        output.info(&format!(
            "Publishing {} to {}...",
            publish.folder_path().display(),
            client.base_url()
        ));

        let summary = Publisher::new(&client, &loader, publisher_config).publish()?;
        print_summary(output, &summary);

        match summary.failures() {
            0 => Ok(()),
            failed => Err(CliError::DocumentsFailed(failed, summary.outcomes.len())),
        }
    }
}

fn print_summary(output: &Output, summary: &PublishSummary) {
    for outcome in &summary.outcomes {
        let line = status_line(outcome);
        match outcome.status {
            PublishStatus::Created | PublishStatus::Updated => output.success(&line),
            PublishStatus::Skipped => output.info(&line),
            PublishStatus::Failed => output.error(&line),
        }
        for warning in &outcome.warnings {
            output.warning(&format!("    ! {warning}"));
        }
    }

    output.separator();
    output.highlight(&format!(
        "{} succeeded ({} created, {} updated, {} unchanged), {} failed",
        summary.successes(),
        summary.count(PublishStatus::Created),
        summary.count(PublishStatus::Updated),
        summary.count(PublishStatus::Skipped),
        summary.failures()
    ));
}

fn status_line(outcome: &DocumentOutcome) -> String {
    format!(
        "  {:<8} {} ({})",
        outcome.status.label(),
        outcome.title,
        outcome.detail
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_line() {
        let outcome = DocumentOutcome {
            title: "Guide".to_owned(),
            path: PathBuf::from("/vault/Guide.md"),
            status: PublishStatus::Updated,
            detail: "version 3 -> 4".to_owned(),
            warnings: Vec::new(),
        };
        assert_eq!(status_line(&outcome), "  updated  Guide (version 3 -> 4)");
    }
}
