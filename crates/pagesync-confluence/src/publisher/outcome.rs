//! Result types for publish runs.

use std::fmt;
use std::path::PathBuf;

use pagesync_loader::LocalDocument;

/// What happened to a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStatus {
    /// Remote page already had identical content.
    Skipped,
    /// Page did not exist and was created.
    ///
    /// Reported even when the document's content equals the creation
    /// placeholder and no second version is written; the page is new either
    /// way. `Skipped` is reserved for pages that already existed.
    Created,
    /// Existing page received a new version.
    Updated,
    /// Publishing failed; see the outcome detail.
    Failed,
}

impl PublishStatus {
    /// Lowercase label for display.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Failed => "failed",
        }
    }

    /// Whether this status counts as a success.
    #[must_use]
    pub fn is_success(self) -> bool {
        self != Self::Failed
    }
}

impl fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Media reference that could not be turned into an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaWarning {
    /// Media URL as found in the document tree.
    pub url: String,
    /// Why it was left unresolved.
    pub reason: String,
}

impl fmt::Display for MediaWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.url, self.reason)
    }
}

/// Result of publishing one document.
#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    /// Page title.
    pub title: String,
    /// Local file path.
    pub path: PathBuf,
    /// Final status.
    pub status: PublishStatus,
    /// Human-readable detail (version change, or the error chain).
    pub detail: String,
    /// Unresolved media references.
    pub warnings: Vec<MediaWarning>,
}

impl DocumentOutcome {
    pub(crate) fn new(
        document: &LocalDocument,
        status: PublishStatus,
        detail: String,
        warnings: Vec<MediaWarning>,
    ) -> Self {
        Self {
            title: document.page_title.clone(),
            path: document.absolute_file_path.clone(),
            status,
            detail,
            warnings,
        }
    }
}

/// Outcomes of a publish run, in document order.
#[derive(Debug, Clone, Default)]
pub struct PublishSummary {
    /// Per-document outcomes.
    pub outcomes: Vec<DocumentOutcome>,
}

impl PublishSummary {
    /// Number of documents that did not fail.
    #[must_use]
    pub fn successes(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_success()).count()
    }

    /// Number of failed documents.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.outcomes.len() - self.successes()
    }

    /// Number of documents with the given status.
    #[must_use]
    pub fn count(&self, status: PublishStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: PublishStatus) -> DocumentOutcome {
        DocumentOutcome {
            title: "T".to_owned(),
            path: PathBuf::from("/vault/T.md"),
            status,
            detail: String::new(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_summary_counts() {
        let summary = PublishSummary {
            outcomes: vec![
                outcome(PublishStatus::Skipped),
                outcome(PublishStatus::Failed),
                outcome(PublishStatus::Created),
                outcome(PublishStatus::Updated),
            ],
        };
        assert_eq!(summary.successes(), 3);
        assert_eq!(summary.failures(), 1);
        assert_eq!(summary.count(PublishStatus::Created), 1);
    }

    #[test]
    fn test_media_warning_display() {
        let warning = MediaWarning {
            url: "file:a.png".to_owned(),
            reason: "file not found".to_owned(),
        };
        assert_eq!(warning.to_string(), "file:a.png: file not found");
    }
}
