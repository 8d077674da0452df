//! Per-document pipeline: resolve the page, sync media, commit if changed.

use pagesync_adf::{AdfDocument, markdown_to_adf};
use pagesync_loader::{DocumentLoader, LocalDocument};
use tracing::{debug, info, trace, warn};

use super::attachments::sync_attachments;
use super::rewrite::{links_to_inline_cards, resolve_media};
use super::{DocumentOutcome, MediaWarning, PublishStatus, error_chain};
use crate::api::ConfluenceApi;
use crate::error::ConfluenceError;
use crate::types::Page;

/// Body of a freshly created page until real content is committed.
pub const PLACEHOLDER_TEXT: &str = "Blank page to replace";

/// Fields needed to diff and commit a page found by title.
const SEARCH_EXPAND: &[&str] = &["version", "body.atlas_doc_format", "body.storage"];

/// Shared, read-only state for one publish run.
pub(crate) struct PageContext<'a> {
    pub(crate) api: &'a dyn ConfluenceApi,
    pub(crate) loader: &'a dyn DocumentLoader,
    pub(crate) space_key: &'a str,
    pub(crate) parent_id: &'a str,
}

/// Remote page state the committer works from.
struct RemotePage {
    id: String,
    version: u32,
    current_body: String,
    created: bool,
}

impl RemotePage {
    fn found(page: Page) -> Result<Self, ConfluenceError> {
        let version = require_version(&page)?;
        if let Some(storage) = page.storage_body() {
            trace!("Page {} storage body: {}", page.id, storage);
        }
        Ok(Self {
            current_body: page.adf_body().unwrap_or_default().to_owned(),
            version,
            id: page.id,
            created: false,
        })
    }

    fn created(page: Page, placeholder: String) -> Result<Self, ConfluenceError> {
        let version = require_version(&page)?;
        Ok(Self {
            current_body: page.adf_body().map_or(placeholder, str::to_owned),
            version,
            id: page.id,
            created: true,
        })
    }
}

fn require_version(page: &Page) -> Result<u32, ConfluenceError> {
    page.version_number().ok_or_else(|| {
        ConfluenceError::UnexpectedResponse(format!("page {} has no version", page.id))
    })
}

/// Publish one document, capturing any failure in the outcome.
pub(crate) fn publish_document(ctx: &PageContext<'_>, document: &LocalDocument) -> DocumentOutcome {
    let mut warnings = Vec::new();
    match sync_page(ctx, document, &mut warnings) {
        Ok((status, detail)) => {
            info!("{} '{}': {}", status, document.page_title, detail);
            DocumentOutcome::new(document, status, detail, warnings)
        }
        Err(e) => {
            let detail = error_chain(&e);
            warn!("Failed to publish '{}': {}", document.page_title, detail);
            DocumentOutcome::new(document, PublishStatus::Failed, detail, warnings)
        }
    }
}

fn sync_page(
    ctx: &PageContext<'_>,
    document: &LocalDocument,
    warnings: &mut Vec<MediaWarning>,
) -> Result<(PublishStatus, String), ConfluenceError> {
    let mut tree = markdown_to_adf(&document.contents);
    let title = &document.page_title;

    let remote = match ctx.api.find_page_by_title(ctx.space_key, title, SEARCH_EXPAND)? {
        Some(page) => RemotePage::found(page)?,
        None => {
            let placeholder = AdfDocument::paragraph(PLACEHOLDER_TEXT).to_json()?;
            let page = ctx
                .api
                .create_page(ctx.space_key, ctx.parent_id, title, &placeholder)?;
            RemotePage::created(page, placeholder)?
        }
    };

    let attachments =
        sync_attachments(ctx.api, ctx.loader, &remote.id, &document.absolute_file_path, &tree)?;
    warnings.extend(attachments.warnings);

    resolve_media(&mut tree, &attachments.uploaded);
    links_to_inline_cards(&mut tree);
    let body = tree.to_json()?;

    let status = if remote.created {
        PublishStatus::Created
    } else {
        PublishStatus::Updated
    };

    if body == remote.current_body {
        debug!("Page {} ('{}') is up to date", remote.id, title);
        return Ok(if remote.created {
            (status, format!("page {} version {}", remote.id, remote.version))
        } else {
            (
                PublishStatus::Skipped,
                format!("unchanged at version {}", remote.version),
            )
        });
    }

    ctx.api
        .update_page(&remote.id, ctx.parent_id, title, &body, remote.version)?;

    let detail = if remote.created {
        format!("page {} version {}", remote.id, remote.version + 1)
    } else {
        format!("version {} -> {}", remote.version, remote.version + 1)
    };
    Ok((status, detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::fake::FakeConfluence;
    use pagesync_loader::MockLoader;
    use pretty_assertions::assert_eq;

    fn context<'a>(api: &'a FakeConfluence, loader: &'a MockLoader) -> PageContext<'a> {
        PageContext {
            api,
            loader,
            space_key: "DOCS",
            parent_id: FakeConfluence::PARENT_ID,
        }
    }

    fn document(raw: &str) -> LocalDocument {
        LocalDocument::from_raw(std::path::Path::new("/vault/Pages/Guide.md"), raw)
    }

    #[test]
    fn test_creates_missing_page_then_updates() {
        let api = FakeConfluence::new("DOCS");
        let loader = MockLoader::new();

        let outcome = publish_document(&context(&api, &loader), &document("# Hello"));

        assert_eq!(outcome.status, PublishStatus::Created);
        let page = api.page_by_title("Guide").unwrap();
        assert_eq!(page.version, 2);
        assert_eq!(page.parent_id, FakeConfluence::PARENT_ID);
        assert_eq!(page.body, markdown_to_adf("# Hello").to_json().unwrap());
    }

    #[test]
    fn test_created_page_matching_placeholder_is_not_updated() {
        let api = FakeConfluence::new("DOCS");
        let loader = MockLoader::new();

        let outcome = publish_document(&context(&api, &loader), &document(PLACEHOLDER_TEXT));

        assert_eq!(outcome.status, PublishStatus::Created);
        assert_eq!(api.page_by_title("Guide").unwrap().version, 1);
        assert_eq!(api.update_count(), 0);
    }

    #[test]
    fn test_existing_page_with_same_body_is_skipped() {
        let api = FakeConfluence::new("DOCS");
        let loader = MockLoader::new();
        let body = markdown_to_adf("Same").to_json().unwrap();
        api.add_page("Guide", &body);

        let outcome = publish_document(&context(&api, &loader), &document("Same"));

        assert_eq!(outcome.status, PublishStatus::Skipped);
        assert_eq!(outcome.detail, "unchanged at version 1");
        assert_eq!(api.update_count(), 0);
    }

    #[test]
    fn test_changed_content_updates_exactly_once() {
        let api = FakeConfluence::new("DOCS");
        let loader = MockLoader::new();
        api.add_page("Guide", &markdown_to_adf("Old").to_json().unwrap());

        let outcome = publish_document(&context(&api, &loader), &document("New"));

        assert_eq!(outcome.status, PublishStatus::Updated);
        assert_eq!(outcome.detail, "version 1 -> 2");
        assert_eq!(api.update_count(), 1);
        assert_eq!(api.page_by_title("Guide").unwrap().version, 2);
    }

    #[test]
    fn test_committed_body_has_inline_cards() {
        let api = FakeConfluence::new("DOCS");
        let loader = MockLoader::new();

        publish_document(
            &context(&api, &loader),
            &document("See [Example](https://example.com)"),
        );

        let body = api.page_by_title("Guide").unwrap().body;
        assert!(body.contains(r#"{"type":"inlineCard","attrs":{"url":"https://example.com"}}"#));
        assert!(!body.contains("Example"));
    }

    #[test]
    fn test_conflict_is_failed_outcome() {
        let api = FakeConfluence::new("DOCS");
        let loader = MockLoader::new();
        api.add_page("Guide", "");
        api.conflict_on_update("Guide");

        let outcome = publish_document(&context(&api, &loader), &document("New"));

        assert_eq!(outcome.status, PublishStatus::Failed);
        assert!(outcome.detail.starts_with("version conflict on page"));
    }

    #[test]
    fn test_media_warnings_do_not_fail_document() {
        let api = FakeConfluence::new("DOCS");
        let loader = MockLoader::new().with_binary("a.png", "Pages/a.png", b"png");

        let outcome = publish_document(
            &context(&api, &loader),
            &document("![](a.png)\n\n![](missing.png)"),
        );

        assert_eq!(outcome.status, PublishStatus::Created);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].url, "file:missing.png");
        let body = api.page_by_title("Guide").unwrap().body;
        assert!(body.contains("contentId-"));
        assert!(body.contains(r#""url":"file:missing.png""#));
    }
}
