//! Confluence attachment types.

use serde::Deserialize;

/// Confluence attachment.
///
/// Only includes fields that are actually used.
/// Serde ignores unknown fields from the API response.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    /// Attachment ID.
    pub id: String,
    /// Attachment title/filename.
    pub title: String,
    /// Attachment metadata.
    #[serde(default)]
    pub metadata: Option<AttachmentMetadata>,
    /// Media platform identifiers.
    #[serde(default)]
    pub extensions: Option<AttachmentExtensions>,
    /// Content the attachment belongs to.
    #[serde(default)]
    pub container: Option<Container>,
}

impl Attachment {
    /// Upload comment; holds the content hash for attachments we uploaded.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.metadata.as_ref()?.comment.as_deref()
    }

    /// Media file id used by ADF `media` nodes.
    #[must_use]
    pub fn file_id(&self) -> Option<&str> {
        self.extensions.as_ref()?.file_id.as_deref()
    }

    /// Media collection name.
    #[must_use]
    pub fn collection_name(&self) -> Option<&str> {
        self.extensions.as_ref()?.collection_name.as_deref()
    }

    /// Id of the containing page.
    #[must_use]
    pub fn container_id(&self) -> Option<&str> {
        self.container.as_ref().map(|c| c.id.as_str())
    }
}

/// Attachment metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttachmentMetadata {
    /// Version comment.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Attachment extensions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentExtensions {
    /// Media file id.
    #[serde(default)]
    pub file_id: Option<String>,
    /// Media collection name.
    #[serde(default)]
    pub collection_name: Option<String>,
}

/// Containing content reference.
#[derive(Debug, Clone, Deserialize)]
pub struct Container {
    /// Content ID.
    pub id: String,
}

/// Attachments API response.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentsResponse {
    /// List of attachments.
    pub results: Vec<Attachment>,
    /// Pagination links.
    #[serde(rename = "_links", default)]
    pub links: Option<PageLinks>,
}

impl AttachmentsResponse {
    /// Whether the server reported more results after this page.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.links.as_ref().is_some_and(|l| l.next.is_some())
    }
}

/// Pagination links.
#[derive(Debug, Clone, Deserialize)]
pub struct PageLinks {
    /// Relative link to the next page of results.
    #[serde(default)]
    pub next: Option<String>,
}

/// Attachment payload for create-or-replace upload.
#[derive(Debug, Clone, Copy)]
pub struct AttachmentUpload<'a> {
    /// Attachment title; an existing attachment with this title is replaced.
    pub file_name: &'a str,
    /// File content.
    pub data: &'a [u8],
    /// MIME type.
    pub content_type: &'a str,
    /// Version comment.
    pub comment: &'a str,
}
