//! Attachment synchronization for media referenced by a document.

use std::collections::HashMap;
use std::path::Path;

use pagesync_adf::{AdfDocument, FILE_URL_SCHEME};
use pagesync_loader::{BinaryFile, DocumentLoader};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::MediaWarning;
use super::error_chain;
use crate::api::ConfluenceApi;
use crate::error::ConfluenceError;
use crate::types::{Attachment, AttachmentUpload};

/// Hex characters of the path hash used in attachment titles.
const PATH_HASH_LEN: usize = 32;

/// Remote identity of an attachment, as referenced by ADF `media` nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImageData {
    /// Attachment title on the page.
    pub filename: String,
    /// Media file id.
    pub id: String,
    /// Media collection name.
    pub collection: String,
}

/// Result of synchronizing one document's attachments.
#[derive(Debug, Default)]
pub(crate) struct AttachmentSync {
    /// Remote identity by media URL.
    pub(crate) uploaded: HashMap<String, UploadedImageData>,
    /// URLs that could not be resolved.
    pub(crate) warnings: Vec<MediaWarning>,
    /// Number of uploads performed.
    pub(crate) uploads: usize,
}

/// Distinct local media URLs in the tree, in first-seen order.
pub(crate) fn media_urls(tree: &AdfDocument) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    tree.visit(|node| {
        if node.is("media")
            && node.attr_str("type") == Some("file")
            && let Some(url) = node.attr_str("url")
            && !urls.iter().any(|u| u == url)
        {
            urls.push(url.to_owned());
        }
    });
    urls
}

/// Ensure every local media file referenced by `tree` exists on the page.
///
/// Attachments whose title and content hash already match are reused without
/// uploading. Missing files and failed uploads become warnings; only a failure
/// to list the page's attachments is an error.
pub(crate) fn sync_attachments(
    api: &dyn ConfluenceApi,
    loader: &dyn DocumentLoader,
    page_id: &str,
    document_path: &Path,
    tree: &AdfDocument,
) -> Result<AttachmentSync, ConfluenceError> {
    let mut sync = AttachmentSync::default();
    let urls = media_urls(tree);
    if urls.is_empty() {
        return Ok(sync);
    }

    let remote = api.list_attachments(page_id)?;
    let existing: HashMap<&str, &Attachment> =
        remote.iter().map(|a| (a.title.as_str(), a)).collect();

    for url in urls {
        let name = url.strip_prefix(FILE_URL_SCHEME).unwrap_or(&url);
        let binary = match loader.read_binary_near(name, document_path) {
            Ok(Some(binary)) => binary,
            Ok(None) => {
                sync.warn(&url, "file not found".to_owned());
                continue;
            }
            Err(e) => {
                sync.warn(&url, error_chain(&e));
                continue;
            }
        };

        let title = attachment_title(&binary);
        let hash = sha256_hex(&binary.contents);

        if let Some(attachment) = existing.get(title.as_str())
            && attachment.comment() == Some(hash.as_str())
            && let Some(file_id) = attachment.file_id()
        {
            debug!("Attachment '{}' unchanged, reusing {}", title, file_id);
            let collection = attachment
                .collection_name()
                .map_or_else(|| collection_for(page_id), str::to_owned);
            sync.uploaded.insert(
                url,
                UploadedImageData {
                    filename: title,
                    id: file_id.to_owned(),
                    collection,
                },
            );
            continue;
        }

        let upload = AttachmentUpload {
            file_name: &title,
            data: &binary.contents,
            content_type: &binary.mime_type,
            comment: &hash,
        };
        match api.upload_attachment(page_id, &upload) {
            Ok(attachment) => {
                sync.uploads += 1;
                let Some(file_id) = attachment.file_id() else {
                    sync.warn(&url, "upload response has no file id".to_owned());
                    continue;
                };
                let collection = collection_for(attachment.container_id().unwrap_or(page_id));
                sync.uploaded.insert(
                    url,
                    UploadedImageData {
                        id: file_id.to_owned(),
                        filename: title,
                        collection,
                    },
                );
            }
            Err(e) => sync.warn(&url, error_chain(&e)),
        }
    }

    Ok(sync)
}

impl AttachmentSync {
    fn warn(&mut self, url: &str, reason: String) {
        warn!("Media '{}' left unresolved: {}", url, reason);
        self.warnings.push(MediaWarning {
            url: url.to_owned(),
            reason,
        });
    }
}

/// Attachment title: hash of the vault-relative path plus the file name.
///
/// Files with the same name in different folders get distinct titles.
pub(crate) fn attachment_title(file: &BinaryFile) -> String {
    let path_hash = sha256_hex(file.file_path.as_bytes());
    format!("{}-{}", &path_hash[..PATH_HASH_LEN], file.file_name)
}

fn collection_for(page_id: &str) -> String {
    format!("contentId-{page_id}")
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
