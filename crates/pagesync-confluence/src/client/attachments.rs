//! Attachment operations for Confluence API.

use rand::RngExt;
use tracing::info;

use super::{ConfluenceClient, checked_body};
use crate::error::ConfluenceError;
use crate::types::{Attachment, AttachmentUpload, AttachmentsResponse};

/// Attachments requested per listing call.
const PAGE_SIZE: usize = 200;

impl ConfluenceClient {
    /// Create or replace an attachment by title.
    pub(crate) fn upload_attachment(
        &self,
        page_id: &str,
        upload: &AttachmentUpload<'_>,
    ) -> Result<Attachment, ConfluenceError> {
        let url = format!("{}/content/{}/child/attachment", self.api_url(), page_id);

        info!(
            "Uploading attachment '{}' to page {}",
            upload.file_name, page_id
        );

        let boundary = format!("----PagesyncBoundary{:016x}", rand::rng().random::<u64>());
        let body = multipart_body(&boundary, upload);

        let response = self
            .agent
            .put(&url)
            .header("Authorization", &self.auth_header)
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .header("X-Atlassian-Token", "nocheck")
            .header("Accept", "application/json")
            .send(&body[..])?;

        let response: AttachmentsResponse = checked_body(response)?.read_json()?;
        response.results.into_iter().next().ok_or_else(|| {
            ConfluenceError::UnexpectedResponse(format!(
                "empty attachment response for '{}'",
                upload.file_name
            ))
        })
    }

    /// List all attachments on a page, following pagination.
    pub(crate) fn list_attachments(&self, page_id: &str) -> Result<Vec<Attachment>, ConfluenceError> {
        info!("Getting attachments for page {}", page_id);

        let mut attachments = Vec::new();
        loop {
            let url = format!(
                "{}/content/{}/child/attachment?limit={}&start={}",
                self.api_url(),
                page_id,
                PAGE_SIZE,
                attachments.len()
            );

            let response = self
                .agent
                .get(&url)
                .header("Authorization", &self.auth_header)
                .header("Accept", "application/json")
                .call()?;

            let page: AttachmentsResponse = checked_body(response)?.read_json()?;
            let has_next = page.has_next() && !page.results.is_empty();
            attachments.extend(page.results);
            if !has_next {
                return Ok(attachments);
            }
        }
    }
}

/// Build a multipart form with `file`, `comment` and `minorEdit` parts.
fn multipart_body(boundary: &str, upload: &AttachmentUpload<'_>) -> Vec<u8> {
    let mut body = Vec::new();

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            escape_filename(upload.file_name)
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", upload.content_type).as_bytes());
    body.extend_from_slice(upload.data);
    body.extend_from_slice(b"\r\n");

    for (name, value) in [("comment", upload.comment), ("minorEdit", "false")] {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

/// Escape a quoted multipart parameter the way browsers do.
fn escape_filename(name: &str) -> String {
    name.replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
