//! Remote operations needed by the publisher.

use crate::client::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{Attachment, AttachmentUpload, Page};

/// Confluence operations used during a publish pass.
///
/// Implemented by [`ConfluenceClient`]; tests substitute an in-memory fake.
pub trait ConfluenceApi: Send + Sync {
    /// Get a page by id.
    fn get_page(&self, page_id: &str, expand: &[&str]) -> Result<Page, ConfluenceError>;

    /// Find a page by exact title in a space.
    fn find_page_by_title(
        &self,
        space_key: &str,
        title: &str,
        expand: &[&str],
    ) -> Result<Option<Page>, ConfluenceError>;

    /// Create a page with an ADF body under `parent_id`.
    fn create_page(
        &self,
        space_key: &str,
        parent_id: &str,
        title: &str,
        adf: &str,
    ) -> Result<Page, ConfluenceError>;

    /// Replace a page body, sending `current_version + 1`.
    fn update_page(
        &self,
        page_id: &str,
        parent_id: &str,
        title: &str,
        adf: &str,
        current_version: u32,
    ) -> Result<Page, ConfluenceError>;

    /// List every attachment of a page.
    fn list_attachments(&self, page_id: &str) -> Result<Vec<Attachment>, ConfluenceError>;

    /// Create or replace an attachment by title.
    fn upload_attachment(
        &self,
        page_id: &str,
        upload: &AttachmentUpload<'_>,
    ) -> Result<Attachment, ConfluenceError>;
}

impl ConfluenceApi for ConfluenceClient {
    fn get_page(&self, page_id: &str, expand: &[&str]) -> Result<Page, ConfluenceError> {
        ConfluenceClient::get_page(self, page_id, expand)
    }

    fn find_page_by_title(
        &self,
        space_key: &str,
        title: &str,
        expand: &[&str],
    ) -> Result<Option<Page>, ConfluenceError> {
        ConfluenceClient::find_page_by_title(self, space_key, title, expand)
    }

    fn create_page(
        &self,
        space_key: &str,
        parent_id: &str,
        title: &str,
        adf: &str,
    ) -> Result<Page, ConfluenceError> {
        ConfluenceClient::create_page(self, space_key, parent_id, title, adf)
    }

    fn update_page(
        &self,
        page_id: &str,
        parent_id: &str,
        title: &str,
        adf: &str,
        current_version: u32,
    ) -> Result<Page, ConfluenceError> {
        ConfluenceClient::update_page(self, page_id, parent_id, title, adf, current_version)
    }

    fn list_attachments(&self, page_id: &str) -> Result<Vec<Attachment>, ConfluenceError> {
        ConfluenceClient::list_attachments(self, page_id)
    }

    fn upload_attachment(
        &self,
        page_id: &str,
        upload: &AttachmentUpload<'_>,
    ) -> Result<Attachment, ConfluenceError> {
        ConfluenceClient::upload_attachment(self, page_id, upload)
    }
}
