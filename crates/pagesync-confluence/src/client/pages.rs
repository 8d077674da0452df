//! Page operations for Confluence API.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::json;
use tracing::info;

use super::{ConfluenceClient, checked_body};
use crate::error::ConfluenceError;
use crate::types::{ContentSearchResponse, Page};

/// Representation name for ADF bodies.
const ADF_REPRESENTATION: &str = "atlas_doc_format";

impl ConfluenceClient {
    /// Get page by ID with optional field expansion.
    pub(crate) fn get_page(&self, page_id: &str, expand: &[&str]) -> Result<Page, ConfluenceError> {
        let mut url = format!("{}/content/{}", self.api_url(), page_id);

        if !expand.is_empty() {
            url.push_str("?expand=");
            url.push_str(&expand.join(","));
        }

        info!("Getting page {}", page_id);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        Ok(checked_body(response)?.read_json()?)
    }

    /// Find a page by exact title within a space.
    pub(crate) fn find_page_by_title(
        &self,
        space_key: &str,
        title: &str,
        expand: &[&str],
    ) -> Result<Option<Page>, ConfluenceError> {
        let mut url = format!(
            "{}/content?type=page&spaceKey={}&title={}",
            self.api_url(),
            utf8_percent_encode(space_key, NON_ALPHANUMERIC),
            utf8_percent_encode(title, NON_ALPHANUMERIC),
        );

        if !expand.is_empty() {
            url.push_str("&expand=");
            url.push_str(&expand.join(","));
        }

        info!("Searching page '{}' in space {}", title, space_key);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        let search: ContentSearchResponse = checked_body(response)?.read_json()?;
        Ok(search.results.into_iter().next())
    }

    /// Create a page under `parent_id` with an ADF body.
    pub(crate) fn create_page(
        &self,
        space_key: &str,
        parent_id: &str,
        title: &str,
        adf: &str,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content", self.api_url());

        let payload = json!({
            "type": "page",
            "title": title,
            "space": {"key": space_key},
            "ancestors": [{"id": parent_id}],
            "body": {
                ADF_REPRESENTATION: {
                    "value": adf,
                    "representation": ADF_REPRESENTATION
                }
            }
        });

        info!("Creating page '{}' under {}", title, parent_id);

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        let page: Page = checked_body(response)?.read_json()?;
        info!("Created page {} ('{}')", page.id, page.title);
        Ok(page)
    }

    /// Update existing page (auto-increments version).
    ///
    /// Returns [`ConfluenceError::Conflict`] when `version` is no longer
    /// the latest.
    pub(crate) fn update_page(
        &self,
        page_id: &str,
        parent_id: &str,
        title: &str,
        adf: &str,
        version: u32,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), page_id);

        let payload = json!({
            "id": page_id,
            "type": "page",
            "title": title,
            "ancestors": [{"id": parent_id}],
            "body": {
                ADF_REPRESENTATION: {
                    "value": adf,
                    "representation": ADF_REPRESENTATION
                }
            },
            "version": {"number": version + 1}
        });

        info!(
            "Updating page {} from version {} to {}",
            page_id,
            version,
            version + 1
        );

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .put(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        let page: Page = checked_body(response)
            .map_err(|e| match e {
                ConfluenceError::HttpResponse { status: 409, body } => ConfluenceError::Conflict {
                    page_id: page_id.to_owned(),
                    body,
                },
                other => other,
            })?
            .read_json()?;

        info!("Updated page {} to version {}", page_id, version + 1);
        Ok(page)
    }
}
