//! Confluence REST API client.
//!
//! Provides sync HTTP client for the Confluence Cloud REST API with
//! Basic authentication (account email + API token).

mod attachments;
mod pages;

use std::time::Duration;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use ureq::Agent;
use ureq::http::Response;

use crate::error::ConfluenceError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    auth_header: String,
}

impl ConfluenceClient {
    /// Create client from config values.
    ///
    /// # Arguments
    /// * `base_url` - Confluence Cloud site URL (e.g. `https://example.atlassian.net`)
    /// * `user_name` - Atlassian account email
    /// * `api_token` - Atlassian API token
    #[must_use]
    pub fn new(base_url: &str, user_name: &str, api_token: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        let credentials = BASE64_STANDARD.encode(format!("{user_name}:{api_token}"));

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth_header: format!("Basic {credentials}"),
        }
    }

    /// Site base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/wiki/rest/api", self.base_url)
    }
}

/// Return the response body, or an error carrying the body for error statuses.
fn checked_body(response: Response<ureq::Body>) -> Result<ureq::Body, ConfluenceError> {
    let status = response.status().as_u16();
    let mut body_reader = response.into_body();

    if status >= 400 {
        let error_body = body_reader
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(ConfluenceError::HttpResponse {
            status,
            body: error_body,
        });
    }
    Ok(body_reader)
}
