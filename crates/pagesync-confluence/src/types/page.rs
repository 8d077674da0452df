//! Confluence page types.

use serde::{Deserialize, Serialize};

/// Confluence page.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page {
    /// Page ID.
    pub id: String,
    /// Page title.
    pub title: String,
    /// Version information (present unless the response omitted it).
    #[serde(default)]
    pub version: Option<Version>,
    /// Space the page lives in (requires `expand=space`).
    #[serde(default)]
    pub space: Option<Space>,
    /// Page body content.
    #[serde(default)]
    pub body: Option<Body>,
}

impl Page {
    /// Current version number, if known.
    #[must_use]
    pub fn version_number(&self) -> Option<u32> {
        self.version.as_ref().map(|v| v.number)
    }

    /// Stored ADF body as a JSON string.
    #[must_use]
    pub fn adf_body(&self) -> Option<&str> {
        let value = self.body.as_ref()?.atlas_doc_format.as_ref()?;
        Some(&value.value)
    }

    /// Stored body in legacy storage format.
    #[must_use]
    pub fn storage_body(&self) -> Option<&str> {
        let value = self.body.as_ref()?.storage.as_ref()?;
        Some(&value.value)
    }
}

/// Page version.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Version {
    /// Version number.
    pub number: u32,
}

/// Space reference.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Space {
    /// Space key.
    pub key: String,
}

/// Page body content.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Body {
    /// Storage format content.
    #[serde(default)]
    pub storage: Option<BodyValue>,
    /// Atlassian Document Format content (serialized JSON).
    #[serde(default)]
    pub atlas_doc_format: Option<BodyValue>,
}

/// A single body representation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BodyValue {
    /// Serialized content.
    pub value: String,
    /// Content representation ("storage" or "atlas_doc_format").
    pub representation: String,
}

/// Content search API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentSearchResponse {
    /// Matching pages.
    pub results: Vec<Page>,
}
