//! Confluence Cloud integration for pagesync.
//!
//! - [`ConfluenceClient`]: blocking REST client with Basic authentication
//! - [`ConfluenceApi`]: the remote operations a publish pass needs
//! - [`Publisher`]: publishes loader documents as pages under a parent page

mod api;
mod client;
mod error;
mod publisher;
mod types;

pub use api::ConfluenceApi;
pub use client::ConfluenceClient;
pub use error::ConfluenceError;
pub use publisher::{
    DocumentOutcome, MediaWarning, PLACEHOLDER_TEXT, PublishError, PublishStatus, PublishSummary,
    Publisher, PublisherConfig, UploadedImageData, links_to_inline_cards, resolve_media,
};
pub use types::{
    Attachment, AttachmentExtensions, AttachmentMetadata, AttachmentUpload, AttachmentsResponse,
    Body, BodyValue, Container, ContentSearchResponse, Page, PageLinks, Space, Version,
};
