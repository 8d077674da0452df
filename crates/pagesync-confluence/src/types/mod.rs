//! Confluence API types.

mod attachment;
mod page;

pub use attachment::{
    Attachment, AttachmentExtensions, AttachmentMetadata, AttachmentUpload, AttachmentsResponse,
    Container, PageLinks,
};
pub use page::{Body, BodyValue, ContentSearchResponse, Page, Space, Version};
