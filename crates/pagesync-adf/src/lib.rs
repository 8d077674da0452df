//! Atlassian Document Format (ADF) tree for pagesync.
//!
//! This crate provides:
//! - [`AdfDocument`], [`Node`] and [`Mark`]: a generic, serde-backed ADF tree
//!   with pre-order walkers ([`AdfDocument::visit`], [`AdfDocument::visit_mut`])
//! - [`markdown_to_adf`]: markdown to ADF conversion built on `pulldown-cmark`
//!
//! # Example
//!
//! ```
//! use pagesync_adf::markdown_to_adf;
//!
//! let doc = markdown_to_adf("# Hello\n\nSee [docs](https://example.com)");
//! let json = doc.to_json().unwrap();
//! assert!(json.starts_with(r#"{"version":1,"type":"doc""#));
//! ```

mod markdown;
mod node;

pub use markdown::{FILE_URL_SCHEME, markdown_to_adf};
pub use node::{AdfDocument, Attrs, Mark, Node};
