//! ADF document and node types.
//!
//! Serialization is deterministic: struct fields are emitted in declaration
//! order and attribute maps are sorted by key. Two trees with the same
//! structure always produce the same JSON bytes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Node and mark attributes.
pub type Attrs = serde_json::Map<String, Value>;

/// Root of an ADF document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdfDocument {
    /// ADF schema version (always 1).
    pub version: u32,
    /// Node type (always "doc").
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Top-level block nodes.
    #[serde(default)]
    pub content: Vec<Node>,
}

impl Default for AdfDocument {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl AdfDocument {
    /// Create a document from top-level block nodes.
    #[must_use]
    pub fn new(content: Vec<Node>) -> Self {
        Self {
            version: 1,
            doc_type: "doc".to_owned(),
            content,
        }
    }

    /// Single-paragraph document containing `text`.
    #[must_use]
    pub fn paragraph(text: &str) -> Self {
        Self::new(vec![Node::new("paragraph").with_content(vec![Node::text(text)])])
    }

    /// Parse a document from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the document to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Visit every node depth-first (pre-order).
    pub fn visit<F: FnMut(&Node)>(&self, mut f: F) {
        walk(&self.content, &mut f);
    }

    /// Visit every node depth-first (pre-order) with mutable access.
    ///
    /// The callback may rewrite the node in place, including its type.
    /// Children are visited after the callback returns, so a rewrite that
    /// removes content also removes it from the walk.
    pub fn visit_mut<F: FnMut(&mut Node)>(&mut self, mut f: F) {
        walk_mut(&mut self.content, &mut f);
    }

    /// Collect clones of all nodes matching `predicate`, in document order.
    #[must_use]
    pub fn filter<P: Fn(&Node) -> bool>(&self, predicate: P) -> Vec<Node> {
        let mut found = Vec::new();
        self.visit(|node| {
            if predicate(node) {
                found.push(node.clone());
            }
        });
        found
    }
}

fn walk<F: FnMut(&Node)>(nodes: &[Node], f: &mut F) {
    for node in nodes {
        f(node);
        walk(&node.content, f);
    }
}

fn walk_mut<F: FnMut(&mut Node)>(nodes: &mut [Node], f: &mut F) {
    for node in nodes {
        f(node);
        walk_mut(&mut node.content, f);
    }
}

/// ADF node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node type (e.g. "paragraph", "text", "media").
    #[serde(rename = "type")]
    pub node_type: String,
    /// Node attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Attrs>,
    /// Child nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,
    /// Text content (text nodes only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Inline marks (text nodes only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

impl Node {
    /// Create an empty node of the given type.
    #[must_use]
    pub fn new(node_type: &str) -> Self {
        Self {
            node_type: node_type.to_owned(),
            attrs: None,
            content: Vec::new(),
            text: None,
            marks: Vec::new(),
        }
    }

    /// Create a text node.
    #[must_use]
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_owned()),
            ..Self::new("text")
        }
    }

    /// Set an attribute.
    #[must_use]
    pub fn with_attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Replace child nodes.
    #[must_use]
    pub fn with_content(mut self, content: Vec<Node>) -> Self {
        self.content = content;
        self
    }

    /// Replace marks.
    #[must_use]
    pub fn with_marks(mut self, marks: Vec<Mark>) -> Self {
        self.marks = marks;
        self
    }

    /// Check the node type.
    #[must_use]
    pub fn is(&self, node_type: &str) -> bool {
        self.node_type == node_type
    }

    /// Get a string attribute.
    #[must_use]
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.as_ref()?.get(key)?.as_str()
    }

    /// Set an attribute, creating the attribute map if needed.
    pub fn set_attr(&mut self, key: &str, value: impl Into<Value>) {
        self.attrs
            .get_or_insert_with(Attrs::new)
            .insert(key.to_owned(), value.into());
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attr(&mut self, key: &str) -> Option<Value> {
        self.attrs.as_mut()?.remove(key)
    }

    /// Target of the first link-typed mark, if any.
    ///
    /// All marks are scanned; the link does not have to be the first mark.
    #[must_use]
    pub fn link_href(&self) -> Option<&str> {
        self.marks
            .iter()
            .find(|m| m.mark_type == "link")
            .and_then(|m| m.attr_str("href"))
    }
}

/// Inline mark applied to a text node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    /// Mark type (e.g. "strong", "link").
    #[serde(rename = "type")]
    pub mark_type: String,
    /// Mark attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Attrs>,
}

impl Mark {
    /// Create a mark without attributes.
    #[must_use]
    pub fn new(mark_type: &str) -> Self {
        Self {
            mark_type: mark_type.to_owned(),
            attrs: None,
        }
    }

    /// Create a link mark.
    #[must_use]
    pub fn link(href: &str) -> Self {
        let mut attrs = Attrs::new();
        attrs.insert("href".to_owned(), Value::from(href));
        Self {
            mark_type: "link".to_owned(),
            attrs: Some(attrs),
        }
    }

    /// Get a string attribute.
    #[must_use]
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.as_ref()?.get(key)?.as_str()
    }
}
