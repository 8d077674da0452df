//! Markdown to ADF conversion.
//!
//! Walks `pulldown-cmark` events and builds the ADF tree with an explicit
//! stack of open block nodes. ADF requires inline content to live inside a
//! paragraph, so text that pulldown-cmark emits directly inside a list item,
//! blockquote or table cell gets an implicit paragraph that is closed as soon
//! as a block starts or the container ends.

use percent_encoding::percent_decode_str;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd};

use crate::node::{AdfDocument, Mark, Node};

/// URL scheme used for media nodes that reference local files.
pub const FILE_URL_SCHEME: &str = "file:";

/// Node types that hold blocks but not inline content.
const BLOCK_CONTAINERS: [&str; 4] = ["listItem", "blockquote", "tableCell", "tableHeader"];

/// Node types that hold inline content.
const TEXT_BLOCKS: [&str; 2] = ["paragraph", "heading"];

/// Convert markdown text to an ADF document.
///
/// Front-matter must already be stripped.
#[must_use]
pub fn markdown_to_adf(markdown: &str) -> AdfDocument {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_WIKILINKS;

    let mut builder = AdfBuilder::default();
    for event in Parser::new_ext(markdown, options) {
        builder.process_event(event);
    }
    builder.finish()
}

struct Frame {
    node: Node,
    implicit: bool,
    /// Second half of a text block split by an image.
    continuation: bool,
}

/// Image being collected between `Start(Image)` and `End(Image)`.
struct PendingImage {
    dest: String,
    alt: String,
    /// Wikilink embeds repeat the target as their text; it is not alt text.
    keep_alt: bool,
}

impl PendingImage {
    fn alt(&self) -> &str {
        if self.keep_alt { &self.alt } else { "" }
    }
}

#[derive(Default)]
struct AdfBuilder {
    root: Vec<Node>,
    stack: Vec<Frame>,
    marks: Vec<Mark>,
    image: Option<PendingImage>,
    in_table_head: bool,
    /// Depth of wikilinks to other notes; these render as plain text.
    wikilink_depth: usize,
}

impl AdfBuilder {
    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.push_text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => {
                self.push_text(html.trim_end_matches('\n'));
            }
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => {
                if self.image.is_none() {
                    self.ensure_inline_container();
                    self.append(Node::new("hardBreak"));
                }
            }
            Event::Rule => {
                self.close_implicit();
                self.append(Node::new("rule"));
            }
            Event::TaskListMarker(checked) => {
                self.push_text(if checked { "[x] " } else { "[ ] " });
            }
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.open_block(Node::new("paragraph")),
            Tag::Heading { level, .. } => {
                self.open_block(Node::new("heading").with_attr("level", heading_level(level)));
            }
            Tag::BlockQuote(_) => self.open_block(Node::new("blockquote")),
            Tag::CodeBlock(kind) => {
                let mut node = Node::new("codeBlock");
                if let CodeBlockKind::Fenced(info) = kind
                    && let Some(language) = info.split_whitespace().next()
                {
                    node.set_attr("language", language);
                }
                self.open_block(node);
            }
            Tag::List(Some(start)) => {
                let mut node = Node::new("orderedList");
                if start != 1 {
                    node.set_attr("order", start);
                }
                self.open_block(node);
            }
            Tag::List(None) => self.open_block(Node::new("bulletList")),
            Tag::Item => self.open_block(Node::new("listItem")),
            Tag::Table(_) => self.open_block(Node::new("table")),
            Tag::TableHead => {
                self.in_table_head = true;
                self.open_block(Node::new("tableRow"));
            }
            Tag::TableRow => self.open_block(Node::new("tableRow")),
            Tag::TableCell => {
                let cell = if self.in_table_head {
                    "tableHeader"
                } else {
                    "tableCell"
                };
                self.open_block(Node::new(cell));
            }
            Tag::Emphasis => self.marks.push(Mark::new("em")),
            Tag::Strong => self.marks.push(Mark::new("strong")),
            Tag::Strikethrough => self.marks.push(Mark::new("strike")),
            Tag::Superscript => self.marks.push(subsup("sup")),
            Tag::Subscript => self.marks.push(subsup("sub")),
            Tag::Link {
                link_type,
                dest_url,
                ..
            } => {
                if matches!(link_type, LinkType::WikiLink { .. }) {
                    self.wikilink_depth += 1;
                } else {
                    self.marks.push(Mark::link(&dest_url));
                }
            }
            Tag::Image {
                link_type,
                dest_url,
                ..
            } => {
                self.image = Some(PendingImage {
                    dest: dest_url.into_string(),
                    alt: String::new(),
                    keep_alt: !matches!(link_type, LinkType::WikiLink { .. }),
                });
            }
            Tag::FootnoteDefinition(_)
            | Tag::HtmlBlock
            | Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::CodeBlock
            | TagEnd::List(_)
            | TagEnd::Table
            | TagEnd::TableRow
            | TagEnd::BlockQuote(_)
            | TagEnd::Item
            | TagEnd::TableCell => {
                self.close_implicit();
                self.close();
            }
            TagEnd::TableHead => {
                self.close();
                self.in_table_head = false;
            }
            TagEnd::Emphasis => self.pop_mark("em"),
            TagEnd::Strong => self.pop_mark("strong"),
            TagEnd::Strikethrough => self.pop_mark("strike"),
            TagEnd::Superscript | TagEnd::Subscript => self.pop_mark("subsup"),
            TagEnd::Link => {
                if self.wikilink_depth > 0 {
                    self.wikilink_depth -= 1;
                } else {
                    self.pop_mark("link");
                }
            }
            TagEnd::Image => {
                if let Some(image) = self.image.take() {
                    self.insert_media(&image);
                }
            }
            TagEnd::FootnoteDefinition
            | TagEnd::HtmlBlock
            | TagEnd::MetadataBlock(_)
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition => {}
        }
    }

    fn finish(mut self) -> AdfDocument {
        while !self.stack.is_empty() {
            self.close();
        }
        AdfDocument::new(self.root)
    }

    fn top_type(&self) -> Option<&str> {
        self.stack.last().map(|f| f.node.node_type.as_str())
    }

    fn open_block(&mut self, node: Node) {
        self.close_implicit();
        self.stack.push(Frame {
            node,
            implicit: false,
            continuation: false,
        });
    }

    /// Pop the top frame and attach it to its parent.
    ///
    /// Paragraphs left without content are dropped.
    fn close(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let mut node = frame.node;
        if node.content.is_empty() && (frame.continuation || node.is("paragraph")) {
            return;
        }
        if node.is("codeBlock")
            && let Some(last) = node.content.last_mut()
            && let Some(text) = last.text.as_mut()
        {
            let trimmed = text.trim_end_matches('\n').len();
            text.truncate(trimmed);
        }
        self.append(node);
    }

    fn close_implicit(&mut self) {
        while self.stack.last().is_some_and(|f| f.implicit) {
            self.close();
        }
    }

    /// Make sure the top of the stack accepts inline nodes.
    fn ensure_inline_container(&mut self) {
        let needs_paragraph = match self.top_type() {
            None => true,
            Some(t) => BLOCK_CONTAINERS.contains(&t),
        };
        if needs_paragraph {
            self.stack.push(Frame {
                node: Node::new("paragraph"),
                implicit: true,
                continuation: false,
            });
        }
    }

    /// Append a node to the innermost open node (or the document root).
    ///
    /// Adjacent text nodes with identical marks are merged.
    fn append(&mut self, node: Node) {
        let target = match self.stack.last_mut() {
            Some(frame) => &mut frame.node.content,
            None => &mut self.root,
        };
        if node.is("text")
            && let Some(last) = target.last_mut()
            && last.is("text")
            && last.marks == node.marks
            && let (Some(existing), Some(added)) = (last.text.as_mut(), node.text.as_deref())
        {
            existing.push_str(added);
            return;
        }
        target.push(node);
    }

    fn push_text(&mut self, text: &str) {
        if let Some(image) = self.image.as_mut() {
            image.alt.push_str(text);
            return;
        }
        if text.is_empty() {
            return;
        }
        if self.top_type() == Some("codeBlock") {
            self.append(Node::text(text));
            return;
        }
        self.ensure_inline_container();
        self.append(Node::text(text).with_marks(self.marks.clone()));
    }

    fn inline_code(&mut self, code: &str) {
        if let Some(image) = self.image.as_mut() {
            image.alt.push_str(code);
            return;
        }
        self.ensure_inline_container();
        // ADF only allows the code mark together with a link.
        let mut marks: Vec<Mark> = self
            .marks
            .iter()
            .filter(|m| m.mark_type == "link")
            .cloned()
            .collect();
        marks.insert(0, Mark::new("code"));
        self.append(Node::text(code).with_marks(marks));
    }

    fn pop_mark(&mut self, mark_type: &str) {
        if let Some(pos) = self.marks.iter().rposition(|m| m.mark_type == mark_type) {
            self.marks.remove(pos);
        }
    }

    /// Insert a `mediaSingle` block for an image.
    ///
    /// Images inside a paragraph or heading split it: the text before the
    /// image stays in the original block, the media follows it, and a fresh
    /// block of the same kind receives the text after the image.
    fn insert_media(&mut self, image: &PendingImage) {
        let media = Node::new("mediaSingle")
            .with_attr("layout", "center")
            .with_content(vec![media_node(&image.dest, image.alt())]);

        let in_text_block = self.top_type().is_some_and(|t| TEXT_BLOCKS.contains(&t));
        if !in_text_block {
            self.append(media);
            return;
        }

        let Some(frame) = self.stack.pop() else {
            return;
        };
        let mut continuation = Node::new(&frame.node.node_type);
        continuation.attrs.clone_from(&frame.node.attrs);
        let implicit = frame.implicit;

        if !frame.node.content.is_empty() {
            self.append(frame.node);
        }
        self.append(media);
        self.stack.push(Frame {
            node: continuation,
            implicit,
            continuation: true,
        });
    }
}

/// Build a `media` node for an image target.
fn media_node(dest: &str, alt: &str) -> Node {
    let mut node = Node::new("media");
    if dest.starts_with("http://") || dest.starts_with("https://") {
        node.set_attr("type", "external");
        node.set_attr("url", dest);
    } else {
        let name = percent_decode_str(dest).decode_utf8_lossy();
        node.set_attr("type", "file");
        node.set_attr("url", format!("{FILE_URL_SCHEME}{name}"));
        node.set_attr("collection", "");
    }
    if !alt.is_empty() {
        node.set_attr("alt", alt);
    }
    node
}

fn subsup(kind: &str) -> Mark {
    let mut mark = Mark::new("subsup");
    mark.attrs = Some(
        [("type".to_owned(), serde_json::Value::from(kind))]
            .into_iter()
            .collect(),
    );
    mark
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
