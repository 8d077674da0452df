//! Tree rewrites applied before a document is committed.

use std::collections::HashMap;

use pagesync_adf::{AdfDocument, Node};

use super::UploadedImageData;

/// Point local `media` nodes at their uploaded attachments.
///
/// Each file media node whose `url` is in `uploaded` gets `id` and
/// `collection` and loses `url`. Unresolved nodes are left as they are.
/// Returns the number of rewritten nodes.
pub fn resolve_media(tree: &mut AdfDocument, uploaded: &HashMap<String, UploadedImageData>) -> usize {
    let mut count = 0;
    tree.visit_mut(|node| {
        if !node.is("media") || node.attr_str("type") != Some("file") {
            return;
        }
        let Some(data) = node.attr_str("url").and_then(|url| uploaded.get(url)) else {
            return;
        };
        let (id, collection) = (data.id.clone(), data.collection.clone());
        node.set_attr("id", id);
        node.set_attr("collection", collection);
        node.remove_attr("url");
        count += 1;
    });
    count
}

/// Replace linked text with inline smart-link cards.
///
/// A run of adjacent text nodes carrying a `link` mark to the same target
/// (one link with mixed formatting) becomes a single `inlineCard` whose
/// `url` is the link target; the text and all marks are dropped.
/// Returns the number of cards created.
pub fn links_to_inline_cards(tree: &mut AdfDocument) -> usize {
    collapse_links(&mut tree.content)
}

fn collapse_links(nodes: &mut Vec<Node>) -> usize {
    let mut count = 0;
    let mut rewritten = Vec::with_capacity(nodes.len());
    let mut run_href: Option<String> = None;

    for mut node in nodes.drain(..) {
        if node.is("text")
            && let Some(href) = node.link_href()
        {
            if run_href.as_deref() != Some(href) {
                let href = href.to_owned();
                rewritten.push(Node::new("inlineCard").with_attr("url", href.as_str()));
                run_href = Some(href);
                count += 1;
            }
            continue;
        }
        run_href = None;
        count += collapse_links(&mut node.content);
        rewritten.push(node);
    }

    *nodes = rewritten;
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesync_adf::{Mark, markdown_to_adf};
    use pretty_assertions::assert_eq;

    fn uploaded() -> HashMap<String, UploadedImageData> {
        HashMap::from([(
            "file:a.png".to_owned(),
            UploadedImageData {
                filename: "h-a.png".to_owned(),
                id: "file-1".to_owned(),
                collection: "contentId-42".to_owned(),
            },
        )])
    }

    #[test]
    fn test_resolve_media_sets_identity() {
        let mut tree = markdown_to_adf("![](a.png)");
        assert_eq!(resolve_media(&mut tree, &uploaded()), 1);

        let media = tree.filter(|n| n.is("media"));
        assert_eq!(
            media,
            vec![
                Node::new("media")
                    .with_attr("type", "file")
                    .with_attr("id", "file-1")
                    .with_attr("collection", "contentId-42")
            ]
        );
    }

    #[test]
    fn test_resolve_media_leaves_unresolved_nodes() {
        let mut tree = markdown_to_adf("![](missing.png)\n\n![](https://x.test/a.png)");
        let before = tree.clone();
        assert_eq!(resolve_media(&mut tree, &uploaded()), 0);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_links_become_inline_cards() {
        let mut tree = markdown_to_adf("See [Example](https://example.com) now");
        assert_eq!(links_to_inline_cards(&mut tree), 1);

        let paragraph = &tree.content[0];
        assert_eq!(
            paragraph.content,
            vec![
                Node::text("See "),
                Node::new("inlineCard").with_attr("url", "https://example.com"),
                Node::text(" now"),
            ]
        );
    }

    #[test]
    fn test_link_mark_found_after_other_marks() {
        let mut tree = AdfDocument::new(vec![Node::new("paragraph").with_content(vec![
            Node::text("bold link").with_marks(vec![Mark::new("strong"), Mark::link("https://x.test")]),
        ])]);
        links_to_inline_cards(&mut tree);
        assert_eq!(
            tree.content[0].content,
            vec![Node::new("inlineCard").with_attr("url", "https://x.test")]
        );
    }

    #[test]
    fn test_formatted_link_becomes_one_card() {
        let mut tree = markdown_to_adf("[**bold** plain](https://x.test)");
        assert_eq!(links_to_inline_cards(&mut tree), 1);
        assert_eq!(
            tree.content[0].content,
            vec![Node::new("inlineCard").with_attr("url", "https://x.test")]
        );
    }

    #[test]
    fn test_adjacent_links_to_different_targets_stay_separate() {
        let mut tree = markdown_to_adf("[a](https://a.test)[b](https://b.test)");
        assert_eq!(links_to_inline_cards(&mut tree), 2);
        assert_eq!(
            tree.content[0].content,
            vec![
                Node::new("inlineCard").with_attr("url", "https://a.test"),
                Node::new("inlineCard").with_attr("url", "https://b.test"),
            ]
        );
    }

    #[test]
    fn test_links_in_nested_blocks_are_rewritten() {
        let mut tree = markdown_to_adf("- item with [link](https://x.test)");
        assert_eq!(links_to_inline_cards(&mut tree), 1);
        let cards = tree.filter(|n| n.is("inlineCard"));
        assert_eq!(cards.len(), 1);
    }

    #[test]
    fn test_rewrites_are_idempotent_and_commute() {
        let source = "![](a.png)\n\nA [link](https://example.com) here";
        let mut media_first = markdown_to_adf(source);
        resolve_media(&mut media_first, &uploaded());
        links_to_inline_cards(&mut media_first);

        let mut links_first = markdown_to_adf(source);
        links_to_inline_cards(&mut links_first);
        resolve_media(&mut links_first, &uploaded());
        assert_eq!(media_first, links_first);

        let once = media_first.clone();
        assert_eq!(resolve_media(&mut media_first, &uploaded()), 0);
        assert_eq!(links_to_inline_cards(&mut media_first), 0);
        assert_eq!(media_first, once);
    }
}
