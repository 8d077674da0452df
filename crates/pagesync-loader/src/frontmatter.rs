//! YAML front-matter parsing.

use serde_yaml::Mapping;
use tracing::warn;

/// Split a document into its front-matter mapping and body.
///
/// Front-matter is a block delimited by `---` lines at the very start of the
/// file. Content without front-matter is returned unchanged with an empty
/// mapping. Malformed YAML is logged and treated as empty, but the block is
/// still removed from the body.
pub fn split_frontmatter(raw: &str) -> (Mapping, &str) {
    let Some((yaml, body)) = find_block(raw) else {
        return (Mapping::new(), raw);
    };

    if yaml.trim().is_empty() {
        return (Mapping::new(), body);
    }

    match serde_yaml::from_str::<Mapping>(yaml) {
        Ok(mapping) => (mapping, body),
        Err(e) => {
            warn!("Ignoring invalid front-matter: {e}");
            (Mapping::new(), body)
        }
    }
}

/// Locate the front-matter block, returning (yaml, body).
fn find_block(raw: &str) -> Option<(&str, &str)> {
    let rest = raw
        .strip_prefix("---\n")
        .or_else(|| raw.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed == "---" || trimmed == "..." {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    #[test]
    fn test_no_frontmatter() {
        let (fm, body) = split_frontmatter("# Title\n\nText");
        assert!(fm.is_empty());
        assert_eq!(body, "# Title\n\nText");
    }

    #[test]
    fn test_simple_frontmatter() {
        let (fm, body) = split_frontmatter("---\ntitle: Hello\ntags: [a, b]\n---\n# Body\n");
        assert_eq!(fm.get("title"), Some(&Value::from("Hello")));
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn test_crlf_frontmatter() {
        let (fm, body) = split_frontmatter("---\r\nconnie-publish: false\r\n---\r\nBody");
        assert_eq!(fm.get("connie-publish"), Some(&Value::Bool(false)));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_empty_frontmatter() {
        let (fm, body) = split_frontmatter("---\n---\nBody");
        assert!(fm.is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_unterminated_block_is_body() {
        let raw = "---\ntitle: x\nno end";
        let (fm, body) = split_frontmatter(raw);
        assert!(fm.is_empty());
        assert_eq!(body, raw);
    }

    #[test]
    fn test_invalid_yaml_is_stripped() {
        let (fm, body) = split_frontmatter("---\n: [unclosed\n---\nBody");
        assert!(fm.is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_horizontal_rule_not_at_start_is_not_frontmatter() {
        let raw = "Text\n---\nMore";
        let (fm, body) = split_frontmatter(raw);
        assert!(fm.is_empty());
        assert_eq!(body, raw);
    }
}
