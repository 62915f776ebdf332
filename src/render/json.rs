//! Structural dump of a dependency tree

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::chain::{ChainResult, ImageRepoNode};

/// Serialize a tree as tab-indented JSON
///
/// Empty `tags`, `edges` and `children` are omitted.
pub fn json_dump(root: &ImageRepoNode) -> ChainResult<String> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
    root.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Parse a structural dump back into a tree
pub fn parse_json(dump: &str) -> ChainResult<ImageRepoNode> {
    Ok(serde_json::from_str(dump)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Edge;

    #[test]
    fn test_dump_layout() {
        let mut root = ImageRepoNode::new("ns/a", "latest");
        root.edges.push(Edge::new("ns/bc", "ns/b"));
        root.children.push(ImageRepoNode::new("ns/b", "v1"));

        let expected = "{\n\t\"fullname\": \"ns/a\",\n\t\"tags\": [\n\t\t\"latest\"\n\t],\n\t\"edges\": [\n\t\t{\n\t\t\t\"fullname\": \"ns/bc\",\n\t\t\t\"to\": \"ns/b\"\n\t\t}\n\t],\n\t\"children\": [\n\t\t{\n\t\t\t\"fullname\": \"ns/b\",\n\t\t\t\"tags\": [\n\t\t\t\t\"v1\"\n\t\t\t]\n\t\t}\n\t]\n}";
        assert_eq!(json_dump(&root).unwrap(), expected);
    }

    #[test]
    fn test_dump_is_idempotent() {
        let mut root = ImageRepoNode::new("ns/a", "latest");
        root.edges.push(Edge::new("ns/bc", "ns/b"));
        root.edges.push(Edge::new("ns/bc2", "ns/b"));
        let mut child = ImageRepoNode::new("ns/b", "v1");
        child.tags.push("v2".to_string());
        root.children.push(child);

        let dump = json_dump(&root).unwrap();
        let parsed = parse_json(&dump).unwrap();
        assert_eq!(parsed, root);
        assert_eq!(json_dump(&parsed).unwrap(), dump);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_json("{\"tags\": []}").is_err());
    }
}
