//! Deployment manifest model.
//!
//! The Vercel file listing is a tree of entries, each either a file with an
//! opaque content uid or a directory with children. Child order is preserved
//! because it drives download order and console reporting.

use serde::{Deserialize, Serialize};

/// One entry in a deployment's file listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ManifestNode {
    File {
        name: String,
        uid: String,
    },
    Directory {
        name: String,
        #[serde(default)]
        children: Vec<ManifestNode>,
    },
}

/// Counts file entries reachable from the given nodes.
///
/// Iterative so an arbitrarily deep listing cannot exhaust the call stack.
pub fn file_count(nodes: &[ManifestNode]) -> usize {
    let mut count = 0;
    let mut work: Vec<&ManifestNode> = nodes.iter().collect();

    while let Some(node) = work.pop() {
        match node {
            ManifestNode::File { .. } => count += 1,
            ManifestNode::Directory { children, .. } => work.extend(children.iter()),
        }
    }

    count
}

/// Outcome counters for one mirror run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadStats {
    pub succeeded: u64,
    pub failed: u64,
}

impl DownloadStats {
    pub fn total(&self) -> u64 {
        self.succeeded + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_listing() -> Vec<ManifestNode> {
        serde_json::from_str(
            r#"[
                {
                    "name": "src",
                    "type": "directory",
                    "children": [
                        { "name": "main.ts", "type": "file", "uid": "uid-1" },
                        {
                            "name": "lib",
                            "type": "directory",
                            "children": [
                                { "name": "util.ts", "type": "file", "uid": "uid-2" }
                            ]
                        }
                    ]
                },
                { "name": "package.json", "type": "file", "uid": "uid-3" }
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn parses_tagged_listing() {
        let nodes = sample_listing();

        assert_eq!(nodes.len(), 2);
        assert!(matches!(&nodes[0], ManifestNode::Directory { name, .. } if name == "src"));
        assert_eq!(
            nodes[1],
            ManifestNode::File {
                name: "package.json".to_string(),
                uid: "uid-3".to_string(),
            }
        );
    }

    #[test]
    fn ignores_unknown_fields() {
        let node: ManifestNode = serde_json::from_str(
            r#"{ "name": "index.html", "type": "file", "uid": "u", "mode": 33188 }"#,
        )
        .unwrap();

        assert!(matches!(node, ManifestNode::File { ref name, .. } if name == "index.html"));
    }

    #[test]
    fn directory_children_default_to_empty() {
        let node: ManifestNode =
            serde_json::from_str(r#"{ "name": "public", "type": "directory" }"#).unwrap();

        match node {
            ManifestNode::Directory { children, .. } => assert!(children.is_empty()),
            other => panic!("expected directory, got {other:?}"),
        }
    }

    #[test]
    fn counts_nested_files() {
        assert_eq!(file_count(&sample_listing()), 3);
        assert_eq!(file_count(&[]), 0);
    }
}
