//! Dependency tree node types

use std::fmt;

use serde::{Deserialize, Serialize};

/// A node of the dependency tree: one image repository
///
/// `children` holds at most one entry per repository. `edges` records every
/// build configuration that links this node to a child, so it may name the
/// same child more than once.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageRepoNode {
    #[serde(rename = "fullname")]
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ImageRepoNode>,
}

/// A build configuration relationship between two nodes
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Edge {
    /// `namespace/name` of the triggering build configuration
    #[serde(rename = "fullname")]
    pub full_name: String,
    /// `full_name` of the child node
    pub to: String,
}

impl Edge {
    pub fn new(full_name: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            to: to.into(),
        }
    }
}

impl ImageRepoNode {
    /// Create a leaf node
    pub fn new(full_name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            tags: vec![tag.into()],
            edges: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn child(&self, full_name: &str) -> Option<&ImageRepoNode> {
        self.children.iter().find(|c| c.full_name == full_name)
    }

    /// Edges whose target is `child`
    pub fn edges_to<'a>(&'a self, child: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.to == child)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Count the nodes of a tree, root included
///
/// A size of 1 means the repository has no dependencies.
pub fn tree_size(root: &ImageRepoNode) -> usize {
    1 + root.children.iter().map(tree_size).sum::<usize>()
}

/// Ancestor-string form: `name(child(grandchild))(child)`
impl fmt::Display for ImageRepoNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)?;
        for child in &self.children {
            write!(f, "({})", child)?;
        }
        Ok(())
    }
}
