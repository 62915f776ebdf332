//! Graphviz DOT output
//!
//! Every repository in the tree becomes one node, identified by its
//! sanitized short name and labelled `namespace/name`. Every edge entry that
//! leads to a child becomes one DOT edge labelled with the build
//! configuration, so several configurations linking the same pair show up as
//! parallel edges. The written document is parsed back before it is
//! returned; output that does not parse is an error, never printed.

mod graph;
mod ident;
mod parser;

pub use graph::{Attrs, Graph, GraphEdge, Node, attr, quote};
pub use ident::{IdentAllocator, is_keyword, sanitize};
pub use parser::{DotParseError, parse};

use crate::chain::{ChainError, ChainResult, ImageRepoNode};
use crate::models::RepositoryIdentity;
use crate::render::RenderOptions;

/// Render a dependency tree as a DOT digraph
pub fn dot_dump(root: &ImageRepoNode, options: &RenderOptions) -> ChainResult<String> {
    let identity: RepositoryIdentity = root.full_name.parse()?;
    let mut ids = IdentAllocator::new();
    let graph_name = ids.ident(&root.full_name, &identity.name);

    let mut graph = Graph::new(graph_name);
    // Directed since we illustrate dependencies; not strict so that
    // parallel edges between the same pair of nodes are kept
    graph.directed = true;
    graph.strict = false;

    let root_tag = if options.label_root_tag {
        root.tags.first().map(String::as_str)
    } else {
        None
    };
    add_tree(&mut graph, &mut ids, root, root_tag)?;

    let output = graph.to_string();
    validate(&output, &graph)?;
    Ok(output)
}

fn add_tree(
    graph: &mut Graph,
    ids: &mut IdentAllocator,
    node: &ImageRepoNode,
    tag: Option<&str>,
) -> ChainResult<()> {
    let identity: RepositoryIdentity = node.full_name.parse()?;
    let id = ids.ident(&node.full_name, &identity.name);
    graph.add_node(&id, label(&identity.to_string(), tag));

    for child in &node.children {
        let child_identity: RepositoryIdentity = child.full_name.parse()?;
        let child_id = ids.ident(&child.full_name, &child_identity.name);
        // Declare the child before its edges so it keeps its label
        graph.add_node(&child_id, label(&child_identity.to_string(), None));
        for edge in node.edges_to(&child.full_name) {
            graph.add_edge(&id, &child_id, label(&edge.full_name, None));
        }
        add_tree(graph, ids, child, None)?;
    }
    Ok(())
}

fn label(text: &str, tag: Option<&str>) -> Attrs {
    let value = match tag {
        Some(tag) => format!("{}:{}", text, tag),
        None => text.to_string(),
    };
    vec![("label".to_string(), value)]
}

/// Parse `output` back and check it describes `expected`
fn validate(output: &str, expected: &Graph) -> ChainResult<()> {
    let parsed = parse(output).map_err(|e| ChainError::InvalidGraph(e.to_string()))?;
    if !parsed.directed || parsed.strict {
        return Err(ChainError::InvalidGraph(
            "graph must be a non-strict digraph".to_string(),
        ));
    }
    if parsed.nodes.len() != expected.nodes.len() || parsed.edges.len() != expected.edges.len() {
        return Err(ChainError::InvalidGraph(format!(
            "expected {} nodes and {} edges, parsed {} and {}",
            expected.nodes.len(),
            expected.edges.len(),
            parsed.nodes.len(),
            parsed.edges.len()
        )));
    }
    Ok(())
}
