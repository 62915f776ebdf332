//! In-memory DOT graph and its textual form

use std::fmt;

/// Ordered attribute list, `key=value`
pub type Attrs = Vec<(String, String)>;

/// A DOT graph: the statements this crate writes and reads back
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    pub strict: bool,
    pub directed: bool,
    pub name: Option<String>,
    /// Graph-level attributes
    pub attrs: Attrs,
    pub nodes: Vec<Node>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub attrs: Attrs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub attrs: Attrs,
}

impl Graph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Add a node; a node that already exists keeps its attributes
    pub fn add_node(&mut self, id: &str, attrs: Attrs) {
        if self.node(id).is_none() {
            self.nodes.push(Node {
                id: id.to_string(),
                attrs,
            });
        }
    }

    /// Add an edge, declaring missing endpoints
    ///
    /// In a strict graph a second edge between the same pair is dropped.
    pub fn add_edge(&mut self, from: &str, to: &str, attrs: Attrs) {
        self.add_node(from, Attrs::new());
        self.add_node(to, Attrs::new());
        if self.strict && self.edges.iter().any(|e| e.from == from && e.to == to) {
            return;
        }
        self.edges.push(GraphEdge {
            from: from.to_string(),
            to: to.to_string(),
            attrs,
        });
    }

    /// Edges between `from` and `to`
    pub fn edges_between<'a>(
        &'a self,
        from: &'a str,
        to: &'a str,
    ) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.from == from && e.to == to)
    }
}

/// Attribute value lookup
pub fn attr<'a>(attrs: &'a Attrs, key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Write `value` as a DOT ID, quoting it unless it is a bare identifier
pub fn quote(value: &str) -> String {
    let bare = value
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !super::ident::is_keyword(value);
    if bare {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn write_attrs(f: &mut fmt::Formatter<'_>, attrs: &Attrs) -> fmt::Result {
    if attrs.is_empty() {
        return Ok(());
    }
    let list: Vec<String> = attrs
        .iter()
        .map(|(k, v)| format!("{}={}", quote(k), quote(v)))
        .collect();
    write!(f, " [{}]", list.join(", "))
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.strict {
            f.write_str("strict ")?;
        }
        f.write_str(if self.directed { "digraph" } else { "graph" })?;
        if let Some(name) = &self.name {
            write!(f, " {}", quote(name))?;
        }
        writeln!(f, " {{")?;

        for (k, v) in &self.attrs {
            writeln!(f, "    {}={};", quote(k), quote(v))?;
        }
        for node in &self.nodes {
            write!(f, "    {}", quote(&node.id))?;
            write_attrs(f, &node.attrs)?;
            writeln!(f, ";")?;
        }
        let op = if self.directed { "->" } else { "--" };
        for edge in &self.edges {
            write!(f, "    {} {} {}", quote(&edge.from), op, quote(&edge.to))?;
            write_attrs(f, &edge.attrs)?;
            writeln!(f, ";")?;
        }

        writeln!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(value: &str) -> Attrs {
        vec![("label".to_string(), value.to_string())]
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("app"), "app");
        assert_eq!(quote("ns/app"), "\"ns/app\"");
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote("node"), "\"node\"");
        assert_eq!(quote("1x"), "\"1x\"");
    }

    #[test]
    fn test_display() {
        let mut graph = Graph::new("app");
        graph.directed = true;
        graph.add_node("app", label("ns/app"));
        graph.add_edge("app", "lib", label("ns/bc"));
        graph.add_edge("app", "lib", label("ns/bc2"));

        assert_eq!(
            graph.to_string(),
            "digraph app {\n    app [label=\"ns/app\"];\n    lib;\n    app -> lib [label=\"ns/bc\"];\n    app -> lib [label=\"ns/bc2\"];\n}\n"
        );
        assert_eq!(graph.edges_between("app", "lib").count(), 2);
    }

    #[test]
    fn test_strict_graph_drops_parallel_edges() {
        let mut graph = Graph::new("g");
        graph.strict = true;
        graph.add_edge("a", "b", Attrs::new());
        graph.add_edge("a", "b", Attrs::new());
        assert_eq!(graph.edges.len(), 1);
        assert!(graph.to_string().starts_with("strict graph g {"));
    }

    #[test]
    fn test_existing_node_keeps_attributes() {
        let mut graph = Graph::new("g");
        graph.add_node("a", label("first"));
        graph.add_node("a", label("second"));
        assert_eq!(attr(&graph.nodes[0].attrs, "label"), Some("first"));
    }
}
