//! DOT identifier allocation
//!
//! Maps repository names onto bare DOT identifiers
//! (`[A-Za-z_][A-Za-z0-9_]*`, never a keyword) such that two distinct
//! repositories never share an identifier within one graph.

use std::collections::{HashMap, HashSet};

const KEYWORDS: &[&str] = &["node", "edge", "graph", "digraph", "subgraph", "strict"];

/// Replace every character that is not legal in a bare DOT identifier
pub fn sanitize(name: &str) -> String {
    let mut id: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if id.is_empty() || id.starts_with(|c: char| c.is_ascii_digit()) {
        id.insert(0, '_');
    }
    if is_keyword(&id) {
        id.push('_');
    }
    id
}

/// DOT keywords are reserved regardless of case
pub fn is_keyword(value: &str) -> bool {
    KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(value))
}

/// Hands out one unique identifier per distinct key
#[derive(Debug, Default)]
pub struct IdentAllocator {
    assigned: HashMap<String, String>,
    taken: HashSet<String>,
}

impl IdentAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier for `key`, derived from `short_name`
    ///
    /// The same key always gets the same identifier. A key whose sanitized
    /// name is already held by another key gets a numeric suffix.
    pub fn ident(&mut self, key: &str, short_name: &str) -> String {
        if let Some(id) = self.assigned.get(key) {
            return id.clone();
        }

        let base = sanitize(short_name);
        let mut candidate = base.clone();
        let mut n = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{}_{}", base, n);
            n += 1;
        }

        self.taken.insert(candidate.clone());
        self.assigned.insert(key.to_string(), candidate.clone());
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("my-app"), "my_app");
        assert_eq!(sanitize("ns/app.v2"), "ns_app_v2");
        assert_eq!(sanitize("9lives"), "_9lives");
        assert_eq!(sanitize(""), "_");
        assert_eq!(sanitize("Graph"), "Graph_");
        assert_eq!(sanitize("nodejs"), "nodejs");
    }

    #[test]
    fn test_collisions_get_suffixes() {
        let mut ids = IdentAllocator::new();
        assert_eq!(ids.ident("ns/my-app", "my-app"), "my_app");
        assert_eq!(ids.ident("ns/my.app", "my.app"), "my_app_2");
        assert_eq!(ids.ident("other/my-app", "my-app"), "my_app_3");
        assert_eq!(ids.ident("ns/my-app", "my-app"), "my_app");
    }

    #[test]
    fn test_suffix_does_not_steal_existing_name() {
        let mut ids = IdentAllocator::new();
        assert_eq!(ids.ident("a/x_2", "x_2"), "x_2");
        assert_eq!(ids.ident("a/x", "x"), "x");
        assert_eq!(ids.ident("b/x", "x"), "x_3");
    }
}
