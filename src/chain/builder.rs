//! Dependency tree construction
//!
//! Starting from one `namespace/name:tag`, finds every build configuration
//! whose image-change trigger watches it, resolves where that build pushes,
//! and recurses into the pushed repository. Builds triggered through several
//! tags of the same repository collapse into a single child node.

use std::collections::HashMap;

use crate::chain::{ChainError, ChainResult, Edge, ImageRepoNode};
use crate::models::{BuildConfig, RepositoryIdentity, TriggerSource};

/// Builds dependency trees over a fixed set of build configurations
///
/// Trigger sources are indexed once by their `namespace/name:tag` key, so
/// each step of the traversal is a single lookup.
pub struct TreeBuilder<'a> {
    index: HashMap<String, Vec<&'a BuildConfig>>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(configs: &'a [BuildConfig]) -> Self {
        let mut index: HashMap<String, Vec<&'a BuildConfig>> = HashMap::new();
        for config in configs {
            for source in config.trigger_sources() {
                index.entry(source.key()).or_default().push(config);
            }
        }
        Self { index }
    }

    /// Build the dependency tree rooted at `repository` (`namespace/name`) and `tag`
    pub fn build(&self, repository: &str, tag: &str) -> ChainResult<ImageRepoNode> {
        let mut path = Vec::new();
        self.build_node(repository, tag, &mut path)
    }

    fn build_node(
        &self,
        repository: &str,
        tag: &str,
        path: &mut Vec<String>,
    ) -> ChainResult<ImageRepoNode> {
        let identity: RepositoryIdentity = repository.parse()?;
        let key = target_key(&identity.namespace, &identity.name, tag);

        if path.contains(&key) {
            let mut cycle = path.clone();
            cycle.push(key);
            return Err(ChainError::Cycle { path: cycle });
        }

        let mut root = ImageRepoNode::new(repository, tag);
        let Some(triggered) = self.index.get(&key) else {
            return Ok(root);
        };

        path.push(key);
        let mut child_index: HashMap<String, usize> = HashMap::new();

        for config in triggered {
            let Some(target) = config.output_target()? else {
                tracing::debug!(
                    "{} is triggered by {} but has no output",
                    config.full_name(),
                    path.last().map(String::as_str).unwrap_or_default()
                );
                continue;
            };

            let repository = target.repository();
            root.edges.push(Edge::new(config.full_name(), repository.clone()));

            if let Some(&existing) = child_index.get(&repository) {
                // Same repository reached through another tag: only the first
                // subtree is kept, so the duplicate is not expanded.
                let key = target_key(&target.namespace, &target.name, &target.tag);
                if path.contains(&key) {
                    let mut cycle = path.clone();
                    cycle.push(key);
                    return Err(ChainError::Cycle { path: cycle });
                }
                root.children[existing].tags.push(target.tag);
                continue;
            }

            let child = self.build_node(&repository, &target.tag, path)?;
            child_index.insert(repository, root.children.len());
            root.children.push(child);
        }

        path.pop();
        Ok(root)
    }
}

/// Matching key of `namespace/name:tag`, as used by the trigger index
fn target_key(namespace: &str, name: &str, tag: &str) -> String {
    TriggerSource {
        namespace: namespace.to_string(),
        name: name.to_string(),
        tag: tag.to_string(),
    }
    .key()
}

/// Build the dependency tree of `repository:tag` over `configs`
pub fn build_dependency_tree(
    repository: &str,
    tag: &str,
    configs: &[BuildConfig],
) -> ChainResult<ImageRepoNode> {
    tracing::debug!("Checking dependencies of repo {} tag {}", repository, tag);
    TreeBuilder::new(configs).build(repository, tag)
}
