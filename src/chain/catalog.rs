//! Repository catalog
//!
//! Scans build configurations for the image stream tags they watch.

use std::collections::{BTreeMap, HashSet};

use crate::models::BuildConfig;

/// Mapping of repository identity (`namespace/name`) to watched tags
///
/// Repositories iterate in sorted order; tags keep discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoCatalog {
    repos: BTreeMap<String, Vec<String>>,
    seen: HashSet<(String, String)>,
}

impl RepoCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tag for a repository, ignoring duplicates
    ///
    /// Returns `true` when the tag was not yet known for that repository.
    pub fn insert(&mut self, repository: &str, tag: &str) -> bool {
        if !self
            .seen
            .insert((repository.to_string(), tag.to_string()))
        {
            return false;
        }
        self.repos
            .entry(repository.to_string())
            .or_default()
            .push(tag.to_string());
        true
    }

    /// Replace the tags of one repository
    pub fn set_tags(&mut self, repository: &str, tags: Vec<String>) {
        self.seen.retain(|(repo, _)| repo != repository);
        self.repos.remove(repository);
        for tag in tags {
            self.insert(repository, &tag);
        }
    }

    pub fn tags(&self, repository: &str) -> Option<&[String]> {
        self.repos.get(repository).map(Vec::as_slice)
    }

    pub fn contains(&self, repository: &str) -> bool {
        self.repos.contains_key(repository)
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    /// Number of repositories
    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.repos
            .iter()
            .map(|(repo, tags)| (repo.as_str(), tags.as_slice()))
    }

    /// Every `(repository, tag)` root, in iteration order
    pub fn roots(&self) -> Vec<(String, String)> {
        self.iter()
            .flat_map(|(repo, tags)| tags.iter().map(move |tag| (repo.to_string(), tag.clone())))
            .collect()
    }
}

/// Collect every image repository whose update triggers a build
///
/// Only mutable `ImageStreamTag` sources count: pinned images never change
/// and so never start a rebuild.
pub fn watched_repositories(configs: &[BuildConfig]) -> RepoCatalog {
    tracing::debug!("Scanning {} build configurations", configs.len());
    let mut catalog = RepoCatalog::new();

    for config in configs {
        tracing::trace!("Scanning build configuration {}", config.full_name());
        for source in config.trigger_sources() {
            let repository = source.repository();
            let unique = catalog.insert(&repository, &source.tag);
            tracing::trace!(
                "Found image change trigger on {}:{} (unique: {})",
                repository,
                source.tag,
                unique
            );
        }
    }

    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BuildConfigSpec, BuildStrategy, BuildTriggerPolicy, ImageChangeTrigger, ObjectReference,
        ReferenceKind, StrategyImage,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn config(
        namespace: &str,
        name: &str,
        kind: ReferenceKind,
        from: &str,
        from_ns: Option<&str>,
    ) -> BuildConfig {
        BuildConfig {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            spec: BuildConfigSpec {
                triggers: vec![BuildTriggerPolicy {
                    trigger_type: "ImageChange".to_string(),
                    image_change: Some(ImageChangeTrigger::default()),
                }],
                strategy: BuildStrategy {
                    source_strategy: Some(StrategyImage {
                        from: Some(ObjectReference {
                            kind,
                            name: from.to_string(),
                            namespace: from_ns.map(str::to_string),
                        }),
                    }),
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_empty_configs() {
        assert!(watched_repositories(&[]).is_empty());
    }

    #[test]
    fn test_namespace_defaults_to_config() {
        let catalog = watched_repositories(&[
            config("ns", "a", ReferenceKind::ImageStreamTag, "base:1", None),
            config("ns", "b", ReferenceKind::ImageStreamTag, "tools:2", Some("shared")),
        ]);
        assert_eq!(catalog.tags("ns/base"), Some(&["1".to_string()][..]));
        assert_eq!(catalog.tags("shared/tools"), Some(&["2".to_string()][..]));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_duplicate_tags_are_collapsed() {
        let catalog = watched_repositories(&[
            config("ns", "a", ReferenceKind::ImageStreamTag, "base:1", None),
            config("ns", "b", ReferenceKind::ImageStreamTag, "base:2", None),
            config("ns", "c", ReferenceKind::ImageStreamTag, "base:1", None),
        ]);
        assert_eq!(
            catalog.tags("ns/base").unwrap(),
            &["1".to_string(), "2".to_string()]
        );
    }

    #[test]
    fn test_pinned_sources_are_ignored() {
        let catalog = watched_repositories(&[
            config("ns", "a", ReferenceKind::ImageStreamImage, "base@sha256:1", None),
            config("ns", "b", ReferenceKind::DockerImage, "docker.io/library/base:1", None),
        ]);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_roots_are_sorted_by_repository() {
        let catalog = watched_repositories(&[
            config("ns", "a", ReferenceKind::ImageStreamTag, "zeta:1", None),
            config("ns", "b", ReferenceKind::ImageStreamTag, "alpha:1", None),
        ]);
        assert_eq!(
            catalog.roots(),
            vec![
                ("ns/alpha".to_string(), "1".to_string()),
                ("ns/zeta".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_set_tags_replaces_existing() {
        let mut catalog = RepoCatalog::new();
        catalog.insert("ns/a", "old");
        catalog.set_tags("ns/a", vec!["new".to_string(), "new".to_string()]);
        assert_eq!(catalog.tags("ns/a").unwrap(), &["new".to_string()]);
        assert!(catalog.insert("ns/a", "old"));
    }
}
