//! File-backed source
//!
//! Reads a dump of build configurations, either a Kubernetes `List` or a
//! bare array, in JSON or YAML. Image streams are not part of such a dump,
//! so the tags of a stream are the tags that build triggers watch on it.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::BuildConfigSource;
use crate::chain::watched_repositories;
use crate::models::{BuildConfig, join};

pub struct FileSource {
    namespace: String,
    configs: Vec<BuildConfig>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    List { items: Vec<BuildConfig> },
    Items(Vec<BuildConfig>),
}

impl FileSource {
    /// Load `path`; configurations without a namespace are placed in `namespace`
    pub async fn open(path: impl AsRef<Path>, namespace: &str) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Reading build configurations from {:?}", path);

        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read file: {:?}", path))?;
        let mut configs = parse_document(&content)
            .with_context(|| format!("Failed to parse build configurations from {:?}", path))?;

        for config in &mut configs {
            if config.namespace().is_empty() {
                config.metadata.namespace = Some(namespace.to_string());
            }
        }
        tracing::debug!("Loaded {} build configurations", configs.len());

        Ok(Self {
            namespace: namespace.to_string(),
            configs,
        })
    }
}

/// YAML is a superset of JSON, so one parser covers both
fn parse_document(content: &str) -> Result<Vec<BuildConfig>> {
    let document: Document = serde_yaml::from_str(content)?;
    Ok(match document {
        Document::List { items } => items,
        Document::Items(items) => items,
    })
}

#[async_trait]
impl BuildConfigSource for FileSource {
    fn default_namespace(&self) -> String {
        self.namespace.clone()
    }

    async fn namespaces(&self) -> Result<Vec<String>> {
        let namespaces: BTreeSet<&str> = self.configs.iter().map(|c| c.namespace()).collect();
        Ok(namespaces.into_iter().map(str::to_string).collect())
    }

    async fn build_configs(&self, namespaces: &[String]) -> Result<Vec<BuildConfig>> {
        Ok(self
            .configs
            .iter()
            .filter(|c| namespaces.iter().any(|ns| ns == c.namespace()))
            .cloned()
            .collect())
    }

    async fn image_stream_tags(&self, namespace: &str, name: &str) -> Result<Vec<String>> {
        let catalog = watched_repositories(&self.configs);
        Ok(catalog
            .tags(&join(namespace, name))
            .map(<[String]>::to_vec)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LIST_YAML: &str = r#"
apiVersion: v1
kind: List
items:
- metadata: {name: web, namespace: apps}
  spec:
    triggers: [{type: ImageChange, imageChange: {}}]
    strategy: {sourceStrategy: {from: {kind: ImageStreamTag, name: "base:latest"}}}
    output: {to: {kind: ImageStreamTag, name: "web:latest"}}
- metadata: {name: tools}
  spec:
    triggers: [{type: ImageChange, imageChange: {}}]
    strategy: {dockerStrategy: {from: {kind: ImageStreamTag, name: "base:v2"}}}
    output: {to: {kind: ImageStreamTag, name: "tools:latest"}}
"#;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_list_document() {
        let file = write_temp(LIST_YAML);
        let source = FileSource::open(file.path(), "fallback").await.unwrap();

        assert_eq!(
            source.namespaces().await.unwrap(),
            vec!["apps".to_string(), "fallback".to_string()]
        );
        let configs = source.build_configs(&["apps".to_string()]).await.unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].full_name(), "apps/web");
    }

    #[tokio::test]
    async fn test_bare_json_array() {
        let file = write_temp(
            r#"[{"metadata": {"name": "bc", "namespace": "ns"}, "spec": {}}]"#,
        );
        let source = FileSource::open(file.path(), "ns").await.unwrap();
        let configs = source.build_configs(&["ns".to_string()]).await.unwrap();
        assert_eq!(configs.len(), 1);
    }

    #[tokio::test]
    async fn test_tags_come_from_watched_triggers() {
        let file = write_temp(LIST_YAML);
        let source = FileSource::open(file.path(), "apps").await.unwrap();

        assert_eq!(
            source.image_stream_tags("apps", "base").await.unwrap(),
            vec!["latest".to_string(), "v2".to_string()]
        );
        assert!(source.image_stream_tags("apps", "web").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileSource::open(dir.path().join("missing.yaml"), "ns").await;
        assert!(result.is_err());
    }
}
