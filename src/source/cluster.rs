//! Cluster-backed source

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::try_join_all;
use kube::api::ListParams;
use kube::core::DynamicObject;
use kube::{Api, Client};
use serde::Deserialize;

use super::BuildConfigSource;
use crate::models::BuildConfig;

/// Reads BuildConfigs, ImageStreams and Projects from the API server
pub struct ClusterSource {
    client: Client,
    namespace: String,
}

impl ClusterSource {
    /// Wrap a client; `namespace` overrides the client's default namespace
    pub fn new(client: Client, namespace: Option<String>) -> Self {
        let namespace = namespace
            .filter(|ns| !ns.is_empty())
            .unwrap_or_else(|| client.default_namespace().to_string());
        Self { client, namespace }
    }
}

/// Only `status.tags[].tag` of an image stream is needed
#[derive(Debug, Default, Deserialize)]
struct ImageStreamStatus {
    #[serde(default)]
    tags: Vec<NamedTag>,
}

#[derive(Debug, Deserialize)]
struct NamedTag {
    tag: String,
}

fn to_build_config(obj: DynamicObject) -> Result<BuildConfig> {
    let name = obj.metadata.name.clone().unwrap_or_default();
    let value = serde_json::to_value(&obj)
        .with_context(|| format!("Failed to serialize BuildConfig {}", name))?;
    serde_json::from_value(value).with_context(|| format!("Failed to parse BuildConfig {}", name))
}

#[async_trait]
impl BuildConfigSource for ClusterSource {
    fn default_namespace(&self) -> String {
        self.namespace.clone()
    }

    async fn namespaces(&self) -> Result<Vec<String>> {
        let api: Api<DynamicObject> =
            Api::all_with(self.client.clone(), &crate::kube::project_resource());
        let list = api
            .list(&ListParams::default())
            .await
            .context("Failed to list projects")?;

        let mut namespaces: Vec<String> = list
            .items
            .into_iter()
            .filter_map(|project| project.metadata.name)
            .collect();
        namespaces.sort();
        tracing::debug!("Found {} projects", namespaces.len());
        Ok(namespaces)
    }

    async fn build_configs(&self, namespaces: &[String]) -> Result<Vec<BuildConfig>> {
        let resource = crate::kube::build_config_resource();
        let lists = namespaces.iter().map(|namespace| {
            let api: Api<DynamicObject> =
                Api::namespaced_with(self.client.clone(), namespace, &resource);
            async move {
                let list = api
                    .list(&ListParams::default())
                    .await
                    .with_context(|| format!("Failed to list BuildConfigs in {}", namespace))?;
                tracing::debug!("Found {} BuildConfigs in {}", list.items.len(), namespace);
                Ok::<_, anyhow::Error>(list.items)
            }
        });

        // Results keep the namespace order
        try_join_all(lists)
            .await?
            .into_iter()
            .flatten()
            .map(to_build_config)
            .collect()
    }

    async fn image_stream_tags(&self, namespace: &str, name: &str) -> Result<Vec<String>> {
        let api: Api<DynamicObject> = Api::namespaced_with(
            self.client.clone(),
            namespace,
            &crate::kube::image_stream_resource(),
        );
        let stream = api
            .get(name)
            .await
            .with_context(|| format!("Failed to get image stream {}/{}", namespace, name))?;

        let status: ImageStreamStatus = match stream.data.get("status") {
            Some(status) => serde_json::from_value(status.clone()).with_context(|| {
                format!("Failed to parse status of image stream {}/{}", namespace, name)
            })?,
            None => ImageStreamStatus::default(),
        };

        Ok(status.tags.into_iter().map(|t| t.tag).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_object_converts_to_build_config() {
        let obj: DynamicObject = serde_json::from_value(serde_json::json!({
            "apiVersion": "build.openshift.io/v1",
            "kind": "BuildConfig",
            "metadata": {"name": "bc", "namespace": "ns"},
            "spec": {
                "triggers": [{"type": "ImageChange", "imageChange": {}}],
                "strategy": {"dockerStrategy": {"from": {"kind": "ImageStreamTag", "name": "base:1"}}},
                "output": {"to": {"kind": "ImageStreamTag", "name": "app:latest"}}
            }
        }))
        .unwrap();

        let config = to_build_config(obj).unwrap();
        assert_eq!(config.full_name(), "ns/bc");
        assert_eq!(config.trigger_sources()[0].key(), "ns/base:1");
    }

    #[test]
    fn test_image_stream_status_tags() {
        let status: ImageStreamStatus = serde_json::from_value(serde_json::json!({
            "dockerImageRepository": "registry/ns/app",
            "tags": [{"tag": "latest", "items": []}, {"tag": "v1"}]
        }))
        .unwrap();
        let tags: Vec<String> = status.tags.into_iter().map(|t| t.tag).collect();
        assert_eq!(tags, vec!["latest", "v1"]);
    }
}
