//! OpenShift BuildConfig resource types
//!
//! Only the fields needed to derive build dependencies are modelled. Unknown
//! fields are ignored so objects fetched from any API server version can be
//! deserialized directly.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};

use super::image_reference::{DEFAULT_TAG, ImageReference, split_tag};
use crate::chain::ChainError;

/// A build configuration (build.openshift.io/v1 BuildConfig)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: BuildConfigSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfigSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<BuildTriggerPolicy>,
    #[serde(default)]
    pub strategy: BuildStrategy,
    #[serde(default)]
    pub output: BuildOutput,
}

/// A single trigger entry of a build configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildTriggerPolicy {
    #[serde(rename = "type", default)]
    pub trigger_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_change: Option<ImageChangeTrigger>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageChangeTrigger {
    /// Image to watch; the strategy image is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ObjectReference>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildStrategy {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub strategy_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_strategy: Option<StrategyImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_strategy: Option<StrategyImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_strategy: Option<StrategyImage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrategyImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ObjectReference>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<ObjectReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_image_reference: Option<String>,
}

/// Reference to an image source or destination
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    #[serde(default)]
    pub kind: ReferenceKind,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Kind of an image reference
///
/// Only `ImageStreamTag` references move over time; the other kinds are
/// pinned and never originate a rebuild.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReferenceKind {
    ImageStreamTag,
    ImageStreamImage,
    DockerImage,
    ImageStream,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A resolved image-change trigger source: a mutable `namespace/name:tag`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSource {
    pub namespace: String,
    pub name: String,
    pub tag: String,
}

impl TriggerSource {
    /// Repository identity, `namespace/name`
    pub fn repository(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }

    /// Key used to match a trigger against a tree node, `namespace/name:tag`
    pub fn key(&self) -> String {
        format!("{}/{}:{}", self.namespace, self.name, self.tag)
    }
}

/// Output destination of a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub namespace: String,
    pub name: String,
    pub tag: String,
}

impl OutputTarget {
    pub fn repository(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

impl BuildConfig {
    /// Namespace of the configuration, empty when unset
    pub fn namespace(&self) -> &str {
        self.metadata.namespace.as_deref().unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    /// `namespace/name` of the configuration itself
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.namespace(), self.name())
    }

    /// Image the build strategy pulls from
    pub fn strategy_from(&self) -> Option<&ObjectReference> {
        let strategy = &self.spec.strategy;
        strategy
            .source_strategy
            .as_ref()
            .or(strategy.docker_strategy.as_ref())
            .or(strategy.custom_strategy.as_ref())
            .and_then(|s| s.from.as_ref())
    }

    /// Resolve the source of every image-change trigger
    ///
    /// One entry per image-change trigger whose source is a mutable
    /// `ImageStreamTag` reference. Pinned references are skipped.
    pub fn trigger_sources(&self) -> Vec<TriggerSource> {
        let mut sources = Vec::new();
        for trigger in &self.spec.triggers {
            if !trigger.is_image_change() {
                continue;
            }
            let from = trigger
                .image_change
                .as_ref()
                .and_then(|ic| ic.from.as_ref())
                .or_else(|| self.strategy_from());
            let Some(from) = from else {
                tracing::trace!("{}: image change trigger without an image", self.full_name());
                continue;
            };
            if from.kind != ReferenceKind::ImageStreamTag || from.name.is_empty() {
                tracing::trace!(
                    "{}: skipping {:?} reference {}",
                    self.full_name(),
                    from.kind,
                    from.name
                );
                continue;
            }
            let (name, tag) = split_tag(&from.name);
            let namespace = match from.namespace.as_deref() {
                Some(ns) if !ns.is_empty() => ns.to_string(),
                _ => self.namespace().to_string(),
            };
            sources.push(TriggerSource {
                namespace,
                name: name.to_string(),
                tag: tag.unwrap_or(DEFAULT_TAG).to_string(),
            });
        }
        sources
    }

    /// Resolve where the build pushes its image
    ///
    /// Returns `Ok(None)` when the configuration has no output at all.
    pub fn output_target(&self) -> Result<Option<OutputTarget>, ChainError> {
        let output = &self.spec.output;

        if let Some(to) = output.to.as_ref().filter(|to| !to.name.is_empty()) {
            if to.kind == ReferenceKind::DockerImage {
                return self.target_from_reference(&to.name).map(Some);
            }
            let (name, embedded_tag) = split_tag(&to.name);
            let tag = embedded_tag
                .or(output.tag.as_deref().filter(|t| !t.is_empty()))
                .unwrap_or(DEFAULT_TAG);
            let namespace = match to.namespace.as_deref() {
                Some(ns) if !ns.is_empty() => ns,
                _ => self.namespace(),
            };
            return Ok(Some(OutputTarget {
                namespace: namespace.to_string(),
                name: name.to_string(),
                tag: tag.to_string(),
            }));
        }

        match output.docker_image_reference.as_deref() {
            Some(reference) if !reference.is_empty() => {
                self.target_from_reference(reference).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn target_from_reference(&self, reference: &str) -> Result<OutputTarget, ChainError> {
        let parsed: ImageReference = reference.parse()?;
        Ok(OutputTarget {
            namespace: self.namespace().to_string(),
            name: parsed.name,
            tag: parsed.tag,
        })
    }
}

impl BuildTriggerPolicy {
    pub fn is_image_change(&self) -> bool {
        self.image_change.is_some() || self.trigger_type == "ImageChange"
    }
}
