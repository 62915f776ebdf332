//! Where build configurations and image stream tags come from
//!
//! - `cluster.rs` - live cluster through the kube dynamic API
//! - `file.rs` - a JSON or YAML dump (`oc get bc -o yaml`)

mod cluster;
mod file;

pub use cluster::ClusterSource;
pub use file::FileSource;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::BuildConfig;

/// Read-only access to build configurations and image streams
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BuildConfigSource: Send + Sync {
    /// Namespace used when none is given on the command line
    fn default_namespace(&self) -> String;

    /// Every namespace (project) the source can see
    async fn namespaces(&self) -> Result<Vec<String>>;

    /// Build configurations in the given namespaces
    async fn build_configs(&self, namespaces: &[String]) -> Result<Vec<BuildConfig>>;

    /// Tags currently present on an image stream
    async fn image_stream_tags(&self, namespace: &str, name: &str) -> Result<Vec<String>>;
}
