//! Kubernetes client module
//!
//! Handles connection to the API server and describes the OpenShift
//! resources the build chain reads.

pub mod resources;

use anyhow::{Context, Result};
use kube::config::Kubeconfig;
use kube::{Client, Config};

pub use resources::{build_config_resource, image_stream_resource, project_resource};

/// Initialize and return a Kubernetes client
///
/// Uses the default kubeconfig loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn create_client() -> Result<Client> {
    let config = Config::infer()
        .await
        .context("Failed to load Kubernetes configuration")?;
    tracing::debug!(
        "Connecting to {} (namespace {})",
        config.cluster_url,
        config.default_namespace
    );
    let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
    Ok(client)
}

/// Get the current kubeconfig context name, if any
pub fn current_context() -> Option<String> {
    Kubeconfig::read().ok().and_then(|kc| kc.current_context)
}
