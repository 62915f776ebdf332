//! The build-chain command
//!
//! Collects build configurations from a [`BuildConfigSource`], picks the
//! roots to compute, builds one dependency tree per `repository:tag` and
//! renders each tree that has at least one dependency.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::chain::{RootSelection, TreeBuilder, resolve_roots, tree_size};
use crate::config::Config;
use crate::render::{OutputFormat, RenderOptions, render};
use crate::source::BuildConfigSource;

/// Arguments of the build-chain command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildChainArgs {
    /// Image stream to start from, with an optional tag (default: latest).
    /// Without it, every image stream watched by a build trigger is used.
    #[arg(value_name = "IMAGE_STREAM[:TAG]", conflicts_with = "all")]
    pub image_stream: Option<String>,

    /// Build dependency trees for all image streams in all projects
    #[arg(long, conflicts_with = "all_tags")]
    pub all: bool,

    /// Build dependency trees for all tags of the image stream
    #[arg(long, requires = "image_stream")]
    pub all_tags: bool,

    /// Namespace to read from (default: config, then the kube context)
    #[arg(short = 'n', long)]
    pub namespace: Option<String>,

    /// Output format of dependency tree(s)
    #[arg(short = 'o', long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Read build configurations from a JSON or YAML file instead of the cluster
    #[arg(short = 'f', long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Do not append the tag to the root node label in DOT output
    #[arg(long)]
    pub no_root_tag: bool,
}

impl BuildChainArgs {
    /// Namespace given on the command line or in the config
    pub fn namespace(&self, config: &Config) -> Option<String> {
        self.namespace
            .clone()
            .or_else(|| Some(config.default_namespace.clone()))
            .filter(|ns| !ns.is_empty())
    }

    pub fn output_format(&self, config: &Config) -> OutputFormat {
        self.output.unwrap_or(config.output)
    }

    pub fn render_options(&self, config: &Config) -> RenderOptions {
        RenderOptions {
            label_root_tag: config.label_root_tag && !self.no_root_tag,
        }
    }
}

/// Compute and render the requested dependency trees
///
/// Returns one rendered document per tree, in catalog order. Trees without
/// dependencies are logged and skipped.
pub async fn execute(
    args: &BuildChainArgs,
    config: &Config,
    source: &dyn BuildConfigSource,
) -> Result<Vec<String>> {
    let namespace = args
        .namespace(config)
        .unwrap_or_else(|| source.default_namespace());

    let mut namespaces = if args.all {
        source.namespaces().await.context("Failed to list projects")?
    } else {
        Vec::new()
    };
    for ns in &namespaces {
        tracing::debug!("Found namespace {}", ns);
    }
    if namespaces.is_empty() {
        namespaces.push(namespace.clone());
    }

    let configs = source
        .build_configs(&namespaces)
        .await
        .context("Failed to get build configurations")?;

    let selection = match (&args.image_stream, args.all) {
        (Some(arg), false) => RootSelection::from_arg(arg, &namespace, args.all_tags)?,
        _ => RootSelection::Watched,
    };

    let known_tags = match selection.image_stream() {
        Some(repository) => source
            .image_stream_tags(&repository.namespace, &repository.name)
            .await
            .with_context(|| format!("Failed to get image stream {}", repository))?,
        None => Vec::new(),
    };

    let catalog = resolve_roots(&selection, &configs, &known_tags)?;
    let format = args.output_format(config);
    let options = args.render_options(config);

    let mut documents = Vec::new();
    let builder = TreeBuilder::new(&configs);
    for (repository, tag) in catalog.roots() {
        tracing::debug!("Checking dependencies of repo {} tag {}", repository, tag);
        let root = builder.build(&repository, &tag)?;

        if tree_size(&root) < 2 {
            tracing::info!("{}:{} has no dependencies", root.full_name, tag);
            continue;
        }

        documents.push(render(&root, format, &options)?);
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainError;
    use crate::models::BuildConfig;
    use crate::source::MockBuildConfigSource;

    fn configs() -> Vec<BuildConfig> {
        serde_yaml::from_str(
            r#"
- metadata: {name: app-build, namespace: ns}
  spec:
    triggers: [{type: ImageChange, imageChange: {}}]
    strategy: {sourceStrategy: {from: {kind: ImageStreamTag, name: "base:latest"}}}
    output: {to: {kind: ImageStreamTag, name: "app:latest"}}
- metadata: {name: tools-build, namespace: ns}
  spec:
    triggers: [{type: ImageChange, imageChange: {}}]
    strategy: {dockerStrategy: {from: {kind: ImageStreamTag, name: "base:v2"}}}
    output: {to: {kind: ImageStreamTag, name: "tools:latest"}}
"#,
        )
        .unwrap()
    }

    fn source() -> MockBuildConfigSource {
        let mut source = MockBuildConfigSource::new();
        source
            .expect_default_namespace()
            .return_const("ns".to_string());
        source
            .expect_build_configs()
            .returning(|_| Ok(configs()));
        source
            .expect_image_stream_tags()
            .returning(|_, _| Ok(vec!["latest".to_string(), "v2".to_string()]));
        source
    }

    fn args(image_stream: Option<&str>) -> BuildChainArgs {
        BuildChainArgs {
            image_stream: image_stream.map(str::to_string),
            output: Some(OutputFormat::Ast),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_single_tag() {
        let out = execute(&args(Some("base")), &Config::default(), &source())
            .await
            .unwrap();
        assert_eq!(out, vec!["ns/base(ns/app)"]);
    }

    #[tokio::test]
    async fn test_all_tags() {
        let args = BuildChainArgs {
            all_tags: true,
            ..args(Some("base"))
        };
        let out = execute(&args, &Config::default(), &source()).await.unwrap();
        assert_eq!(out, vec!["ns/base(ns/app)", "ns/base(ns/tools)"]);
    }

    #[tokio::test]
    async fn test_watched_repositories() {
        let out = execute(&args(None), &Config::default(), &source())
            .await
            .unwrap();
        assert_eq!(out.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_tag() {
        let err = execute(&args(Some("base:nope")), &Config::default(), &source())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChainError>(),
            Some(ChainError::UnknownTag { .. })
        ));
        assert_eq!(err.to_string(), "no tag nope exists in ns/base");
    }

    #[tokio::test]
    async fn test_leaf_is_skipped() {
        let out = execute(&args(Some("app")), &Config::default(), &source())
            .await
            .unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_all_reads_every_project() {
        let mut source = MockBuildConfigSource::new();
        source
            .expect_default_namespace()
            .return_const("ns".to_string());
        source
            .expect_namespaces()
            .times(1)
            .returning(|| Ok(vec!["a".to_string(), "ns".to_string()]));
        source
            .expect_build_configs()
            .withf(|namespaces| namespaces.len() == 2 && namespaces[0] == "a")
            .returning(|_| Ok(configs()));
        source.expect_image_stream_tags().times(0);

        let args = BuildChainArgs {
            all: true,
            ..args(None)
        };
        let out = execute(&args, &Config::default(), &source).await.unwrap();
        assert_eq!(out.len(), 2);
    }

    #[tokio::test]
    async fn test_no_repositories() {
        let mut source = MockBuildConfigSource::new();
        source
            .expect_default_namespace()
            .return_const("empty".to_string());
        source.expect_build_configs().returning(|_| Ok(Vec::new()));

        let err = execute(&args(None), &Config::default(), &source)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "no image repository available for building its dependency tree"
        );
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            default_namespace: "from-config".to_string(),
            output: OutputFormat::Dot,
            ..Default::default()
        };
        let mut args = BuildChainArgs::default();
        assert_eq!(args.namespace(&config).as_deref(), Some("from-config"));
        assert_eq!(args.output_format(&config), OutputFormat::Dot);
        assert!(args.render_options(&config).label_root_tag);

        args.namespace = Some("flag".to_string());
        args.output = Some(OutputFormat::Json);
        args.no_root_tag = true;
        assert_eq!(args.namespace(&config).as_deref(), Some("flag"));
        assert_eq!(args.output_format(&config), OutputFormat::Json);
        assert!(!args.render_options(&config).label_root_tag);
    }
}
