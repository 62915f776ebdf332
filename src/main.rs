//! buildchain - output the build dependencies of OpenShift image streams
//!
//! Reads BuildConfigs from the cluster (or a file), follows their
//! image-change triggers and prints one dependency tree per image stream tag.

use anyhow::{Context, Result};
use buildchain::cli::{self, BuildChainArgs, ConfigSubcommand};
use buildchain::config::ConfigLoader;
use buildchain::source::{BuildConfigSource, ClusterSource, FileSource};
use clap::{Parser, Subcommand};

const LONG_ABOUT: &str = "Output build dependencies of a specific image stream.
Supported output formats are json, dot, and ast. The default is json.
Tag and namespace are optional; when not given, 'latest' and the default
namespace are used.

Examples:

    # Build dependency tree for the specified image stream and tag
    $ buildchain [image-stream]:[tag]

    # Build dependency trees for all tags in the specified image stream
    $ buildchain [image-stream] --all-tags

    # Build the dependency tree using tag 'latest' in 'testing' namespace
    $ buildchain [image-stream] -n testing

    # Build the dependency tree and output it in DOT syntax
    $ buildchain [image-stream] -o dot

    # Build dependency trees for all image streams in the current namespace
    $ buildchain

    # Build dependency trees for all image streams across all namespaces
    $ buildchain --all";

/// Output build dependencies of OpenShift image streams
#[derive(Parser, Debug)]
#[command(name = "buildchain", version)]
#[command(about = "Output build dependencies of a specific image stream", long_about = LONG_ABOUT)]
#[command(args_conflicts_with_subcommands = true)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    #[command(flatten)]
    build: BuildChainArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Some(Command::Config { subcommand }) => {
            cli::init_logging(args.debug, "warn");
            return cli::handle_config_command(subcommand);
        }
        Some(Command::Version) => {
            cli::display_version();
            return Ok(());
        }
        None => {}
    }

    let context = buildchain::kube::current_context();
    let config = ConfigLoader::load(context.as_deref()).context("Failed to load configuration")?;
    cli::init_logging(args.debug, &config.logger.level);
    tracing::debug!(
        "Configuration loaded: context={:?}, output={}",
        context,
        config.output
    );

    let namespace = args.build.namespace(&config);
    let source: Box<dyn BuildConfigSource> = match &args.build.file {
        Some(path) => {
            let namespace = namespace.as_deref().unwrap_or("default");
            Box::new(FileSource::open(path, namespace).await?)
        }
        None => {
            let client = buildchain::kube::create_client().await?;
            Box::new(ClusterSource::new(client, namespace))
        }
    };

    for document in cli::execute(&args.build, &config, source.as_ref()).await? {
        println!("{}", document.trim_end());
    }

    Ok(())
}
