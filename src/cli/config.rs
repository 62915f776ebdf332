//! `config` subcommand handlers

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::config::{self, ConfigLoader, paths};

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get configuration value
    Get {
        /// Configuration key (e.g., "output", "logger.level")
        key: Option<String>,
    },
    /// Set configuration value
    Set {
        /// Configuration key (e.g., "output", "logger.level")
        key: String,
        /// Configuration value
        value: String,
        /// Kube context name for context-specific config
        #[arg(long)]
        context: Option<String>,
    },
    /// List all configuration
    List,
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
}

/// Handle configuration subcommands
pub fn handle_config_command(cmd: ConfigSubcommand) -> Result<()> {
    let context = crate::kube::current_context();

    match cmd {
        ConfigSubcommand::Get { key } => {
            let config =
                ConfigLoader::load(context.as_deref()).context("Failed to load configuration")?;

            if let Some(key) = key {
                let value = config::get_config_value(&config, &key)?;
                println!("{}", value);
            } else {
                let yaml =
                    serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
                print!("{}", yaml);
            }
        }
        ConfigSubcommand::Set {
            key,
            value,
            context,
        } => {
            // Only the target file is edited, never the merged view
            let path = match context.as_deref() {
                Some(ctx) => paths::context_config_path(ctx),
                None => paths::root_config_path(),
            };
            ConfigLoader::set_value(&path, &key, &value)
                .with_context(|| format!("Failed to set {} = {}", key, value))?;
            match context {
                Some(ctx) => println!("Configuration saved for context: {}", ctx),
                None => println!("Configuration saved"),
            }
        }
        ConfigSubcommand::List => {
            let config =
                ConfigLoader::load(context.as_deref()).context("Failed to load configuration")?;
            for key in config::CONFIG_KEYS {
                println!("{}: {}", key, config::get_config_value(&config, key)?);
            }
        }
        ConfigSubcommand::Path => {
            println!("{}", paths::root_config_path().display());
            if let Some(ctx) = context {
                println!("{}", paths::context_config_path(&ctx).display());
            }
        }
        ConfigSubcommand::Validate => {
            ConfigLoader::validate(context.as_deref())
                .context("Configuration validation failed")?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}
