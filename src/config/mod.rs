//! Configuration system for buildchain
//!
//! A root config file, optionally layered with a per-kube-context file and
//! environment variable overrides.

pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, LoggerConfig};

use crate::render::OutputFormat;

/// Keys understood by `config get` and `config set`
pub const CONFIG_KEYS: &[&str] = &["defaultNamespace", "output", "labelRootTag", "logger.level"];

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    match key {
        "defaultNamespace" => Ok(config.default_namespace.clone()),
        "output" => Ok(config.output.to_string()),
        "labelRootTag" => Ok(config.label_root_tag.to_string()),
        "logger.level" => Ok(config.logger.level.clone()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut Config, key: &str, value: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    match key {
        "defaultNamespace" => {
            config.default_namespace = value.to_string();
        }
        "output" => {
            config.output = value
                .parse::<OutputFormat>()
                .map_err(anyhow::Error::msg)?;
        }
        "labelRootTag" => {
            config.label_root_tag = value
                .parse()
                .context("labelRootTag must be 'true' or 'false'")?;
        }
        "logger.level" => {
            if !LoggerConfig::is_valid_level(value) {
                return Err(anyhow::anyhow!(
                    "logger.level must be one of {}",
                    schema::LOG_LEVELS.join(", ")
                ));
            }
            config.logger.level = value.to_ascii_lowercase();
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_can_be_read() {
        let config = Config::default();
        for key in CONFIG_KEYS {
            assert!(get_config_value(&config, key).is_ok(), "{}", key);
        }
        assert!(get_config_value(&config, "nope").is_err());
    }

    #[test]
    fn test_set_values() {
        let mut config = Config::default();
        set_config_value(&mut config, "output", "dot").unwrap();
        set_config_value(&mut config, "labelRootTag", "false").unwrap();
        set_config_value(&mut config, "logger.level", "DEBUG").unwrap();

        assert_eq!(get_config_value(&config, "output").unwrap(), "dot");
        assert!(!config.label_root_tag);
        assert_eq!(config.logger.level, "debug");
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(set_config_value(&mut config, "output", "png").is_err());
        assert!(set_config_value(&mut config, "labelRootTag", "yes").is_err());
        assert!(set_config_value(&mut config, "logger.level", "loud").is_err());
        assert_eq!(config, Config::default());
    }
}
