//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{paths, schema::Config};
use crate::render::OutputFormat;
use anyhow::{Context, Result};
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Context-specific config
    /// 3. Root config
    /// 4. Built-in defaults
    ///
    /// Command line flags are applied on top by the caller.
    pub fn load(context: Option<&str>) -> Result<Config> {
        let context_path = context.map(paths::context_config_path);
        let config = Self::load_layers(&paths::root_config_path(), context_path.as_deref())?;
        Ok(Self::apply_env_overrides(config))
    }

    /// Merge the root file and an optional context file over the defaults
    ///
    /// Missing files are skipped; a file that exists but does not parse is
    /// an error.
    pub fn load_layers(root: &Path, context: Option<&Path>) -> Result<Config> {
        let mut merged = serde_yaml::to_value(Config::default())
            .context("Failed to serialize default configuration")?;

        for path in std::iter::once(root).chain(context) {
            if !path.exists() {
                tracing::trace!("No config file at {}", path.display());
                continue;
            }
            tracing::debug!("Loading config file {}", path.display());
            let layer = Self::read_value(path)?;
            merge_values(&mut merged, layer);
        }

        serde_yaml::from_value(merged).context("Failed to load merged configuration")
    }

    /// Load configuration from a single file; an empty file gives the defaults
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let value = Self::read_value(path)?;
        if value.is_null() {
            return Ok(Config::default());
        }
        serde_yaml::from_value(value)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Validate configuration by loading and checking for errors
    ///
    /// Fails on invalid YAML syntax, invalid value types, an unknown output
    /// format or log level, and file read errors.
    pub fn validate(context: Option<&str>) -> Result<()> {
        let config = Self::load(context)?;
        if !super::LoggerConfig::is_valid_level(&config.logger.level) {
            return Err(anyhow::anyhow!(
                "logger.level '{}' is not one of {}",
                config.logger.level,
                super::schema::LOG_LEVELS.join(", ")
            ));
        }

        Ok(())
    }

    fn read_value(path: &Path) -> Result<Value> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let value: Value = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        if value.is_null() {
            return Ok(value);
        }
        // Type errors are reported against the file, not the merged result
        serde_yaml::from_value::<Config>(value.clone())
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(value)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(config: Config) -> Config {
        Self::apply_overrides(config, |key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, ignoring values that do not parse
    pub fn apply_overrides(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
        // BUILDCHAIN_OUTPUT override
        if let Some(output) = lookup("BUILDCHAIN_OUTPUT") {
            match output.parse::<OutputFormat>() {
                Ok(format) => config.output = format,
                Err(e) => tracing::warn!("Ignoring BUILDCHAIN_OUTPUT: {}", e),
            }
        }

        // BUILDCHAIN_NAMESPACE override
        if let Some(namespace) = lookup("BUILDCHAIN_NAMESPACE") {
            config.default_namespace = namespace;
        }

        // BUILDCHAIN_LOG_LEVEL override
        if let Some(level) = lookup("BUILDCHAIN_LOG_LEVEL") {
            config.logger.level = level;
        }

        config
    }

    /// Set one key in a single config file and leave its other keys alone
    ///
    /// `key` is a dotted path such as `logger.level`. The value is checked
    /// against the schema before the file is touched; a missing or empty file
    /// starts out as an empty mapping.
    pub fn set_value(path: &Path, key: &str, value: &str) -> Result<()> {
        let mut scratch = Config::default();
        super::set_config_value(&mut scratch, key, value)?;
        let scratch =
            serde_yaml::to_value(&scratch).context("Failed to serialize configuration")?;
        let typed = key
            .split('.')
            .try_fold(&scratch, |node, segment| node.get(segment))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Unknown config key: {}", key))?;

        let mut document = if path.exists() {
            Self::read_value(path)?
        } else {
            Value::Null
        };
        let segments: Vec<&str> = key.split('.').collect();
        insert_at(&mut document, &segments, typed);

        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let yaml =
            serde_yaml::to_string(&document).context("Failed to serialize configuration to YAML")?;
        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}

/// Place `value` at `segments` inside `document`, creating mappings on the way
fn insert_at(document: &mut Value, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *document = value;
        return;
    };
    if !document.is_mapping() {
        *document = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(map) = document {
        let entry = map
            .entry(Value::String(first.to_string()))
            .or_insert(Value::Null);
        insert_at(entry, rest, value);
    }
}

/// Recursively merge `other` into `base`; mappings merge key by key
fn merge_values(base: &mut Value, other: Value) {
    match (base, other) {
        (Value::Mapping(base), Value::Mapping(other)) => {
            for (key, value) in other {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        // An empty file parses as null and changes nothing
        (_, Value::Null) => {}
        (base, other) => *base = other,
    }
}
