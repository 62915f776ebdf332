//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};

use crate::render::OutputFormat;

/// Log levels accepted by `logger.level`
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Namespace to read build configurations from; empty means the
    /// namespace of the current kube context
    #[serde(default)]
    pub default_namespace: String,

    /// Output format used when `--output` is not given
    #[serde(default)]
    pub output: OutputFormat,

    /// Append the tag to the root node label in DOT output
    #[serde(default = "default_true")]
    pub label_root_tag: bool,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerConfig,
}

/// Logger configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    /// Default level, overridden by `--debug` and `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl LoggerConfig {
    pub fn is_valid_level(level: &str) -> bool {
        LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_namespace: String::new(),
            output: OutputFormat::default(),
            label_root_tag: default_true(),
            logger: LoggerConfig::default(),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert!(config.default_namespace.is_empty());
        assert_eq!(config.output, OutputFormat::Json);
        assert!(config.label_root_tag);
        assert_eq!(config.logger.level, "info");
    }

    #[test]
    fn test_config_serialization() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        assert!(yaml.contains("defaultNamespace"));
        assert!(yaml.contains("labelRootTag"));
        assert!(yaml.contains("output: json"));
    }

    #[test]
    fn test_config_deserialization() {
        let yaml = r#"
defaultNamespace: builds
output: dot
logger:
  level: debug
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.default_namespace, "builds");
        assert_eq!(config.output, OutputFormat::Dot);
        assert!(config.label_root_tag);
        assert_eq!(config.logger.level, "debug");
    }

    #[test]
    fn test_unknown_output_is_rejected() {
        assert!(serde_yaml::from_str::<Config>("output: svg").is_err());
    }

    #[test]
    fn test_log_levels() {
        assert!(LoggerConfig::is_valid_level("WARN"));
        assert!(!LoggerConfig::is_valid_level("verbose"));
    }
}
