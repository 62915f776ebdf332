//! Dependency tree output formats
//!
//! - `json`: structural dump of every node field, tab indented
//! - `dot`: Graphviz directed graph, validated by parsing it back
//! - `ast`: ancestor string, `name(child(grandchild))`

pub mod dot;
mod json;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chain::{ChainResult, ImageRepoNode};

pub use dot::dot_dump;
pub use json::{json_dump, parse_json};

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Dot,
    Ast,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Dot => "dot",
            OutputFormat::Ast => "ast",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "dot" => Ok(OutputFormat::Dot),
            "ast" => Ok(OutputFormat::Ast),
            _ => Err(format!("Wrong output format specified: {}", s)),
        }
    }
}

/// Per-render settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Put the root's first tag into the root node label (DOT only)
    pub label_root_tag: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            label_root_tag: true,
        }
    }
}

/// Render a dependency tree in the requested format
pub fn render(
    root: &ImageRepoNode,
    format: OutputFormat,
    options: &RenderOptions,
) -> ChainResult<String> {
    match format {
        OutputFormat::Json => json_dump(root),
        OutputFormat::Dot => dot_dump(root, options),
        OutputFormat::Ast => Ok(root.to_string()),
    }
}
