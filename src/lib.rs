//! Build chain library
//!
//! Derives the build dependency graph of OpenShift image streams from
//! `BuildConfig` image-change triggers and renders it as JSON, DOT or an
//! ancestor string. Used by the `buildchain` binary and by tests.

pub mod chain;
pub mod cli;
pub mod config;
pub mod kube;
pub mod models;
pub mod render;
pub mod source;

// Re-export commonly used types for convenience
pub use chain::{ChainError, ChainResult, Edge, ImageRepoNode, build_dependency_tree};
pub use models::BuildConfig;
pub use render::{OutputFormat, RenderOptions, render};
