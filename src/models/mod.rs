//! Build chain model layer
//!
//! Rust types for the cluster resources the dependency graph is derived from.
//!
//! Structure:
//! - `build_config.rs` - BuildConfig resource and trigger/output resolution
//! - `image_reference.rs` - image reference parsing and repository identities

pub mod build_config;
pub mod image_reference;

pub use build_config::{
    BuildConfig, BuildConfigSpec, BuildOutput, BuildStrategy, BuildTriggerPolicy,
    ImageChangeTrigger, ObjectReference, OutputTarget, ReferenceKind, StrategyImage,
    TriggerSource,
};
pub use image_reference::{DEFAULT_TAG, ImageReference, RepositoryIdentity, join, split_tag};
