//! Build chain computation
//!
//! Derives which image repositories trigger which builds. Works purely on an
//! already fetched list of build configurations:
//! - `catalog` collects the repositories watched by image-change triggers
//! - `builder` grows the dependency tree of one `repository:tag`
//! - `selection` picks the roots the caller asked for

mod builder;
mod catalog;
mod error;
mod node;
mod selection;

pub use builder::{TreeBuilder, build_dependency_tree};
pub use catalog::{RepoCatalog, watched_repositories};
pub use error::{ChainError, ChainResult};
pub use node::{Edge, ImageRepoNode, tree_size};
pub use selection::{RootSelection, resolve_roots};
