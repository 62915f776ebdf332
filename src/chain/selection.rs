//! Choosing which `repository:tag` roots to build trees for

use crate::chain::{ChainError, ChainResult, RepoCatalog, watched_repositories};
use crate::models::{BuildConfig, DEFAULT_TAG, RepositoryIdentity, split_tag};

/// Which roots to compute dependency trees for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootSelection {
    /// One tag of one image stream
    Tag {
        repository: RepositoryIdentity,
        tag: String,
    },
    /// Every tag of one image stream
    AllTags { repository: RepositoryIdentity },
    /// Every repository watched by an image-change trigger
    Watched,
}

impl RootSelection {
    /// Build a selection from an `image-stream[:tag]` argument
    ///
    /// The tag defaults to `latest`.
    pub fn from_arg(arg: &str, namespace: &str, all_tags: bool) -> ChainResult<Self> {
        let (name, tag) = split_tag(arg);
        if name.is_empty() || name.contains('/') {
            return Err(ChainError::InvalidRepository(arg.to_string()));
        }
        let repository = RepositoryIdentity::new(namespace, name);
        if all_tags {
            Ok(Self::AllTags { repository })
        } else {
            Ok(Self::Tag {
                repository,
                tag: tag.unwrap_or(DEFAULT_TAG).to_string(),
            })
        }
    }

    /// The image stream whose tags must be looked up, if any
    pub fn image_stream(&self) -> Option<&RepositoryIdentity> {
        match self {
            Self::Tag { repository, .. } | Self::AllTags { repository } => Some(repository),
            Self::Watched => None,
        }
    }
}

/// Resolve a selection into the catalog of roots to compute
///
/// `known_tags` are the tags of the selected image stream; they are ignored
/// for [`RootSelection::Watched`].
pub fn resolve_roots(
    selection: &RootSelection,
    configs: &[BuildConfig],
    known_tags: &[String],
) -> ChainResult<RepoCatalog> {
    let catalog = match selection {
        RootSelection::Tag { repository, tag } => {
            let repo = repository.to_string();
            if !known_tags.contains(tag) {
                return Err(ChainError::UnknownTag {
                    tag: tag.clone(),
                    repository: repo,
                });
            }
            let mut catalog = RepoCatalog::new();
            catalog.insert(&repo, tag);
            catalog
        }
        RootSelection::AllTags { repository } => {
            let mut catalog = RepoCatalog::new();
            catalog.set_tags(&repository.to_string(), known_tags.to_vec());
            catalog
        }
        RootSelection::Watched => watched_repositories(configs),
    };

    if catalog.is_empty() {
        return Err(ChainError::NoRepositories);
    }
    Ok(catalog)
}
