//! Image reference parsing
//!
//! Handles the two string forms images are named by:
//! - stream tag names (`name:tag`) used by `ImageStreamTag` references
//! - combined pull specs (`[registry/][namespace/]name[:tag][@digest]`)

use std::fmt;
use std::str::FromStr;

use crate::chain::ChainError;

/// Tag assumed when a reference carries none
pub const DEFAULT_TAG: &str = "latest";

/// Split a stream tag name into `(name, tag)`
///
/// The tag is `None` when the name has no `:` separator.
pub fn split_tag(reference: &str) -> (&str, Option<&str>) {
    match reference.rsplit_once(':') {
        Some((name, tag)) if !tag.is_empty() => (name, Some(tag)),
        Some((name, _)) => (name, None),
        None => (reference, None),
    }
}

/// Join a namespace and a name into a repository identity
pub fn join(namespace: &str, name: &str) -> String {
    format!("{}/{}", namespace, name)
}

/// Repository identity, `namespace/name`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepositoryIdentity {
    pub namespace: String,
    pub name: String,
}

impl RepositoryIdentity {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl FromStr for RepositoryIdentity {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((namespace, name))
                if !namespace.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(namespace, name))
            }
            _ => Err(ChainError::InvalidRepository(s.to_string())),
        }
    }
}

/// A parsed combined image reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub registry: Option<String>,
    pub namespace: Option<String>,
    pub name: String,
    pub tag: String,
    pub digest: Option<String>,
}

impl FromStr for ImageReference {
    type Err = ChainError;

    fn from_str(reference: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| ChainError::MalformedReference {
            reference: reference.to_string(),
            reason: reason.to_string(),
        };

        if reference.is_empty() {
            return Err(malformed("empty reference"));
        }

        let (path, digest) = match reference.split_once('@') {
            Some((_, "")) => return Err(malformed("empty digest")),
            Some((path, digest)) => (path, Some(digest.to_string())),
            None => (reference, None),
        };

        // A tag separator only counts after the last path component so that
        // registry ports are not mistaken for tags.
        let last_slash = path.rfind('/').map_or(0, |i| i + 1);
        let (path, tag) = match path[last_slash..].rfind(':') {
            Some(i) => {
                let split = last_slash + i;
                let tag = &path[split + 1..];
                if !is_valid_tag(tag) {
                    return Err(malformed("invalid tag"));
                }
                (&path[..split], Some(tag))
            }
            None => (path, None),
        };

        let components: Vec<&str> = path.split('/').collect();
        let (registry, namespace, name) = match components.as_slice() {
            [name] => (None, None, *name),
            [first, name] if looks_like_registry(first) => (Some(*first), None, *name),
            [namespace, name] => (None, Some(*namespace), *name),
            [registry, namespace, name] => (Some(*registry), Some(*namespace), *name),
            _ => return Err(malformed("too many path components")),
        };

        if let Some(registry) = registry {
            if registry.is_empty() {
                return Err(malformed("empty registry"));
            }
        }
        if let Some(namespace) = namespace {
            if !is_valid_component(namespace) {
                return Err(malformed("invalid namespace"));
            }
        }
        if !is_valid_component(name) {
            return Err(malformed("invalid name"));
        }

        Ok(Self {
            registry: registry.map(str::to_string),
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
            tag: tag.unwrap_or(DEFAULT_TAG).to_string(),
            digest,
        })
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(registry) = &self.registry {
            write!(f, "{}/", registry)?;
        }
        if let Some(namespace) = &self.namespace {
            write!(f, "{}/", namespace)?;
        }
        write!(f, "{}:{}", self.name, self.tag)?;
        if let Some(digest) = &self.digest {
            write!(f, "@{}", digest)?;
        }
        Ok(())
    }
}

fn looks_like_registry(component: &str) -> bool {
    component.contains('.') || component.contains(':') || component == "localhost"
}

fn is_valid_component(component: &str) -> bool {
    !component.is_empty()
        && component
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
}

fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag.len() <= 128
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}
