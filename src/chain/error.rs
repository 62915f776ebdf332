//! Errors raised while computing or rendering dependency trees

/// Build chain errors
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("invalid image reference {reference:?}: {reason}")]
    MalformedReference { reference: String, reason: String },

    #[error("invalid image repository {0:?}, expected namespace/name")]
    InvalidRepository(String),

    #[error("no tag {tag} exists in {repository}")]
    UnknownTag { tag: String, repository: String },

    #[error("no image repository available for building its dependency tree")]
    NoRepositories,

    #[error("build trigger cycle detected: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("cannot parse DOT output: {0}")]
    InvalidGraph(String),

    #[error("failed to serialize dependency tree: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for build chain operations
pub type ChainResult<T> = Result<T, ChainError>;
