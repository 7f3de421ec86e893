//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A profile name is empty or otherwise unusable.
    #[error("invalid profile name: {0}")]
    InvalidProfileName(String),

    /// An API key is empty.
    #[error("invalid API key: key must not be empty")]
    InvalidApiKey,

    /// A base URL is malformed or uses an unsupported scheme.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// A namespace identifier is empty where one is required.
    #[error("invalid namespace id: {0}")]
    InvalidNamespaceId(String),

    /// The namespace delimiter is empty; splitting on an empty
    /// delimiter is rejected rather than left undefined.
    #[error("namespace delimiter must not be empty")]
    EmptyDelimiter,

    /// No profile with the given id exists in the registry.
    #[error("unknown profile: {0}")]
    UnknownProfile(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
